use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use si4463_chat::{ChatConfig, ChatSession, TurnConfig};
use si4463_driver::CancelToken;
use tracing::debug;

use crate::cmd::{bring_up, install_ctrlc_handler, load_config, open_chip, parse_duration, ChatArgs};
use crate::exit::{chat_error, driver_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

/// How often the message source looks at the cancel flag while stdin is idle.
const INPUT_POLL: Duration = Duration::from_millis(100);

pub fn run(args: ChatArgs, format: OutputFormat) -> CliResult<i32> {
    let handoff_timeout = args
        .handoff_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;

    let directives = load_config(&args.radio.config)?;
    let chip = open_chip(&args.port)?;
    bring_up(&chip, &directives)?;
    chip.clear_interrupts()
        .map_err(|err| driver_error("clear interrupts failed", err))?;

    let cancel = CancelToken::new();
    install_ctrlc_handler(cancel.clone())?;

    let channel = args.radio.channel;
    let session = ChatSession::new(
        Arc::new(chip),
        ChatConfig {
            channel,
            ..ChatConfig::default()
        },
        TurnConfig { handoff_timeout },
    );
    session
        .run(
            stdin_lines(cancel.clone()),
            |message| print_message(&message, channel, format),
            &cancel,
        )
        .map_err(|err| chat_error("chat failed", err))?;

    Ok(SUCCESS)
}

/// Lines typed on stdin, ending at EOF or once `cancel` is tripped.
///
/// Reading happens on a detached thread so a cancelled session never waits
/// on a blocked `read_line`.
fn stdin_lines(cancel: CancelToken) -> impl Iterator<Item = String> + Send + 'static {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
    cancellable(rx, cancel)
}

fn cancellable(
    rx: mpsc::Receiver<String>,
    cancel: CancelToken,
) -> impl Iterator<Item = String> + Send + 'static {
    std::iter::from_fn(move || loop {
        if cancel.is_cancelled() {
            return None;
        }
        match rx.recv_timeout(INPUT_POLL) {
            Ok(line) => return Some(line),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    })
}
