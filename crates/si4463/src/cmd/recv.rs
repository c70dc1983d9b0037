use si4463_chat::{receive_message, ChatError, MAX_PACKET_LEN};
use si4463_driver::{CancelToken, DriverError, PollOptions};

use crate::cmd::{bring_up, install_ctrlc_handler, load_config, open_chip, RecvArgs};
use crate::exit::{chat_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: RecvArgs, format: OutputFormat) -> CliResult<i32> {
    let directives = load_config(&args.radio.config)?;
    let chip = open_chip(&args.port)?;
    bring_up(&chip, &directives)?;

    let cancel = CancelToken::new();
    install_ctrlc_handler(cancel.clone())?;
    let poll = PollOptions::unbounded().with_cancel(cancel.clone());

    let mut printed = 0usize;
    while !cancel.is_cancelled() {
        let message = match receive_message(&chip, args.radio.channel, MAX_PACKET_LEN as u8, &poll)
        {
            Ok(message) => message,
            Err(ChatError::Driver(DriverError::Cancelled)) => break,
            Err(err) => return Err(chat_error("receive failed", err)),
        };

        print_message(&message, args.radio.channel, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    Ok(SUCCESS)
}
