use si4463_chat::{send_message, MAX_MESSAGE_LEN};
use si4463_driver::PollOptions;

use crate::cmd::{bring_up, load_config, open_chip, parse_duration, SendArgs};
use crate::exit::{chat_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, _format: OutputFormat) -> CliResult<i32> {
    let message = args.message.as_bytes();
    if message.len() > MAX_MESSAGE_LEN {
        return Err(CliError::new(
            USAGE,
            format!(
                "message is {} bytes; at most {MAX_MESSAGE_LEN} fit in one packet",
                message.len()
            ),
        ));
    }

    let mut poll = PollOptions::unbounded();
    if let Some(timeout) = &args.timeout {
        poll = poll.with_timeout(parse_duration(timeout)?);
    }

    let directives = load_config(&args.radio.config)?;
    let chip = open_chip(&args.port)?;
    bring_up(&chip, &directives)?;

    send_message(&chip, message, args.radio.channel, &poll)
        .map_err(|err| chat_error("send failed", err))?;
    Ok(SUCCESS)
}
