use tracing::info;

use crate::cmd::{open_channel, IdentifyArgs};
use crate::exit::{channel_error, CliResult, SUCCESS};

pub fn run(args: IdentifyArgs) -> CliResult<i32> {
    let channel = open_channel(&args.port)?;
    channel
        .identify()
        .map_err(|err| channel_error("identify failed", err))?;
    info!(port = %args.port.port, "bridge identified");

    if args.reset {
        channel
            .reset_chip()
            .map_err(|err| channel_error("reset failed", err))?;
        info!(port = %args.port.port, "radio reset");
    }
    Ok(SUCCESS)
}
