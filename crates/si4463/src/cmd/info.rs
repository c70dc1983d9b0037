use crate::cmd::{open_chip, InfoArgs};
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::{print_info, InfoOutput, OutputFormat};

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let chip = open_chip(&args.port)?;
    let part = chip
        .part_info()
        .map_err(|err| driver_error("part info failed", err))?;
    let state = chip
        .request_device_state()
        .map_err(|err| driver_error("device state failed", err))?;

    print_info(&InfoOutput::new(&args.port.port, &part, &state), format);
    Ok(SUCCESS)
}
