use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use si4463_driver::{load_radio_config, CancelToken, ConfigDirective, PartInfo, Si4463};
use si4463_frame::{ChannelConfig, CommandChannel};
use si4463_transport::{SerialConfig, SerialStream, DEFAULT_BAUD_RATE};
use tracing::info;

use crate::exit::{channel_error, config_error, driver_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod chat;
pub mod identify;
pub mod info;
pub mod recv;
pub mod send;
pub mod version;

pub type Chip = Si4463<SerialStream>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transmit a single message.
    Send(SendArgs),
    /// Print received messages.
    Recv(RecvArgs),
    /// Interactive chat: lines from stdin go out, received messages are printed.
    Chat(ChatArgs),
    /// Show chip identity and state.
    Info(InfoArgs),
    /// Blink the bridge LED.
    Identify(IdentifyArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Recv(args) => recv::run(args, format),
        Command::Chat(args) => chat::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Identify(args) => identify::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial port of the bridge (e.g. /dev/ttyUSB0).
    pub port: String,
    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Give up on a bridge response after this long (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub response_timeout: String,
}

#[derive(Args, Debug)]
pub struct RadioArgs {
    /// Radio configuration header exported by the vendor tool.
    #[arg(long, default_value = "radio_config.h")]
    pub config: PathBuf,
    /// Radio channel.
    #[arg(long, short = 'c', default_value_t = 0)]
    pub channel: u8,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Message to send (at most 63 bytes).
    pub message: String,
    #[command(flatten)]
    pub radio: RadioArgs,
    /// Give up if the chip has not reported the packet sent (e.g. 5s).
    #[arg(long)]
    pub timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecvArgs {
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub radio: RadioArgs,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub radio: RadioArgs,
    /// Fail if a turn handoff takes longer than this (e.g. 10s). Default: wait forever.
    #[arg(long)]
    pub handoff_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub port: PortArgs,
}

#[derive(Args, Debug)]
pub struct IdentifyArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Also power-cycle the radio.
    #[arg(long)]
    pub reset: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the bridge command channel on the given port.
pub fn open_channel(args: &PortArgs) -> CliResult<CommandChannel<SerialStream>> {
    let response_timeout = parse_duration(&args.response_timeout)?;
    let serial = SerialConfig {
        baud_rate: args.baud,
        ..SerialConfig::default()
    };
    let config = ChannelConfig {
        response_timeout: Some(response_timeout),
    };
    CommandChannel::open(&args.port, &serial, config)
        .map_err(|err| channel_error("open failed", err))
}

pub fn open_chip(args: &PortArgs) -> CliResult<Chip> {
    open_channel(args).map(Si4463::from_channel)
}

/// Read the radio configuration. Done before the port is opened so a bad
/// file never touches the hardware.
pub fn load_config(path: &Path) -> CliResult<Vec<ConfigDirective>> {
    let directives = load_radio_config(path).map_err(|err| config_error("config", err))?;
    info!(path = %path.display(), directives = directives.len(), "radio configuration loaded");
    Ok(directives)
}

pub fn bring_up(chip: &Chip, directives: &[ConfigDirective]) -> CliResult<PartInfo> {
    chip.bring_up(directives)
        .map_err(|err| driver_error("bring-up failed", err))
}

/// Trip `cancel` on Ctrl-C.
pub fn install_ctrlc_handler(cancel: CancelToken) -> CliResult<()> {
    ctrlc::set_handler(move || cancel.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert_eq!(parse_duration("0s").unwrap_err().code, USAGE);
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn missing_config_file_is_usage() {
        let err = load_config(Path::new("/nonexistent/radio_config.h")).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
