use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use si4463_chat::ChatMessage;
use si4463_driver::{DeviceState, PartInfo};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput {
    channel: u8,
    length: usize,
    message: String,
    timestamp: String,
}

pub fn print_message(message: &ChatMessage, channel: u8, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                channel,
                length: message.payload.len(),
                message: message.text().into_owned(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "SIZE", "MESSAGE"])
                .add_row(vec![
                    channel.to_string(),
                    message.payload.len().to_string(),
                    message.text().into_owned(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("> {}", message.text());
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            let _ = out.write_all(&message.payload);
            let _ = out.write_all(b"\n");
            let _ = out.flush();
        }
    }
}

#[derive(Serialize)]
pub struct InfoOutput {
    pub port: String,
    pub chip_revision: u8,
    pub part: String,
    pub build_id: u8,
    pub id: String,
    pub customer_id: u8,
    pub rom_id: u8,
    pub state: &'static str,
    pub channel: u8,
}

impl InfoOutput {
    pub fn new(port: &str, info: &PartInfo, state: &DeviceState) -> Self {
        Self {
            port: port.to_string(),
            chip_revision: info.chip_revision,
            part: format!("0x{:04X}", info.part),
            build_id: info.build_id,
            id: format!("0x{:04X}", info.id),
            customer_id: info.customer_id,
            rom_id: info.rom_id,
            state: state.state.name(),
            channel: state.channel,
        }
    }
}

pub fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["Port".to_string(), out.port.clone()])
                .add_row(vec!["Part".to_string(), out.part.clone()])
                .add_row(vec!["Revision".to_string(), out.chip_revision.to_string()])
                .add_row(vec!["Build".to_string(), out.build_id.to_string()])
                .add_row(vec!["ID".to_string(), out.id.clone()])
                .add_row(vec!["Customer".to_string(), out.customer_id.to_string()])
                .add_row(vec!["ROM".to_string(), out.rom_id.to_string()])
                .add_row(vec!["State".to_string(), out.state.to_string()])
                .add_row(vec!["Channel".to_string(), out.channel.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Radio Info:");
            println!("  Port:     {}", out.port);
            println!("  Part:     {} (rev {})", out.part, out.chip_revision);
            println!("  Build:    {}", out.build_id);
            println!("  ID:       {}", out.id);
            println!("  Customer: {}", out.customer_id);
            println!("  ROM:      {}", out.rom_id);
            println!("  State:    {} (channel {})", out.state, out.channel);
        }
        OutputFormat::Raw => {
            println!("{}", out.part);
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
