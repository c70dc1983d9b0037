//! Reader for the `radio_config.h` export of the chip vendor's
//! configuration tool.
//!
//! Each `#define RF_<NAME> <value>` line is one command for the chip, sent
//! verbatim with no expected response. Values are either a comma-separated
//! list of byte integers (optionally parenthesized) or a bytes literal such
//! as `b'\x11\x00'`. Every other line is ignored.

use std::path::Path;
use std::sync::OnceLock;

use bytes::{BufMut, Bytes, BytesMut};
use regex::Regex;

use crate::error::ConfigError;

/// One configuration command taken from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDirective {
    /// The macro name, e.g. `RF_POWER_UP`.
    pub name: String,
    /// The bytes to send.
    pub bytes: Bytes,
}

fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#define (RF_[A-Z0-9_]+) (.*)$").expect("directive pattern is valid")
    })
}

/// Read and parse a configuration file.
pub fn load_radio_config(path: impl AsRef<Path>) -> Result<Vec<ConfigDirective>, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_radio_config(&text)
}

/// Parse configuration text into directives, in file order.
pub fn parse_radio_config(text: &str) -> Result<Vec<ConfigDirective>, ConfigError> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let Some(caps) = directive_pattern().captures(line.trim_end()) else {
            continue;
        };
        let name = caps[1].to_string();
        let bytes =
            parse_literal(caps[2].trim()).map_err(|reason| ConfigError::InvalidLiteral {
                line: idx + 1,
                name: name.clone(),
                reason,
            })?;
        if bytes.is_empty() {
            return Err(ConfigError::InvalidLiteral {
                line: idx + 1,
                name,
                reason: "value encodes to zero bytes".to_string(),
            });
        }
        out.push(ConfigDirective { name, bytes });
    }
    Ok(out)
}

fn parse_literal(value: &str) -> Result<Bytes, String> {
    if let Some(body) = strip_bytes_literal(value) {
        return parse_bytes_body(body);
    }

    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(value);

    let mut out = BytesMut::new();
    let mut parts = inner.split(',').map(str::trim).peekable();
    while let Some(part) = parts.next() {
        // A single trailing comma is allowed, as in `(0x02,)`.
        if part.is_empty() && parts.peek().is_none() && !out.is_empty() {
            break;
        }
        out.put_u8(parse_byte(part)?);
    }
    Ok(out.freeze())
}

fn parse_byte(token: &str) -> Result<u8, String> {
    let cleaned = token.replace('_', "");
    let parsed = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        u32::from_str_radix(bin, 2)
    } else {
        cleaned.parse::<u32>()
    };

    match parsed {
        Ok(value) if value <= 0xFF => Ok(value as u8),
        Ok(value) => Err(format!("{value} does not fit in a byte")),
        Err(_) => Err(format!("'{token}' is not an integer literal")),
    }
}

fn strip_bytes_literal(value: &str) -> Option<&str> {
    let rest = value.strip_prefix('b').or_else(|| value.strip_prefix('B'))?;
    for quote in ['\'', '"'] {
        let Some(inner) = rest.strip_prefix(quote) else {
            continue;
        };
        if let Some(body) = inner.strip_suffix(quote) {
            return Some(body);
        }
    }
    None
}

fn parse_bytes_body(body: &str) -> Result<Bytes, String> {
    let mut out = BytesMut::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            if !c.is_ascii() {
                return Err(format!("non-ASCII character '{c}' in bytes literal"));
            }
            out.put_u8(c as u8);
            continue;
        }
        let escaped = chars
            .next()
            .ok_or_else(|| "dangling backslash in bytes literal".to_string())?;
        let byte = match escaped {
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return Err("truncated \\x escape".to_string());
                }
                u8::from_str_radix(&hex, 16).map_err(|_| format!("invalid \\x escape '{hex}'"))?
            }
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            '0' => 0,
            '\\' => b'\\',
            '\'' => b'\'',
            '"' => b'"',
            other => return Err(format!("unsupported escape '\\{other}'")),
        };
        out.put_u8(byte);
    }
    Ok(out.freeze())
}
