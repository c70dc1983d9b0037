//! Typed Si4463 operations over the bridge command channel.
//!
//! [`Si4463`] turns each chip command into one bridge request and decodes
//! the response. It also provides status polling and the loader for
//! `radio_config.h` exports.

pub mod config;
pub mod consts;
pub mod driver;
pub mod error;
pub mod part_info;
pub mod poll;
pub mod property;

pub use config::{load_radio_config, parse_radio_config, ConfigDirective};
pub use consts::{command, interrupt, State, EXPECTED_PART};
pub use driver::{DeviceState, RxOptions, Si4463, StartCondition, TxOptions};
pub use error::{ConfigError, DriverError, Result};
pub use part_info::{PartInfo, PART_INFO_LEN};
pub use poll::{CancelToken, PollOptions};
pub use property::PropertyValue;
