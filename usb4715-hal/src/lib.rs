#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
mod config;
mod constants;
mod driver;
mod error;
mod facade;
pub mod gpio;
pub mod i2c;
pub mod registers;
pub mod spi;
pub mod status;
pub mod transport;

pub use codec::RegisterValue;
pub use config::BridgeConfig;
pub use driver::USB4715;
pub use error::{Bus, BusTimeoutCause, Error, InvalidTransaction, NackPhase};
pub use facade::BusClient;
pub use i2c::{I2cSpeed, I2cTransaction};
pub use registers::RegisterAddress;
pub use spi::{SpiMode, SpiSettings, SpiTransaction};
