use crate::gpio::GpioCommand;
use crate::i2c::I2cCommand;
use crate::registers::RegisterCommand;
use crate::spi::SpiCommand;
use crate::util;

use clap::{ArgAction, Parser};

/// CLI for the USB4715 hub's register bank and bus bridges
///
/// This talks to the hub controller over USB vendor control transfers. Registers
/// can be read and written by name or address, the two GPIO lines read and
/// driven, and I2C and SPI transfers of up to 32 bytes made through the hub's
/// bridges (longer SPI transfers are split).
///
/// The I2C bridge must be enabled with `i2c enable` once after the hub powers up.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    /// Device vendor ID in hexadecimal
    #[arg(long = "vid", default_value = "0x0424", value_parser = util::u16_from_hex)]
    pub(crate) vid: u16,
    /// Device product ID in hexadecimal
    #[arg(long = "pid", default_value = "0x494C", value_parser = util::u16_from_hex)]
    pub(crate) pid: u16,
    /// Log more detail (-v info, -vv register accesses, -vvv control transfers)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Parser)]
pub(crate) enum Commands {
    /// Show the chip revision and USB IDs.
    Info,
    /// Read or write hub registers.
    #[command(subcommand)]
    Register(RegisterCommand),
    /// Perform I2C transfers
    #[command(subcommand)]
    I2c(I2cCommand),
    /// Perform SPI transfers
    #[command(subcommand)]
    Spi(SpiCommand),
    /// Read or drive the GPIO lines.
    #[command(subcommand)]
    Gpio(GpioCommand),
    /// Show the current drawn on downstream ports.
    Currents {
        /// Ports to measure (1 to 4), all if omitted
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        ports: Vec<u8>,
    },
}
