use clap::Parser;
use usb4715_hal::{SpiSettings, USB4715};

use crate::util;

#[derive(Debug, Parser)]
#[command(flatten_help = true)]
pub(crate) enum SpiCommand {
    /// Exchange bytes, printing what was clocked in
    Transfer {
        /// Clock polarity and phase
        #[arg(long, value_enum, default_value = "0")]
        mode: SpiMode,
        /// Divisor of the 48 MHz reference clock
        #[arg(long, default_value_t = 48)]
        divisor: u16,
        /// Bytes to send in hexadecimal
        #[arg(value_parser = util::u8_from_hex, required = true)]
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub(crate) enum SpiMode {
    /// CPOL 0, CPHA 0
    #[value(name = "0")]
    Mode0,
    /// CPOL 0, CPHA 1
    #[value(name = "1")]
    Mode1,
    /// CPOL 1, CPHA 0
    #[value(name = "2")]
    Mode2,
    /// CPOL 1, CPHA 1
    #[value(name = "3")]
    Mode3,
}

impl From<SpiMode> for usb4715_hal::SpiMode {
    fn from(value: SpiMode) -> Self {
        match value {
            SpiMode::Mode0 => usb4715_hal::SpiMode::Mode0,
            SpiMode::Mode1 => usb4715_hal::SpiMode::Mode1,
            SpiMode::Mode2 => usb4715_hal::SpiMode::Mode2,
            SpiMode::Mode3 => usb4715_hal::SpiMode::Mode3,
        }
    }
}

pub(crate) fn action(device: &USB4715, command: SpiCommand) -> Result<(), usb4715_hal::Error> {
    match command {
        SpiCommand::Transfer {
            mode,
            divisor,
            bytes,
        } => {
            let settings = SpiSettings {
                mode: mode.into(),
                clock_divisor: divisor,
            };
            util::print_bytes(&device.spi_transfer_with(settings, &bytes)?);
        }
    }
    Ok(())
}
