use clap::Parser;
use usb4715_hal::USB4715;

use crate::util;

#[derive(Debug, Parser)]
#[command(flatten_help = true)]
pub(crate) enum I2cCommand {
    /// Enable I2C pass-through at the given bus speed
    Enable {
        #[arg(long, value_enum, default_value = "standard")]
        speed: I2cSpeed,
    },
    /// List addresses that acknowledge a probe
    Scan,
    /// Read bytes from a target
    Read {
        /// 7-bit target address in hexadecimal
        #[arg(value_parser = util::i2c_address)]
        address: u8,
        /// Number of bytes to read (at most 32)
        length: usize,
    },
    /// Write bytes to a target
    Write {
        /// 7-bit target address in hexadecimal
        #[arg(value_parser = util::i2c_address)]
        address: u8,
        /// Bytes in hexadecimal (at most 32)
        #[arg(value_parser = util::u8_from_hex, required = true)]
        bytes: Vec<u8>,
    },
    /// Write bytes to a target, then read from it after a repeated START
    WriteRead {
        /// 7-bit target address in hexadecimal
        #[arg(value_parser = util::i2c_address)]
        address: u8,
        /// Number of bytes to read (at most 32)
        length: usize,
        /// Bytes to write in hexadecimal (at most 32)
        #[arg(value_parser = util::u8_from_hex, required = true)]
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub(crate) enum I2cSpeed {
    /// 400kbps "fast" mode
    Fast,
    /// 250kbps
    Medium250,
    /// 200kbps
    Medium200,
    /// 100kbps "standard" mode
    Standard,
    /// 80kbps
    Slow80,
    /// 50kbps
    Slow50,
}

impl From<I2cSpeed> for usb4715_hal::I2cSpeed {
    fn from(value: I2cSpeed) -> usb4715_hal::I2cSpeed {
        match value {
            I2cSpeed::Fast => usb4715_hal::I2cSpeed::Fast_400kbps,
            I2cSpeed::Medium250 => usb4715_hal::I2cSpeed::Medium_250kbps,
            I2cSpeed::Medium200 => usb4715_hal::I2cSpeed::Medium_200kbps,
            I2cSpeed::Standard => usb4715_hal::I2cSpeed::Standard_100kbps,
            I2cSpeed::Slow80 => usb4715_hal::I2cSpeed::Slow_80kbps,
            I2cSpeed::Slow50 => usb4715_hal::I2cSpeed::Slow_50kbps,
        }
    }
}

pub(crate) fn action(device: &USB4715, command: I2cCommand) -> Result<(), usb4715_hal::Error> {
    match command {
        I2cCommand::Enable { speed } => device.i2c_enable(speed.into())?,
        I2cCommand::Scan => {
            for address in 0x08..0x78u8 {
                if device.i2c_check_address(address)? {
                    println!("{address:#04X}");
                }
            }
        }
        I2cCommand::Read { address, length } => {
            util::print_bytes(&device.i2c_read(address, length)?);
        }
        I2cCommand::Write { address, bytes } => device.i2c_write(address, &bytes)?,
        I2cCommand::WriteRead {
            address,
            length,
            bytes,
        } => util::print_bytes(&device.i2c_write_read(address, &bytes, length)?),
    }
    Ok(())
}
