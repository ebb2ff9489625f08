use clap::Parser;
use usb4715_hal::{RegisterAddress, RegisterValue, USB4715};

use crate::util;

#[derive(Debug, Parser)]
#[command(flatten_help = true)]
pub(crate) enum RegisterCommand {
    /// Read a register and show its fields.
    Read {
        /// Register name (eg I2C_STATUS, SPI_DATA[3]) or absolute address
        #[arg(value_parser = parse_register)]
        register: RegisterAddress,
    },
    /// Write a register.
    Write {
        /// Register name (eg GPIO_DIRECTION) or absolute address
        #[arg(value_parser = parse_register)]
        register: RegisterAddress,
        /// Value, decimal or 0x-prefixed hexadecimal
        #[arg(value_parser = util::u32_from_int)]
        value: u32,
    },
    /// List every known register.
    List,
}

/// A register name, or an absolute address in `0x` hexadecimal.
fn parse_register(value: &str) -> Result<RegisterAddress, String> {
    if value.starts_with("0x") || value.starts_with("0X") {
        let address = util::u32_from_int(value).map_err(|e| e.to_string())?;
        RegisterAddress::try_from(address).map_err(|e| e.to_string())
    } else {
        value.parse().map_err(|e: usb4715_hal::Error| e.to_string())
    }
}

fn print_register(value: &RegisterValue) {
    println!("{:#010X} {}", value.address().absolute(), value);
    for (name, field) in value.fields() {
        println!("       {name} : {field:#X}");
    }
    if value.undefined_bits() != 0 {
        println!("       (undefined bits {:#X})", value.undefined_bits());
    }
}

pub(crate) fn action(device: &USB4715, command: RegisterCommand) -> Result<(), usb4715_hal::Error> {
    match command {
        RegisterCommand::Read { register } => print_register(&device.register_read(register)?),
        RegisterCommand::Write { register, value } => device.register_write(register, value)?,
        RegisterCommand::List => {
            for address in RegisterAddress::all() {
                let info = address.info();
                println!(
                    "{:#010X} {:<20} {} byte(s) {:?}",
                    address.absolute(),
                    address.to_string(),
                    info.width.bytes(),
                    info.access
                );
            }
        }
    }
    Ok(())
}
