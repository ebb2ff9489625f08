//! # I2C bus-scanning example
//!
//! This attempts to find out which devices are connected to the hub's I2C bus
//! by running a zero-length write to each possible address through the bridge.
//!
//! If a device acknowledges its address, the address is printed (in
//! hexadecimal). But if a connected device does not respond to writes,
//! then it won't appear in the output.
//!
//! On the Capable Robot hub the two port power switches answer at 0x56 and
//! 0x57.
use usb4715_hal::{I2cSpeed, USB4715};

fn main() -> Result<(), usb4715_hal::Error> {
    env_logger::init();
    let device = USB4715::connect()?;
    device.i2c_enable(I2cSpeed::Standard_100kbps)?;

    println!("Scanning the I2C bus...\n");
    for address in 0..128u8 {
        if start_line(address) {
            print!("{address:02X}:  ");
        }
        if device.i2c_check_address(address)? {
            print!("{address:02X} ");
        } else {
            print!("-- ")
        }
        if end_line(address) {
            println!();
        }
    }
    println!("{}", TRAILER);

    Ok(())
}

fn start_line(n: u8) -> bool {
    n % 16 == 0
}

fn end_line(n: u8) -> bool {
    n % 16 == 15
}

const TRAILER: &str = r#"
A two-digit number is an address (in hex) that was acknowledged."#;
