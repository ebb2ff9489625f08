//! # Downstream port current monitor
//!
//! Prints the current drawn on each of the four downstream ports once a second,
//! read from the hub's power switches over the I2C bridge.
use std::thread::sleep;
use std::time::Duration;

use usb4715_hal::{I2cSpeed, USB4715};

fn main() -> Result<(), usb4715_hal::Error> {
    env_logger::init();
    let device = USB4715::connect()?;
    device.i2c_enable(I2cSpeed::Standard_100kbps)?;

    loop {
        let currents = device.port_currents(&[1, 2, 3, 4])?;
        let line: Vec<String> = currents.iter().map(|ma| format!("{ma:7.1} mA")).collect();
        println!("{}", line.join("  "));
        sleep(Duration::from_secs(1));
    }
}
