use anyhow::Context;
use clap::Parser;
use usb4715_hal::USB4715;

use cli::Commands;

mod cli;
mod gpio;
mod i2c;
mod registers;
mod spi;
mod util;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let device = USB4715::connect_with_vid_and_pid(cli.vid, cli.pid)
        .with_context(|| format!("opening hub {:04X}:{:04X}", cli.vid, cli.pid))?;
    match cli.command {
        Commands::Info => {
            println!("Revision:   {}", device.revision()?);
            println!("Vendor ID:  {:#06X}", device.vendor_id()?);
            println!("Product ID: {:#06X}", device.product_id()?);
        }
        Commands::Register(command) => registers::action(&device, command)?,
        Commands::I2c(command) => i2c::action(&device, command)?,
        Commands::Spi(command) => spi::action(&device, command)?,
        Commands::Gpio(command) => gpio::action(&device, command)?,
        Commands::Currents { ports } => {
            let ports = if ports.is_empty() {
                vec![1, 2, 3, 4]
            } else {
                ports
            };
            let currents = device
                .port_currents(&ports)
                .context("reading port currents (is I2C enabled?)")?;
            for (port, current) in ports.iter().zip(currents) {
                println!("Port {port}: {current:7.1} mA");
            }
        }
    }
    Ok(())
}
