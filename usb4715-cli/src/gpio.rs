use clap::{Parser, ValueEnum};
use usb4715_hal::USB4715;
use usb4715_hal::gpio::{self, GpioPin, GpioState};

#[derive(Debug, Parser)]
#[command(flatten_help = true)]
pub(crate) enum GpioCommand {
    /// Read the input levels of both lines
    Read,
    /// Set the output levels of both lines
    Write {
        /// Two-bit value: GPIO0 is bit 0, GPIO1 is bit 1
        #[arg(value_parser = clap::value_parser!(u8).range(0..=3))]
        value: u8,
    },
    /// Make a line an input or an output
    Direction {
        #[arg(value_enum)]
        pin: Pin,
        #[arg(value_enum)]
        direction: GpioDirection,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum Pin {
    #[value(name = "0")]
    Gpio0,
    #[value(name = "1")]
    Gpio1,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum GpioDirection {
    #[value(alias = "in")]
    Input,
    #[value(alias = "out")]
    Output,
}

pub(crate) fn action(device: &USB4715, command: GpioCommand) -> Result<(), usb4715_hal::Error> {
    match command {
        GpioCommand::Read => {
            let state = device.gpio_read()?;
            println!("{state}");
            println!("GPIO0: {:?}", state.level(GpioPin::Gpio0));
            println!("GPIO1: {:?}", state.level(GpioPin::Gpio1));
        }
        GpioCommand::Write { value } => device.gpio_write(GpioState::new(value))?,
        GpioCommand::Direction { pin, direction } => {
            let pin = match pin {
                Pin::Gpio0 => GpioPin::Gpio0,
                Pin::Gpio1 => GpioPin::Gpio1,
            };
            let direction = match direction {
                GpioDirection::Input => gpio::GpioDirection::Input,
                GpioDirection::Output => gpio::GpioDirection::Output,
            };
            device.gpio_set_direction(pin, direction)?;
        }
    }
    Ok(())
}
