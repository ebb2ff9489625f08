use super::{GpioDirection, GpioPin, LogicLevel};
use crate::transport::Transport;
use crate::{Error, USB4715};

/// A GPIO line that can be configured as a digital input or output.
#[derive(Debug)]
pub struct GpioLine<'a, T: Transport> {
    driver: &'a USB4715<T>,
    pin: GpioPin,
}

impl<'a, T: Transport> GpioLine<'a, T> {
    /// Which line this is.
    pub fn pin(&self) -> GpioPin {
        self.pin
    }

    /// Set the line up as a digital input.
    ///
    /// You can retrieve the line (for reconfiguration as an output) by calling
    /// [`Input::destroy`].
    pub fn configure_as_digital_input(self) -> Result<Input<'a, T>, Error> {
        self.driver
            .gpio_set_direction(self.pin, GpioDirection::Input)?;
        Ok(Input(self))
    }

    /// Set the line up as a digital output.
    ///
    /// You can retrieve the line (for reconfiguration as an input) by calling
    /// [`Output::destroy`].
    pub fn configure_as_digital_output(self) -> Result<Output<'a, T>, Error> {
        self.driver
            .gpio_set_direction(self.pin, GpioDirection::Output)?;
        Ok(Output(self))
    }
}

impl<'a, T: Transport> TryFrom<GpioLine<'a, T>> for Input<'a, T> {
    type Error = Error;
    fn try_from(line: GpioLine<'a, T>) -> Result<Self, Self::Error> {
        line.configure_as_digital_input()
    }
}

impl<'a, T: Transport> TryFrom<GpioLine<'a, T>> for Output<'a, T> {
    type Error = Error;
    fn try_from(line: GpioLine<'a, T>) -> Result<Self, Self::Error> {
        line.configure_as_digital_output()
    }
}

/// A GPIO line in input mode.
#[derive(Debug)]
pub struct Input<'a, T: Transport>(GpioLine<'a, T>);

impl<'a, T: Transport> Input<'a, T> {
    /// Read the level at this line.
    pub fn get_level(&self) -> Result<LogicLevel, Error> {
        Ok(self.0.driver.gpio_read()?.level(self.0.pin))
    }

    /// Return the underlying line, so that it can be reconfigured.
    ///
    /// This does not change any hub settings.
    pub fn destroy(self) -> GpioLine<'a, T> {
        self.0
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl<T: Transport> embedded_hal::digital::ErrorType for Input<'_, T> {
    type Error = Error;
}

impl<T: Transport> embedded_hal::digital::InputPin for Input<'_, T> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.get_level().map(LogicLevel::is_high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.get_level().map(LogicLevel::is_low)
    }
}

/// A GPIO line in output mode.
#[derive(Debug)]
pub struct Output<'a, T: Transport>(GpioLine<'a, T>);

impl<'a, T: Transport> Output<'a, T> {
    /// Drive this line to `level`, leaving the other line untouched.
    pub fn set_level(&self, level: LogicLevel) -> Result<(), Error> {
        self.0.driver.gpio_set_level(self.0.pin, level)
    }

    /// The level this line is currently set to drive.
    pub fn get_output_level(&self) -> Result<LogicLevel, Error> {
        Ok(self.0.driver.gpio_read_output()?.level(self.0.pin))
    }

    /// Return the underlying line, so that it can be reconfigured.
    pub fn destroy(self) -> GpioLine<'a, T> {
        self.0
    }
}

impl<T: Transport> embedded_hal::digital::ErrorType for Output<'_, T> {
    type Error = Error;
}

impl<T: Transport> embedded_hal::digital::OutputPin for Output<'_, T> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::High)
    }
}

impl<T: Transport> embedded_hal::digital::StatefulOutputPin for Output<'_, T> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.get_output_level().map(LogicLevel::is_high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.get_output_level().map(LogicLevel::is_low)
    }
}

impl<'a, T: Transport> TryFrom<Output<'a, T>> for Input<'a, T> {
    type Error = Error;

    fn try_from(value: Output<'a, T>) -> Result<Self, Self::Error> {
        value.destroy().configure_as_digital_input()
    }
}

impl<'a, T: Transport> TryFrom<Input<'a, T>> for Output<'a, T> {
    type Error = Error;

    fn try_from(value: Input<'a, T>) -> Result<Self, Self::Error> {
        value.destroy().configure_as_digital_output()
    }
}

/// The hub's two GPIO lines.
#[derive(Debug)]
pub struct Pins<'a, T: Transport> {
    /// Line GPIO0
    pub gpio0: GpioLine<'a, T>,
    /// Line GPIO1
    pub gpio1: GpioLine<'a, T>,
}

impl<'a, T: Transport> Pins<'a, T> {
    pub(crate) fn new(driver: &'a USB4715<T>) -> Self {
        Self {
            gpio0: GpioLine {
                driver,
                pin: GpioPin::Gpio0,
            },
            gpio1: GpioLine {
                driver,
                pin: GpioPin::Gpio1,
            },
        }
    }
}
