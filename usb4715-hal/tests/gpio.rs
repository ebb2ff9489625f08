//! GPIO control against the simulated hub.
mod common;

use common::{Op, driver};
use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};
use usb4715_hal::Error;
use usb4715_hal::RegisterAddress;
use usb4715_hal::gpio::{GpioDirection, GpioPin, GpioState, LogicLevel};

/// Writing 0b10 and reading back gives 0b10, with no polling.
#[test]
fn write_then_read() -> Result<(), Error> {
    let (device, hub) = driver();
    device.gpio_write(GpioState::new(0b10))?;
    assert_eq!(device.gpio_read()?, GpioState::new(0b10));
    assert_eq!(
        hub.log(),
        vec![
            Op::Read(RegisterAddress::GPIO_OUTPUT),
            Op::Write(RegisterAddress::GPIO_OUTPUT, 0b0011_0010),
            Op::Read(RegisterAddress::GPIO_INPUT),
        ]
    );
    Ok(())
}

/// Drive-strength and undocumented bits survive a write.
#[test]
fn write_preserves_other_bits() -> Result<(), Error> {
    let (device, hub) = driver();
    hub.state()
        .registers
        .insert(RegisterAddress::GPIO_OUTPUT, 0b1010_0101);
    device.gpio_write(GpioState::new(0b10))?;
    assert_eq!(
        device.register_read(RegisterAddress::GPIO_OUTPUT)?.raw(),
        0b1010_0110
    );
    Ok(())
}

/// Input lines report the external level, not the output latch.
#[test]
fn direction_selects_source() -> Result<(), Error> {
    let (device, hub) = driver();
    hub.state().gpio_external = 0b01;
    device.gpio_set_direction(GpioPin::Gpio0, GpioDirection::Input)?;
    device.gpio_write(GpioState::new(0b10))?;
    assert_eq!(device.gpio_read()?.bits(), 0b11);
    assert_eq!(
        device.register_read(RegisterAddress::GPIO_DIRECTION)?.raw(),
        0b10
    );
    Ok(())
}

/// Pin handles can only be taken once.
#[test]
fn pins_taken_once() {
    let (device, _hub) = driver();
    assert!(device.take_pins().is_ok());
    assert!(matches!(device.take_pins(), Err(Error::PinsAlreadyTaken)));
}

/// embedded-hal pin traits drive and read single lines.
#[test]
fn embedded_hal_pins() -> Result<(), Error> {
    let (device, hub) = driver();
    hub.state().gpio_external = 0b01;
    let pins = device.take_pins()?;
    let mut input = pins.gpio0.configure_as_digital_input()?;
    let mut output = pins.gpio1.configure_as_digital_output()?;

    output.set_high()?;
    assert!(output.is_set_high()?);
    assert_eq!(output.get_output_level()?, LogicLevel::High);
    assert!(input.is_high()?);

    output.set_low()?;
    assert!(output.is_set_low()?);
    assert_eq!(device.gpio_read()?.level(GpioPin::Gpio1), LogicLevel::Low);

    let line = input.destroy();
    assert_eq!(line.pin(), GpioPin::Gpio0);
    Ok(())
}
