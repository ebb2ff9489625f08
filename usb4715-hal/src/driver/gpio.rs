use super::USB4715;
use crate::Error;
use crate::gpio::{GpioDirection, GpioPin, GpioState, LogicLevel};
use crate::registers::RegisterAddress;
use crate::transport::Transport;

impl<T: Transport> USB4715<T> {
    /// Read the levels present on both GPIO lines.
    pub fn gpio_read(&self) -> Result<GpioState, Error> {
        self.with_access(|access| access.read_byte(RegisterAddress::GPIO_INPUT))
            .map(GpioState::new)
    }

    /// Read the levels the GPIO lines are set to drive.
    pub fn gpio_read_output(&self) -> Result<GpioState, Error> {
        self.with_access(|access| access.read_byte(RegisterAddress::GPIO_OUTPUT))
            .map(GpioState::new)
    }

    /// Set the output levels of both GPIO lines.
    ///
    /// The output register also holds the drive-strength setting and undocumented
    /// bits, so it is read first and only the two line bits are changed.
    pub fn gpio_write(&self, state: GpioState) -> Result<(), Error> {
        self.gpio_update(RegisterAddress::GPIO_OUTPUT, GpioState::MASK, state.bits())
    }

    /// Set the output level of one GPIO line, leaving the other as it is.
    pub fn gpio_set_level(&self, pin: GpioPin, level: LogicLevel) -> Result<(), Error> {
        let mask = 1 << pin.bit();
        let bits = if level.is_high() { mask } else { 0 };
        self.gpio_update(RegisterAddress::GPIO_OUTPUT, mask, bits)
    }

    /// Make one GPIO line an input or an output.
    pub fn gpio_set_direction(&self, pin: GpioPin, direction: GpioDirection) -> Result<(), Error> {
        let mask = 1 << pin.bit();
        let bits = if bool::from(direction) { mask } else { 0 };
        self.gpio_update(RegisterAddress::GPIO_DIRECTION, mask, bits)
    }

    /// Read-modify-write of the bits in `mask`, under one lock.
    fn gpio_update(&self, register: RegisterAddress, mask: u8, bits: u8) -> Result<(), Error> {
        self.with_access(|access| {
            let current = access.read_byte(register)?;
            let updated = (current & !mask) | (bits & mask);
            access.write(register, u32::from(updated))
        })
    }
}
