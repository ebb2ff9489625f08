//! The hub's two GPIO lines.

mod pins;

pub use pins::{GpioLine, Input, Output, Pins};

/// One of the two GPIO lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioPin {
    /// GPIO0, bit 0 of the GPIO registers.
    Gpio0,
    /// GPIO1, bit 1 of the GPIO registers.
    Gpio1,
}

impl GpioPin {
    /// Bit position of this line in the GPIO registers.
    pub fn bit(self) -> usize {
        match self {
            GpioPin::Gpio0 => 0,
            GpioPin::Gpio1 => 1,
        }
    }
}

/// GPIO line level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicLevel {
    /// Line driven or read high.
    High,
    /// Line driven or read low.
    Low,
}

impl LogicLevel {
    /// True if high.
    pub fn is_high(self) -> bool {
        self == LogicLevel::High
    }

    /// True if low.
    pub fn is_low(self) -> bool {
        self == LogicLevel::Low
    }
}

impl From<bool> for LogicLevel {
    fn from(value: bool) -> Self {
        if value { Self::High } else { Self::Low }
    }
}

impl From<LogicLevel> for bool {
    fn from(value: LogicLevel) -> Self {
        value.is_high()
    }
}

/// GPIO line direction.
///
/// In the GPIO_DIRECTION register a set bit makes the line an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    /// Line is read.
    Input,
    /// Line is driven.
    Output,
}

impl From<bool> for GpioDirection {
    fn from(value: bool) -> Self {
        if value { Self::Output } else { Self::Input }
    }
}

impl From<GpioDirection> for bool {
    fn from(value: GpioDirection) -> Self {
        matches!(value, GpioDirection::Output)
    }
}

/// Levels of both GPIO lines: GPIO0 in bit 0, GPIO1 in bit 1.
///
/// ```
/// use usb4715_hal::gpio::{GpioPin, GpioState, LogicLevel};
///
/// let state = GpioState::new(0b10);
/// assert_eq!(state.level(GpioPin::Gpio1), LogicLevel::High);
/// assert_eq!(state.with_level(GpioPin::Gpio0, LogicLevel::High).bits(), 0b11);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GpioState(u8);

impl GpioState {
    /// Mask of the bits that belong to the GPIO lines.
    pub const MASK: u8 = 0b11;

    /// Build a state from the low two bits of `bits`.
    pub fn new(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// The two-bit value.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Level of one line.
    pub fn level(self, pin: GpioPin) -> LogicLevel {
        LogicLevel::from(self.0 & (1 << pin.bit()) != 0)
    }

    /// Copy of this state with one line changed.
    pub fn with_level(self, pin: GpioPin, level: LogicLevel) -> Self {
        let bit = 1 << pin.bit();
        match level {
            LogicLevel::High => Self(self.0 | bit),
            LogicLevel::Low => Self(self.0 & !bit),
        }
    }
}

impl From<u8> for GpioState {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<GpioState> for u8 {
    fn from(value: GpioState) -> Self {
        value.0
    }
}

impl std::fmt::Display for GpioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04b}", self.0)
    }
}
