//! The hub's register map.
//!
//! Every register the driver touches is listed here with its width, access mode,
//! and named bitfields. This table is the wire format: the codec derives transfer
//! lengths from it and nothing else.
use std::str::FromStr;

use crate::Error;
use crate::constants::{BRIDGE_BUFFER_LEN, REGISTER_BASE};

/// Size of a register on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWidth {
    /// 8-bit register.
    One,
    /// 16-bit register.
    Two,
    /// 32-bit register.
    Four,
}

impl RegisterWidth {
    /// Number of bytes transferred for this register.
    pub const fn bytes(self) -> usize {
        match self {
            RegisterWidth::One => 1,
            RegisterWidth::Two => 2,
            RegisterWidth::Four => 4,
        }
    }

    /// Largest value representable in this width.
    pub const fn max_value(self) -> u32 {
        match self {
            RegisterWidth::One => 0xFF,
            RegisterWidth::Two => 0xFFFF,
            RegisterWidth::Four => 0xFFFF_FFFF,
        }
    }
}

/// Whether a register may be read, written, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Status and input registers.
    ReadOnly,
    /// Trigger and transmit-buffer registers.
    WriteOnly,
    /// Configuration registers.
    ReadWrite,
}

impl Access {
    /// True if the register can be read.
    pub fn readable(self) -> bool {
        !matches!(self, Access::WriteOnly)
    }

    /// True if the register can be written.
    pub fn writable(self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

/// A named bitfield within a register, covering bits `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field name as printed by tools.
    pub name: &'static str,
    /// First bit (inclusive).
    pub start: usize,
    /// Last bit (exclusive).
    pub end: usize,
}

impl Field {
    const fn new(name: &'static str, start: usize, end: usize) -> Self {
        Self { name, start, end }
    }

    const fn bit(name: &'static str, bit: usize) -> Self {
        Self::new(name, bit, bit + 1)
    }

    /// Mask of the bits covered by this field.
    pub fn mask(&self) -> u32 {
        let width = self.end - self.start;
        let ones = if width >= 32 { u32::MAX } else { (1 << width) - 1 };
        ones << self.start
    }
}

/// Static description of a register (or a bank of identical buffer registers).
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterInfo {
    /// Register name, without any buffer index.
    pub name: &'static str,
    /// Size on the wire.
    pub width: RegisterWidth,
    /// Access mode.
    pub access: Access,
    /// Documented bitfields. Bits not covered here are undefined.
    pub fields: &'static [Field],
}

impl RegisterInfo {
    /// Mask of all documented bits.
    pub fn defined_mask(&self) -> u32 {
        self.fields.iter().fold(0, |mask, field| mask | field.mask())
    }
}

/// One row of the register map. Buffers occupy `count` consecutive addresses.
struct Entry {
    offset: u32,
    count: u32,
    info: RegisterInfo,
}

const STATUS_FIELDS: &[Field] = &[
    Field::bit("busy", 0),
    Field::bit("complete", 1),
    Field::bit("error", 2),
    Field::new("error_code", 4, 7),
];
const CONTROL_FIELDS: &[Field] = &[Field::bit("start", 0), Field::bit("abort", 1)];
const DATA_FIELDS: &[Field] = &[Field::new("data", 0, 8)];
const BUFFER_COUNT: u32 = BRIDGE_BUFFER_LEN as u32;

macro_rules! register {
    ($offset:expr, $count:expr, $name:literal, $width:ident, $access:ident, $fields:expr) => {
        Entry {
            offset: $offset,
            count: $count,
            info: RegisterInfo {
                name: $name,
                width: RegisterWidth::$width,
                access: Access::$access,
                fields: $fields,
            },
        }
    };
}

#[rustfmt::skip]
static REGISTER_MAP: &[Entry] = &[
    register!(0x3000, 1, "DEVICE_REVISION", Four, ReadOnly,
        &[Field::new("revision", 0, 8), Field::new("device_id", 16, 32)]),
    register!(0x3400, 1, "VENDOR_ID", Two, ReadOnly, &[Field::new("vid", 0, 16)]),
    register!(0x3402, 1, "PRODUCT_ID", Two, ReadOnly, &[Field::new("pid", 0, 16)]),
    register!(0x3410, 1, "FRAME_COUNTER", Two, ReadOnly, &[Field::new("frame", 0, 11)]),
    register!(0x0900, 1, "GPIO_INPUT", One, ReadOnly,
        &[Field::bit("gpio0", 0), Field::bit("gpio1", 1)]),
    register!(0x0904, 1, "GPIO_OUTPUT", One, ReadWrite,
        &[Field::bit("gpio0", 0), Field::bit("gpio1", 1), Field::new("drive_strength", 4, 6)]),
    register!(0x0908, 1, "GPIO_DIRECTION", One, ReadWrite,
        &[Field::bit("gpio0_output", 0), Field::bit("gpio1_output", 1)]),
    register!(0x9000, 1, "I2C_TARGET", One, ReadWrite, &[Field::new("address", 0, 7)]),
    register!(0x9002, 1, "I2C_LENGTH", Two, ReadWrite,
        &[Field::new("write_length", 0, 8), Field::new("read_length", 8, 16)]),
    register!(0x9004, 1, "I2C_CONTROL", One, WriteOnly, CONTROL_FIELDS),
    register!(0x9005, 1, "I2C_STATUS", One, ReadOnly, STATUS_FIELDS),
    register!(0x9010, BUFFER_COUNT, "I2C_TX_DATA", One, WriteOnly, DATA_FIELDS),
    register!(0x9030, BUFFER_COUNT, "I2C_RX_DATA", One, ReadOnly, DATA_FIELDS),
    register!(0x9100, 1, "SPI_CONFIG", One, ReadWrite,
        &[Field::bit("cpha", 0), Field::bit("cpol", 1)]),
    register!(0x9101, 1, "SPI_LENGTH", One, ReadWrite, &[Field::new("length", 0, 8)]),
    register!(0x9102, 1, "SPI_CLOCK_DIVISOR", Two, ReadWrite, &[Field::new("divisor", 0, 16)]),
    register!(0x9104, 1, "SPI_CONTROL", One, WriteOnly, CONTROL_FIELDS),
    register!(0x9105, 1, "SPI_STATUS", One, ReadOnly, STATUS_FIELDS),
    register!(0x9110, BUFFER_COUNT, "SPI_DATA", One, ReadWrite, DATA_FIELDS),
];

/// Absolute address of one register in the hub's register bank.
///
/// Only addresses present in the register map can be constructed: use the
/// associated constants, the buffer constructors, [`TryFrom<u32>`], or parse a
/// register name with [`FromStr`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterAddress(u32);

impl RegisterAddress {
    /// Chip revision and device ID.
    pub const DEVICE_REVISION: Self = Self::at(0x3000);
    /// USB vendor ID the hub enumerates with.
    pub const VENDOR_ID: Self = Self::at(0x3400);
    /// USB product ID the hub enumerates with.
    pub const PRODUCT_ID: Self = Self::at(0x3402);
    /// Current USB (micro)frame number.
    pub const FRAME_COUNTER: Self = Self::at(0x3410);
    /// Input levels of the two GPIO lines.
    pub const GPIO_INPUT: Self = Self::at(0x0900);
    /// Output levels of the two GPIO lines (shared with drive-strength bits).
    pub const GPIO_OUTPUT: Self = Self::at(0x0904);
    /// Output-enable bits of the two GPIO lines.
    pub const GPIO_DIRECTION: Self = Self::at(0x0908);
    /// I2C bridge: 7-bit target address.
    pub const I2C_TARGET: Self = Self::at(0x9000);
    /// I2C bridge: write length (low byte) and read length (high byte).
    pub const I2C_LENGTH: Self = Self::at(0x9002);
    /// I2C bridge: start/abort trigger.
    pub const I2C_CONTROL: Self = Self::at(0x9004);
    /// I2C bridge: transaction status.
    pub const I2C_STATUS: Self = Self::at(0x9005);
    /// SPI bridge: clock polarity and phase.
    pub const SPI_CONFIG: Self = Self::at(0x9100);
    /// SPI bridge: transfer length.
    pub const SPI_LENGTH: Self = Self::at(0x9101);
    /// SPI bridge: clock divisor.
    pub const SPI_CLOCK_DIVISOR: Self = Self::at(0x9102);
    /// SPI bridge: start/abort trigger.
    pub const SPI_CONTROL: Self = Self::at(0x9104);
    /// SPI bridge: transaction status.
    pub const SPI_STATUS: Self = Self::at(0x9105);

    const I2C_TX_DATA_OFFSET: u32 = 0x9010;
    const I2C_RX_DATA_OFFSET: u32 = 0x9030;
    const SPI_DATA_OFFSET: u32 = 0x9110;

    const fn at(offset: u32) -> Self {
        Self(REGISTER_BASE + offset)
    }

    fn buffer(base_offset: u32, index: usize) -> Option<Self> {
        (index < BRIDGE_BUFFER_LEN).then(|| Self::at(base_offset + index as u32))
    }

    /// Byte `index` of the I2C transmit buffer, if `index` is within the buffer.
    pub fn i2c_tx_data(index: usize) -> Option<Self> {
        Self::buffer(Self::I2C_TX_DATA_OFFSET, index)
    }

    /// Byte `index` of the I2C receive buffer, if `index` is within the buffer.
    pub fn i2c_rx_data(index: usize) -> Option<Self> {
        Self::buffer(Self::I2C_RX_DATA_OFFSET, index)
    }

    /// Byte `index` of the SPI data buffer, if `index` is within the buffer.
    pub fn spi_data(index: usize) -> Option<Self> {
        Self::buffer(Self::SPI_DATA_OFFSET, index)
    }

    fn bank(base_offset: u32) -> impl Iterator<Item = Self> {
        (0..BUFFER_COUNT).map(move |i| Self::at(base_offset + i))
    }

    /// The I2C transmit buffer, in address order.
    pub(crate) fn i2c_tx_bank() -> impl Iterator<Item = Self> {
        Self::bank(Self::I2C_TX_DATA_OFFSET)
    }

    /// The I2C receive buffer, in address order.
    pub(crate) fn i2c_rx_bank() -> impl Iterator<Item = Self> {
        Self::bank(Self::I2C_RX_DATA_OFFSET)
    }

    /// The SPI data buffer, in address order.
    pub(crate) fn spi_data_bank() -> impl Iterator<Item = Self> {
        Self::bank(Self::SPI_DATA_OFFSET)
    }

    /// Look up a register by its offset from the register base.
    pub fn from_offset(offset: u32) -> Result<Self, Error> {
        REGISTER_BASE
            .checked_add(offset)
            .ok_or_else(|| Error::UnknownRegister(format!("{offset:#X}")))
            .and_then(Self::try_from)
    }

    /// Full 32-bit address.
    pub fn absolute(self) -> u32 {
        self.0
    }

    /// Offset from the register base.
    pub fn offset(self) -> u32 {
        self.0 - REGISTER_BASE
    }

    /// Static description of this register.
    pub fn info(self) -> &'static RegisterInfo {
        &self.entry().info
    }

    /// Position within a buffer bank, or `None` for ordinary registers.
    pub fn buffer_index(self) -> Option<usize> {
        let entry = self.entry();
        (entry.count > 1).then(|| (self.offset() - entry.offset) as usize)
    }

    /// Every register in the map, buffer banks expanded, in address order.
    pub fn all() -> impl Iterator<Item = RegisterAddress> {
        let mut all: Vec<_> = REGISTER_MAP
            .iter()
            .flat_map(|entry| (0..entry.count).map(|i| Self::at(entry.offset + i)))
            .collect();
        all.sort();
        all.into_iter()
    }

    fn entry(self) -> &'static Entry {
        find_entry(self.offset()).expect("RegisterAddress is only built from the map.")
    }
}

fn find_entry(offset: u32) -> Option<&'static Entry> {
    REGISTER_MAP
        .iter()
        .find(|entry| (entry.offset..entry.offset + entry.count).contains(&offset))
}

impl TryFrom<u32> for RegisterAddress {
    type Error = Error;

    /// Validate an absolute register address against the register map.
    fn try_from(absolute: u32) -> Result<Self, Self::Error> {
        absolute
            .checked_sub(REGISTER_BASE)
            .and_then(find_entry)
            .map(|_| Self(absolute))
            .ok_or_else(|| Error::UnknownRegister(format!("{absolute:#010X}")))
    }
}

impl FromStr for RegisterAddress {
    type Err = Error;

    /// Parse a register name such as `I2C_STATUS` or `SPI_DATA[4]`.
    ///
    /// Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownRegister(s.to_owned());
        let upper = s.trim().to_ascii_uppercase();
        let (name, index) = match upper.split_once('[') {
            Some((name, rest)) => {
                let index: u32 = rest
                    .strip_suffix(']')
                    .and_then(|i| i.parse().ok())
                    .ok_or_else(unknown)?;
                (name.to_owned(), Some(index))
            }
            None => (upper, None),
        };
        let entry = REGISTER_MAP
            .iter()
            .find(|entry| entry.info.name == name)
            .ok_or_else(unknown)?;
        match (entry.count, index) {
            (1, None) => Ok(Self::at(entry.offset)),
            (count, Some(index)) if count > 1 && index < count => {
                Ok(Self::at(entry.offset + index))
            }
            _ => Err(unknown()),
        }
    }
}

impl std::fmt::Display for RegisterAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.buffer_index() {
            Some(index) => write!(f, "{}[{index}]", self.info().name),
            None => f.write_str(self.info().name),
        }
    }
}

impl std::fmt::Debug for RegisterAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self} ({:#010X})", self.0)
    }
}
