//! I2C bridge types.
use crate::constants::BRIDGE_BUFFER_LEN;
use crate::error::{Bus, InvalidTransaction};

/// I2C bus speed of the hub's pass-through master.
///
/// Each speed corresponds to a pair of SCL high/low period counts, sent as the
/// value of the I2C enter request.
#[allow(non_camel_case_types)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum I2cSpeed {
    /// I2C bus speed of 400kbps ("Fast-mode")
    Fast_400kbps,
    /// I2C bus speed of 250kbps
    Medium_250kbps,
    /// I2C bus speed of 200kbps
    Medium_200kbps,
    /// I2C bus speed of 100kbps ("Standard-mode")
    #[default]
    Standard_100kbps,
    /// I2C bus speed of 80kbps
    Slow_80kbps,
    /// I2C bus speed of 50kbps
    Slow_50kbps,
}

impl I2cSpeed {
    /// SCL period counts sent with the pass-through enable request.
    pub(crate) fn clock_divisor(&self) -> u16 {
        match self {
            I2cSpeed::Fast_400kbps => 0x0A00,
            I2cSpeed::Medium_250kbps => 0x081B,
            I2cSpeed::Medium_200kbps => 0x1818,
            I2cSpeed::Standard_100kbps => 0x3131,
            I2cSpeed::Slow_80kbps => 0x3D3E,
            I2cSpeed::Slow_50kbps => 0x6363,
        }
    }
}

/// One I2C transaction as executed by the hub's bridge.
///
/// The bridge always performs the write phase (if any) first, then the read phase
/// (if any) after a repeated START. A transaction with neither is an address probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cTransaction<'a> {
    address: u8,
    write: &'a [u8],
    read_length: usize,
}

impl<'a> I2cTransaction<'a> {
    /// Write `bytes` to the target.
    pub fn write(address: u8, bytes: &'a [u8]) -> Self {
        Self {
            address,
            write: bytes,
            read_length: 0,
        }
    }

    /// Read `length` bytes from the target.
    pub fn read(address: u8, length: usize) -> Self {
        Self {
            address,
            write: &[],
            read_length: length,
        }
    }

    /// Write `bytes`, then read `length` bytes after a repeated START.
    pub fn write_read(address: u8, bytes: &'a [u8], length: usize) -> Self {
        Self {
            address,
            write: bytes,
            read_length: length,
        }
    }

    /// Address the target without transferring any data.
    pub fn probe(address: u8) -> Self {
        Self::write(address, &[])
    }

    /// 7-bit target address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Bytes to be written.
    pub fn write_bytes(&self) -> &'a [u8] {
        self.write
    }

    /// Number of bytes to be read.
    pub fn read_length(&self) -> usize {
        self.read_length
    }

    /// Check the transaction fits the bridge before any USB traffic.
    pub fn validate(&self) -> Result<(), InvalidTransaction> {
        if self.address > 0x7F {
            return Err(InvalidTransaction::AddressOutOfRange(self.address));
        }
        if self.write.len() > BRIDGE_BUFFER_LEN {
            return Err(InvalidTransaction::WriteTooLong {
                bus: Bus::I2c,
                length: self.write.len(),
                capacity: BRIDGE_BUFFER_LEN,
            });
        }
        if self.read_length > BRIDGE_BUFFER_LEN {
            return Err(InvalidTransaction::ReadTooLong {
                bus: Bus::I2c,
                length: self.read_length,
                capacity: BRIDGE_BUFFER_LEN,
            });
        }
        Ok(())
    }
}
