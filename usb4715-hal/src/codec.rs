//! Encoding register accesses as vendor control transfers, and decoding replies.
//!
//! Nothing here performs I/O. The register width, and so the transfer length, is
//! always taken from the register map.
use std::time::Duration;

use bit_field::BitField;

use crate::Error;
use crate::config::BridgeConfig;
use crate::constants::{CMD_I2C_ENTER, CMD_REG_READ, CMD_REG_WRITE};
use crate::i2c::I2cSpeed;
use crate::registers::{Field, RegisterAddress};
use crate::transport::ControlTransferRequest;

/// Builds control transfers for register access and decodes the hub's replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    timeout: Duration,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(BridgeConfig::default().control_timeout)
    }
}

impl Codec {
    /// Create a codec that stamps `timeout` on every request.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Split a register address into the wValue/wIndex pair.
    fn split(address: RegisterAddress) -> (u16, u16) {
        let absolute = address.absolute();
        (absolute.get_bits(0..16) as u16, absolute.get_bits(16..32) as u16)
    }

    /// Request that reads `address`.
    pub fn encode_read(&self, address: RegisterAddress) -> ControlTransferRequest {
        let (value, index) = Self::split(address);
        let width = address.info().width.bytes() as u16;
        ControlTransferRequest::device_to_host(CMD_REG_READ, value, index, width, self.timeout)
    }

    /// Request that writes `value` to `address`.
    ///
    /// Only the low bytes that fit the register are sent, little-endian.
    pub fn encode_write(&self, address: RegisterAddress, value: u32) -> ControlTransferRequest {
        let (w_value, w_index) = Self::split(address);
        let width = address.info().width.bytes();
        let payload = value.to_le_bytes()[..width].to_vec();
        ControlTransferRequest::host_to_device(CMD_REG_WRITE, w_value, w_index, payload, self.timeout)
    }

    /// Interpret the bytes returned for a read of `address`.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedResponse`] if the reply is not exactly the register's width.
    pub fn decode(&self, address: RegisterAddress, raw: &[u8]) -> Result<RegisterValue, Error> {
        let expected = address.info().width.bytes();
        if raw.len() != expected {
            return Err(Error::MalformedResponse {
                address,
                expected,
                received: raw.len(),
            });
        }
        let mut bytes = [0u8; 4];
        bytes[..expected].copy_from_slice(raw);
        Ok(RegisterValue {
            address,
            raw: u32::from_le_bytes(bytes),
        })
    }

    /// Request that puts the hub's I2C master into pass-through mode at `speed`.
    pub fn encode_i2c_enter(&self, speed: I2cSpeed) -> ControlTransferRequest {
        ControlTransferRequest::host_to_device(
            CMD_I2C_ENTER,
            speed.clock_divisor(),
            0,
            Vec::new(),
            self.timeout,
        )
        .to_interface()
    }
}

/// A value read from (or destined for) one register.
///
/// The raw value is kept exactly as received, including any bits the register map
/// does not describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterValue {
    address: RegisterAddress,
    raw: u32,
}

impl RegisterValue {
    /// Pair a raw value with its register.
    pub fn new(address: RegisterAddress, raw: u32) -> Self {
        Self { address, raw }
    }

    /// Register the value belongs to.
    pub fn address(&self) -> RegisterAddress {
        self.address
    }

    /// Value as transferred, zero-extended to 32 bits.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// A single bit of the raw value.
    pub fn bit(&self, bit: usize) -> bool {
        self.raw.get_bit(bit)
    }

    /// The named field's value, or `None` if the register has no such field.
    pub fn field(&self, name: &str) -> Option<u32> {
        self.address
            .info()
            .fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| self.extract(field))
    }

    /// Every named field with its value, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.address
            .info()
            .fields
            .iter()
            .map(|field| (field.name, self.extract(field)))
    }

    /// Bits that are set but not covered by any named field.
    pub fn undefined_bits(&self) -> u32 {
        self.raw & !self.address.info().defined_mask()
    }

    fn extract(&self, field: &Field) -> u32 {
        self.raw.get_bits(field.start..field.end)
    }
}

impl std::fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.address.info().width.bytes() * 2;
        write!(f, "{} = {:#0width$X}", self.address, self.raw, width = digits + 2)
    }
}
