//! Status read from the hub.

use bit_field::BitField;

use crate::codec::RegisterValue;

/// Decoded I2C_STATUS or SPI_STATUS register.
///
/// Read fresh on every poll; the bridge state changes underneath the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStatus {
    /// The bridge is executing a transaction.
    pub busy: bool,
    /// The last transaction finished successfully.
    pub complete: bool,
    /// The last transaction failed; see `error_code`.
    pub error: bool,
    /// Reason for failure.
    pub error_code: BridgeErrorCode,
    /// Bits 3 and 7, which are not documented. Preserved as read.
    pub undefined_bits: u8,
}

impl BridgeStatus {
    pub(crate) fn from_raw(raw: u8) -> Self {
        Self {
            busy: raw.get_bit(0),
            complete: raw.get_bit(1),
            error: raw.get_bit(2),
            error_code: raw.get_bits(4..7).into(),
            undefined_bits: raw & 0b1000_1000,
        }
    }

    /// The bridge has stopped, one way or the other.
    pub fn is_finished(&self) -> bool {
        self.complete || self.error
    }
}

impl From<RegisterValue> for BridgeStatus {
    fn from(value: RegisterValue) -> Self {
        Self::from_raw(value.raw() as u8)
    }
}

/// Failure reasons reported in bits 4..7 of a bridge status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeErrorCode {
    /// No error.
    None,
    /// No target acknowledged the address.
    AddressNack,
    /// The target did not acknowledge a data byte.
    DataNack,
    /// Another controller won bus arbitration.
    ArbitrationLost,
    /// SCL was held low past the bridge's timeout.
    BusTimeout,
    /// Any other code.
    Unknown(u8),
}

impl From<u8> for BridgeErrorCode {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::AddressNack,
            2 => Self::DataNack,
            3 => Self::ArbitrationLost,
            4 => Self::BusTimeout,
            code => Self::Unknown(code),
        }
    }
}

impl From<BridgeErrorCode> for u8 {
    fn from(value: BridgeErrorCode) -> u8 {
        match value {
            BridgeErrorCode::None => 0,
            BridgeErrorCode::AddressNack => 1,
            BridgeErrorCode::DataNack => 2,
            BridgeErrorCode::ArbitrationLost => 3,
            BridgeErrorCode::BusTimeout => 4,
            BridgeErrorCode::Unknown(code) => code,
        }
    }
}

/// Chip identification from the DEVICE_REVISION register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    /// Chip device ID.
    pub device_id: u16,
    /// Silicon revision.
    pub revision: u8,
}

impl From<RegisterValue> for Revision {
    fn from(value: RegisterValue) -> Self {
        Self {
            device_id: value.raw().get_bits(16..32) as u16,
            revision: value.raw().get_bits(0..8) as u8,
        }
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X} rev {:02X}", self.device_id, self.revision)
    }
}
