use std::time::Duration;

use crate::registers::RegisterAddress;
use crate::status::BridgeErrorCode;
use crate::transport::TransportError;

/// Wrapper for problems when communicating with the USB4715.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A control transfer failed and was not recovered by retrying.
    ///
    /// Transient failures (timeouts, stalls) are retried by the driver before this
    /// is returned, so `attempts` is the total number of transfers issued.
    #[error("control transfer for register {address} failed after {attempts} attempt(s): {source}")]
    Transport {
        /// Register being accessed when the transfer failed.
        address: RegisterAddress,
        /// Number of transfers issued for this register access.
        attempts: u16,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },
    /// The I2C pass-through enable request failed.
    #[error("failed to enable I2C pass-through: {0}")]
    I2cEnable(#[source] TransportError),
    /// The response to a register read was not the width of the register.
    ///
    /// This is never retried. It indicates a mismatch between this driver's register
    /// map and the hub firmware.
    #[error("malformed response for register {address}: expected {expected} byte(s), received {received}")]
    MalformedResponse {
        /// Register that was read.
        address: RegisterAddress,
        /// Width of the register in bytes.
        expected: usize,
        /// Number of bytes the hub returned.
        received: usize,
    },
    /// The request was rejected before any USB traffic took place.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] InvalidTransaction),
    /// An I2C target did not acknowledge.
    #[error("I2C target {address:#04X} did not acknowledge its {phase}")]
    BusNack {
        /// 7-bit target address.
        address: u8,
        /// Whether the address or a data byte was not acknowledged.
        phase: NackPhase,
    },
    /// The I2C bus could not complete the transfer.
    #[error("I2C bus error talking to {address:#04X}: {cause}")]
    BusTimeout {
        /// 7-bit target address.
        address: u8,
        /// Arbitration loss or clock-stretch timeout.
        cause: BusTimeoutCause,
    },
    /// The bridge reported an error code this driver does not know.
    #[error("{bus} bridge reported unknown error code {code:#X}")]
    DeviceError {
        /// Bridge that reported the error.
        bus: Bus,
        /// Raw error code from the status register.
        code: u8,
    },
    /// The bridge did not finish the transaction within the polling budget.
    ///
    /// The driver has already attempted to abort the transaction.
    #[error("{bus} transaction did not complete after {polls} status poll(s) ({elapsed:?})")]
    TransactionTimeout {
        /// Bridge that timed out.
        bus: Bus,
        /// Number of status reads made.
        polls: u32,
        /// Time spent polling.
        elapsed: Duration,
    },
    /// A register name or address is not in the register map.
    #[error("unknown register: {0}")]
    UnknownRegister(String),
    /// No USB device with the given IDs could be opened.
    #[error("no USB device found with VID {vendor_id:#06X} and PID {product_id:#06X}")]
    DeviceNotFound {
        /// Vendor ID searched for.
        vendor_id: u16,
        /// Product ID searched for.
        product_id: u16,
    },
    /// The USB device was found but could not be opened.
    #[error("unable to open USB device: {0}")]
    Usb(#[from] rusb::Error),
    /// The GPIO pin handles have already been taken from the driver.
    #[error("GPIO pins have already been taken")]
    PinsAlreadyTaken,
}

/// Reasons a request is rejected before it reaches the hub.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTransaction {
    /// The address does not fit in 7 bits.
    #[error("I2C address {0:#X} is not a 7-bit address")]
    AddressOutOfRange(u8),
    /// More bytes to write than the bridge transmit buffer holds.
    #[error("{bus} write of {length} bytes exceeds the {capacity}-byte buffer")]
    WriteTooLong {
        /// Bridge the write was for.
        bus: Bus,
        /// Requested length.
        length: usize,
        /// Buffer capacity.
        capacity: usize,
    },
    /// More bytes to read than the bridge receive buffer holds.
    #[error("{bus} read of {length} bytes exceeds the {capacity}-byte buffer")]
    ReadTooLong {
        /// Bridge the read was for.
        bus: Bus,
        /// Requested length.
        length: usize,
        /// Buffer capacity.
        capacity: usize,
    },
    /// The value has bits set above the width of the register.
    #[error("value {value:#X} does not fit in {width}-byte register {address}")]
    ValueOutOfRange {
        /// Target register.
        address: RegisterAddress,
        /// Rejected value.
        value: u32,
        /// Register width in bytes.
        width: usize,
    },
    /// Attempt to write a read-only register.
    #[error("register {0} is read-only")]
    ReadOnlyRegister(RegisterAddress),
    /// Attempt to read a write-only register.
    #[error("register {0} is write-only")]
    WriteOnlyRegister(RegisterAddress),
    /// An embedded-hal transaction placed a read before a write.
    ///
    /// The bridge always performs the write phase first.
    #[error("read operations cannot precede write operations in one I2C transaction")]
    ReadBeforeWrite,
    /// Port numbers for current sensing run from 1 to 4.
    #[error("no downstream port {0}")]
    NoSuchPort(u8),
}

/// Which of the hub's bus bridges an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    /// I2C bridge.
    I2c,
    /// SPI bridge.
    Spi,
}

impl std::fmt::Display for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bus::I2c => f.write_str("I2C"),
            Bus::Spi => f.write_str("SPI"),
        }
    }
}

/// Point in an I2C transfer at which a NACK was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NackPhase {
    /// No target acknowledged the address byte.
    Address,
    /// The target stopped acknowledging written data.
    Data,
}

impl std::fmt::Display for NackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NackPhase::Address => f.write_str("address"),
            NackPhase::Data => f.write_str("data"),
        }
    }
}

/// Cause of an I2C bus-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusTimeoutCause {
    /// Another controller won arbitration.
    ArbitrationLost,
    /// A target held SCL low for too long.
    ClockStretch,
}

impl std::fmt::Display for BusTimeoutCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusTimeoutCause::ArbitrationLost => f.write_str("arbitration lost"),
            BusTimeoutCause::ClockStretch => f.write_str("bus timeout"),
        }
    }
}

impl Error {
    /// Build the error for a failed I2C transaction from its bridge error code.
    pub(crate) fn from_i2c_code(address: u8, code: BridgeErrorCode) -> Self {
        match code {
            BridgeErrorCode::AddressNack => Error::BusNack {
                address,
                phase: NackPhase::Address,
            },
            BridgeErrorCode::DataNack => Error::BusNack {
                address,
                phase: NackPhase::Data,
            },
            BridgeErrorCode::ArbitrationLost => Error::BusTimeout {
                address,
                cause: BusTimeoutCause::ArbitrationLost,
            },
            BridgeErrorCode::BusTimeout => Error::BusTimeout {
                address,
                cause: BusTimeoutCause::ClockStretch,
            },
            BridgeErrorCode::None | BridgeErrorCode::Unknown(_) => Error::DeviceError {
                bus: Bus::I2c,
                code: code.into(),
            },
        }
    }
}
