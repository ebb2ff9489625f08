use log::debug;

use super::USB4715;
use super::access::RegisterAccess;
use super::bridge::{I2C_BRIDGE, Outcome};
use crate::error::{Bus, Error, NackPhase};
use crate::i2c::I2cTransaction;
use crate::registers::RegisterAddress;
use crate::transport::Transport;

impl<T: Transport> RegisterAccess<'_, T> {
    /// Frame one I2C transaction into the bridge registers and collect the result.
    ///
    /// The transaction must already be validated.
    pub(super) fn i2c_transaction(
        &mut self,
        transaction: &I2cTransaction<'_>,
    ) -> Result<Vec<u8>, Error> {
        let address = transaction.address();
        let write = transaction.write_bytes();
        let read_length = transaction.read_length();
        debug!(
            "I2C {address:#04X}: write {} byte(s), read {read_length}",
            write.len()
        );

        self.write(RegisterAddress::I2C_TARGET, u32::from(address))?;
        let lengths = ((read_length as u32) << 8) | write.len() as u32;
        self.write(RegisterAddress::I2C_LENGTH, lengths)?;
        for (register, &byte) in RegisterAddress::i2c_tx_bank().zip(write) {
            self.write(register, u32::from(byte))?;
        }

        match self.run_bridge(&I2C_BRIDGE)? {
            Outcome::Complete => RegisterAddress::i2c_rx_bank()
                .take(read_length)
                .map(|register| self.read_byte(register))
                .collect(),
            Outcome::Failed(code) => Err(Error::from_i2c_code(address, code)),
            Outcome::TimedOut { polls, elapsed } => Err(Error::TransactionTimeout {
                bus: Bus::I2c,
                polls,
                elapsed,
            }),
        }
    }
}

impl<T: Transport> USB4715<T> {
    /// Run one I2C transaction on the hub's bridge.
    ///
    /// Returns the bytes read, which is empty for write-only transactions and
    /// probes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransaction`] if the address is not 7-bit or either length
    ///   exceeds the 32-byte bridge buffers. Nothing is sent to the hub.
    /// - [`Error::BusNack`] if the target did not acknowledge.
    /// - [`Error::BusTimeout`] on arbitration loss or a bus timeout.
    /// - [`Error::DeviceError`] if the bridge reported an unknown error code.
    /// - [`Error::TransactionTimeout`] if the bridge never finished.
    /// - [`Error::Transport`] if a register access failed.
    pub fn i2c_transaction(&self, transaction: &I2cTransaction<'_>) -> Result<Vec<u8>, Error> {
        transaction.validate()?;
        self.with_access(|access| access.i2c_transaction(transaction))
    }

    /// Write `data` to the I2C target at `address`.
    pub fn i2c_write(&self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.i2c_transaction(&I2cTransaction::write(address, data))
            .map(|_| ())
    }

    /// Read `length` bytes from the I2C target at `address`.
    pub fn i2c_read(&self, address: u8, length: usize) -> Result<Vec<u8>, Error> {
        self.i2c_transaction(&I2cTransaction::read(address, length))
    }

    /// Write `data` to the target, then read `length` bytes after a repeated START.
    ///
    /// This is the usual way to read a device register: write the register number,
    /// then read its contents.
    pub fn i2c_write_read(&self, address: u8, data: &[u8], length: usize) -> Result<Vec<u8>, Error> {
        self.i2c_transaction(&I2cTransaction::write_read(address, data, length))
    }

    /// Check if a device responds at the given I2C address.
    ///
    /// Only an address NACK counts as absent. Other errors are returned.
    ///
    /// ```no_run
    /// # use usb4715_hal::USB4715;
    /// let hub = USB4715::connect()?;
    /// for address in 0x08..0x78 {
    ///     if hub.i2c_check_address(address)? {
    ///         println!("{address:#04X}");
    ///     }
    /// }
    /// # Ok::<(), usb4715_hal::Error>(())
    /// ```
    pub fn i2c_check_address(&self, address: u8) -> Result<bool, Error> {
        match self.i2c_transaction(&I2cTransaction::probe(address)) {
            Ok(_) => Ok(true),
            Err(Error::BusNack {
                phase: NackPhase::Address,
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
