use log::debug;

use super::USB4715;
use super::access::RegisterAccess;
use super::bridge::{Outcome, SPI_BRIDGE};
use crate::constants::BRIDGE_BUFFER_LEN;
use crate::error::{Bus, Error};
use crate::registers::RegisterAddress;
use crate::spi::{SpiSettings, SpiTransaction};
use crate::transport::{Transport, TransportError};

impl<T: Transport> RegisterAccess<'_, T> {
    /// Frame one full-duplex exchange into the SPI bridge registers.
    ///
    /// The transaction must already be validated.
    pub(super) fn spi_transaction(
        &mut self,
        transaction: &SpiTransaction<'_>,
    ) -> Result<Vec<u8>, Error> {
        let payload = transaction.payload();
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        debug!("SPI {:?}: exchange {} byte(s)", transaction.mode(), payload.len());

        self.write(RegisterAddress::SPI_CONFIG, transaction.mode().config_bits())?;
        self.write(
            RegisterAddress::SPI_CLOCK_DIVISOR,
            u32::from(transaction.clock_divisor()),
        )?;
        self.write(RegisterAddress::SPI_LENGTH, payload.len() as u32)?;
        for (register, &byte) in RegisterAddress::spi_data_bank().zip(payload) {
            self.write(register, u32::from(byte))?;
        }

        match self.run_bridge(&SPI_BRIDGE)? {
            Outcome::Complete => RegisterAddress::spi_data_bank()
                .take(transaction.response_length())
                .map(|register| self.read_byte(register))
                .collect(),
            Outcome::Failed(code) => Err(Error::Transport {
                address: RegisterAddress::SPI_STATUS,
                attempts: 1,
                source: TransportError::BridgeFault(code.into()),
            }),
            Outcome::TimedOut { polls, elapsed } => Err(Error::TransactionTimeout {
                bus: Bus::Spi,
                polls,
                elapsed,
            }),
        }
    }

    /// Exchange any number of bytes as consecutive bridge-sized transactions.
    pub(super) fn spi_exchange(
        &mut self,
        settings: SpiSettings,
        payload: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut response = Vec::with_capacity(payload.len());
        for chunk in payload.chunks(BRIDGE_BUFFER_LEN) {
            let transaction = SpiTransaction::new(settings, chunk);
            transaction.validate()?;
            response.extend(self.spi_transaction(&transaction)?);
        }
        Ok(response)
    }
}

impl<T: Transport> USB4715<T> {
    /// Run one SPI exchange of at most 32 bytes on the hub's bridge.
    ///
    /// The response is exactly as long as the payload. An empty payload returns an
    /// empty response without touching the hub.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransaction`] if the payload exceeds the 32-byte buffer.
    /// - [`Error::Transport`] with [`TransportError::BridgeFault`] if the bridge
    ///   flagged an error.
    /// - [`Error::TransactionTimeout`] if the bridge never finished.
    pub fn spi_transaction(&self, transaction: &SpiTransaction<'_>) -> Result<Vec<u8>, Error> {
        transaction.validate()?;
        if transaction.payload().is_empty() {
            return Ok(Vec::new());
        }
        self.with_access(|access| access.spi_transaction(transaction))
    }

    /// Exchange `payload` using the current [`SpiSettings`].
    ///
    /// Payloads longer than the bridge buffer are split into consecutive 32-byte
    /// transactions, all run while holding the transport lock.
    pub fn spi_transfer(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        self.spi_transfer_with(self.spi_settings(), payload)
    }

    /// Exchange `payload` using `settings` for this call only.
    pub fn spi_transfer_with(&self, settings: SpiSettings, payload: &[u8]) -> Result<Vec<u8>, Error> {
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        self.with_access(|access| access.spi_exchange(settings, payload))
    }
}
