//! Single-register reads and writes with bounded retry.
use std::thread::sleep;

use log::{debug, warn};

use crate::codec::{Codec, RegisterValue};
use crate::config::BridgeConfig;
use crate::error::{Error, InvalidTransaction};
use crate::registers::RegisterAddress;
use crate::transport::{ControlTransferRequest, Transport};

/// Exclusive register access for the duration of one driver operation.
///
/// Built by the driver while it holds the transport lock. Bridge protocols run
/// entirely through one of these, so nothing else can reach the transport until
/// they finish.
pub(super) struct RegisterAccess<'a, T: Transport> {
    transport: &'a mut T,
    codec: &'a Codec,
    config: &'a BridgeConfig,
}

impl<'a, T: Transport> RegisterAccess<'a, T> {
    pub(super) fn new(transport: &'a mut T, codec: &'a Codec, config: &'a BridgeConfig) -> Self {
        Self {
            transport,
            codec,
            config,
        }
    }

    pub(super) fn config(&self) -> &BridgeConfig {
        self.config
    }

    /// Read one register: one control transfer per attempt, one decode.
    pub(super) fn read(&mut self, address: RegisterAddress) -> Result<RegisterValue, Error> {
        if !address.info().access.readable() {
            return Err(InvalidTransaction::WriteOnlyRegister(address).into());
        }
        let request = self.codec.encode_read(address);
        let raw = self.exchange(address, &request)?;
        let value = self.codec.decode(address, &raw)?;
        debug!("read  {value}");
        Ok(value)
    }

    /// Read one byte-wide register.
    pub(super) fn read_byte(&mut self, address: RegisterAddress) -> Result<u8, Error> {
        self.read(address).map(|value| value.raw() as u8)
    }

    /// Write one register, rejecting values wider than the register.
    pub(super) fn write(&mut self, address: RegisterAddress, value: u32) -> Result<(), Error> {
        let info = address.info();
        if !info.access.writable() {
            return Err(InvalidTransaction::ReadOnlyRegister(address).into());
        }
        if value > info.width.max_value() {
            return Err(InvalidTransaction::ValueOutOfRange {
                address,
                value,
                width: info.width.bytes(),
            }
            .into());
        }
        let request = self.codec.encode_write(address, value);
        debug!("write {}", RegisterValue::new(address, value));
        self.exchange(address, &request).map(|_| ())
    }

    /// Issue `request`, re-issuing it unchanged after transient failures.
    fn exchange(
        &mut self,
        address: RegisterAddress,
        request: &ControlTransferRequest,
    ) -> Result<Vec<u8>, Error> {
        let mut attempts: u16 = 0;
        loop {
            attempts += 1;
            match self.transport.transfer(request) {
                Ok(bytes) => return Ok(bytes),
                Err(source)
                    if source.is_transient()
                        && attempts <= u16::from(self.config.register_retries) =>
                {
                    warn!("{address}: {source}, retrying (attempt {attempts})");
                    sleep(self.config.retry_delay);
                }
                Err(source) => {
                    return Err(Error::Transport {
                        address,
                        attempts,
                        source,
                    });
                }
            }
        }
    }
}
