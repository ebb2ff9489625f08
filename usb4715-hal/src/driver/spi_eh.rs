//! embedded_hal SPI bus implementation for USB4715.
use embedded_hal::spi::{self, SpiBus};

use super::USB4715;
use crate::Error;
use crate::transport::Transport;

impl spi::Error for Error {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl<T: Transport> spi::ErrorType for USB4715<T> {
    type Error = Error;
}

/// The bridge only ever clocks whole bytes, and the chip select is left to the
/// caller (a GPIO line or an `embedded-hal-bus` device wrapper).
impl<T: Transport> SpiBus<u8> for USB4715<T> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let response = self.spi_transfer(&vec![0x00; words.len()])?;
        words.copy_from_slice(&response);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.spi_transfer(words).map(|_| ())
    }

    /// Clocks `max(read.len(), write.len())` bytes, sending zeros once `write` is
    /// exhausted and discarding input once `read` is full.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let mut outgoing = write.to_vec();
        outgoing.resize(read.len().max(write.len()), 0x00);
        let response = self.spi_transfer(&outgoing)?;
        read.copy_from_slice(&response[..read.len()]);
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let response = self.spi_transfer(words)?;
        words.copy_from_slice(&response);
        Ok(())
    }

    /// Every transfer has finished by the time it returns.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
