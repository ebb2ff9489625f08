//! A bus-client interface shaped like the native I2C/SPI/GPIO objects of
//! microcontroller runtimes.
//!
//! Code written against [`BusClient`] runs unchanged whether the buses belong to
//! a microcontroller or are reached through the hub. For code written against
//! [`embedded_hal`], use the trait implementations on [`USB4715`] and the GPIO
//! [`Pins`](crate::gpio::Pins) instead.
use crate::gpio::GpioState;
use crate::transport::Transport;
use crate::{Error, USB4715};

/// Blocking access to an I2C bus, an SPI bus and two GPIO lines.
pub trait BusClient {
    /// Error returned by every operation.
    type Error;

    /// Write `bytes` to the I2C target at `address`.
    fn i2c_write(&self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read `length` bytes from the I2C target at `address`.
    fn i2c_read(&self, address: u8, length: usize) -> Result<Vec<u8>, Self::Error>;

    /// Write `bytes`, then read `length` bytes after a repeated START.
    fn i2c_write_then_read(
        &self,
        address: u8,
        bytes: &[u8],
        length: usize,
    ) -> Result<Vec<u8>, Self::Error>;

    /// Full-duplex SPI exchange; the response is as long as `payload`.
    fn spi_transfer(&self, payload: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// Levels on the GPIO lines.
    fn gpio_read(&self) -> Result<GpioState, Self::Error>;

    /// Drive the GPIO lines.
    fn gpio_write(&self, state: GpioState) -> Result<(), Self::Error>;
}

impl<T: Transport> BusClient for USB4715<T> {
    type Error = Error;

    fn i2c_write(&self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        USB4715::i2c_write(self, address, bytes)
    }

    fn i2c_read(&self, address: u8, length: usize) -> Result<Vec<u8>, Error> {
        USB4715::i2c_read(self, address, length)
    }

    fn i2c_write_then_read(
        &self,
        address: u8,
        bytes: &[u8],
        length: usize,
    ) -> Result<Vec<u8>, Error> {
        USB4715::i2c_write_read(self, address, bytes, length)
    }

    fn spi_transfer(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        USB4715::spi_transfer(self, payload)
    }

    fn gpio_read(&self) -> Result<GpioState, Error> {
        USB4715::gpio_read(self)
    }

    fn gpio_write(&self, state: GpioState) -> Result<(), Error> {
        USB4715::gpio_write(self, state)
    }
}

impl<C: BusClient + ?Sized> BusClient for &C {
    type Error = C::Error;

    fn i2c_write(&self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).i2c_write(address, bytes)
    }

    fn i2c_read(&self, address: u8, length: usize) -> Result<Vec<u8>, Self::Error> {
        (**self).i2c_read(address, length)
    }

    fn i2c_write_then_read(
        &self,
        address: u8,
        bytes: &[u8],
        length: usize,
    ) -> Result<Vec<u8>, Self::Error> {
        (**self).i2c_write_then_read(address, bytes, length)
    }

    fn spi_transfer(&self, payload: &[u8]) -> Result<Vec<u8>, Self::Error> {
        (**self).spi_transfer(payload)
    }

    fn gpio_read(&self) -> Result<GpioState, Self::Error> {
        (**self).gpio_read()
    }

    fn gpio_write(&self, state: GpioState) -> Result<(), Self::Error> {
        (**self).gpio_write(state)
    }
}
