use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::codec::{Codec, RegisterValue};
use crate::config::BridgeConfig;
use crate::constants::{MICROCHIP_VID, USB4715_PID};
use crate::error::Error;
use crate::i2c::I2cSpeed;
use crate::registers::RegisterAddress;
use crate::spi::SpiSettings;
use crate::status::Revision;
use crate::transport::{Transport, UsbTransport};

mod access;
mod bridge;
mod gpio;
mod i2c;
mod i2c_eh;
mod power;
mod spi;
mod spi_eh;

use access::RegisterAccess;

/// Driver for the USB4715 hub controller.
///
/// # Quick start
///
/// Create the driver with default values by calling [`USB4715::connect`], or
/// [`USB4715::connect_with_vid_and_pid`] if the hub enumerates with a different
/// vendor or product ID. Call [`USB4715::i2c_enable`] once before using the I2C
/// bridge.
///
/// ```no_run
/// use usb4715_hal::{I2cSpeed, USB4715};
///
/// let hub = USB4715::connect()?;
/// hub.i2c_enable(I2cSpeed::Standard_100kbps)?;
/// let id = hub.i2c_write_read(0x40, &[0x00], 2)?;
/// println!("{id:02X?}");
/// # Ok::<(), usb4715_hal::Error>(())
/// ```
///
/// The driver implements the blocking I2C and SPI bus traits from [`embedded_hal`]
/// (and, with the `async` feature, the I2C trait from `embedded_hal_async`), as well
/// as this crate's [`BusClient`] trait.
///
/// For GPIO digital input and output, use [`USB4715::take_pins`] and convert the
/// [`GpioLine`] objects into [`Input`] or [`Output`] types, which implement the
/// appropriate traits from [`embedded_hal::digital`].
///
/// [`BusClient`]: crate::BusClient
/// [`GpioLine`]: crate::gpio::GpioLine
/// [`Input`]: crate::gpio::Input
/// [`Output`]: crate::gpio::Output
///
/// # Sharing
///
/// Every method takes `&self`. The transport sits behind a mutex that is held for
/// the whole of a bus transaction, from the first configuration write to the last
/// receive-buffer read, so transactions issued from different threads never
/// interleave on the wire.
#[derive(Debug)]
pub struct USB4715<T: Transport = UsbTransport> {
    transport: Mutex<T>,
    spi_settings: Mutex<SpiSettings>,
    config: BridgeConfig,
    codec: Codec,
    /// Marker for whether the pin structs have been taken from the driver.
    pins_taken: AtomicBool,
}

impl USB4715<UsbTransport> {
    ////////////////////////////////////////////////////////////////////////////////
    // Constructors - USB methods
    ////////////////////////////////////////////////////////////////////////////////

    /// Connect to the first USB device found with the default vendor and product ID.
    ///
    /// The default VID is 0x0424 (Microchip) and PID 0x494C.
    ///
    /// # Errors
    ///
    /// An error will be returned if the USB device cannot be opened.
    pub fn connect() -> Result<Self, Error> {
        USB4715::connect_with_vid_and_pid(MICROCHIP_VID, USB4715_PID)
    }

    /// Connect to the first USB device found with the given vendor and product ID.
    ///
    /// # Errors
    ///
    /// An error will be returned if the USB device cannot be opened.
    pub fn connect_with_vid_and_pid(vendor_id: u16, product_id: u16) -> Result<Self, Error> {
        let transport = UsbTransport::open(vendor_id, product_id)?;
        Ok(Self::with_transport(transport, BridgeConfig::default()))
    }
}

impl<T: Transport> USB4715<T> {
    /// Drive a hub through any [`Transport`], with the given timing policy.
    pub fn with_transport(transport: T, config: BridgeConfig) -> Self {
        Self {
            transport: Mutex::new(transport),
            spi_settings: Mutex::new(SpiSettings::default()),
            config,
            codec: Codec::new(config.control_timeout),
            pins_taken: AtomicBool::new(false),
        }
    }

    /// Timing and retry policy in use.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Give back the transport.
    pub fn into_transport(self) -> T {
        self.transport
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the transport for one whole operation.
    ///
    /// A panic while the lock was held leaves nothing half-updated on the host side,
    /// and every transaction rewrites the bridge registers it relies on, so a
    /// poisoned lock is simply taken over.
    fn lock(&self) -> MutexGuard<'_, T> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive register access.
    fn with_access<R>(
        &self,
        f: impl FnOnce(&mut RegisterAccess<'_, T>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let mut transport = self.lock();
        let mut access = RegisterAccess::new(&mut *transport, &self.codec, &self.config);
        f(&mut access)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Register access
    ////////////////////////////////////////////////////////////////////////////////

    /// Read one register.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransaction`] if the register is write-only.
    /// - [`Error::Transport`] if the control transfer fails, after retries.
    /// - [`Error::MalformedResponse`] if the reply is the wrong length.
    pub fn register_read(&self, address: RegisterAddress) -> Result<RegisterValue, Error> {
        self.with_access(|access| access.read(address))
    }

    /// Write one register.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransaction`] if the register is read-only or `value` does
    ///   not fit its width.
    /// - [`Error::Transport`] if the control transfer fails, after retries.
    pub fn register_write(&self, address: RegisterAddress, value: u32) -> Result<(), Error> {
        self.with_access(|access| access.write(address, value))
    }

    /// Read a register given its name, such as `"GPIO_OUTPUT"` or `"SPI_DATA[3]"`.
    pub fn register_read_by_name(&self, name: &str) -> Result<RegisterValue, Error> {
        self.register_read(name.parse()?)
    }

    /// Chip device ID and silicon revision.
    pub fn revision(&self) -> Result<Revision, Error> {
        self.register_read(RegisterAddress::DEVICE_REVISION)
            .map(Revision::from)
    }

    /// USB vendor ID the hub reports in its register bank.
    pub fn vendor_id(&self) -> Result<u16, Error> {
        Ok(self.register_read(RegisterAddress::VENDOR_ID)?.raw() as u16)
    }

    /// USB product ID the hub reports in its register bank.
    pub fn product_id(&self) -> Result<u16, Error> {
        Ok(self.register_read(RegisterAddress::PRODUCT_ID)?.raw() as u16)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // I2C
    ////////////////////////////////////////////////////////////////////////////////

    /// Put the hub's I2C master into pass-through mode at the given bus speed.
    ///
    /// This only needs to be done once after the hub powers up, or to change speed.
    ///
    /// # Errors
    ///
    /// [`Error::I2cEnable`] if the request is rejected. It is not retried.
    pub fn i2c_enable(&self, speed: I2cSpeed) -> Result<(), Error> {
        let request = self.codec.encode_i2c_enter(speed);
        info!("Enabling I2C pass-through at {speed:?}");
        self.lock()
            .transfer(&request)
            .map(|_| ())
            .map_err(Error::I2cEnable)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // SPI settings
    ////////////////////////////////////////////////////////////////////////////////

    /// Set the mode and clock used by subsequent SPI transfers.
    pub fn spi_configure(&self, settings: SpiSettings) {
        debug!("SPI settings {settings:?}");
        *self
            .spi_settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Mode and clock used by [`USB4715::spi_transfer`].
    pub fn spi_settings(&self) -> SpiSettings {
        *self
            .spi_settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // GPIO pins
    ////////////////////////////////////////////////////////////////////////////////

    /// Take the two GPIO line handles for individual digital I/O.
    ///
    /// # Errors
    ///
    /// [`Error::PinsAlreadyTaken`] on every call after the first.
    pub fn take_pins(&self) -> Result<crate::gpio::Pins<'_, T>, Error> {
        if self.pins_taken.swap(true, Ordering::AcqRel) {
            Err(Error::PinsAlreadyTaken)
        } else {
            Ok(crate::gpio::Pins::new(self))
        }
    }
}
