use log::{info, trace};
use rusb::{DeviceHandle, GlobalContext};

use super::{ControlTransferRequest, Direction, Transport, TransportError};
use crate::Error;

/// libusb-backed control channel to the hub.
///
/// Control transfers addressed to the device do not require claiming an interface,
/// so the hub's downstream ports and other functions are left undisturbed.
#[derive(Debug)]
pub struct UsbTransport {
    handle: DeviceHandle<GlobalContext>,
}

impl UsbTransport {
    /// Open the first USB device found with the given vendor and product ID.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotFound`] if no such device is attached.
    /// - [`Error::Usb`] if the device cannot be enumerated or opened (on Linux this
    ///   is usually a missing udev rule).
    pub fn open(vendor_id: u16, product_id: u16) -> Result<Self, Error> {
        let device = rusb::devices()?
            .iter()
            .find(|device| {
                device.device_descriptor().is_ok_and(|descriptor| {
                    descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id
                })
            })
            .ok_or(Error::DeviceNotFound {
                vendor_id,
                product_id,
            })?;
        let handle = device.open()?;
        info!(
            "Opened hub {vendor_id:04X}:{product_id:04X} on bus {} address {}",
            device.bus_number(),
            device.address()
        );
        Ok(Self { handle })
    }

    /// Wrap an already-open libusb device handle.
    pub fn from_handle(handle: DeviceHandle<GlobalContext>) -> Self {
        Self { handle }
    }

    /// Underlying libusb device handle.
    pub fn handle(&self) -> &DeviceHandle<GlobalContext> {
        &self.handle
    }
}

impl Transport for UsbTransport {
    fn transfer(&mut self, request: &ControlTransferRequest) -> Result<Vec<u8>, TransportError> {
        trace!(
            "ctrl {:?} req={:#04X} value={:#06X} index={:#06X} len={} data={:02X?}",
            request.direction(),
            request.request(),
            request.value(),
            request.index(),
            request.length(),
            request.data(),
        );
        match request.direction() {
            Direction::HostToDevice => {
                let written = self.handle.write_control(
                    request.request_type(),
                    request.request(),
                    request.value(),
                    request.index(),
                    request.data(),
                    request.timeout(),
                )?;
                if written != request.data().len() {
                    return Err(TransportError::ShortWrite {
                        expected: request.data().len(),
                        written,
                    });
                }
                Ok(Vec::new())
            }
            Direction::DeviceToHost => {
                let mut buf = vec![0; request.length() as usize];
                let read = self.handle.read_control(
                    request.request_type(),
                    request.request(),
                    request.value(),
                    request.index(),
                    &mut buf,
                    request.timeout(),
                )?;
                buf.truncate(read);
                trace!("ctrl response {buf:02X?}");
                Ok(buf)
            }
        }
    }
}
