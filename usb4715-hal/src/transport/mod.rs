//! The USB control-transfer channel to the hub.
//!
//! The driver talks to the hub exclusively through the [`Transport`] trait, so that
//! anything able to perform a USB control transfer can stand in for the real device.
//! [`UsbTransport`] is the implementation backed by libusb (via [`rusb`]).
use std::time::Duration;

mod usb;

pub use usb::UsbTransport;

/// A channel able to perform USB control transfers against the hub.
///
/// Implementations perform exactly one control transfer per call and never retry;
/// retry policy belongs to the driver.
pub trait Transport {
    /// Perform the control transfer described by `request`.
    ///
    /// For device-to-host requests the returned buffer holds the bytes received,
    /// which may be fewer than requested. For host-to-device requests an empty
    /// buffer is returned once all the payload bytes have been accepted.
    fn transfer(&mut self, request: &ControlTransferRequest) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn transfer(&mut self, request: &ControlTransferRequest) -> Result<Vec<u8>, TransportError> {
        (**self).transfer(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transfer(&mut self, request: &ControlTransferRequest) -> Result<Vec<u8>, TransportError> {
        (**self).transfer(request)
    }
}

/// Direction of the data stage of a control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// OUT: data flows from the host to the hub.
    HostToDevice,
    /// IN: data flows from the hub to the host.
    DeviceToHost,
}

/// Recipient of a vendor control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The hub controller itself (register access).
    Device,
    /// The hub's vendor interface (I2C pass-through commands).
    Interface,
}

/// A fully-specified vendor control transfer.
///
/// These are only built by the register codec (see [`crate::codec`]), which is the
/// single place that knows the hub's wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTransferRequest {
    direction: Direction,
    recipient: Recipient,
    request: u8,
    value: u16,
    index: u16,
    /// OUT payload. Always empty for IN transfers.
    data: Vec<u8>,
    /// wLength of the setup packet.
    length: u16,
    timeout: Duration,
}

impl ControlTransferRequest {
    pub(crate) fn host_to_device(
        request: u8,
        value: u16,
        index: u16,
        data: Vec<u8>,
        timeout: Duration,
    ) -> Self {
        let length = u16::try_from(data.len()).expect("Control payloads are register sized.");
        Self {
            direction: Direction::HostToDevice,
            recipient: Recipient::Device,
            request,
            value,
            index,
            data,
            length,
            timeout,
        }
    }

    pub(crate) fn device_to_host(
        request: u8,
        value: u16,
        index: u16,
        length: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            direction: Direction::DeviceToHost,
            recipient: Recipient::Device,
            request,
            value,
            index,
            data: Vec::new(),
            length,
            timeout,
        }
    }

    /// Address the request to the vendor interface rather than the device.
    pub(crate) fn to_interface(mut self) -> Self {
        self.recipient = Recipient::Interface;
        self
    }

    /// Direction of the data stage.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the request targets the device or its vendor interface.
    pub fn recipient(&self) -> Recipient {
        self.recipient
    }

    /// bRequest: the vendor command code.
    pub fn request(&self) -> u8 {
        self.request
    }

    /// wValue of the setup packet.
    pub fn value(&self) -> u16 {
        self.value
    }

    /// wIndex of the setup packet.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Payload to send for host-to-device requests.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// wLength: payload length (OUT) or number of bytes requested (IN).
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Timeout the transport should apply to this transfer.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// bmRequestType: vendor request to the device or its vendor interface.
    pub fn request_type(&self) -> u8 {
        let direction = match self.direction {
            Direction::HostToDevice => rusb::Direction::Out,
            Direction::DeviceToHost => rusb::Direction::In,
        };
        let recipient = match self.recipient {
            Recipient::Device => rusb::Recipient::Device,
            Recipient::Interface => rusb::Recipient::Interface,
        };
        rusb::request_type(direction, rusb::RequestType::Vendor, recipient)
    }

    /// The 8-byte USB setup packet for this request.
    pub fn setup_packet(&self) -> [u8; 8] {
        let [value_low, value_high] = self.value.to_le_bytes();
        let [index_low, index_high] = self.index.to_le_bytes();
        let [length_low, length_high] = self.length.to_le_bytes();
        [
            self.request_type(),
            self.request,
            value_low,
            value_high,
            index_low,
            index_high,
            length_low,
            length_high,
        ]
    }

    /// Setup packet followed by the OUT payload, as it would appear on the bus.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.setup_packet().to_vec();
        out.extend_from_slice(&self.data);
        out
    }
}

/// Failure of a single control transfer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transfer did not complete within its timeout.
    #[error("control transfer timed out")]
    Timeout,
    /// The hub stalled the control pipe.
    #[error("control pipe stalled")]
    Stall,
    /// The device or its driver is busy.
    #[error("device busy")]
    Busy,
    /// The transfer was interrupted.
    #[error("transfer interrupted")]
    Interrupted,
    /// Low-level input/output error.
    #[error("input/output error")]
    Io,
    /// The hub returned more data than was requested.
    #[error("device sent more data than requested")]
    Overflow,
    /// Fewer payload bytes were accepted than were sent.
    #[error("short write: {written} of {expected} byte(s) accepted")]
    ShortWrite {
        /// Payload length.
        expected: usize,
        /// Bytes accepted by the device.
        written: usize,
    },
    /// The hub is no longer attached.
    #[error("device disconnected")]
    Disconnected,
    /// The host denied access to the device (check udev rules).
    #[error("access denied")]
    AccessDenied,
    /// The SPI bridge flagged a failed transfer.
    #[error("bridge reported fault code {0:#X}")]
    BridgeFault(u8),
    /// Any other USB failure.
    #[error("USB error: {0}")]
    Other(String),
}

impl TransportError {
    /// True if re-issuing the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout
                | TransportError::Stall
                | TransportError::Busy
                | TransportError::Interrupted
                | TransportError::Io
                | TransportError::Overflow
                | TransportError::ShortWrite { .. }
        )
    }
}

impl From<rusb::Error> for TransportError {
    fn from(value: rusb::Error) -> Self {
        match value {
            rusb::Error::Timeout => TransportError::Timeout,
            rusb::Error::Pipe => TransportError::Stall,
            rusb::Error::Busy => TransportError::Busy,
            rusb::Error::Interrupted => TransportError::Interrupted,
            rusb::Error::Io => TransportError::Io,
            rusb::Error::Overflow => TransportError::Overflow,
            rusb::Error::NoDevice => TransportError::Disconnected,
            rusb::Error::Access => TransportError::AccessDenied,
            other => TransportError::Other(other.to_string()),
        }
    }
}
