//! Register access against the simulated hub.
mod common;

use std::time::Duration;

use common::{Op, SimulatedHub, driver};
use usb4715_hal::transport::TransportError;
use usb4715_hal::{BridgeConfig, Error, InvalidTransaction, RegisterAddress, USB4715};

/// Identification registers decode with their widths.
#[test]
fn identification() -> Result<(), Error> {
    let (device, _hub) = driver();
    assert_eq!(device.vendor_id()?, 0x0424);
    assert_eq!(device.product_id()?, 0x494C);
    let revision = device.revision()?;
    assert_eq!(revision.device_id, 0x4715);
    assert_eq!(revision.revision, 0x02);
    Ok(())
}

/// A written value reads back unchanged, for each register width.
#[test]
fn write_then_read_back() -> Result<(), Error> {
    let (device, hub) = driver();
    for (address, value) in [
        (RegisterAddress::SPI_CONFIG, 0x03),
        (RegisterAddress::SPI_CLOCK_DIVISOR, 0xBEEF),
        (RegisterAddress::I2C_LENGTH, 0x0102),
    ] {
        device.register_write(address, value)?;
        assert_eq!(device.register_read(address)?.raw(), value);
    }
    assert_eq!(hub.transfers(), 6);
    Ok(())
}

/// Registers can be read by name, and their fields listed.
#[test]
fn read_by_name() -> Result<(), Error> {
    let (device, _hub) = driver();
    let value = device.register_read_by_name("gpio_output")?;
    assert_eq!(value.address(), RegisterAddress::GPIO_OUTPUT);
    assert_eq!(value.field("drive_strength"), Some(0b11));
    assert!(matches!(
        device.register_read_by_name("NOT_A_REGISTER"),
        Err(Error::UnknownRegister(_))
    ));
    Ok(())
}

/// Access-mode and range violations are rejected before any transfer.
#[test]
fn invalid_accesses_do_no_io() {
    let (device, hub) = driver();
    assert!(matches!(
        device.register_write(RegisterAddress::I2C_STATUS, 0),
        Err(Error::InvalidTransaction(InvalidTransaction::ReadOnlyRegister(_)))
    ));
    assert!(matches!(
        device.register_read(RegisterAddress::I2C_CONTROL),
        Err(Error::InvalidTransaction(InvalidTransaction::WriteOnlyRegister(_)))
    ));
    assert!(matches!(
        device.register_write(RegisterAddress::SPI_LENGTH, 0x100),
        Err(Error::InvalidTransaction(InvalidTransaction::ValueOutOfRange { .. }))
    ));
    assert_eq!(hub.transfers(), 0);
}

/// Transient failures are retried with the identical request.
#[test]
fn transient_failures_are_retried() -> Result<(), Error> {
    let (device, hub) = driver();
    hub.state()
        .inject
        .extend([TransportError::Timeout, TransportError::Stall]);
    assert_eq!(device.vendor_id()?, 0x0424);
    assert_eq!(hub.log(), vec![Op::Read(RegisterAddress::VENDOR_ID)]);
    assert!(hub.state().inject.is_empty());
    Ok(())
}

/// Retries stop after the configured number, reporting every attempt.
#[test]
fn retries_are_bounded() {
    let (device, hub) = driver();
    hub.state()
        .inject
        .extend((0..10).map(|_| TransportError::Timeout));
    match device.vendor_id() {
        Err(Error::Transport {
            address,
            attempts,
            source,
        }) => {
            assert_eq!(address, RegisterAddress::VENDOR_ID);
            assert_eq!(attempts, 4);
            assert_eq!(source, TransportError::Timeout);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(hub.state().inject.len(), 6);
}

/// The largest retry setting reports every attempt, with none lost to overflow.
#[test]
fn maximum_retries_are_counted() {
    let hub = SimulatedHub::new();
    let config = BridgeConfig::default()
        .with_register_retries(u8::MAX)
        .with_retry_delay(Duration::ZERO);
    let device = USB4715::with_transport(hub.clone(), config);
    hub.state()
        .inject
        .extend((0..300).map(|_| TransportError::Timeout));
    assert!(matches!(
        device.vendor_id(),
        Err(Error::Transport { attempts: 256, .. })
    ));
    assert_eq!(hub.state().inject.len(), 300 - 256);
}

/// Permanent failures surface on the first attempt.
#[test]
fn permanent_failures_are_not_retried() {
    let (device, hub) = driver();
    hub.state()
        .inject
        .extend([TransportError::Disconnected, TransportError::Timeout]);
    assert!(matches!(
        device.vendor_id(),
        Err(Error::Transport {
            attempts: 1,
            source: TransportError::Disconnected,
            ..
        })
    ));
    assert_eq!(hub.state().inject.len(), 1);
}

/// A reply of the wrong length is reported, not retried.
#[test]
fn malformed_reply_is_not_retried() {
    let (device, hub) = driver();
    hub.state().truncate_next_read = true;
    assert!(matches!(
        device.vendor_id(),
        Err(Error::MalformedResponse {
            expected: 2,
            received: 1,
            ..
        })
    ));
    assert_eq!(hub.transfers(), 1);
}

/// The pass-through enable request carries the speed's clock divisor.
#[test]
fn i2c_enable_sends_divisor() -> Result<(), Error> {
    let (device, hub) = driver();
    device.i2c_enable(usb4715_hal::I2cSpeed::default())?;
    device.i2c_enable(usb4715_hal::I2cSpeed::Fast_400kbps)?;
    assert_eq!(hub.log(), vec![Op::I2cEnter(0x3131), Op::I2cEnter(0x0A00)]);
    Ok(())
}

/// A failed enable request is reported without retrying.
#[test]
fn i2c_enable_failure() {
    let (device, hub) = driver();
    hub.state().inject.push_back(TransportError::Timeout);
    assert!(matches!(
        device.i2c_enable(usb4715_hal::I2cSpeed::default()),
        Err(Error::I2cEnable(TransportError::Timeout))
    ));
    assert_eq!(hub.state().i2c_enter, None);
}
