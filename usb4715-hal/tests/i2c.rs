//! I2C bridge protocol against the simulated hub.
mod common;

use common::{I2cTarget, Op, SimulatedHub, driver, driver_with};
use usb4715_hal::transport::TransportError;
use usb4715_hal::{
    Bus, BusTimeoutCause, Error, I2cTransaction, InvalidTransaction, NackPhase, RegisterAddress,
};

fn hub_with_target(address: u8) -> SimulatedHub {
    SimulatedHub::new().with_target(address, I2cTarget::default())
}

/// Write [1, 2] then read 2 bytes from 0x40: the full register sequence.
#[test]
fn write_then_read_sequence() -> Result<(), Error> {
    let (device, hub) = driver_with(hub_with_target(0x40));
    let data = device.i2c_write_read(0x40, &[1, 2], 2)?;
    // Pointer set to 1, byte 2 stored at 1, so the read starts at 2.
    assert_eq!(data, vec![2, 3]);

    let log = hub.log();
    assert_eq!(
        &log[..5],
        &[
            Op::Write(RegisterAddress::I2C_TARGET, 0x40),
            Op::Write(RegisterAddress::I2C_LENGTH, 0x0202),
            Op::Write(RegisterAddress::i2c_tx_data(0).unwrap(), 1),
            Op::Write(RegisterAddress::i2c_tx_data(1).unwrap(), 2),
            Op::Write(RegisterAddress::I2C_CONTROL, 0x01),
        ]
    );
    let polls = log[5..]
        .iter()
        .take_while(|op| **op == Op::Read(RegisterAddress::I2C_STATUS))
        .count();
    assert!(polls >= 1);
    assert_eq!(
        &log[5 + polls..],
        &[
            Op::Read(RegisterAddress::i2c_rx_data(0).unwrap()),
            Op::Read(RegisterAddress::i2c_rx_data(1).unwrap()),
        ]
    );
    Ok(())
}

/// Busy status is polled until the bridge completes.
#[test]
fn polls_until_complete() -> Result<(), Error> {
    let (device, hub) = driver_with(hub_with_target(0x40));
    hub.state().busy_polls = 5;
    device.i2c_read(0x40, 1)?;
    let polls = hub
        .log()
        .iter()
        .filter(|op| **op == Op::Read(RegisterAddress::I2C_STATUS))
        .count();
    assert_eq!(polls, 6);
    Ok(())
}

/// A zero-length write completes without touching the receive buffer.
#[test]
fn zero_length_write_is_a_probe() -> Result<(), Error> {
    let (device, hub) = driver_with(hub_with_target(0x40));
    device.i2c_write(0x40, &[])?;
    assert!(hub.log().iter().all(|op| match op {
        Op::Read(address) => *address == RegisterAddress::I2C_STATUS,
        _ => true,
    }));
    Ok(())
}

/// Oversized reads and writes, and 8-bit addresses, fail without any transfer.
#[test]
fn invalid_transactions_do_no_io() {
    let (device, hub) = driver_with(hub_with_target(0x40));
    assert!(matches!(
        device.i2c_read(0x40, 33),
        Err(Error::InvalidTransaction(InvalidTransaction::ReadTooLong {
            bus: Bus::I2c,
            length: 33,
            capacity: 32,
        }))
    ));
    assert!(matches!(
        device.i2c_write(0x40, &[0; 33]),
        Err(Error::InvalidTransaction(InvalidTransaction::WriteTooLong { .. }))
    ));
    assert!(matches!(
        device.i2c_write(0x80, &[0]),
        Err(Error::InvalidTransaction(InvalidTransaction::AddressOutOfRange(0x80)))
    ));
    assert_eq!(hub.transfers(), 0);
}

/// A full 32-byte read fits the bridge.
#[test]
fn full_buffer_read() -> Result<(), Error> {
    let (device, _hub) = driver_with(hub_with_target(0x40));
    let data = device.i2c_write_read(0x40, &[0x20], 32)?;
    assert_eq!(data, (0x20..0x40).collect::<Vec<u8>>());
    Ok(())
}

/// An absent target NACKs its address; the bridge is aborted.
#[test]
fn address_nack() {
    let (device, hub) = driver();
    assert!(matches!(
        device.i2c_write(0x21, &[0]),
        Err(Error::BusNack {
            address: 0x21,
            phase: NackPhase::Address,
        })
    ));
    assert_eq!(hub.state().aborts, 1);
    assert_eq!(
        hub.log().last(),
        Some(&Op::Write(RegisterAddress::I2C_CONTROL, 0b10))
    );
}

/// A target refusing data reports the data phase, and nothing is read back.
#[test]
fn data_nack() {
    let target = I2cTarget {
        nack_data: true,
        ..Default::default()
    };
    let (device, hub) = driver_with(SimulatedHub::new().with_target(0x40, target));
    assert!(matches!(
        device.i2c_write_read(0x40, &[0], 4),
        Err(Error::BusNack {
            phase: NackPhase::Data,
            ..
        })
    ));
    assert!(
        !hub.log()
            .contains(&Op::Read(RegisterAddress::i2c_rx_data(0).unwrap()))
    );
}

/// Bus-level error codes map to their error variants.
#[test]
fn bus_error_codes() {
    let (device, hub) = driver_with(hub_with_target(0x40));
    hub.state().i2c_error_code = Some(3);
    assert!(matches!(
        device.i2c_read(0x40, 1),
        Err(Error::BusTimeout {
            cause: BusTimeoutCause::ArbitrationLost,
            ..
        })
    ));
    hub.state().i2c_error_code = Some(4);
    assert!(matches!(
        device.i2c_read(0x40, 1),
        Err(Error::BusTimeout {
            cause: BusTimeoutCause::ClockStretch,
            ..
        })
    ));
    hub.state().i2c_error_code = Some(6);
    assert!(matches!(
        device.i2c_read(0x40, 1),
        Err(Error::DeviceError {
            bus: Bus::I2c,
            code: 6,
        })
    ));
    assert_eq!(hub.state().aborts, 3);
}

/// A bridge that never finishes is aborted once the poll budget runs out.
#[test]
fn transaction_timeout() {
    let (device, hub) = driver_with(hub_with_target(0x40));
    hub.state().stuck = true;
    match device.i2c_read(0x40, 1) {
        Err(Error::TransactionTimeout { bus, polls, .. }) => {
            assert_eq!(bus, Bus::I2c);
            assert!((1..=100).contains(&polls));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(hub.state().aborts, 1);
}

/// A status read that keeps failing after the start still aborts the bridge.
#[test]
fn failed_status_read_aborts() {
    let (device, hub) = driver_with(hub_with_target(0x40));
    hub.state()
        .fail_reads
        .insert(RegisterAddress::I2C_STATUS, TransportError::Timeout);
    match device.i2c_read(0x40, 1) {
        Err(Error::Transport {
            address,
            attempts,
            source,
        }) => {
            assert_eq!(address, RegisterAddress::I2C_STATUS);
            assert_eq!(attempts, 4);
            assert_eq!(source, TransportError::Timeout);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(hub.state().aborts, 1);
}

/// A receive buffer read failing midway returns the error, not the bytes so far.
#[test]
fn failed_receive_read_returns_no_data() {
    let (device, hub) = driver_with(hub_with_target(0x40));
    let second = RegisterAddress::i2c_rx_data(1).unwrap();
    hub.state()
        .fail_reads
        .insert(second, TransportError::Disconnected);
    match device.i2c_read(0x40, 2) {
        Err(Error::Transport {
            address, attempts, ..
        }) => {
            assert_eq!(address, second);
            assert_eq!(attempts, 1);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(hub.log().contains(&Op::Read(RegisterAddress::i2c_rx_data(0).unwrap())));
}

/// Scanning distinguishes present and absent targets.
#[test]
fn check_address() -> Result<(), Error> {
    let (device, _hub) = driver_with(hub_with_target(0x40));
    assert!(device.i2c_check_address(0x40)?);
    assert!(!device.i2c_check_address(0x41)?);
    Ok(())
}

/// A transaction value can be run directly.
#[test]
fn explicit_transaction() -> Result<(), Error> {
    let (device, hub) = driver_with(hub_with_target(0x50));
    let written = device.i2c_transaction(&I2cTransaction::write(0x50, &[0x10, 0xAA, 0xBB]))?;
    assert!(written.is_empty());
    let read = device.i2c_transaction(&I2cTransaction::write_read(0x50, &[0x10], 2))?;
    assert_eq!(read, vec![0xAA, 0xBB]);
    assert_eq!(
        hub.state().i2c_targets[&0x50].written,
        vec![vec![0x10, 0xAA, 0xBB], vec![0x10]]
    );
    Ok(())
}

/// Port currents come from the power switches at 0x57 and 0x56.
#[test]
fn port_currents() -> Result<(), Error> {
    let mut ports_12 = I2cTarget::default();
    ports_12.memory[0] = 10;
    ports_12.memory[1] = 0;
    let mut ports_34 = I2cTarget::default();
    ports_34.memory[0] = 3;
    ports_34.memory[1] = 100;
    let hub = SimulatedHub::new()
        .with_target(0x57, ports_12)
        .with_target(0x56, ports_34);
    let (device, _hub) = driver_with(hub);

    let currents = device.port_currents(&[1, 2, 3, 4])?;
    let expected = [133.0, 0.0, 39.9, 1330.0];
    for (current, expected) in currents.iter().zip(expected) {
        assert!((current - expected).abs() < 0.01, "{current} != {expected}");
    }
    assert!(matches!(
        device.port_currents(&[1, 5]),
        Err(Error::InvalidTransaction(InvalidTransaction::NoSuchPort(5)))
    ));
    Ok(())
}
