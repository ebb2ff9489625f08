//! A simulated hub for driving the driver without hardware.
//!
//! The simulation models the register bank, the two GPIO lines, and the I2C and SPI
//! bridges, and records every register access the driver makes.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use usb4715_hal::transport::{ControlTransferRequest, Direction, Transport, TransportError};
use usb4715_hal::{BridgeConfig, RegisterAddress, USB4715};

const CMD_REG_WRITE: u8 = 0x03;
const CMD_REG_READ: u8 = 0x04;
const CMD_I2C_ENTER: u8 = 0x70;

/// One register access seen by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(RegisterAddress),
    Write(RegisterAddress, u32),
    I2cEnter(u16),
}

/// An I2C target with a 256-byte register file and an auto-incrementing pointer.
#[derive(Debug, Clone)]
pub struct I2cTarget {
    pub memory: [u8; 256],
    pub pointer: u8,
    pub written: Vec<Vec<u8>>,
    /// Refuse data bytes after the address.
    pub nack_data: bool,
}

impl Default for I2cTarget {
    fn default() -> Self {
        let mut memory = [0; 256];
        for (i, byte) in memory.iter_mut().enumerate() {
            *byte = i as u8;
        }
        Self {
            memory,
            pointer: 0,
            written: Vec::new(),
            nack_data: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct HubState {
    pub registers: HashMap<RegisterAddress, u32>,
    pub log: Vec<Op>,
    pub i2c_targets: HashMap<u8, I2cTarget>,
    pub i2c_enter: Option<u16>,
    /// Failures returned (in order) before any further transfer is handled.
    pub inject: VecDeque<TransportError>,
    /// Reads of these registers always fail with the given error.
    pub fail_reads: HashMap<RegisterAddress, TransportError>,
    /// Panic inside the next transfer.
    pub panic_next: bool,
    /// Next read reply is truncated by one byte.
    pub truncate_next_read: bool,
    /// Status reads reporting busy before a transaction finishes.
    pub busy_polls: u32,
    /// Bridge never finishes.
    pub stuck: bool,
    /// Force an I2C error code instead of running the transaction.
    pub i2c_error_code: Option<u8>,
    /// Force an SPI error code.
    pub spi_error_code: Option<u8>,
    /// Aborts written to either bridge.
    pub aborts: u32,
    /// Levels applied externally to lines configured as inputs.
    pub gpio_external: u8,
    remaining_busy: u32,
}

/// Handle to a simulated hub. Clones share the same state.
#[derive(Debug, Clone)]
pub struct SimulatedHub {
    state: Arc<Mutex<HubState>>,
}

impl SimulatedHub {
    pub fn new() -> Self {
        let mut state = HubState::default();
        let preset = [
            (RegisterAddress::DEVICE_REVISION, 0x4715_0002),
            (RegisterAddress::VENDOR_ID, 0x0424),
            (RegisterAddress::PRODUCT_ID, 0x494C),
            (RegisterAddress::FRAME_COUNTER, 0x0123),
            // Drive strength bits set, both lines outputs.
            (RegisterAddress::GPIO_OUTPUT, 0b0011_0000),
            (RegisterAddress::GPIO_DIRECTION, 0b11),
        ];
        for (address, value) in preset {
            state.registers.insert(address, value);
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap()
    }

    pub fn with_target(self, address: u8, target: I2cTarget) -> Self {
        self.state().i2c_targets.insert(address, target);
        self
    }

    pub fn log(&self) -> Vec<Op> {
        self.state().log.clone()
    }

    pub fn clear_log(&self) {
        self.state().log.clear();
    }

    /// Number of control transfers handled so far.
    pub fn transfers(&self) -> usize {
        self.state().log.len()
    }
}

/// A driver around a fresh simulated hub, with fast polling.
pub fn driver() -> (USB4715<SimulatedHub>, SimulatedHub) {
    driver_with(SimulatedHub::new())
}

pub fn driver_with(hub: SimulatedHub) -> (USB4715<SimulatedHub>, SimulatedHub) {
    let config = BridgeConfig::default()
        .with_retry_delay(Duration::ZERO)
        .with_poll_interval(Duration::from_micros(10));
    (USB4715::with_transport(hub.clone(), config), hub)
}

impl Transport for SimulatedHub {
    fn transfer(&mut self, request: &ControlTransferRequest) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state();
        if std::mem::take(&mut state.panic_next) {
            drop(state);
            panic!("simulated hub panicked during a transfer");
        }
        if let Some(error) = state.inject.pop_front() {
            return Err(error);
        }
        if request.request() == CMD_I2C_ENTER {
            state.i2c_enter = Some(request.value());
            state.log.push(Op::I2cEnter(request.value()));
            return Ok(Vec::new());
        }
        let absolute = (u32::from(request.index()) << 16) | u32::from(request.value());
        let address = RegisterAddress::try_from(absolute)
            .map_err(|_| TransportError::Stall)?;
        match (request.direction(), request.request()) {
            (Direction::DeviceToHost, CMD_REG_READ) => {
                if let Some(error) = state.fail_reads.get(&address) {
                    return Err(error.clone());
                }
                state.log.push(Op::Read(address));
                let value = state.read_register(address);
                let mut reply = value.to_le_bytes()[..request.length() as usize].to_vec();
                if state.truncate_next_read {
                    state.truncate_next_read = false;
                    reply.pop();
                }
                Ok(reply)
            }
            (Direction::HostToDevice, CMD_REG_WRITE) => {
                let mut bytes = [0u8; 4];
                bytes[..request.data().len()].copy_from_slice(request.data());
                let value = u32::from_le_bytes(bytes);
                state.log.push(Op::Write(address, value));
                state.write_register(address, value);
                Ok(Vec::new())
            }
            _ => Err(TransportError::Stall),
        }
    }
}

impl HubState {
    fn get(&self, address: RegisterAddress) -> u32 {
        self.registers.get(&address).copied().unwrap_or(0)
    }

    fn read_register(&mut self, address: RegisterAddress) -> u32 {
        if address == RegisterAddress::GPIO_INPUT {
            let direction = self.get(RegisterAddress::GPIO_DIRECTION);
            let output = self.get(RegisterAddress::GPIO_OUTPUT);
            let external = u32::from(self.gpio_external);
            return ((output & direction) | (external & !direction)) & 0b11;
        }
        if address == RegisterAddress::I2C_STATUS || address == RegisterAddress::SPI_STATUS {
            if self.stuck {
                return 0b0000_0001;
            }
            if self.remaining_busy > 0 {
                self.remaining_busy -= 1;
                return 0b0000_0001;
            }
        }
        self.get(address)
    }

    fn write_register(&mut self, address: RegisterAddress, value: u32) {
        if address == RegisterAddress::I2C_CONTROL || address == RegisterAddress::SPI_CONTROL {
            if value & 0b10 != 0 {
                self.aborts += 1;
                return;
            }
            if value & 0b01 != 0 {
                self.remaining_busy = self.busy_polls;
                let status = if address == RegisterAddress::I2C_CONTROL {
                    self.run_i2c()
                } else {
                    self.run_spi()
                };
                let status_register = if address == RegisterAddress::I2C_CONTROL {
                    RegisterAddress::I2C_STATUS
                } else {
                    RegisterAddress::SPI_STATUS
                };
                self.registers.insert(status_register, status);
            }
            return;
        }
        self.registers.insert(address, value);
    }

    fn run_i2c(&mut self) -> u32 {
        if let Some(code) = self.i2c_error_code {
            return failed(code);
        }
        let address = self.get(RegisterAddress::I2C_TARGET) as u8;
        let lengths = self.get(RegisterAddress::I2C_LENGTH);
        let write_length = (lengths & 0xFF) as usize;
        let read_length = (lengths >> 8) as usize;
        let written: Vec<u8> = (0..write_length)
            .map(|i| self.get(RegisterAddress::i2c_tx_data(i).unwrap()) as u8)
            .collect();
        let Some(target) = self.i2c_targets.get_mut(&address) else {
            return failed(1);
        };
        if target.nack_data && !written.is_empty() {
            return failed(2);
        }
        if let Some((&pointer, rest)) = written.split_first() {
            target.pointer = pointer;
            for &byte in rest {
                target.memory[target.pointer as usize] = byte;
                target.pointer = target.pointer.wrapping_add(1);
            }
            target.written.push(written.clone());
        }
        let mut read = Vec::with_capacity(read_length);
        for _ in 0..read_length {
            read.push(target.memory[target.pointer as usize]);
            target.pointer = target.pointer.wrapping_add(1);
        }
        for (i, byte) in read.into_iter().enumerate() {
            self.registers
                .insert(RegisterAddress::i2c_rx_data(i).unwrap(), u32::from(byte));
        }
        COMPLETE
    }

    /// The SPI peripheral answers each byte with its bitwise complement.
    fn run_spi(&mut self) -> u32 {
        if let Some(code) = self.spi_error_code {
            return failed(code);
        }
        let length = self.get(RegisterAddress::SPI_LENGTH) as usize;
        for i in 0..length {
            let register = RegisterAddress::spi_data(i).unwrap();
            let outgoing = self.get(register);
            self.registers.insert(register, !outgoing & 0xFF);
        }
        COMPLETE
    }
}

const COMPLETE: u32 = 0b0000_0010;

fn failed(code: u8) -> u32 {
    0b0000_0100 | (u32::from(code) << 4)
}
