use super::USB4715;
use crate::error::{Error, InvalidTransaction};
use crate::transport::Transport;

/// I2C address of the power switch for downstream ports 1 and 2.
const SWITCH_PORTS_12: u8 = 0x57;
/// I2C address of the power switch for downstream ports 3 and 4.
const SWITCH_PORTS_34: u8 = 0x56;
/// Current register of the switch's first and second channel.
const CHANNEL_1_CURRENT: u8 = 0x00;
const CHANNEL_2_CURRENT: u8 = 0x01;
/// Milliamps per LSB of the current registers.
const MILLIAMPS_PER_LSB: f32 = 13.3;

impl<T: Transport> USB4715<T> {
    /// Current drawn on each of the given downstream ports (1 to 4), in milliamps.
    ///
    /// The readings come from the UCS2113 power switches on the hub's I2C bus, so
    /// the I2C bridge must be enabled first.
    ///
    /// # Errors
    ///
    /// [`InvalidTransaction::NoSuchPort`] for a port outside 1..=4, before any
    /// reading is taken. Otherwise any I2C bridge error.
    pub fn port_currents(&self, ports: &[u8]) -> Result<Vec<f32>, Error> {
        if let Some(&port) = ports.iter().find(|port| !(1..=4).contains(*port)) {
            return Err(InvalidTransaction::NoSuchPort(port).into());
        }
        ports
            .iter()
            .map(|&port| {
                let switch = if port <= 2 { SWITCH_PORTS_12 } else { SWITCH_PORTS_34 };
                let register = if port % 2 == 1 {
                    CHANNEL_1_CURRENT
                } else {
                    CHANNEL_2_CURRENT
                };
                let reading = self.i2c_write_read(switch, &[register], 1)?;
                Ok(f32::from(reading[0]) * MILLIAMPS_PER_LSB)
            })
            .collect()
    }
}
