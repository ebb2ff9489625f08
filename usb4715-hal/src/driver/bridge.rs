//! The trigger-and-poll state machine shared by the I2C and SPI bridges.
use std::thread::sleep;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::access::RegisterAccess;
use crate::error::{Bus, Error};
use crate::registers::RegisterAddress;
use crate::status::{BridgeErrorCode, BridgeStatus};
use crate::transport::Transport;

/// Control and status registers of one bridge.
pub(super) struct Bridge {
    pub(super) bus: Bus,
    control: RegisterAddress,
    status: RegisterAddress,
}

pub(super) const I2C_BRIDGE: Bridge = Bridge {
    bus: Bus::I2c,
    control: RegisterAddress::I2C_CONTROL,
    status: RegisterAddress::I2C_STATUS,
};

pub(super) const SPI_BRIDGE: Bridge = Bridge {
    bus: Bus::Spi,
    control: RegisterAddress::SPI_CONTROL,
    status: RegisterAddress::SPI_STATUS,
};

const START_BIT: usize = 0;
const ABORT_BIT: usize = 1;

/// How a triggered transaction ended.
#[derive(Debug)]
pub(super) enum Outcome {
    /// The bridge set `complete`; results are in the receive buffer.
    Complete,
    /// The bridge set `error`, and has been told to abort.
    Failed(BridgeErrorCode),
    /// The polling budget ran out, and the bridge has been told to abort.
    TimedOut { polls: u32, elapsed: Duration },
}

impl<T: Transport> RegisterAccess<'_, T> {
    /// Start the configured transaction and poll until the bridge finishes.
    ///
    /// Status is read at least once, then every `poll_interval` until the bridge
    /// reports `complete` or `error`, `max_polls` reads have been made, or
    /// `transaction_timeout` has passed. An `error` flag wins over `complete`.
    /// If a status read fails the bridge is aborted before the error is returned.
    pub(super) fn run_bridge(&mut self, bridge: &Bridge) -> Result<Outcome, Error> {
        self.write(bridge.control, 1 << START_BIT)?;
        debug!("{} bridge started", bridge.bus);

        let started = Instant::now();
        let mut polls = 0;
        loop {
            let status = match self.read(bridge.status) {
                Ok(value) => BridgeStatus::from(value),
                Err(e) => {
                    self.abort(bridge);
                    return Err(e);
                }
            };
            polls += 1;
            if status.error {
                debug!("{} bridge failed: {:?}", bridge.bus, status.error_code);
                self.abort(bridge);
                return Ok(Outcome::Failed(status.error_code));
            }
            if status.complete {
                debug!("{} bridge complete after {polls} poll(s)", bridge.bus);
                return Ok(Outcome::Complete);
            }
            let elapsed = started.elapsed();
            if polls >= self.config().max_polls || elapsed >= self.config().transaction_timeout {
                debug!("{} bridge still busy after {polls} poll(s)", bridge.bus);
                self.abort(bridge);
                return Ok(Outcome::TimedOut { polls, elapsed });
            }
            sleep(self.config().poll_interval);
        }
    }

    /// Best-effort abort. The original failure is what the caller reports.
    fn abort(&mut self, bridge: &Bridge) {
        if let Err(e) = self.write(bridge.control, 1 << ABORT_BIT) {
            warn!("Failed to abort {} transaction: {e}", bridge.bus);
        }
    }
}
