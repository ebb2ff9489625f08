//! SPI bridge types.
use crate::constants::BRIDGE_BUFFER_LEN;
use crate::error::{Bus, InvalidTransaction};

/// SPI clock polarity and phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SpiMode {
    /// CPOL = 0, CPHA = 0.
    #[default]
    Mode0,
    /// CPOL = 0, CPHA = 1.
    Mode1,
    /// CPOL = 1, CPHA = 0.
    Mode2,
    /// CPOL = 1, CPHA = 1.
    Mode3,
}

impl SpiMode {
    /// Clock idles high.
    pub fn cpol(self) -> bool {
        matches!(self, SpiMode::Mode2 | SpiMode::Mode3)
    }

    /// Data captured on the second clock edge.
    pub fn cpha(self) -> bool {
        matches!(self, SpiMode::Mode1 | SpiMode::Mode3)
    }

    /// Value of the SPI_CONFIG register for this mode.
    pub(crate) fn config_bits(self) -> u32 {
        (u32::from(self.cpol()) << 1) | u32::from(self.cpha())
    }
}

impl From<embedded_hal::spi::Mode> for SpiMode {
    fn from(mode: embedded_hal::spi::Mode) -> Self {
        use embedded_hal::spi::{Phase, Polarity};
        match (mode.polarity, mode.phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => SpiMode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => SpiMode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => SpiMode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => SpiMode::Mode3,
        }
    }
}

/// Clock settings applied to every SPI transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSettings {
    /// Clock polarity and phase.
    pub mode: SpiMode,
    /// Divisor of the hub's 48 MHz reference clock.
    pub clock_divisor: u16,
}

impl Default for SpiSettings {
    /// Mode 0 at 1 MHz.
    fn default() -> Self {
        Self {
            mode: SpiMode::Mode0,
            clock_divisor: 48,
        }
    }
}

/// One full-duplex SPI exchange as executed by the hub's bridge.
///
/// Every byte clocked out produces one byte clocked in, so the response is always
/// exactly as long as the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiTransaction<'a> {
    settings: SpiSettings,
    payload: &'a [u8],
}

impl<'a> SpiTransaction<'a> {
    /// Exchange `payload` using `settings`.
    pub fn new(settings: SpiSettings, payload: &'a [u8]) -> Self {
        Self { settings, payload }
    }

    /// Clock polarity and phase.
    pub fn mode(&self) -> SpiMode {
        self.settings.mode
    }

    /// Clock divisor.
    pub fn clock_divisor(&self) -> u16 {
        self.settings.clock_divisor
    }

    /// Bytes to transmit.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Number of bytes that will be received.
    pub fn response_length(&self) -> usize {
        self.payload.len()
    }

    /// Check the transaction fits the bridge before any USB traffic.
    pub fn validate(&self) -> Result<(), InvalidTransaction> {
        if self.payload.len() > BRIDGE_BUFFER_LEN {
            return Err(InvalidTransaction::WriteTooLong {
                bus: Bus::Spi,
                length: self.payload.len(),
                capacity: BRIDGE_BUFFER_LEN,
            });
        }
        Ok(())
    }
}
