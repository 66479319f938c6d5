//! SPI bus bring-up
//!
//! Radio and display drivers own their SPI transactions; the capability
//! table only needs to bring the shared bus up once during setup.

/// SPI host controller
pub trait SpiHost {
    /// Configure pins and clock and enable the controller
    fn begin(&mut self, config: SpiConfig);

    /// Check whether `begin` has run
    fn is_started(&self) -> bool;
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock mode
    pub mode: Mode,
}

impl SpiConfig {
    pub const fn with_frequency(frequency: u32) -> Self {
        Self {
            frequency,
            mode: Mode::Mode0,
        }
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        // 4 MHz suits both SX12xx radios and e-paper controllers
        Self::with_frequency(4_000_000)
    }
}

/// SPI clock mode (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Idle low, sample on the rising edge; SX12xx radios and SSD16xx panels
    Mode0,
    Mode1,
    Mode2,
    Mode3,
}
