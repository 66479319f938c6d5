//! Radio module identification
//!
//! Which radio a board carries affects more than the radio driver: on the
//! small boards the SX12xx reset line doubles as an I2C pin, so a
//! barometric sensor can only be used when that line is not wired.

/// Radio transceiver fitted to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioChip {
    #[default]
    None,
    Nrf905,
    Sx1276,
    Sx1262,
    Cc13xx,
    /// 978 MHz UAT receiver module on a secondary UART
    Uat978,
}

/// Radio fitting and wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    pub chip: RadioChip,
    /// The radio's reset line is connected to the MCU
    pub reset_wired: bool,
}

impl RadioConfig {
    /// Check whether the shared I2C pins are free for a barometer
    pub fn baro_pins_free(&self) -> bool {
        matches!(self.chip, RadioChip::Sx1276 | RadioChip::Sx1262) && !self.reset_wired
    }
}
