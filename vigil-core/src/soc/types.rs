//! Types exchanged through the capability table

use vigil_display::PanelModel;
use vigil_hal::RawResetCause;

/// Target family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SocId {
    Esp8266,
    Esp32,
    Rp2040,
    Nrf52,
    Stm32,
    /// Host build used for simulation and tests
    Host,
}

/// Why the last reboot happened, with the chip's raw code kept alongside
pub type ResetInfo = RawResetCause;

/// Fatal failures during board setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// Settings storage could not be opened
    Storage,
    /// A mandatory peripheral did not respond
    Peripheral,
    /// Build does not match the detected hardware
    UnsupportedBoard,
}

/// Why the device is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutdownReason {
    NormalRestart,
    Watchdog,
    UserCommand,
    ExternalReset,
    Unknown,
}

/// Settings block hook invoked around EEPROM access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromCommand {
    /// Block was just read from storage
    Load,
    /// Block is about to be written
    Save,
    /// Block was reset to factory defaults
    Defaults,
}

/// Tunable Wi-Fi parameter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiParam {
    /// Radio output power in dBm
    TxPower(f32),
    /// DHCP lease for access-point clients, in minutes
    DhcpLeaseMinutes(u32),
}

/// Display fitted to the board, as found during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayKind {
    #[default]
    None,
    /// E-paper status panel
    Epd(PanelModel),
    /// Monochrome OLED
    Oled,
}

impl DisplayKind {
    /// Check whether any display was found
    pub fn is_present(self) -> bool {
        self != DisplayKind::None
    }
}

/// Largest firmware image that fits the update slot
///
/// One sector is kept in reserve and the result is sector aligned.
pub const fn max_sketch_space(free: u32) -> u32 {
    free.saturating_sub(0x1000) & !0xFFF
}
