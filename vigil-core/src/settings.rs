//! Application settings as seen by the hardware layer
//!
//! The full settings schema belongs to the application. This module only
//! carries the fields the capability table and the status display read,
//! plus the one migration applied when the block is loaded from EEPROM.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    #[default]
    Normal,
    Bridge,
    Relay,
    TxRxTest,
    Loopback,
    Uav,
    Watchout,
    /// Listen only; the radio never transmits
    Receiver,
}

/// Radio protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RfProtocol {
    #[default]
    Legacy,
    Ogntp,
    P3i,
    Adsb1090,
    /// 978 MHz UAT, receive only
    AdsbUat,
    Fanet,
    Aprs,
    Adsl860,
}

impl RfProtocol {
    /// Short name shown on the status panel
    pub const fn short_name(self) -> &'static str {
        match self {
            RfProtocol::Legacy => "LEG",
            RfProtocol::Ogntp => "OGN",
            RfProtocol::P3i => "P3I",
            RfProtocol::Adsb1090 => "ADS",
            RfProtocol::AdsbUat => "UAT",
            RfProtocol::Fanet => "FAN",
            RfProtocol::Aprs => "APRS",
            RfProtocol::Adsl860 => "ADL",
        }
    }

    /// Check whether the protocol can only receive
    pub const fn is_receive_only(self) -> bool {
        matches!(self, RfProtocol::AdsbUat)
    }
}

/// Regulatory band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RfBand {
    /// Legacy "pick from position" value, no longer supported
    Auto,
    #[default]
    Eu,
    Us,
    Au,
    Nz,
    Ru,
    Cn,
    /// Legacy UK band, folded into EU
    Uk,
    In,
    Il,
    Kr,
}

/// Radio transmit power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TxPower {
    #[default]
    Full,
    Low,
    Off,
}

/// Buzzer volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Volume {
    #[default]
    Full,
    Low,
    Off,
}

/// Settings fields used below the application layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    pub mode: Mode,
    pub protocol: RfProtocol,
    pub band: RfBand,
    pub tx_power: TxPower,
    pub volume: Volume,
}

impl Settings {
    /// Check whether the radio is allowed to transmit at all
    pub fn transmits(&self) -> bool {
        !(self.mode == Mode::Receiver
            || self.protocol.is_receive_only()
            || self.tx_power == TxPower::Off)
    }

    /// Apply the load-time migration of retired bands
    ///
    /// Returns `true` if anything changed.
    pub fn migrate_legacy_band(&mut self) -> bool {
        match self.band {
            RfBand::Auto | RfBand::Uk => {
                self.band = RfBand::Eu;
                true
            }
            _ => false,
        }
    }
}
