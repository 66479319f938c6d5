//! Settings block in the emulated EEPROM
//!
//! Layout: one version byte followed by the postcard-encoded
//! [`Settings`]. Anything that does not decode falls back to defaults.

use defmt::*;
use vigil_core::settings::Settings;
use vigil_core::soc::{EepromCommand, Soc};
use vigil_hal::{Eeprom, EepromError};

use crate::channels::EEPROM_BYTES;
use crate::soc::Rp2040Soc;

/// Bumped whenever the encoded layout changes
const SETTINGS_VERSION: u8 = 1;

/// Bytes reserved for the block, version byte included
const BLOCK_SIZE: usize = 64;

/// Settings storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    Eeprom(EepromError),
    /// Block written by another firmware layout
    Version(u8),
    Decode,
    Encode,
}

impl From<EepromError> for SettingsError {
    fn from(e: EepromError) -> Self {
        SettingsError::Eeprom(e)
    }
}

/// Decode the settings block
pub fn read(eeprom: &impl Eeprom) -> Result<Settings, SettingsError> {
    let mut block = [0u8; BLOCK_SIZE];
    eeprom.read(0, &mut block)?;
    if block[0] != SETTINGS_VERSION {
        return Err(SettingsError::Version(block[0]));
    }
    postcard::from_bytes(&block[1..]).map_err(|_| SettingsError::Decode)
}

/// Encode the settings block and commit it
pub fn write(eeprom: &mut impl Eeprom, settings: &Settings) -> Result<(), SettingsError> {
    let mut block = [0xFFu8; BLOCK_SIZE];
    block[0] = SETTINGS_VERSION;
    postcard::to_slice(settings, &mut block[1..]).map_err(|_| SettingsError::Encode)?;
    eeprom.write(0, &block)?;
    eeprom.commit()?;
    Ok(())
}

/// Open the EEPROM and load the settings through the capability table
///
/// Board fix-ups run on every load; a block they changed is written back.
pub fn load(soc: &mut Rp2040Soc) -> Settings {
    if !soc.eeprom_begin(EEPROM_BYTES) {
        warn!("EEPROM unavailable, using default settings");
        let mut settings = Settings::default();
        soc.eeprom_extension(EepromCommand::Defaults, &mut settings);
        return settings;
    }

    let (mut settings, stored) = match read(&*soc.eeprom()) {
        Ok(settings) => (settings, true),
        Err(e) => {
            info!("No stored settings ({:?}), using defaults", e);
            let mut settings = Settings::default();
            soc.eeprom_extension(EepromCommand::Defaults, &mut settings);
            (settings, false)
        }
    };

    let loaded = settings;
    soc.eeprom_extension(EepromCommand::Load, &mut settings);

    if !stored || settings != loaded {
        soc.eeprom_extension(EepromCommand::Save, &mut settings);
        match write(soc.eeprom(), &settings) {
            Ok(()) => info!("Settings block written"),
            Err(e) => warn!("Failed to write settings: {:?}", e),
        }
    }
    settings
}
