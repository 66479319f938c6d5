//! Buzzer capability group

use vigil_core::settings::Volume;
use vigil_core::soc::SoundOps;
use vigil_core::sound;
use vigil_hal::ResetCause;

use super::{Esp8266Board, Esp8266Soc};

impl<B: Esp8266Board> SoundOps for Esp8266Soc<B> {
    fn test(&mut self, cause: ResetCause) {
        let config = self.sound_config();
        if let Some(buzzer) = self.buzzer.as_mut() {
            let _played = sound::play_boot(buzzer, &mut self.delay, &config, cause);
            #[cfg(feature = "defmt")]
            defmt::debug!("boot melody: {}", _played);
        }
    }

    fn tone(&mut self, hz: i32, volume: Volume) {
        if let Some(buzzer) = self.buzzer.as_mut() {
            sound::alert_tone(buzzer, hz, volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::*;
    use super::super::Esp8266Config;
    use super::*;
    use vigil_core::settings::Settings;
    use vigil_core::soc::{EepromCommand, Soc};
    use vigil_core::sound::ALARM_TONE_MS;
    use vigil_hal::ToneLevel;

    #[test]
    fn test_boot_melody_blocks_for_full_script() {
        let mut soc = soc_with(board(), Esp8266Config::default());

        soc.test(ResetCause::PowerOn);

        let buzzer = soc.buzzer.as_ref().unwrap();
        assert_eq!(buzzer.tones.as_slice(), &[440, 640, 840, 1040]);
        assert!(buzzer.durations.iter().all(|&d| d == 500));
        assert!(buzzer.released);
        assert_eq!(soc.delay.total_ms, 2100);
    }

    #[test]
    fn test_boot_melody_muted_by_settings() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        let mut settings = Settings {
            volume: Volume::Off,
            ..Settings::default()
        };
        soc.eeprom_extension(EepromCommand::Load, &mut settings);

        soc.test(ResetCause::Exception);

        assert!(soc.buzzer.as_ref().unwrap().tones.is_empty());
        assert_eq!(soc.delay.total_ms, 0);
    }

    #[test]
    fn test_alert_tone() {
        let mut soc = soc_with(board(), Esp8266Config::default());

        soc.tone(1500, Volume::Low);
        {
            let buzzer = soc.buzzer.as_ref().unwrap();
            assert_eq!(buzzer.tones.as_slice(), &[1500]);
            assert_eq!(buzzer.durations.as_slice(), &[ALARM_TONE_MS]);
            assert_eq!(buzzer.level, Some(ToneLevel::Low));
        }

        soc.tone(0, Volume::Low);
        let buzzer = soc.buzzer.as_ref().unwrap();
        assert_eq!(buzzer.silenced, 1);
        assert!(buzzer.released);
    }
}
