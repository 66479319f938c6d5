//! Melody playback and alert tones

use embedded_hal::delay::DelayNs;
use vigil_hal::{ResetCause, ToneLevel, ToneOutput};

use super::melody::{Melody, Step};
use crate::settings::Volume;

/// Length of a single alert tone (ms)
pub const ALARM_TONE_MS: u32 = 1000;

/// Buzzer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoundConfig {
    /// A buzzer is wired on this board
    pub buzzer_present: bool,
    pub volume: Volume,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            buzzer_present: true,
            volume: Volume::Full,
        }
    }
}

impl SoundConfig {
    /// Check whether anything should ever be played
    pub fn enabled(&self) -> bool {
        self.buzzer_present && self.volume != Volume::Off
    }
}

/// Duty level used for a volume setting
pub fn tone_level(volume: Volume) -> ToneLevel {
    match volume {
        Volume::Low => ToneLevel::Low,
        _ => ToneLevel::Full,
    }
}

/// Play a melody, blocking until it is done
pub fn play_blocking<O, D>(out: &mut O, delay: &mut D, melody: Melody)
where
    O: ToneOutput + ?Sized,
    D: DelayNs + ?Sized,
{
    for step in melody.script() {
        match step {
            Step::Tone { hz, duration_ms } => out.tone(hz, duration_ms),
            Step::Wait(ms) => delay.delay_ms(ms),
            Step::Release => {
                out.no_tone();
                out.release();
            }
        }
    }
}

/// Play the boot melody for `cause` if the buzzer is enabled
///
/// Returns the melody that was played.
pub fn play_boot<O, D>(
    out: &mut O,
    delay: &mut D,
    config: &SoundConfig,
    cause: ResetCause,
) -> Option<Melody>
where
    O: ToneOutput + ?Sized,
    D: DelayNs + ?Sized,
{
    if !config.enabled() {
        return None;
    }
    let melody = Melody::for_reset(cause);
    out.set_level(tone_level(config.volume));
    play_blocking(out, delay, melody);
    Some(melody)
}

/// Start an alert tone, or silence the buzzer
///
/// `hz > 0` starts a tone lasting [`ALARM_TONE_MS`]; anything else stops
/// the buzzer and releases the pin. Nothing happens at volume `Off`.
pub fn alert_tone<O>(out: &mut O, hz: i32, volume: Volume)
where
    O: ToneOutput + ?Sized,
{
    if volume == Volume::Off {
        return;
    }
    if hz > 0 {
        out.set_level(tone_level(volume));
        out.tone(hz as u32, ALARM_TONE_MS);
    } else {
        out.no_tone();
        out.release();
    }
}
