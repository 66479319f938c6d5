//! Piezo buzzer abstraction

/// Square-wave tone output
///
/// Mirrors the usual `tone()` / `noTone()` pair: `tone` starts a tone and
/// returns immediately, the hardware (or a later `service` call) stops it
/// after `duration_ms`.
pub trait ToneOutput {
    /// Start a tone at `hz` for `duration_ms` milliseconds
    fn tone(&mut self, hz: u32, duration_ms: u32);

    /// Stop any tone in progress
    fn no_tone(&mut self);

    /// Return the pin to high impedance so the buzzer draws no current
    fn release(&mut self);

    /// Set the drive level (duty cycle) used by subsequent tones
    fn set_level(&mut self, level: ToneLevel) {
        let _ = level;
    }
}

/// Buzzer drive level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToneLevel {
    /// 50% duty cycle
    #[default]
    Full,
    /// Reduced duty cycle
    Low,
}
