//! PWM piezo buzzer
//!
//! The slice runs from the 125 MHz system clock through a fixed /64
//! divider, so `top = 1_953_125 / hz - 1`. The hardware has no notion of
//! duration: `tone` records a deadline and the owning task silences the
//! output once it passes.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::{Duration, Instant};
use fixed::FixedU16;
use vigil_hal::{ToneLevel, ToneOutput};

/// Counter clock after the /64 divider (Hz)
const COUNTER_HZ: u32 = 125_000_000 / 64;

/// Which output of the slice drives the piezo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuzzerChannel {
    A,
    B,
}

/// Counter wrap value for a tone, clamped to the 16-bit counter
pub fn top_for(hz: u32) -> u16 {
    if hz == 0 {
        return u16::MAX;
    }
    (COUNTER_HZ / hz).saturating_sub(1).min(u16::MAX as u32) as u16
}

/// Compare value for a duty level
fn compare_for(top: u16, level: ToneLevel) -> u16 {
    match level {
        ToneLevel::Full => top / 2,
        // Narrow pulses are audibly quieter on a piezo
        ToneLevel::Low => top / 16,
    }
}

/// Buzzer on one PWM slice
pub struct PwmBuzzer {
    pwm: Pwm<'static>,
    channel: BuzzerChannel,
    config: PwmConfig,
    level: ToneLevel,
    deadline: Option<Instant>,
}

impl PwmBuzzer {
    pub fn new(pwm: Pwm<'static>, channel: BuzzerChannel) -> Self {
        let mut config = PwmConfig::default();
        config.divider = FixedU16::from_num(64);
        config.enable = false;
        let mut buzzer = Self {
            pwm,
            channel,
            config,
            level: ToneLevel::Full,
            deadline: None,
        };
        buzzer.apply(0);
        buzzer
    }

    /// When the current tone should stop, if one is sounding
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Silence the output if the current tone has run its course
    pub fn service(&mut self, now: Instant) {
        if matches!(self.deadline, Some(d) if now >= d) {
            self.no_tone();
        }
    }

    fn apply(&mut self, compare: u16) {
        match self.channel {
            BuzzerChannel::A => self.config.compare_a = compare,
            BuzzerChannel::B => self.config.compare_b = compare,
        }
        self.pwm.set_config(&self.config);
    }
}

impl ToneOutput for PwmBuzzer {
    fn tone(&mut self, hz: u32, duration_ms: u32) {
        let top = top_for(hz);
        self.config.top = top;
        self.config.enable = true;
        self.apply(compare_for(top, self.level));
        self.deadline = Some(Instant::now() + Duration::from_millis(duration_ms as u64));
    }

    fn no_tone(&mut self) {
        self.config.enable = false;
        self.apply(0);
        self.deadline = None;
    }

    fn release(&mut self) {
        // The pin stays muxed to PWM; a disabled slice holds it low
        self.no_tone();
        self.level = ToneLevel::Full;
    }

    fn set_level(&mut self, level: ToneLevel) {
        self.level = level;
    }
}
