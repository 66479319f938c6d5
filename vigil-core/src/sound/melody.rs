//! Boot melodies
//!
//! The melody played at power-up tells the pilot why the device restarted
//! without looking at it.

use vigil_hal::ResetCause;

/// Length of each note (ms)
pub const NOTE_MS: u32 = 500;

/// Gap between notes (ms)
pub const GAP_MS: u32 = 500;

/// Hold after the last note before the buzzer is released (ms)
pub const TAIL_MS: u32 = 600;

/// Steps in every melody script
pub const SCRIPT_LEN: usize = 9;

/// Four-note boot melody
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Melody {
    /// Clean start: power-on, external reset, requested restart
    Ascending,
    /// Hardware watchdog bit
    Alternating,
    /// Any other fault
    Descending,
}

/// One step of a melody timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Start a tone; it stops on its own after `duration_ms`
    Tone { hz: u32, duration_ms: u32 },
    /// Wait before the next step
    Wait(u32),
    /// Silence the buzzer and release its pin
    Release,
}

impl Melody {
    /// Pick the melody for the last reset cause
    pub fn for_reset(cause: ResetCause) -> Self {
        match cause {
            ResetCause::PowerOn | ResetCause::External | ResetCause::SoftRestart => {
                Melody::Ascending
            }
            ResetCause::Watchdog => Melody::Alternating,
            ResetCause::Exception
            | ResetCause::SoftWatchdog
            | ResetCause::DeepSleepWake
            | ResetCause::Unknown => Melody::Descending,
        }
    }

    /// Note frequencies in Hz
    pub const fn notes(self) -> [u32; 4] {
        match self {
            Melody::Ascending => [440, 640, 840, 1040],
            Melody::Alternating => [440, 1040, 440, 1040],
            Melody::Descending => [1040, 840, 640, 440],
        }
    }

    /// Full timeline: four notes separated by gaps, a tail, then release
    pub fn script(self) -> [Step; SCRIPT_LEN] {
        let [a, b, c, d] = self.notes();
        let tone = |hz| Step::Tone {
            hz,
            duration_ms: NOTE_MS,
        };
        [
            tone(a),
            Step::Wait(GAP_MS),
            tone(b),
            Step::Wait(GAP_MS),
            tone(c),
            Step::Wait(GAP_MS),
            tone(d),
            Step::Wait(TAIL_MS),
            Step::Release,
        ]
    }

    /// Total playing time (ms)
    pub fn duration_ms(self) -> u32 {
        self.script()
            .iter()
            .map(|step| match step {
                Step::Wait(ms) => *ms,
                _ => 0,
            })
            .sum()
    }
}
