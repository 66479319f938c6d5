//! Buzzer task
//!
//! Owns the PWM buzzer. Melodies are replayed step by step on embassy
//! timers; between commands the task silences a tone once its deadline
//! has passed.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};

use vigil_core::settings::Volume;
use vigil_core::sound::{self, Melody, Step};
use vigil_hal::ToneOutput;
use vigil_hal_rp2040::buzzer::PwmBuzzer;

use crate::channels::{SoundCommand, SOUND_CHANNEL};

#[embassy_executor::task]
pub async fn sound_task(mut buzzer: PwmBuzzer) {
    info!("Sound task started");

    loop {
        let cmd = match buzzer.deadline() {
            Some(deadline) => match select(SOUND_CHANNEL.receive(), Timer::at(deadline)).await {
                Either::First(cmd) => cmd,
                Either::Second(()) => {
                    buzzer.service(Instant::now());
                    continue;
                }
            },
            None => SOUND_CHANNEL.receive().await,
        };

        match cmd {
            SoundCommand::Melody(melody, volume) => play(&mut buzzer, melody, volume).await,
            SoundCommand::Alert { hz, volume } => {
                trace!("Alert tone {} Hz", hz);
                sound::alert_tone(&mut buzzer, hz, volume);
            }
        }
    }
}

/// Replay a melody script without blocking the executor
async fn play(buzzer: &mut PwmBuzzer, melody: Melody, volume: Volume) {
    debug!("Playing {:?}", melody);
    buzzer.set_level(sound::tone_level(volume));
    for step in melody.script() {
        match step {
            Step::Tone { hz, duration_ms } => buzzer.tone(hz, duration_ms),
            Step::Wait(ms) => Timer::after_millis(ms as u64).await,
            Step::Release => {
                buzzer.no_tone();
                buzzer.release();
            }
        }
    }
}
