//! Alert tone sequencer
//!
//! Melodies are plain timelines of [`Step`]s. Boards with a blocking delay
//! play them with [`play_blocking`]; async firmware replays the same
//! script with its own timers.

pub mod melody;
pub mod player;

pub use melody::{Melody, Step, GAP_MS, NOTE_MS, SCRIPT_LEN, TAIL_MS};
pub use player::{alert_tone, play_blocking, play_boot, tone_level, SoundConfig, ALARM_TONE_MS};
