//! Embassy async tasks
//!
//! Each task owns one peripheral and talks to the others through
//! `channels`.

pub mod app;
pub mod epd;
pub mod gnss;
pub mod sound;
pub mod storage;

pub use app::app_task;
pub use epd::{epd_task, StatusPanel};
pub use gnss::{gnss_rx_task, pps_task};
pub use sound::sound_task;
pub use storage::storage_task;
