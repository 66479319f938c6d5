//! Board-agnostic core of the Vigil hardware layer
//!
//! This crate contains everything between the application core (traffic
//! tracking, radio protocols, alerting) and the per-chip HALs:
//!
//! - The capability table every target implements ([`soc::Soc`])
//! - Lifecycle control (setup, main loop, shutdown, reset)
//! - Wireless broadcast with serial-input gating
//! - The e-paper status panel scheduler
//! - Boot melodies and alert tones
//! - Settings fields read here, battery parameters, device addressing

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod broadcast;
pub mod devid;
pub mod lifecycle;
pub mod random;
pub mod settings;
pub mod soc;
pub mod sound;
pub mod status;
