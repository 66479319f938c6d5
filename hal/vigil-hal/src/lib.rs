//! Vigil Hardware Abstraction Layer
//!
//! This crate defines the peripheral traits that chip-specific HALs
//! (RP2040, ESP8266-class boards, host mocks) implement. The capability
//! table in `vigil-core` is assembled from these pieces, so the same
//! application core runs on every board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application core (traffic, radio, UI)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  vigil-core (capability table: Soc)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  vigil-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ vigil-hal-    │       │ vigil-drivers │
//! │    rp2040     │       │  (reference)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`chip::Chip`] - Identity, heap, reset cause, entropy, restart
//! - [`serial::SerialInput`] - Telemetry input channel with RX gating
//! - [`net::WifiDriver`], [`net::DatagramSocket`] - Wireless role and UDP
//! - [`tone::ToneOutput`] - Piezo buzzer
//! - [`eeprom::Eeprom`] - EEPROM-style settings storage
//! - [`spi::SpiHost`] - Synchronous bus bring-up
//! - [`input::Watchdog`], [`input::Button`] - Supervisory peripherals

#![no_std]
#![deny(unsafe_code)]

pub mod chip;
pub mod eeprom;
pub mod input;
pub mod net;
pub mod serial;
pub mod spi;
pub mod tone;

// Re-export key traits at crate root for convenience
pub use chip::{Chip, RawResetCause, ResetCause};
pub use eeprom::{Eeprom, EepromError};
pub use input::{Button, ButtonEvent, Watchdog};
pub use net::{DatagramSocket, Interface, Ipv4Info, WifiDriver, WifiRole};
pub use serial::{SerialConfig, SerialInput};
pub use spi::{SpiConfig, SpiHost};
pub use tone::{ToneLevel, ToneOutput};
