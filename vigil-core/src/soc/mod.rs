//! Capability table
//!
//! The application core reaches every piece of per-target hardware through
//! the [`Soc`] trait. Optional groups (Wi-Fi, sound, display, Bluetooth,
//! USB, UAT, watchdog, button) are exposed as `Option<&mut dyn Group>` so a
//! single trait shape covers boards with very different peripheral sets.

pub mod groups;
pub mod table;
pub mod types;

pub use groups::{
    BluetoothOps, ButtonOps, DisplayOps, SoundOps, UatOps, UsbOps, WatchdogOps, WifiOps,
};
pub use table::Soc;
pub use types::{
    max_sketch_space, BootError, DisplayKind, EepromCommand, ResetInfo, ShutdownReason, SocId,
    WifiParam,
};
