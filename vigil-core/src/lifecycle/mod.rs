//! Lifecycle control
//!
//! The phase machine is a pure function of the current phase and an event;
//! the controller performs the side effects around it.

pub mod controller;
pub mod phase;

pub use controller::{Lifecycle, LifecycleError};
pub use phase::{Event, Phase};
