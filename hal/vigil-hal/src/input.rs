//! Supervisory peripherals: watchdog and user button

/// Hardware watchdog
pub trait Watchdog {
    /// Arm the watchdog with the given timeout
    fn start(&mut self, timeout_ms: u32);

    /// Reload the countdown
    fn feed(&mut self);

    /// Disarm the watchdog (where the hardware allows it)
    fn stop(&mut self);
}

/// Debounced push button
///
/// `poll` is called from the main loop; it returns at most one event per
/// call.
pub trait Button {
    /// Configure the pin
    fn init(&mut self);

    /// Sample the pin and return a completed gesture, if any
    fn poll(&mut self, now_ms: u32) -> Option<ButtonEvent>;

    /// Release the pin
    fn deinit(&mut self);
}

/// Button gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Short press and release
    Click,
    /// Two clicks in quick succession
    DoubleClick,
    /// Held past the long-press threshold
    LongPress,
}
