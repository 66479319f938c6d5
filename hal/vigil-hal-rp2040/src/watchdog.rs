//! Hardware watchdog

use embassy_rp::watchdog::Watchdog as RpWatchdog;
use embassy_time::Duration;
use vigil_hal::Watchdog;

/// RP2040 watchdog
///
/// Counts down at 1 MHz; the hardware caps the timeout a little above
/// 8 s, larger requests are clamped.
pub struct Rp2040Watchdog {
    inner: RpWatchdog,
}

/// Longest timeout the counter can hold (ms)
pub const MAX_TIMEOUT_MS: u32 = 8_300;

impl Rp2040Watchdog {
    pub fn new(inner: RpWatchdog) -> Self {
        Self { inner }
    }
}

impl Watchdog for Rp2040Watchdog {
    fn start(&mut self, timeout_ms: u32) {
        let ms = timeout_ms.min(MAX_TIMEOUT_MS);
        self.inner.start(Duration::from_millis(ms as u64));
    }

    fn feed(&mut self) {
        self.inner.feed();
    }

    fn stop(&mut self) {
        self.inner.stop();
    }
}
