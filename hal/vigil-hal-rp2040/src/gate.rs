//! Shared flags between the capability table and peripheral-owning tasks
//!
//! The GNSS UART and the SPI bus are owned by embassy tasks. The
//! capability table only flips flags here; the tasks read them.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use vigil_hal::{SerialConfig, SerialInput, SpiConfig, SpiHost};

/// Receive gate for a UART owned by another task
pub struct SerialGate {
    rx_enabled: AtomicBool,
    baudrate: AtomicU32,
}

impl SerialGate {
    pub const fn new() -> Self {
        Self {
            rx_enabled: AtomicBool::new(false),
            baudrate: AtomicU32::new(0),
        }
    }

    /// Check whether received bytes should be kept
    pub fn is_open(&self) -> bool {
        self.rx_enabled.load(Ordering::Acquire)
    }

    /// Baud rate requested by `begin`, 0 before that
    pub fn baudrate(&self) -> u32 {
        self.baudrate.load(Ordering::Relaxed)
    }
}

impl Default for SerialGate {
    fn default() -> Self {
        Self::new()
    }
}

/// `SerialInput` handle over a static gate
#[derive(Clone, Copy)]
pub struct GatedSerial {
    gate: &'static SerialGate,
}

impl GatedSerial {
    pub fn new(gate: &'static SerialGate) -> Self {
        Self { gate }
    }
}

impl SerialInput for GatedSerial {
    fn begin(&mut self, config: SerialConfig) {
        self.gate.baudrate.store(config.baudrate, Ordering::Relaxed);
        self.gate.rx_enabled.store(true, Ordering::Release);
    }

    fn enable_rx(&mut self, enabled: bool) {
        self.gate.rx_enabled.store(enabled, Ordering::Release);
    }

    fn is_rx_enabled(&self) -> bool {
        self.gate.is_open()
    }
}

/// SPI bring-up latch
///
/// The bus is constructed in `main` and moved into the display task,
/// which waits for the latch before its first transaction.
pub struct SpiLatch {
    started: AtomicBool,
    frequency: AtomicU32,
}

impl SpiLatch {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            frequency: AtomicU32::new(0),
        }
    }

    /// Clock requested by `begin`
    pub fn frequency(&self) -> u32 {
        self.frequency.load(Ordering::Relaxed)
    }

    pub fn is_set(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

impl Default for SpiLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// `SpiHost` handle over a static latch
#[derive(Clone, Copy)]
pub struct LatchedSpi {
    latch: &'static SpiLatch,
}

impl LatchedSpi {
    pub fn new(latch: &'static SpiLatch) -> Self {
        Self { latch }
    }
}

impl SpiHost for LatchedSpi {
    fn begin(&mut self, config: SpiConfig) {
        self.latch.frequency.store(config.frequency, Ordering::Relaxed);
        self.latch.started.store(true, Ordering::Release);
    }

    fn is_started(&self) -> bool {
        self.latch.is_set()
    }
}
