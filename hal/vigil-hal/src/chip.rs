//! Chip identity and control
//!
//! Everything a board knows about its own silicon: the factory-unique id,
//! heap statistics, why it last rebooted, a source of entropy and the
//! ability to restart itself.

/// Why the chip last came out of reset
///
/// Chips report this in wildly different ways; implementations map their
/// native reset registers onto this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// Normal power-on (or the chip cannot tell)
    PowerOn,
    /// Hardware watchdog expired
    Watchdog,
    /// CPU exception / fault handler rebooted the chip
    Exception,
    /// Software watchdog expired
    SoftWatchdog,
    /// Firmware requested a restart
    SoftRestart,
    /// Woke from deep sleep
    DeepSleepWake,
    /// External reset pin or supervisor
    External,
    /// Cause register held a value we do not recognize
    Unknown,
}

impl ResetCause {
    /// Short human-readable description
    pub const fn as_str(self) -> &'static str {
        match self {
            ResetCause::PowerOn => "Power on",
            ResetCause::Watchdog => "Hardware Watchdog",
            ResetCause::Exception => "Exception",
            ResetCause::SoftWatchdog => "Software Watchdog",
            ResetCause::SoftRestart => "Software/System restart",
            ResetCause::DeepSleepWake => "Deep-Sleep Wake",
            ResetCause::External => "External System",
            ResetCause::Unknown => "Unknown",
        }
    }
}

/// Reset cause together with the chip's raw reset register value
///
/// `raw` is opaque to the core; it is only forwarded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawResetCause {
    /// Decoded cause
    pub cause: ResetCause,
    /// Chip-specific register snapshot
    pub raw: u32,
}

impl RawResetCause {
    /// Create a reset record
    pub const fn new(cause: ResetCause, raw: u32) -> Self {
        Self { cause, raw }
    }
}

/// Chip-level identity and control
pub trait Chip {
    /// Factory-unique id (not yet mapped to a device address)
    fn unique_id(&self) -> u32;

    /// Free heap in bytes (0 on targets without a heap)
    fn free_heap(&self) -> u32;

    /// Reset cause latched at boot
    fn reset_cause(&self) -> RawResetCause;

    /// Next 32 bits of entropy
    fn random_u32(&mut self) -> u32;

    /// Free space for an OTA firmware image in bytes
    fn free_sketch_space(&self) -> u32;

    /// Milliseconds since boot
    fn millis(&self) -> u32;

    /// Raw battery ADC reading
    fn battery_adc(&mut self) -> u16;

    /// Restart the chip; never returns
    fn restart(&mut self) -> !;
}
