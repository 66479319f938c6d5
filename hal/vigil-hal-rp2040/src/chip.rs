//! Chip identity and control
//!
//! The RP2040 has no factory MAC; the 64-bit unique id of the external
//! flash chip stands in for it. Reset cause comes from the watchdog
//! reason register, which only distinguishes power-on, forced and
//! timed-out resets.

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::watchdog::ResetReason;
use embassy_time::Instant;
use embedded_alloc::LlffHeap;
use vigil_core::random::XorShift32;
use vigil_hal::{Chip, RawResetCause, ResetCause};

/// Flash size on the supported boards
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Map the watchdog reset reason to a reset cause
pub fn reset_cause(reason: Option<ResetReason>) -> RawResetCause {
    match reason {
        None => RawResetCause::new(ResetCause::PowerOn, 0),
        Some(ResetReason::Forced) => RawResetCause::new(ResetCause::SoftRestart, 1),
        Some(ResetReason::TimedOut) => RawResetCause::new(ResetCause::Watchdog, 2),
    }
}

/// Fold the 64-bit flash unique id into the 32-bit chip id
pub fn fold_unique_id(uid: &[u8; 8]) -> u32 {
    let lo = u32::from_le_bytes([uid[0], uid[1], uid[2], uid[3]]);
    let hi = u32::from_le_bytes([uid[4], uid[5], uid[6], uid[7]]);
    lo ^ hi
}

/// Facts collected once at boot
#[derive(Debug, Clone, Copy)]
pub struct ChipInfo {
    pub unique_id: u32,
    pub reset: RawResetCause,
    /// Flash bytes left for a firmware update image
    pub flash_free: u32,
}

/// Battery sense input
pub struct BatterySense {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl BatterySense {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

/// RP2040 chip services
pub struct Rp2040Chip {
    info: ChipInfo,
    heap: &'static LlffHeap,
    rng: XorShift32,
    battery: Option<BatterySense>,
}

impl Rp2040Chip {
    pub fn new(info: ChipInfo, heap: &'static LlffHeap, battery: Option<BatterySense>) -> Self {
        let seed = info.unique_id ^ (Instant::now().as_ticks() as u32);
        Self {
            info,
            heap,
            rng: XorShift32::new(seed),
            battery,
        }
    }
}

impl Chip for Rp2040Chip {
    fn unique_id(&self) -> u32 {
        self.info.unique_id
    }

    fn free_heap(&self) -> u32 {
        self.heap.free() as u32
    }

    fn reset_cause(&self) -> RawResetCause {
        self.info.reset
    }

    fn random_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn free_sketch_space(&self) -> u32 {
        self.info.flash_free
    }

    fn millis(&self) -> u32 {
        Instant::now().as_millis() as u32
    }

    fn battery_adc(&mut self) -> u16 {
        match self.battery.as_mut() {
            Some(sense) => sense.adc.blocking_read(&mut sense.channel).unwrap_or(0),
            None => 0,
        }
    }

    fn restart(&mut self) -> ! {
        cortex_m::peripheral::SCB::sys_reset()
    }
}
