//! The capability table trait

use super::groups::{
    BluetoothOps, ButtonOps, DisplayOps, SoundOps, UatOps, UsbOps, WatchdogOps, WifiOps,
};
use super::types::{BootError, EepromCommand, ResetInfo, ShutdownReason, SocId};
use crate::battery::BatteryParam;
use crate::settings::Settings;

/// Per-target hardware capability table
///
/// Exactly one implementation is compiled into a firmware image. Identity
/// and lifecycle entries are mandatory. Everything a board may lack is
/// reached through an accessor returning `Option`; `None` means the board
/// does not have that capability and the caller skips it.
pub trait Soc {
    // --- Identity ---

    fn id(&self) -> SocId;

    /// Human-readable target name
    fn name(&self) -> &'static str;

    /// 24-bit device address derived from the chip's unique id
    fn chip_id(&self) -> u32;

    fn free_heap(&self) -> u32;

    fn reset_info(&self) -> ResetInfo;

    fn reset_reason(&self) -> &'static str {
        self.reset_info().cause.as_str()
    }

    /// Uniform random integer in `[low, high)`
    fn random(&mut self, low: i32, high: i32) -> i32;

    // --- Lifecycle ---

    fn setup(&mut self) -> Result<(), BootError>;

    fn post_init(&mut self) {}

    fn loop_tick(&mut self) {}

    fn fini(&mut self, reason: ShutdownReason);

    /// Restart the chip
    fn reset(&mut self) -> !;

    // --- Peripherals ---

    fn gnss_serial_begin(&mut self, baud: u32);

    /// Pause or resume reception on the GNSS serial input
    fn gnss_serial_enable_rx(&mut self, enabled: bool);

    fn eeprom_begin(&mut self, size: usize) -> bool;

    /// Board-specific fix-ups applied to the settings block
    fn eeprom_extension(&mut self, cmd: EepromCommand, settings: &mut Settings) {
        if cmd == EepromCommand::Load {
            settings.migrate_legacy_band();
        }
    }

    fn spi_begin(&mut self);

    /// Largest firmware image accepted by the update slot
    fn max_sketch_space(&self) -> u32;

    // --- Battery and sensors ---

    fn battery_setup(&mut self) {}

    fn battery_param(&mut self, param: BatteryParam) -> f32;

    /// GNSS pulse-per-second edge, stamped with the current time
    fn pps_interrupt(&mut self, now_ms: u32);

    /// Time of the last PPS edge, 0 if none was seen
    fn pps_time_marker(&self) -> u32;

    /// Check whether a barometric sensor may be probed on this board
    fn baro_setup(&mut self) -> bool {
        false
    }

    // --- Optional capability groups ---

    fn wifi(&mut self) -> Option<&mut dyn WifiOps> {
        None
    }

    fn sound(&mut self) -> Option<&mut dyn SoundOps> {
        None
    }

    fn display(&mut self) -> Option<&mut dyn DisplayOps> {
        None
    }

    fn bluetooth(&mut self) -> Option<&mut dyn BluetoothOps> {
        None
    }

    fn usb(&mut self) -> Option<&mut dyn UsbOps> {
        None
    }

    fn uat(&mut self) -> Option<&mut dyn UatOps> {
        None
    }

    fn watchdog(&mut self) -> Option<&mut dyn WatchdogOps> {
        None
    }

    fn button(&mut self) -> Option<&mut dyn ButtonOps> {
        None
    }
}
