//! RP2040 capability table
//!
//! Runs inside the application task. Peripherals that need async
//! service (e-paper, buzzer, GNSS UART, flash) belong to their own tasks;
//! the groups here only queue work for them through `channels`.

use defmt::*;
use portable_atomic::{AtomicU32, Ordering};

use vigil_core::battery::BatteryParam;
use vigil_core::devid;
use vigil_core::random;
use vigil_core::settings::{Settings, Volume};
use vigil_core::soc::{
    self, BootError, ButtonOps, DisplayKind, DisplayOps, EepromCommand, ResetInfo,
    ShutdownReason, Soc, SocId, SoundOps, WatchdogOps,
};
use vigil_core::sound::{Melody, SoundConfig};
use vigil_core::status::{
    FlushMode, RefreshState, RepaintOutcome, StatusConfig, StatusScheduler, StatusSource,
};
use vigil_display::{Canvas, PanelModel};
use vigil_hal::{
    Button, ButtonEvent, Chip, ResetCause, SerialConfig, SerialInput, SpiConfig, SpiHost, Watchdog,
};
use vigil_hal_rp2040::button::GpioButton;
use vigil_hal_rp2040::chip::Rp2040Chip;
use vigil_hal_rp2040::eeprom::MirrorEeprom;
use vigil_hal_rp2040::gate::{GatedSerial, LatchedSpi};
use vigil_hal_rp2040::watchdog::Rp2040Watchdog;

use crate::board;
use crate::channels::{
    EpdCommand, SoundCommand, StatusFrame, EEPROM_BYTES, EPD_CMD, SHUTDOWN_REQUEST,
    SOUND_CHANNEL, STATUS,
};
use crate::status::LiveStatus;

/// Watchdog timeout while the main loop runs
const WDT_TIMEOUT_MS: u32 = 4_000;

/// Battery sampling period
const BATTERY_INTERVAL_MS: u32 = 10_000;

/// E-paper SPI clock
pub const EPD_SPI_HZ: u32 = 4_000_000;

/// Time of the last PPS edge
static PPS_MARKER: AtomicU32 = AtomicU32::new(0);

/// Stamp a PPS edge
pub fn pps_edge(now_ms: u32) {
    PPS_MARKER.store(now_ms, Ordering::Relaxed);
}

/// Board peripherals handed over at construction
pub struct Rp2040Parts {
    pub chip: Rp2040Chip,
    pub gnss: GatedSerial,
    pub eeprom: MirrorEeprom<EEPROM_BYTES>,
    pub spi: LatchedSpi,
    pub watchdog: Rp2040Watchdog,
    /// `None` on boards without a user button
    pub button: Option<GpioButton>,
}

/// RP2040 capability table
pub struct Rp2040Soc {
    chip: Rp2040Chip,
    gnss: GatedSerial,
    eeprom: MirrorEeprom<EEPROM_BYTES>,
    spi: LatchedSpi,
    watchdog: Rp2040Watchdog,
    button: Option<GpioButton>,
    status: LiveStatus,
    volume: Volume,
    last_battery_ms: Option<u32>,
}

impl Rp2040Soc {
    pub fn new(parts: Rp2040Parts) -> Self {
        let address = devid::map(parts.chip.unique_id());
        Self {
            chip: parts.chip,
            gnss: parts.gnss,
            eeprom: parts.eeprom,
            spi: parts.spi,
            watchdog: parts.watchdog,
            button: parts.button,
            status: LiveStatus::new(address),
            volume: Volume::Full,
            last_battery_ms: None,
        }
    }

    pub fn eeprom(&mut self) -> &mut MirrorEeprom<EEPROM_BYTES> {
        &mut self.eeprom
    }

    fn sound_config(&self) -> SoundConfig {
        SoundConfig {
            buzzer_present: board::BUZZER_PRESENT,
            volume: self.volume,
        }
    }

    fn sample_battery(&mut self) {
        let now = self.chip.millis();
        let due = match self.last_battery_ms {
            Some(last) => now.wrapping_sub(last) >= BATTERY_INTERVAL_MS,
            None => true,
        };
        if due {
            self.last_battery_ms = Some(now);
            let volts = self.battery_param(BatteryParam::Voltage);
            LiveStatus::record_battery(volts);
            trace!("battery: {} V", volts);
        }
    }
}

fn send_sound(cmd: SoundCommand) {
    if SOUND_CHANNEL.try_send(cmd).is_err() {
        warn!("Sound channel full, dropping {:?}", cmd);
    }
}

/// Run `f` on the status scheduler if the screen is up and not locked
fn with_scheduler(f: impl FnOnce(&mut StatusScheduler)) {
    if let Ok(mut guard) = STATUS.try_lock() {
        if let Some(frame) = guard.as_mut() {
            f(&mut frame.scheduler);
        }
    }
}

impl Soc for Rp2040Soc {
    fn id(&self) -> SocId {
        SocId::Rp2040
    }

    fn name(&self) -> &'static str {
        "RP2040"
    }

    fn chip_id(&self) -> u32 {
        self.status.device_address()
    }

    fn free_heap(&self) -> u32 {
        self.chip.free_heap()
    }

    fn reset_info(&self) -> ResetInfo {
        self.chip.reset_cause()
    }

    fn random(&mut self, low: i32, high: i32) -> i32 {
        random::uniform(self.chip.random_u32(), low, high)
    }

    fn setup(&mut self) -> Result<(), BootError> {
        info!(
            "{} on {}, {} bytes heap free",
            self.name(),
            board::BOARD_NAME,
            self.free_heap()
        );
        Ok(())
    }

    fn loop_tick(&mut self) {
        self.sample_battery();
    }

    fn fini(&mut self, reason: ShutdownReason) {
        info!("Shutting down: {:?}", reason);
        if board::BUZZER_PRESENT {
            send_sound(SoundCommand::Alert {
                hz: 0,
                volume: Volume::Full,
            });
        }
    }

    fn reset(&mut self) -> ! {
        self.chip.restart()
    }

    fn gnss_serial_begin(&mut self, baud: u32) {
        self.gnss.begin(SerialConfig::with_baud(baud));
    }

    fn gnss_serial_enable_rx(&mut self, enabled: bool) {
        self.gnss.enable_rx(enabled);
    }

    fn eeprom_begin(&mut self, size: usize) -> bool {
        match self.eeprom.begin(size) {
            Ok(()) => true,
            Err(e) => {
                warn!("EEPROM begin({}) failed: {:?}", size, e);
                false
            }
        }
    }

    fn eeprom_extension(&mut self, cmd: EepromCommand, settings: &mut Settings) {
        if cmd == EepromCommand::Load {
            settings.migrate_legacy_band();
            self.volume = settings.volume;
        }
        self.status.set_settings(*settings);
    }

    fn spi_begin(&mut self) {
        self.spi.begin(SpiConfig::with_frequency(EPD_SPI_HZ));
    }

    fn max_sketch_space(&self) -> u32 {
        soc::max_sketch_space(self.chip.free_sketch_space())
    }

    fn battery_param(&mut self, param: BatteryParam) -> f32 {
        let adc = match param {
            BatteryParam::Voltage => self.chip.battery_adc(),
            _ => 0,
        };
        board::BATTERY.param(param, adc)
    }

    fn pps_interrupt(&mut self, now_ms: u32) {
        pps_edge(now_ms);
    }

    fn pps_time_marker(&self) -> u32 {
        PPS_MARKER.load(Ordering::Relaxed)
    }

    fn baro_setup(&mut self) -> bool {
        board::RADIO.baro_pins_free()
    }

    fn sound(&mut self) -> Option<&mut dyn SoundOps> {
        if board::BUZZER_PRESENT {
            Some(self)
        } else {
            None
        }
    }

    fn display(&mut self) -> Option<&mut dyn DisplayOps> {
        if board::DISPLAY_MODEL != PanelModel::Generic {
            Some(self)
        } else {
            None
        }
    }

    fn watchdog(&mut self) -> Option<&mut dyn WatchdogOps> {
        Some(self)
    }

    fn button(&mut self) -> Option<&mut dyn ButtonOps> {
        if self.button.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl SoundOps for Rp2040Soc {
    fn test(&mut self, cause: ResetCause) {
        if !self.sound_config().enabled() {
            return;
        }
        let melody = Melody::for_reset(cause);
        debug!("Boot melody for {}", cause.as_str());
        send_sound(SoundCommand::Melody(melody, self.volume));
    }

    fn tone(&mut self, hz: i32, volume: Volume) {
        if volume == Volume::Off {
            return;
        }
        send_sound(SoundCommand::Alert { hz, volume });
    }
}

impl DisplayOps for Rp2040Soc {
    fn setup(&mut self) -> DisplayKind {
        let mut canvas = match Canvas::for_panel(board::DISPLAY_MODEL, board::DISPLAY_ROTATION) {
            Ok(canvas) => canvas,
            Err(e) => {
                warn!("No frame buffer for {:?}: {:?}", board::DISPLAY_MODEL, e);
                return DisplayKind::None;
            }
        };
        let Ok(mut guard) = STATUS.try_lock() else {
            warn!("Status screen locked during setup");
            return DisplayKind::None;
        };

        let mut scheduler = StatusScheduler::new(StatusConfig {
            interval_ms: board::REFRESH_INTERVAL_MS,
            flush: FlushMode::Deferred,
        });
        scheduler.initialize(self.chip.millis(), &canvas, &self.status);
        if let RepaintOutcome::Queued(kind) = scheduler.repaint(&mut canvas, &self.status) {
            EPD_CMD.signal(EpdCommand::Flush(kind));
        }
        *guard = Some(StatusFrame { scheduler, canvas });

        info!("Status display {:?} ready", board::DISPLAY_MODEL);
        DisplayKind::Epd(board::DISPLAY_MODEL)
    }

    fn loop_tick(&mut self) {
        let now = self.chip.millis();
        // The display task holds the lock while copying a frame out
        let Ok(mut guard) = STATUS.try_lock() else {
            return;
        };
        let Some(frame) = guard.as_mut() else {
            return;
        };

        let was_idle = frame.scheduler.state() == RefreshState::Idle;
        frame.scheduler.tick(now, &mut frame.canvas, &self.status);
        if was_idle {
            if let Some(kind) = frame.scheduler.state().pending_kind() {
                EPD_CMD.signal(EpdCommand::Flush(kind));
            }
        }
    }

    fn fini(&mut self, _reason: ShutdownReason) {
        EPD_CMD.signal(EpdCommand::Sleep);
    }
}

impl WatchdogOps for Rp2040Soc {
    fn setup(&mut self) {
        self.watchdog.start(WDT_TIMEOUT_MS);
    }

    fn feed(&mut self) {
        self.watchdog.feed();
    }

    fn fini(&mut self) {
        self.watchdog.stop();
    }
}

impl ButtonOps for Rp2040Soc {
    fn setup(&mut self) {
        if let Some(button) = self.button.as_mut() {
            button.init();
        }
    }

    fn loop_tick(&mut self) {
        let now = self.chip.millis();
        let Some(event) = self.button.as_mut().and_then(|b| b.poll(now)) else {
            return;
        };
        debug!("Button: {:?}", event);

        match event {
            ButtonEvent::Click => with_scheduler(|scheduler| {
                scheduler.request_full();
                scheduler.next();
            }),
            ButtonEvent::DoubleClick => with_scheduler(StatusScheduler::request_full),
            ButtonEvent::LongPress => SHUTDOWN_REQUEST.signal(ShutdownReason::UserCommand),
        }
    }

    fn fini(&mut self) {
        if let Some(button) = self.button.as_mut() {
            button.deinit();
        }
    }
}
