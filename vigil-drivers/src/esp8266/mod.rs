//! ESP8266-class capability table
//!
//! Wi-Fi, a piezo buzzer and the UAT receiver port are present; Bluetooth,
//! USB and the status display are not. The GNSS receiver sits on a software serial port that
//! cannot receive while the radio stack is busy, which is why Wi-Fi sends
//! go through the gated broadcast path.

mod sound;
mod wifi;

#[cfg(test)]
pub(crate) mod mock;

use embedded_hal::delay::DelayNs;
use vigil_core::battery::{BatteryConfig, BatteryParam};
use vigil_core::devid;
use vigil_core::random;
use vigil_core::settings::{Settings, Volume};
use vigil_core::soc::{
    self, BootError, EepromCommand, ResetInfo, ShutdownReason, Soc, SocId, SoundOps, UatOps,
    WifiOps,
};
use vigil_core::sound::SoundConfig;
use vigil_hal::{
    Chip, DatagramSocket, Eeprom, SerialConfig, SerialInput, SpiConfig, SpiHost, ToneOutput,
    WifiDriver,
};

use crate::radio::RadioConfig;

/// Peripheral types making up a board
pub trait Esp8266Board {
    type Chip: Chip;
    type Wifi: WifiDriver;
    type Socket: DatagramSocket;
    type Gnss: SerialInput;
    type Uat: SerialInput;
    type Buzzer: ToneOutput;
    type Delay: DelayNs;
    type Eeprom: Eeprom;
    type Spi: SpiHost;
}

/// Board peripherals handed over at construction
pub struct Esp8266Parts<B: Esp8266Board> {
    pub chip: B::Chip,
    pub wifi: B::Wifi,
    /// Unicast/broadcast UDP socket, `None` until the application binds one
    pub socket: Option<B::Socket>,
    pub gnss: B::Gnss,
    /// Hardware UART wired to a UAT receiver, `None` when not fitted
    pub uat: Option<B::Uat>,
    /// `None` on boards without a buzzer
    pub buzzer: Option<B::Buzzer>,
    pub delay: B::Delay,
    pub eeprom: B::Eeprom,
    pub spi: B::Spi,
}

/// Board configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Esp8266Config {
    pub battery: BatteryConfig,
    pub radio: RadioConfig,
    /// Volume for the boot melody, refreshed when settings are loaded
    pub volume: Volume,
    /// Use this address instead of deriving one from the chip id.
    /// Truncated to 24 bits like every other device address.
    pub fixed_address: Option<u32>,
}

impl Default for Esp8266Config {
    fn default() -> Self {
        Self {
            battery: BatteryConfig::default(),
            radio: RadioConfig::default(),
            volume: Volume::Full,
            fixed_address: None,
        }
    }
}

/// ESP8266 capability table
pub struct Esp8266Soc<B: Esp8266Board> {
    chip: B::Chip,
    wifi: B::Wifi,
    socket: Option<B::Socket>,
    gnss: B::Gnss,
    uat: Option<B::Uat>,
    buzzer: Option<B::Buzzer>,
    delay: B::Delay,
    eeprom: B::Eeprom,
    spi: B::Spi,
    config: Esp8266Config,
    pps_marker: u32,
}

impl<B: Esp8266Board> Esp8266Soc<B> {
    pub fn new(parts: Esp8266Parts<B>, config: Esp8266Config) -> Self {
        Self {
            chip: parts.chip,
            wifi: parts.wifi,
            socket: parts.socket,
            gnss: parts.gnss,
            uat: parts.uat,
            buzzer: parts.buzzer,
            delay: parts.delay,
            eeprom: parts.eeprom,
            spi: parts.spi,
            config,
            pps_marker: 0,
        }
    }

    pub fn config(&self) -> &Esp8266Config {
        &self.config
    }

    /// Bind or replace the UDP socket
    pub fn set_socket(&mut self, socket: Option<B::Socket>) {
        self.socket = socket;
    }

    pub fn gnss(&self) -> &B::Gnss {
        &self.gnss
    }

    pub fn uat_port(&self) -> Option<&B::Uat> {
        self.uat.as_ref()
    }

    pub fn eeprom(&mut self) -> &mut B::Eeprom {
        &mut self.eeprom
    }

    fn sound_config(&self) -> SoundConfig {
        SoundConfig {
            buzzer_present: self.buzzer.is_some(),
            volume: self.config.volume,
        }
    }
}

impl<B: Esp8266Board> Soc for Esp8266Soc<B> {
    fn id(&self) -> SocId {
        SocId::Esp8266
    }

    fn name(&self) -> &'static str {
        "ESP8266"
    }

    fn chip_id(&self) -> u32 {
        match self.config.fixed_address {
            Some(addr) => addr & devid::ADDRESS_MASK,
            None => devid::map(self.chip.unique_id()),
        }
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
        Ok(())
    }

    fn fini(&mut self, _reason: ShutdownReason) {
        if let Some(buzzer) = self.buzzer.as_mut() {
            buzzer.no_tone();
            buzzer.release();
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
        self.eeprom.begin(size).is_ok()
    }

    fn eeprom_extension(&mut self, cmd: EepromCommand, settings: &mut Settings) {
        if cmd == EepromCommand::Load {
            settings.migrate_legacy_band();
            self.config.volume = settings.volume;
        }
    }

    fn spi_begin(&mut self) {
        self.spi.begin(SpiConfig::default());
    }

    fn max_sketch_space(&self) -> u32 {
        soc::max_sketch_space(self.chip.free_sketch_space())
    }

    fn battery_param(&mut self, param: BatteryParam) -> f32 {
        let adc = match param {
            BatteryParam::Voltage => self.chip.battery_adc(),
            _ => 0,
        };
        self.config.battery.param(param, adc)
    }

    fn pps_interrupt(&mut self, now_ms: u32) {
        self.pps_marker = now_ms;
    }

    fn pps_time_marker(&self) -> u32 {
        self.pps_marker
    }

    fn baro_setup(&mut self) -> bool {
        self.config.radio.baro_pins_free()
    }

    fn wifi(&mut self) -> Option<&mut dyn WifiOps> {
        Some(self)
    }

    fn sound(&mut self) -> Option<&mut dyn SoundOps> {
        if self.buzzer.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn uat(&mut self) -> Option<&mut dyn UatOps> {
        if self.uat.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl<B: Esp8266Board> UatOps for Esp8266Soc<B> {
    fn begin(&mut self, baud: u32) {
        if let Some(port) = self.uat.as_mut() {
            port.begin(SerialConfig::with_baud(baud));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use vigil_core::lifecycle::{Lifecycle, Phase};
    use crate::radio::RadioChip;
    use vigil_core::settings::RfBand;
    use vigil_hal::ResetCause;

    #[test]
    fn test_identity() {
        let soc = soc_with(board(), Esp8266Config::default());
        assert_eq!(soc.id(), SocId::Esp8266);
        assert_eq!(soc.chip_id(), 0x12_34FD);
        assert_eq!(soc.free_heap(), 30_000);
        assert_eq!(soc.reset_reason(), "Hardware Watchdog");
        assert_eq!(soc.reset_info().raw, 1);
    }

    #[test]
    fn test_fixed_address_overrides_chip_id() {
        let config = Esp8266Config {
            fixed_address: Some(0xAB_CDEF),
            ..Esp8266Config::default()
        };
        assert_eq!(soc_with(board(), config).chip_id(), 0xAB_CDEF);

        let wide = Esp8266Config {
            fixed_address: Some(0x7F_AB_CDEF),
            ..Esp8266Config::default()
        };
        assert_eq!(soc_with(board(), wide).chip_id(), 0xAB_CDEF);
    }

    #[test]
    fn test_random_in_range() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        for _ in 0..100 {
            let v = soc.random(-3, 3);
            assert!((-3..3).contains(&v));
        }
        assert_eq!(soc.random(7, 7), 7);
    }

    #[test]
    fn test_sketch_space() {
        let soc = soc_with(board(), Esp8266Config::default());
        // 0x0F_A123 free
        assert_eq!(soc.max_sketch_space(), 0x000F_9000);
    }

    #[test]
    fn test_eeprom_begin() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        assert!(soc.eeprom_begin(512));
        assert!(!soc.eeprom_begin(8192));
    }

    #[test]
    fn test_eeprom_load_migrates_band_and_volume() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        let mut settings = Settings {
            band: RfBand::Uk,
            volume: Volume::Low,
            ..Settings::default()
        };

        soc.eeprom_extension(EepromCommand::Load, &mut settings);
        assert_eq!(settings.band, RfBand::Eu);
        assert_eq!(soc.config().volume, Volume::Low);

        let mut auto = Settings {
            band: RfBand::Auto,
            ..Settings::default()
        };
        soc.eeprom_extension(EepromCommand::Save, &mut auto);
        assert_eq!(auto.band, RfBand::Auto);
    }

    #[test]
    fn test_gnss_serial() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        soc.gnss_serial_begin(38_400);
        assert_eq!(soc.gnss().baud, 38_400);
        soc.gnss_serial_enable_rx(false);
        assert!(!soc.gnss().is_rx_enabled());
        soc.gnss_serial_enable_rx(true);
        assert!(soc.gnss().is_rx_enabled());
    }

    #[test]
    fn test_battery_params() {
        let config = Esp8266Config {
            battery: BatteryConfig {
                counts_per_volt: 100.0,
                ..BatteryConfig::default()
            },
            ..Esp8266Config::default()
        };
        let mut soc = soc_with(board(), config);
        assert_eq!(soc.battery_param(BatteryParam::Threshold), 2.3);
        assert_eq!(soc.battery_param(BatteryParam::Cutoff), 2.1);
        assert_eq!(soc.battery_param(BatteryParam::Charge), 100.0);
        assert!((soc.battery_param(BatteryParam::Voltage) - 2.6).abs() < 0.001);
    }

    #[test]
    fn test_pps_marker() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        assert_eq!(soc.pps_time_marker(), 0);
        soc.pps_interrupt(12_345);
        assert_eq!(soc.pps_time_marker(), 12_345);
    }

    #[test]
    fn test_baro_probe() {
        let mut plain = soc_with(board(), Esp8266Config::default());
        assert!(!plain.baro_setup());

        let config = Esp8266Config {
            radio: RadioConfig {
                chip: RadioChip::Sx1276,
                reset_wired: false,
            },
            ..Esp8266Config::default()
        };
        assert!(soc_with(board(), config).baro_setup());
    }

    #[test]
    fn test_group_presence() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        assert!(soc.wifi().is_some());
        assert!(soc.sound().is_some());
        assert!(soc.display().is_none());
        assert!(soc.bluetooth().is_none());
        assert!(soc.usb().is_none());
        assert!(soc.watchdog().is_none());
        assert!(soc.uat().is_some());

        let mut parts = board();
        parts.buzzer = None;
        parts.uat = None;
        let mut quiet = soc_with(parts, Esp8266Config::default());
        assert!(quiet.sound().is_none());
        assert!(quiet.uat().is_none());
    }

    #[test]
    fn test_uat_serial_begin() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        soc.gnss_serial_begin(9_600);
        if let Some(uat) = soc.uat() {
            uat.begin(2_000_000);
            uat.restart();
        }
        assert_eq!(soc.uat_port().map(|port| port.baud), Some(2_000_000));
        assert_eq!(soc.gnss().baud, 9_600);
    }

    #[test]
    fn test_spi_begin() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        soc.spi_begin();
        assert!(soc.spi.is_started());
    }

    #[test]
    fn test_lifecycle_runs_on_reference_board() {
        let mut lc = Lifecycle::new(soc_with(board(), Esp8266Config::default()));
        lc.setup().unwrap();
        lc.post_init().unwrap();
        assert_eq!(lc.tick(), Ok(true));
        assert!(lc.shutdown(ShutdownReason::UserCommand));

        assert_eq!(lc.phase(), Phase::Shutdown(ShutdownReason::UserCommand));
        assert!(lc.soc().socket.as_ref().unwrap().stopped);
        assert!(lc.soc().buzzer.as_ref().unwrap().released);
    }

    #[test]
    fn test_reset_cause_melody_through_table() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        let cause = soc.reset_info().cause;
        if let Some(sound) = soc.sound() {
            sound.test(cause);
        }
        let buzzer = soc.buzzer.as_ref().unwrap();
        assert_eq!(buzzer.tones.as_slice(), &[440, 1040, 440, 1040]);
        assert_eq!(cause, ResetCause::Watchdog);
    }
}
