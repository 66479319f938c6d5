//! Host mocks of the ESP8266 board peripherals

use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use vigil_core::random::XorShift32;
use vigil_hal::{
    Chip, DatagramSocket, Eeprom, EepromError, Interface, Ipv4Info, RawResetCause, ResetCause,
    SerialConfig, SerialInput, SpiConfig, SpiHost, ToneLevel, ToneOutput, WifiDriver, WifiRole,
};

use super::{Esp8266Board, Esp8266Config, Esp8266Parts, Esp8266Soc};

pub struct MockChip {
    rng: XorShift32,
}

impl Chip for MockChip {
    fn unique_id(&self) -> u32 {
        0xAB12_3456
    }

    fn free_heap(&self) -> u32 {
        30_000
    }

    fn reset_cause(&self) -> RawResetCause {
        RawResetCause::new(ResetCause::Watchdog, 1)
    }

    fn random_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn free_sketch_space(&self) -> u32 {
        0x000F_A123
    }

    fn millis(&self) -> u32 {
        0
    }

    fn battery_adc(&mut self) -> u16 {
        260
    }

    fn restart(&mut self) -> ! {
        panic!("restart")
    }
}

pub struct MockWifi {
    pub role: WifiRole,
    pub stations: Vec<Ipv4Addr, 4>,
    pub power_dbm: Option<f32>,
    pub lease_s: Option<u32>,
    pub hostname_ok: bool,
}

impl WifiDriver for MockWifi {
    type Stations<'a> = core::iter::Copied<core::slice::Iter<'a, Ipv4Addr>>;

    fn role(&self) -> WifiRole {
        self.role
    }

    fn ip_info(&self, interface: Interface) -> Ipv4Info {
        match interface {
            Interface::Station => Ipv4Info::new(
                Ipv4Addr::new(192, 168, 1, 40),
                Ipv4Addr::new(255, 255, 255, 0),
            ),
            Interface::SoftAp => Ipv4Info::new(
                Ipv4Addr::new(192, 168, 4, 1),
                Ipv4Addr::new(255, 255, 255, 0),
            ),
        }
    }

    fn stations(&mut self) -> Self::Stations<'_> {
        self.stations.iter().copied()
    }

    fn set_output_power(&mut self, dbm: f32) {
        self.power_dbm = Some(dbm);
    }

    fn set_dhcp_lease_time(&mut self, seconds: u32) {
        self.lease_s = Some(seconds);
    }

    fn set_hostname(&mut self, _hostname: &str) -> bool {
        self.hostname_ok
    }
}

#[derive(Default)]
pub struct MockSocket {
    pub sent: Vec<(Ipv4Addr, u16), 8>,
    pub stopped: bool,
}

impl DatagramSocket for MockSocket {
    type Error = ();

    fn send_to(&mut self, addr: Ipv4Addr, port: u16, _payload: &[u8]) -> Result<(), ()> {
        self.sent.push((addr, port)).map_err(|_| ())
    }

    fn stop_all(&mut self) {
        self.stopped = true;
    }
}

pub struct MockGnss {
    pub baud: u32,
    pub rx: bool,
    pub toggles: usize,
}

impl SerialInput for MockGnss {
    fn begin(&mut self, config: SerialConfig) {
        self.baud = config.baudrate;
    }

    fn enable_rx(&mut self, enabled: bool) {
        self.rx = enabled;
        self.toggles += 1;
    }

    fn is_rx_enabled(&self) -> bool {
        self.rx
    }
}

#[derive(Default)]
pub struct MockBuzzer {
    pub tones: Vec<u32, 16>,
    pub durations: Vec<u32, 16>,
    pub level: Option<ToneLevel>,
    pub silenced: usize,
    pub released: bool,
}

impl ToneOutput for MockBuzzer {
    fn tone(&mut self, hz: u32, duration_ms: u32) {
        let _ = self.tones.push(hz);
        let _ = self.durations.push(duration_ms);
    }

    fn no_tone(&mut self) {
        self.silenced += 1;
    }

    fn release(&mut self) {
        self.released = true;
    }

    fn set_level(&mut self, level: ToneLevel) {
        self.level = Some(level);
    }
}

#[derive(Default)]
pub struct MockDelay {
    pub total_ms: u32,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += ns / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
    }
}

#[derive(Default)]
pub struct MockEeprom {
    size: usize,
}

impl Eeprom for MockEeprom {
    fn begin(&mut self, size: usize) -> Result<(), EepromError> {
        if size > 4096 {
            return Err(EepromError::TooLarge);
        }
        self.size = size;
        Ok(())
    }

    fn len(&self) -> usize {
        self.size
    }

    fn read(&self, _offset: usize, _buf: &mut [u8]) -> Result<(), EepromError> {
        Ok(())
    }

    fn write(&mut self, _offset: usize, _data: &[u8]) -> Result<(), EepromError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSpi {
    started: bool,
}

impl SpiHost for MockSpi {
    fn begin(&mut self, _config: SpiConfig) {
        self.started = true;
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

pub struct TestBoard;

impl Esp8266Board for TestBoard {
    type Chip = MockChip;
    type Wifi = MockWifi;
    type Socket = MockSocket;
    type Gnss = MockGnss;
    type Uat = MockGnss;
    type Buzzer = MockBuzzer;
    type Delay = MockDelay;
    type Eeprom = MockEeprom;
    type Spi = MockSpi;
}

/// Station-mode board with a bound socket and a buzzer
pub fn board() -> Esp8266Parts<TestBoard> {
    Esp8266Parts {
        chip: MockChip {
            rng: XorShift32::new(7),
        },
        wifi: MockWifi {
            role: WifiRole::Station,
            stations: Vec::new(),
            power_dbm: None,
            lease_s: None,
            hostname_ok: true,
        },
        socket: Some(MockSocket::default()),
        gnss: MockGnss {
            baud: 0,
            rx: true,
            toggles: 0,
        },
        uat: Some(MockGnss {
            baud: 0,
            rx: true,
            toggles: 0,
        }),
        buzzer: Some(MockBuzzer::default()),
        delay: MockDelay::default(),
        eeprom: MockEeprom::default(),
        spi: MockSpi::default(),
    }
}

pub fn soc_with(parts: Esp8266Parts<TestBoard>, config: Esp8266Config) -> Esp8266Soc<TestBoard> {
    Esp8266Soc::new(parts, config)
}
