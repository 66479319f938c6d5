//! Live values behind the status panels

use portable_atomic::{AtomicU32, Ordering};

use vigil_core::settings::Settings;
use vigil_core::status::StatusSource;

/// Aircraft currently tracked
pub static TRAFFIC: AtomicU32 = AtomicU32::new(0);
/// Packets received since boot
pub static RX_PACKETS: AtomicU32 = AtomicU32::new(0);
/// Packets transmitted since boot
pub static TX_PACKETS: AtomicU32 = AtomicU32::new(0);
/// Last battery sample in millivolts
pub static BATTERY_MV: AtomicU32 = AtomicU32::new(0);

/// Status source over the shared counters
#[derive(Debug, Clone, Copy)]
pub struct LiveStatus {
    settings: Settings,
    address: u32,
}

impl LiveStatus {
    pub fn new(address: u32) -> Self {
        Self {
            settings: Settings::default(),
            address,
        }
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Store a battery sample
    pub fn record_battery(volts: f32) {
        // Saturating cast: negative readings store as 0
        BATTERY_MV.store((volts * 1000.0) as u32, Ordering::Relaxed);
    }
}

impl StatusSource for LiveStatus {
    fn traffic_count(&self) -> u32 {
        TRAFFIC.load(Ordering::Relaxed)
    }

    fn battery_voltage(&self) -> f32 {
        BATTERY_MV.load(Ordering::Relaxed) as f32 / 1000.0
    }

    fn rx_packets(&self) -> u32 {
        RX_PACKETS.load(Ordering::Relaxed)
    }

    fn tx_packets(&self) -> u32 {
        TX_PACKETS.load(Ordering::Relaxed)
    }

    fn settings(&self) -> Settings {
        self.settings
    }

    fn device_address(&self) -> u32 {
        self.address
    }
}
