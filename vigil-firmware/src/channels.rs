//! Inter-task communication channels
//!
//! The capability table runs inside the application task and never
//! touches a bus directly. Display, buzzer, GNSS and flash work is handed
//! to the tasks owning those peripherals through the statics below.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use vigil_core::settings::Volume;
use vigil_core::soc::ShutdownReason;
use vigil_core::sound::Melody;
use vigil_core::status::StatusScheduler;
use vigil_display::{Canvas, RefreshKind};
use vigil_hal_rp2040::eeprom::EepromMirror;
use vigil_hal_rp2040::gate::{SerialGate, SpiLatch};

/// Frame buffer size, enough for a 2.13" panel at 1 bpp
pub const FRAME_BYTES: usize = 4096;

/// Emulated EEPROM size
pub const EEPROM_BYTES: usize = 512;

/// Channel capacity for buzzer commands
const SOUND_CHANNEL_SIZE: usize = 4;

/// Status screen state shared by the capability table and the display task
pub struct StatusFrame {
    pub scheduler: StatusScheduler,
    pub canvas: Canvas<FRAME_BYTES>,
}

/// Status screen, `None` until the display group is set up
pub static STATUS: Mutex<CriticalSectionRawMutex, Option<StatusFrame>> = Mutex::new(None);

/// Work for the display task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EpdCommand {
    /// A frame is queued in `STATUS`
    Flush(RefreshKind),
    /// Put the controller to sleep
    Sleep,
}

pub static EPD_CMD: Signal<CriticalSectionRawMutex, EpdCommand> = Signal::new();

/// Work for the buzzer task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundCommand {
    Melody(Melody, Volume),
    /// Alert tone, `hz <= 0` silences
    Alert { hz: i32, volume: Volume },
}

pub static SOUND_CHANNEL: Channel<CriticalSectionRawMutex, SoundCommand, SOUND_CHANNEL_SIZE> =
    Channel::new();

/// Shutdown requested from the button or the application
pub static SHUTDOWN_REQUEST: Signal<CriticalSectionRawMutex, ShutdownReason> = Signal::new();

/// GNSS receive gate, flipped by the capability table
pub static GNSS_GATE: SerialGate = SerialGate::new();

/// Set once the SPI bus may be used
pub static SPI_LATCH: SpiLatch = SpiLatch::new();

/// RAM image of the emulated EEPROM
pub static EEPROM: EepromMirror<EEPROM_BYTES> = EepromMirror::new();
