//! Vigil - traffic awareness firmware for RP2040 boards
//!
//! Brings up the peripherals, builds the capability table and hands it to
//! the application task. Display, buzzer, GNSS and flash each get their
//! own task.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::spi::{Config as SpiBusConfig, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Delay;
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use vigil_core::lifecycle::Lifecycle;
use vigil_core::soc::Soc;
use vigil_hal_rp2040::button::GpioButton;
use vigil_hal_rp2040::buzzer::{BuzzerChannel, PwmBuzzer};
use vigil_hal_rp2040::chip::{self, BatterySense, ChipInfo, Rp2040Chip, FLASH_SIZE};
use vigil_hal_rp2040::eeprom::{FlashStore, MirrorEeprom, StorageError, STORAGE_SIZE};
use vigil_hal_rp2040::epd::Ssd1680;
use vigil_hal_rp2040::gate::{GatedSerial, LatchedSpi};
use vigil_hal_rp2040::watchdog::Rp2040Watchdog;

use crate::channels::{EEPROM, EEPROM_BYTES, GNSS_GATE, SPI_LATCH};
use crate::soc::{Rp2040Parts, Rp2040Soc, EPD_SPI_HZ};

mod board;
mod channels;
mod settings;
mod soc;
mod status;
mod tasks;

#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 8KB
const HEAP_SIZE: usize = 8 * 1024;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Vigil firmware starting on {}", board::BOARD_NAME);

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Reset cause is latched in the watchdog block
    let watchdog = Watchdog::new(p.WATCHDOG);
    let reset = chip::reset_cause(watchdog.reset_reason());

    // Flash: unique id and the stored EEPROM image
    let mut store = FlashStore::new(p.FLASH, p.DMA_CH0);
    let unique_id = match store.unique_id() {
        Ok(uid) => chip::fold_unique_id(&uid),
        Err(e) => {
            warn!("Flash unique id unavailable: {:?}", e);
            0
        }
    };
    restore_eeprom(&mut store).await;

    // Battery sense on GPIO29 (VSYS/3)
    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let battery = BatterySense::new(adc, adc::Channel::new_pin(p.PIN_29, Pull::None));

    let flash_free = (FLASH_SIZE - STORAGE_SIZE) as u32 - board::IMAGE_BYTES;
    let chip = Rp2040Chip::new(
        ChipInfo {
            unique_id,
            reset,
            flash_free,
        },
        &HEAP,
        Some(battery),
    );

    // GNSS on UART0 (GPIO0 TX, GPIO1 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = board::GNSS_BAUD;
    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, gnss_rx) = uart.split();
    let pps = Input::new(p.PIN_2, Pull::Down);

    // Piezo on GPIO15, PWM slice 7 channel B
    let pwm = Pwm::new_output_b(p.PWM_SLICE7, p.PIN_15, PwmConfig::default());
    let buzzer = PwmBuzzer::new(pwm, BuzzerChannel::B);

    // E-paper on SPI1 (GPIO10 SCK, GPIO11 MOSI, GPIO9 CS, GPIO8 DC,
    // GPIO12 RST, GPIO13 BUSY)
    let mut spi_config = SpiBusConfig::default();
    spi_config.frequency = EPD_SPI_HZ;
    let spi = Spi::new_txonly(p.SPI1, p.PIN_10, p.PIN_11, p.DMA_CH1, spi_config);
    let panel = Ssd1680::new(
        spi,
        Output::new(p.PIN_9, Level::High),
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_12, Level::High),
        Input::new(p.PIN_13, Pull::None),
        Delay,
        board::DISPLAY_MODEL,
        board::DISPLAY_ROTATION,
    );

    // User button on GPIO14, active low
    let button = GpioButton::new(Input::new(p.PIN_14, Pull::Up));

    info!("Board peripherals initialized");

    let mut soc = Rp2040Soc::new(Rp2040Parts {
        chip,
        gnss: GatedSerial::new(&GNSS_GATE),
        eeprom: MirrorEeprom::new(&EEPROM),
        spi: LatchedSpi::new(&SPI_LATCH),
        watchdog: Rp2040Watchdog::new(watchdog),
        button: Some(button),
    });

    soc.gnss_serial_begin(board::GNSS_BAUD);
    let loaded = settings::load(&mut soc);
    info!("Settings: {:?}, address {:X}", loaded, soc.chip_id());
    soc.spi_begin();

    // Spawn tasks
    spawner.spawn(tasks::storage_task(store)).unwrap();
    spawner.spawn(tasks::gnss_rx_task(gnss_rx)).unwrap();
    spawner.spawn(tasks::pps_task(pps)).unwrap();
    spawner.spawn(tasks::sound_task(buzzer)).unwrap();
    spawner.spawn(tasks::epd_task(panel)).unwrap();
    spawner.spawn(tasks::app_task(Lifecycle::new(soc))).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Seed the EEPROM mirror from flash
async fn restore_eeprom(store: &mut FlashStore<'static>) {
    let mut image = [0u8; EEPROM_BYTES];
    match store.load(&mut image).await {
        Ok(len) => match EEPROM.restore(&image[..len]) {
            Ok(()) => info!("EEPROM image restored ({} bytes)", len),
            Err(e) => warn!("Stored EEPROM image rejected: {:?}", e),
        },
        Err(StorageError::NotFound) => {
            info!("No EEPROM image in flash, starting blank");
        }
        Err(e) => warn!("Failed to read EEPROM image: {:?}", e),
    }
}
