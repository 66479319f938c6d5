//! E-paper task
//!
//! Owns the SSD1680 and its SPI bus. The capability table draws into the
//! shared canvas and signals a flush; this task copies the frame out,
//! releases the lock for the length of the waveform, and reports back.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Async, Spi};
use embassy_time::{Delay, Timer};

use vigil_display::EpdPanel;
use vigil_hal_rp2040::epd::Ssd1680;

use crate::channels::{EpdCommand, EPD_CMD, FRAME_BYTES, SPI_LATCH, STATUS};

/// Poll period while waiting for SPI bring-up
const LATCH_POLL_MS: u64 = 10;

/// Status panel wiring on the supported boards
pub type StatusPanel = Ssd1680<
    Spi<'static, SPI1, Async>,
    Output<'static>,
    Output<'static>,
    Output<'static>,
    Input<'static>,
    Delay,
>;

#[embassy_executor::task]
pub async fn epd_task(mut panel: StatusPanel) {
    info!("EPD task started");

    while !SPI_LATCH.is_set() {
        Timer::after_millis(LATCH_POLL_MS).await;
    }
    match panel.init() {
        Ok(()) => info!("EPD {:?} initialized", panel.model()),
        Err(e) => error!("EPD init failed: {:?}", e),
    }

    let mut frame = [0u8; FRAME_BYTES];

    loop {
        match EPD_CMD.wait().await {
            EpdCommand::Flush(kind) => {
                let (len, width, height) = {
                    let guard = STATUS.lock().await;
                    let Some(status) = guard.as_ref() else {
                        continue;
                    };
                    let bytes = status.canvas.as_bytes();
                    frame[..bytes.len()].copy_from_slice(bytes);
                    (bytes.len(), status.canvas.width(), status.canvas.height())
                };

                let result = panel
                    .transfer_async(&frame[..len], width, height, kind)
                    .await;

                let mut guard = STATUS.lock().await;
                if let Some(status) = guard.as_mut() {
                    match result {
                        Ok(()) => {
                            status.canvas.mark_clean();
                            trace!("EPD {:?} refresh done", kind);
                        }
                        Err(e) => {
                            warn!("EPD refresh failed: {:?}", e);
                            status.scheduler.request_full();
                        }
                    }
                    status.scheduler.flush_complete();
                }
            }
            EpdCommand::Sleep => {
                if let Err(e) = panel.sleep_async().await {
                    warn!("EPD sleep failed: {:?}", e);
                }
            }
        }
    }
}
