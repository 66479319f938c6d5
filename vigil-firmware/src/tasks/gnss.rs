//! GNSS receive and PPS tasks
//!
//! The UART keeps running at all times; while the capability table has
//! the receive gate closed, incoming bytes are read and thrown away.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::Instant;
use embedded_io_async::Read;

use crate::channels::GNSS_GATE;
use crate::soc::pps_edge;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Log a progress line every this many sentences
const REPORT_EVERY: u32 = 100;

/// GNSS RX task - reads NMEA bytes honoring the receive gate
#[embassy_executor::task]
pub async fn gnss_rx_task(mut rx: BufferedUartRx) {
    info!("GNSS RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];
    let mut sentences: u32 = 0;
    let mut dropped: u32 = 0;

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                if !GNSS_GATE.is_open() {
                    dropped = dropped.wrapping_add(n as u32);
                    trace!("GNSS gate closed, dropped {} bytes", n);
                    continue;
                }
                for &byte in &buf[..n] {
                    if byte == b'\n' {
                        sentences = sentences.wrapping_add(1);
                        if sentences % REPORT_EVERY == 0 {
                            debug!(
                                "GNSS: {} sentences, {} bytes dropped",
                                sentences, dropped
                            );
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("GNSS UART read error: {:?}", e);
            }
        }
    }
}

/// PPS task - stamps every rising edge of the pulse-per-second line
#[embassy_executor::task]
pub async fn pps_task(mut pin: Input<'static>) {
    info!("PPS task started");

    loop {
        pin.wait_for_rising_edge().await;
        let now = Instant::now().as_millis() as u32;
        pps_edge(now);
        trace!("PPS at {} ms", now);
    }
}
