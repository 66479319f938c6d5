//! Application task
//!
//! Drives the capability table through its lifecycle: setup, boot
//! melody, post-init, then the main loop until a shutdown is requested.

use defmt::*;
use embassy_time::{Duration, Ticker, Timer};

use vigil_core::lifecycle::Lifecycle;
use vigil_core::soc::{ShutdownReason, Soc};

use crate::channels::SHUTDOWN_REQUEST;
use crate::soc::Rp2040Soc;

/// Main loop period
const LOOP_INTERVAL_MS: u64 = 50;

/// Time given to the display and buzzer tasks to finish after shutdown
const SHUTDOWN_GRACE_MS: u64 = 500;

#[embassy_executor::task]
pub async fn app_task(mut lifecycle: Lifecycle<Rp2040Soc>) {
    info!("App task started");

    if let Err(e) = lifecycle.setup() {
        error!("Board setup failed: {:?}", e);
    }
    info!(
        "Reset reason: {}, display: {:?}",
        lifecycle.soc().reset_reason(),
        lifecycle.display_kind()
    );

    let cause = lifecycle.soc().reset_info().cause;
    if let Some(sound) = lifecycle.soc_mut().sound() {
        sound.test(cause);
    }

    if let Err(e) = lifecycle.post_init() {
        error!("Post-init failed: {:?}", e);
    }

    let mut ticker = Ticker::every(Duration::from_millis(LOOP_INTERVAL_MS));
    let reason = loop {
        if let Some(reason) = SHUTDOWN_REQUEST.try_take() {
            break reason;
        }
        match lifecycle.tick() {
            Ok(true) => {}
            Ok(false) => break ShutdownReason::Unknown,
            Err(e) => warn!("Loop tick refused: {:?}", e),
        }
        ticker.next().await;
    };

    lifecycle.shutdown(reason);
    Timer::after_millis(SHUTDOWN_GRACE_MS).await;

    match reason {
        ShutdownReason::UserCommand => {
            // No power switch on this board: stay parked with the screen asleep
            info!("Powered down, waiting for reset");
            loop {
                Timer::after_secs(60).await;
            }
        }
        _ => lifecycle.reset(),
    }
}
