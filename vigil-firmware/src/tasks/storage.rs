//! EEPROM persistence task
//!
//! Writes the RAM mirror to flash each time the settings code commits.

use defmt::*;

use vigil_hal_rp2040::eeprom::FlashStore;

use crate::channels::{EEPROM, EEPROM_BYTES};

#[embassy_executor::task]
pub async fn storage_task(mut store: FlashStore<'static>) {
    info!("Storage task started");

    let mut image = [0u8; EEPROM_BYTES];
    loop {
        EEPROM.committed().await;
        let len = EEPROM.snapshot(&mut image);
        match store.store(&image[..len]).await {
            Ok(()) => debug!("EEPROM image persisted ({} bytes)", len),
            Err(e) => warn!("Failed to persist EEPROM image: {:?}", e),
        }
    }
}
