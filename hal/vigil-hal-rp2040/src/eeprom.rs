//! EEPROM emulation for RP2040
//!
//! Settings code expects a byte-addressable EEPROM with an explicit
//! commit. Here that is a RAM mirror: reads and writes hit RAM, and
//! `commit` wakes the storage task, which persists a snapshot as one
//! record in the wear-leveled partition at the end of flash.

use core::cell::RefCell;
use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use sequential_storage::cache::NoCache;
use sequential_storage::map;
use vigil_hal::{Eeprom, EepromError};

use crate::chip::FLASH_SIZE;

/// Storage partition at the end of flash
pub const STORAGE_SIZE: usize = 64 * 1024;
pub const STORAGE_START: usize = FLASH_SIZE - STORAGE_SIZE;
pub const STORAGE_RANGE: Range<u32> = (STORAGE_START as u32)..(FLASH_SIZE as u32);

/// Key of the EEPROM image record
const EEPROM_KEY: u8 = 0;

/// Flash persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No EEPROM image stored yet
    NotFound,
    /// Stored image does not fit the mirror
    TooLarge,
    /// Flash driver or map failure
    Flash,
}

impl From<embassy_rp::flash::Error> for StorageError {
    fn from(_: embassy_rp::flash::Error) -> Self {
        StorageError::Flash
    }
}

impl From<StorageError> for EepromError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::TooLarge => EepromError::TooLarge,
            StorageError::NotFound | StorageError::Flash => EepromError::Flash,
        }
    }
}

struct Image<const N: usize> {
    data: [u8; N],
    len: usize,
    open: bool,
}

/// RAM image shared between the capability table and the storage task
pub struct EepromMirror<const N: usize> {
    image: Mutex<CriticalSectionRawMutex, RefCell<Image<N>>>,
    commit: Signal<CriticalSectionRawMutex, ()>,
}

impl<const N: usize> EepromMirror<N> {
    pub const fn new() -> Self {
        Self {
            image: Mutex::new(RefCell::new(Image {
                data: [0xFF; N],
                len: 0,
                open: false,
            })),
            commit: Signal::new(),
        }
    }

    /// Seed the mirror with the image loaded from flash
    pub fn restore(&self, bytes: &[u8]) -> Result<(), StorageError> {
        if bytes.len() > N {
            return Err(StorageError::TooLarge);
        }
        self.image.lock(|cell| {
            let mut image = cell.borrow_mut();
            image.data[..bytes.len()].copy_from_slice(bytes);
            image.len = bytes.len();
        });
        Ok(())
    }

    /// Copy the committed image out; returns its length
    pub fn snapshot(&self, out: &mut [u8; N]) -> usize {
        self.image.lock(|cell| {
            let image = cell.borrow();
            out[..image.len].copy_from_slice(&image.data[..image.len]);
            image.len
        })
    }

    /// Wait for the next commit
    pub async fn committed(&self) {
        self.commit.wait().await
    }
}

impl<const N: usize> Default for EepromMirror<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// `Eeprom` handle over a static mirror
#[derive(Clone, Copy)]
pub struct MirrorEeprom<const N: usize> {
    mirror: &'static EepromMirror<N>,
}

impl<const N: usize> MirrorEeprom<N> {
    pub fn new(mirror: &'static EepromMirror<N>) -> Self {
        Self { mirror }
    }

    fn with_open<R>(
        &self,
        f: impl FnOnce(&mut Image<N>) -> Result<R, EepromError>,
    ) -> Result<R, EepromError> {
        self.mirror.image.lock(|cell| {
            let mut image = cell.borrow_mut();
            if !image.open {
                return Err(EepromError::NotOpen);
            }
            f(&mut *image)
        })
    }
}

fn span(offset: usize, len: usize, limit: usize) -> Result<Range<usize>, EepromError> {
    match offset.checked_add(len) {
        Some(end) if end <= limit => Ok(offset..end),
        _ => Err(EepromError::OutOfRange),
    }
}

impl<const N: usize> Eeprom for MirrorEeprom<N> {
    fn begin(&mut self, size: usize) -> Result<(), EepromError> {
        if size > N {
            return Err(EepromError::TooLarge);
        }
        self.mirror.image.lock(|cell| {
            let mut image = cell.borrow_mut();
            image.len = size;
            image.open = true;
        });
        Ok(())
    }

    fn len(&self) -> usize {
        self.mirror.image.lock(|cell| {
            let image = cell.borrow();
            if image.open {
                image.len
            } else {
                0
            }
        })
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError> {
        self.with_open(|image| {
            let range = span(offset, buf.len(), image.len)?;
            buf.copy_from_slice(&image.data[range]);
            Ok(())
        })
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        self.with_open(|image| {
            let range = span(offset, data.len(), image.len)?;
            image.data[range].copy_from_slice(data);
            Ok(())
        })
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        self.with_open(|_| Ok(()))?;
        self.mirror.commit.signal(());
        Ok(())
    }
}

/// Wear-leveled flash partition holding the EEPROM image
pub struct FlashStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Read the 8-byte unique id of the flash chip
    pub fn unique_id(&mut self) -> Result<[u8; 8], StorageError> {
        let mut uid = [0u8; 8];
        self.flash.blocking_unique_id(&mut uid)?;
        Ok(uid)
    }

    /// Load the stored image into `buffer`; returns its length
    pub async fn load(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let mut data_buffer = [0u8; 2048];

        let result = map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &EEPROM_KEY,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(StorageError::TooLarge);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(StorageError::NotFound),
            Err(_) => Err(StorageError::Flash),
        }
    }

    /// Store a new image
    pub async fn store(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let mut data_buffer = [0u8; 2048];

        map::store_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &EEPROM_KEY,
            &data,
        )
        .await
        .map_err(|_| StorageError::Flash)
    }
}
