//! EEPROM-style storage
//!
//! Settings live in a small byte array mirrored in RAM and committed to
//! non-volatile storage on demand. Chips without real EEPROM emulate it in
//! a flash sector.

/// Errors from EEPROM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    /// `begin` has not been called
    NotOpen,
    /// Requested size exceeds what the backing store provides
    TooLarge,
    /// Offset/length outside the opened region
    OutOfRange,
    /// Underlying flash operation failed
    Flash,
}

/// EEPROM emulation
pub trait Eeprom {
    /// Open a region of `size` bytes and load it into the RAM mirror
    fn begin(&mut self, size: usize) -> Result<(), EepromError>;

    /// Size of the opened region (0 before `begin`)
    fn len(&self) -> usize;

    /// Check whether the region is empty / not opened
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read from the RAM mirror
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError>;

    /// Write into the RAM mirror
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError>;

    /// Persist the RAM mirror
    fn commit(&mut self) -> Result<(), EepromError>;
}
