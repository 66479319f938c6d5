//! Device address derivation
//!
//! Radio protocols address devices with 24 bits. The chip's 32-bit unique
//! id is folded into that space instead of being truncated, so boards from
//! the same wafer lot (which share the upper byte) still get distinct
//! addresses.

/// Mask of a valid 24-bit device address
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Fold a raw chip id into a 24-bit device address
///
/// `0x000000` and `0xFFFFFF` are reserved by the radio protocols and are
/// never returned.
pub fn map(raw: u32) -> u32 {
    let folded = (raw ^ (raw >> 24)) & ADDRESS_MASK;
    match folded {
        0 => 1,
        ADDRESS_MASK => ADDRESS_MASK - 1,
        other => other,
    }
}
