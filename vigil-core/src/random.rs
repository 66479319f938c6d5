//! Random numbers in a range
//!
//! Boards feed raw entropy (a hardware RNG word, or a seeded generator
//! where none exists); this module turns it into the uniform
//! `[low, high)` integers the application asks for.

/// Map a raw 32-bit word onto `[low, high)`
///
/// An empty or inverted range yields `low`.
pub fn uniform(raw: u32, low: i32, high: i32) -> i32 {
    if low >= high {
        return low;
    }
    let span = (high as i64 - low as i64) as u64;
    // Multiply-shift keeps the bias below 2^-32 for any span.
    let offset = ((raw as u64) * span) >> 32;
    (low as i64 + offset as i64) as i32
}

/// Small xorshift generator for chips without a hardware RNG
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator; a zero seed is replaced since it is a fixed point
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Next raw word
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next value in `[low, high)`
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        uniform(self.next_u32(), low, high)
    }
}
