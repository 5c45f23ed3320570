//! Seeded pseudo-random source.
//!
//! The recurrence is Mulberry32 and is part of the output contract: the same
//! seed must yield the same sequence in any implementation, so do not swap
//! it for a library generator.

/// Source of uniform draws in `[0, 1)` plus the derived helpers the
/// generator uses. Implemented by [`Mulberry32`]; tests can substitute a
/// scripted sequence.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform real in `[lo, hi)`. Returns `lo` when `hi <= lo`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let t = self.next_f64();
        if hi <= lo {
            return lo;
        }
        lo + t * (hi - lo)
    }

    /// Uniform integer in `[lo, hi]` (inclusive).
    fn int_range(&mut self, lo: u32, hi: u32) -> u32 {
        let t = self.next_f64();
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo) as f64 + 1.0;
        (lo + (t * span).floor() as u32).min(hi)
    }

    /// Uniform element of a non-empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let t = self.next_f64();
        let i = ((t * items.len() as f64).floor() as usize).min(items.len() - 1);
        items.get(i)
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Name recorded in recipe metadata.
    fn algorithm(&self) -> &'static str {
        "unspecified"
    }
}

/// Mulberry32 generator with a 32-bit state folded from a 64-bit seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub const NAME: &'static str = "mulberry32";

    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ (seed >> 32)) as u32,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RandomSource for Mulberry32 {
    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    fn algorithm(&self) -> &'static str {
        Self::NAME
    }
}
