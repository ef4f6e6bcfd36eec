//! Injectable random source for event scheduling, mark selection and chaos rolls.
//!
//! The session never touches ambient randomness. Given the same seed a
//! [`PcgRng`] replays the exact same schedule, which is what the tests and the
//! raid simulator rely on.

/// Random source consumed by the session.
pub trait RngSource {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Random value in `[min, max]` inclusive. Returns `min` when the range is empty.
    fn range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        let raw = if span > u64::from(u32::MAX) {
            (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
        } else {
            u64::from(self.next_u32())
        };
        min + raw % span
    }

    /// Random index into a collection of `len` items, or `None` when empty.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.next_u32() as usize % len)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Stateful: every draw advances the internal LCG.
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn seeded(seed: u64) -> Self {
        // Mix the seed once so small seeds (0, 1, 2..) diverge immediately.
        let mut hash = seed ^ 0x9e3779b97f4a7c15;
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(0xff51afd7ed558ccd);
        hash ^= hash >> 33;
        Self { state: hash }
    }

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

/// Scripted source that replays a fixed list of values, cycling when exhausted.
///
/// Useful when a test needs to force a specific event kind or break length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceRng {
    values: Vec<u32>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RngSource for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        let Some(value) = self.values.get(self.cursor % self.values.len().max(1)).copied() else {
            return 0;
        };
        self.cursor += 1;
        value
    }
}
