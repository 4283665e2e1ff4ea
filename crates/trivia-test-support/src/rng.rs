//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use trivia_core::rng::DeterministicRng;

/// An RNG that always returns `min`.
///
/// With the session's Fisher-Yates shuffle every swap partner is slot 0, so
/// a fresh permutation always comes out as `[1, 2, 3, 0]`; stored-question
/// picks always take the first candidate.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a predetermined sequence, clamped into
/// the requested range. Falls back to `min` once the sequence is exhausted.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// Number of values handed out so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.index
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(val) = self.values.get(self.index).copied() else {
            return min;
        };
        self.index += 1;
        val.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_rng_clamps_and_falls_back_to_min() {
        let mut rng = SequenceRng::new(vec![9, 1]);

        assert_eq!(rng.next_u32_range(0, 3), 3);
        assert_eq!(rng.next_u32_range(0, 3), 1);
        assert_eq!(rng.next_u32_range(2, 3), 2);
        assert_eq!(rng.consumed(), 2);
    }
}
