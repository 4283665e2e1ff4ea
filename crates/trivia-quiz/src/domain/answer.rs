//! Answer slots and the per-question answer permutation.

use std::fmt;

use serde::Serialize;
use trivia_core::error::ValidationError;
use trivia_core::rng::DeterministicRng;

/// Number of answer options shown for every question.
pub const ANSWER_SLOTS: usize = 4;

/// One of the four display positions a participant can pick (`A`..`D`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "char")]
pub struct AnswerSlot(u8);

impl AnswerSlot {
    /// Parses a choice letter, case-insensitively.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Self(0)),
            'B' => Some(Self(1)),
            'C' => Some(Self(2)),
            'D' => Some(Self(3)),
            _ => None,
        }
    }

    /// Parses a choice string such as `"b"`. Anything but a single letter
    /// `A`..`D` is rejected.
    #[must_use]
    pub fn parse(choice: &str) -> Option<Self> {
        let mut chars = choice.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter),
            _ => None,
        }
    }

    /// The display letter of this slot.
    #[must_use]
    pub fn letter(self) -> char {
        char::from(b'A' + self.0)
    }

    /// Zero-based position.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<usize> for AnswerSlot {
    type Error = ValidationError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u8::try_from(index)
            .ok()
            .filter(|i| usize::from(*i) < ANSWER_SLOTS)
            .map(Self)
            .ok_or(ValidationError::IndexOutOfRange {
                index,
                len: ANSWER_SLOTS,
            })
    }
}

impl From<AnswerSlot> for char {
    fn from(slot: AnswerSlot) -> Self {
        slot.letter()
    }
}

impl fmt::Display for AnswerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Maps display slots to answers for the current question.
///
/// Entry `i` is the answer shown in slot `i`: `0` is the correct answer and
/// `1..=3` index the incorrect ones. Correctness is always decided through
/// this mapping, never by comparing answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerPermutation([u8; ANSWER_SLOTS]);

impl AnswerPermutation {
    /// The unshuffled permutation: the correct answer sits in slot `A`.
    #[must_use]
    pub const fn identity() -> Self {
        Self([0, 1, 2, 3])
    }

    /// Validates an explicit mapping.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPermutation` unless `values` holds
    /// each of `0..4` exactly once.
    pub fn new(values: [u8; ANSWER_SLOTS]) -> Result<Self, ValidationError> {
        let mut seen = [false; ANSWER_SLOTS];
        for value in values {
            match seen.get_mut(usize::from(value)) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(ValidationError::InvalidPermutation(values.to_vec())),
            }
        }
        Ok(Self(values))
    }

    /// Draws a uniformly random permutation (Fisher-Yates).
    pub fn shuffled(rng: &mut dyn DeterministicRng) -> Self {
        let mut values = Self::identity().0;
        for i in (1..ANSWER_SLOTS).rev() {
            let bound = u32::try_from(i).unwrap_or(u32::MAX);
            let j = rng.next_u32_range(0, bound) as usize;
            values.swap(i, j);
        }
        Self(values)
    }

    /// The slot showing the correct answer.
    #[must_use]
    pub fn correct_slot(self) -> AnswerSlot {
        let position = self.0.iter().position(|v| *v == 0).unwrap_or_default();
        AnswerSlot(u8::try_from(position).unwrap_or_default())
    }

    /// Whether picking `slot` answers correctly.
    #[must_use]
    pub fn is_correct(self, slot: AnswerSlot) -> bool {
        self.0[slot.index()] == 0
    }

    /// The answer index shown in `slot`.
    #[must_use]
    pub fn answer_at(self, slot: AnswerSlot) -> usize {
        usize::from(self.0[slot.index()])
    }

    /// The raw mapping.
    #[must_use]
    pub fn as_array(self) -> [u8; ANSWER_SLOTS] {
        self.0
    }
}

impl Default for AnswerPermutation {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use trivia_test_support::{MockRng, SequenceRng};

    use super::*;

    #[test]
    fn test_letters_map_to_slots() {
        assert_eq!(AnswerSlot::from_letter('A').map(AnswerSlot::index), Some(0));
        assert_eq!(AnswerSlot::from_letter('d').map(AnswerSlot::index), Some(3));
        assert_eq!(AnswerSlot::from_letter('E'), None);
        assert_eq!(AnswerSlot::parse(" c ").map(AnswerSlot::letter), Some('C'));
        assert_eq!(AnswerSlot::parse("AB"), None);
        assert_eq!(AnswerSlot::parse(""), None);
    }

    #[test]
    fn test_slot_from_index_rejects_out_of_range() {
        assert_eq!(AnswerSlot::try_from(2).map(AnswerSlot::letter), Ok('C'));
        assert_eq!(
            AnswerSlot::try_from(4),
            Err(ValidationError::IndexOutOfRange { index: 4, len: 4 })
        );
    }

    #[test]
    fn test_new_rejects_non_permutations() {
        assert!(AnswerPermutation::new([3, 1, 0, 2]).is_ok());
        assert_eq!(
            AnswerPermutation::new([0, 0, 1, 2]),
            Err(ValidationError::InvalidPermutation(vec![0, 0, 1, 2]))
        );
        assert!(AnswerPermutation::new([0, 1, 2, 4]).is_err());
    }

    #[test]
    fn test_shuffle_with_scripted_rng() {
        // Arrange
        let mut rng = SequenceRng::new(vec![1, 1, 0]);

        // Act
        let permutation = AnswerPermutation::shuffled(&mut rng);

        // Assert
        assert_eq!(permutation.as_array(), [2, 0, 3, 1]);
        assert_eq!(permutation.correct_slot().letter(), 'B');
        assert!(permutation.is_correct(AnswerSlot::try_from(1).unwrap()));
        assert!(!permutation.is_correct(AnswerSlot::try_from(0).unwrap()));
    }

    #[test]
    fn test_shuffle_with_mock_rng_puts_correct_answer_last() {
        let permutation = AnswerPermutation::shuffled(&mut MockRng);

        assert_eq!(permutation.as_array(), [1, 2, 3, 0]);
        assert_eq!(permutation.correct_slot().letter(), 'D');
    }
}
