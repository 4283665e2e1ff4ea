//! Fields that may be assigned at most once.

use crate::error::ValidationError;

/// An optional value that can be set once and never overwritten.
///
/// Used for record identities, timestamps and classifiers such as a user's
/// name or a game's winner. Assigning a different value fails instead of
/// silently replacing the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOnce<T> {
    field: &'static str,
    value: Option<T>,
}

impl<T> WriteOnce<T> {
    /// Creates an unassigned field.
    #[must_use]
    pub const fn unset(field: &'static str) -> Self {
        Self { field, value: None }
    }

    /// Creates a field that is already assigned.
    #[must_use]
    pub const fn with_value(field: &'static str, value: T) -> Self {
        Self {
            field,
            value: Some(value),
        }
    }

    /// Creates a field from an optional stored value.
    #[must_use]
    pub fn restore(field: &'static str, value: Option<T>) -> Self {
        Self { field, value }
    }

    /// Returns the value, if assigned.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns whether a value has been assigned.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Name of the field, for error messages.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl<T: PartialEq> WriteOnce<T> {
    /// Assigns the value. Assigning the value already held is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::AlreadyAssigned` if a different value is
    /// already present.
    pub fn set(&mut self, value: T) -> Result<(), ValidationError> {
        match &self.value {
            Some(current) if *current == value => Ok(()),
            Some(_) => Err(ValidationError::AlreadyAssigned { field: self.field }),
            None => {
                self.value = Some(value);
                Ok(())
            }
        }
    }
}

impl<T: Copy> WriteOnce<T> {
    /// Returns a copy of the value, if assigned.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_assignment_fails_and_keeps_first_value() {
        let mut name = WriteOnce::unset("name");
        name.set("Ann".to_owned()).unwrap();

        let result = name.set("Bob".to_owned());

        assert_eq!(
            result,
            Err(ValidationError::AlreadyAssigned { field: "name" })
        );
        assert_eq!(name.get().map(String::as_str), Some("Ann"));
    }

    #[test]
    fn test_assigning_the_held_value_again_is_accepted() {
        let mut winner = WriteOnce::with_value("winner", 7_u32);

        winner.set(7).unwrap();

        assert_eq!(winner.value(), Some(7));
        assert_eq!(
            winner.set(8),
            Err(ValidationError::AlreadyAssigned { field: "winner" })
        );
    }

    #[test]
    fn test_restored_none_can_be_assigned_later() {
        let mut winner: WriteOnce<u32> = WriteOnce::restore("winner", None);
        assert!(!winner.is_set());

        winner.set(3).unwrap();

        assert_eq!(winner.value(), Some(3));
    }

    #[test]
    fn test_independent_owners_do_not_share_state() {
        let mut first: WriteOnce<u8> = WriteOnce::unset("id");
        let second: WriteOnce<u8> = WriteOnce::unset("id");

        first.set(1).unwrap();

        assert!(first.is_set());
        assert!(!second.is_set());
    }
}
