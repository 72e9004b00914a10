//! Field-level validation errors shared by the domain model.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection reason for a value that cannot be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Member age below zero.
    NegativeAge(i64),
    /// Member age too large to store.
    AgeOutOfRange(i64),
    /// Required text field is empty after trimming.
    EmptyField(&'static str),
    /// Membership label outside `Gold|Silver|Bronze`.
    UnknownMembershipType(String),
    /// Return timestamp earlier than the borrow timestamp.
    ReturnBeforeBorrow { borrow_date: i64, return_date: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeAge(age) => write!(f, "age must be non-negative, got {age}"),
            Self::AgeOutOfRange(age) => write!(f, "age {age} is out of range"),
            Self::EmptyField(field) => write!(f, "`{field}` cannot be empty"),
            Self::UnknownMembershipType(value) => write!(
                f,
                "unknown membership type `{value}`; expected Gold|Silver|Bronze"
            ),
            Self::ReturnBeforeBorrow {
                borrow_date,
                return_date,
            } => write!(
                f,
                "return_date {return_date} is earlier than borrow_date {borrow_date}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Rejects empty or whitespace-only text for the named field.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Converts caller-supplied age into the stored non-negative form.
pub fn checked_age(age: i64) -> Result<u32, ValidationError> {
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    u32::try_from(age).map_err(|_| ValidationError::AgeOutOfRange(age))
}
