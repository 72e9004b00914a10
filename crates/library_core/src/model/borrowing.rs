//! Borrowing domain model.
//!
//! # Responsibility
//! - Link one member to one book for a time interval.
//!
//! # Invariants
//! - `return_date`, when set, is not earlier than `borrow_date`.
//! - `return_date = None` means the book is still out.
//! - Referenced member/book are not owned; removal only happens by cascade.

use crate::model::book::BookId;
use crate::model::member::MemberId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one borrowing record.
pub type BorrowingId = Uuid;

/// Canonical borrowing record. Timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowing {
    pub id: BorrowingId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub borrow_date: i64,
    pub return_date: Option<i64>,
}

impl Borrowing {
    /// Creates an open borrowing with a generated stable ID.
    pub fn new(member_id: MemberId, book_id: BookId, borrow_date: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            book_id,
            borrow_date,
            return_date: None,
        }
    }

    /// Returns whether the book is still out.
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.return_date {
            Some(return_date) => check_return_date(self.borrow_date, return_date),
            None => Ok(()),
        }
    }
}

/// Rejects a return timestamp earlier than the borrow timestamp.
pub fn check_return_date(borrow_date: i64, return_date: i64) -> Result<(), ValidationError> {
    if return_date < borrow_date {
        return Err(ValidationError::ReturnBeforeBorrow {
            borrow_date,
            return_date,
        });
    }
    Ok(())
}
