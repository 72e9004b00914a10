//! Library domain model: members, books and the borrowings linking them.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a stable v4 UUID that is never reused.
//! - A `Borrowing` never owns its member or book; it only references them.
//! - `membership_type` is a closed enumeration.

pub mod book;
pub mod borrowing;
pub mod member;
pub mod validation;
