//! Book domain model.
//!
//! # Invariants
//! - `title` and `author` are never empty.
//! - `genre` is free text and may change over the book lifetime.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a catalogued book.
pub type BookId = Uuid;

/// Canonical book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year_published: i32,
}

impl Book {
    /// Creates a book with a generated stable ID.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        year_published: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            year_published,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)
    }
}

/// Partial book update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year_published: Option<i32>,
}

impl BookPatch {
    /// Patch that only changes `genre`.
    pub fn genre(genre: impl Into<String>) -> Self {
        Self {
            genre: Some(genre.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = self.title.as_deref() {
            require_text("title", title)?;
        }
        if let Some(author) = self.author.as_deref() {
            require_text("author", author)?;
        }
        Ok(())
    }
}
