//! Repository layer for the library collections.
//!
//! # Responsibility
//! - Define data access contracts per collection plus read-only reports.
//! - Keep SQL details inside the persistence boundary.
//! - Own referential integrity: cascades and existence checks run inside
//!   one immediate transaction per operation.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - No borrowing outlives its member or book.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::book::BookId;
use crate::model::borrowing::BorrowingId;
use crate::model::member::MemberId;
use crate::model::validation::ValidationError;
use rusqlite::{Connection, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod book_repo;
pub mod borrowing_repo;
pub mod member_repo;
pub mod report_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy shared by all library repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Input failed field-level validation.
    Validation(ValidationError),
    MemberNotFound(MemberId),
    BookNotFound(BookId),
    BorrowingNotFound(BorrowingId),
    /// No open borrowing exists for the member/book pair.
    NoOpenBorrowing { member_id: MemberId, book_id: BookId },
    /// Storage rejected a write that would leave a dangling reference.
    Integrity(String),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether the error reports an unknown entity id.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MemberNotFound(_)
                | Self::BookNotFound(_)
                | Self::BorrowingNotFound(_)
                | Self::NoOpenBorrowing { .. }
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::BorrowingNotFound(id) => write!(f, "borrowing not found: {id}"),
            Self::NoOpenBorrowing { member_id, book_id } => write!(
                f,
                "no open borrowing for member {member_id} and book {book_id}"
            ),
            Self::Integrity(message) => write!(f, "referential integrity violation: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted library data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "library repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "library repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "library repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if is_foreign_key_violation(&value) {
            return Self::Integrity(value.to_string());
        }
        Self::Db(DbError::Sqlite(value))
    }
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Tables and columns every library repository relies on.
const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("members", &["id", "name", "age", "membership_type", "join_year"]),
    ("books", &["id", "title", "author", "genre", "year_published"]),
    (
        "borrowings",
        &["id", "member_id", "book_id", "borrow_date", "return_date"],
    ),
];

/// Rejects connections that were not opened through `db::open_db*`.
pub(crate) fn ensure_library_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

/// Converts a SQL `COUNT(...)` value into an unsigned count.
pub(crate) fn parse_count(value: i64, column: &'static str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` in {column}")))
}

pub(crate) fn member_exists(tx: &Transaction<'_>, id: MemberId) -> RepoResult<bool> {
    row_exists(tx, "SELECT EXISTS(SELECT 1 FROM members WHERE id = ?1);", id)
}

pub(crate) fn book_exists(tx: &Transaction<'_>, id: BookId) -> RepoResult<bool> {
    row_exists(tx, "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1);", id)
}

fn row_exists(tx: &Transaction<'_>, sql: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(sql, [id.to_string()], |row| row.get(0))?;
    Ok(exists == 1)
}
