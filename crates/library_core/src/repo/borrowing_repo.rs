//! Borrowing repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Record borrowings between existing members and books.
//! - Set return dates; borrowings are never deleted directly.
//!
//! # Invariants
//! - `create_borrowing` checks both references inside the insert transaction.
//! - `set_return_date` never stores a return earlier than the borrow.

use crate::model::book::BookId;
use crate::model::borrowing::{check_return_date, Borrowing, BorrowingId};
use crate::model::member::MemberId;
use crate::repo::{
    book_exists, ensure_library_connection_ready, member_exists, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const BORROWING_SELECT_SQL: &str = "SELECT
    id,
    member_id,
    book_id,
    borrow_date,
    return_date
FROM borrowings";

/// Repository interface for borrowing records.
pub trait BorrowingRepository {
    /// Inserts one borrowing after checking its member and book exist.
    fn create_borrowing(&self, borrowing: &Borrowing) -> RepoResult<BorrowingId>;
    fn get_borrowing(&self, id: BorrowingId) -> RepoResult<Option<Borrowing>>;
    /// Sets the return date of one borrowing.
    fn set_return_date(&self, id: BorrowingId, return_date: i64) -> RepoResult<()>;
    /// Returns the earliest open borrowing for the member/book pair.
    fn find_open_borrowing(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> RepoResult<Option<Borrowing>>;
    /// Lists borrowings of one member ordered by `borrow_date ASC, id ASC`.
    fn list_borrowings_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Borrowing>>;
    /// Lists borrowings of one book ordered by `borrow_date ASC, id ASC`.
    fn list_borrowings_for_book(&self, book_id: BookId) -> RepoResult<Vec<Borrowing>>;
    /// Lists borrowings with no return date.
    fn list_open_borrowings(&self) -> RepoResult<Vec<Borrowing>>;
}

/// SQLite-backed borrowing repository.
pub struct SqliteBorrowingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBorrowingRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_library_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn list_where(&self, filter: &str, bind: Option<String>) -> RepoResult<Vec<Borrowing>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BORROWING_SELECT_SQL} WHERE {filter} ORDER BY borrow_date ASC, id ASC;"
        ))?;
        let mut rows = match bind {
            Some(value) => stmt.query([value])?,
            None => stmt.query([])?,
        };
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_borrowing_row(row)?);
        }
        Ok(items)
    }
}

impl BorrowingRepository for SqliteBorrowingRepository<'_> {
    fn create_borrowing(&self, borrowing: &Borrowing) -> RepoResult<BorrowingId> {
        borrowing.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !member_exists(&tx, borrowing.member_id)? {
            return Err(RepoError::MemberNotFound(borrowing.member_id));
        }
        if !book_exists(&tx, borrowing.book_id)? {
            return Err(RepoError::BookNotFound(borrowing.book_id));
        }

        tx.execute(
            "INSERT INTO borrowings (
                id,
                member_id,
                book_id,
                borrow_date,
                return_date
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                borrowing.id.to_string(),
                borrowing.member_id.to_string(),
                borrowing.book_id.to_string(),
                borrowing.borrow_date,
                borrowing.return_date,
            ],
        )?;
        tx.commit()?;

        Ok(borrowing.id)
    }

    fn get_borrowing(&self, id: BorrowingId) -> RepoResult<Option<Borrowing>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BORROWING_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_borrowing_row(row)?));
        }
        Ok(None)
    }

    fn set_return_date(&self, id: BorrowingId, return_date: i64) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let borrow_date: i64 = tx
            .query_row(
                "SELECT borrow_date FROM borrowings WHERE id = ?1;",
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(RepoError::BorrowingNotFound(id))?;
        check_return_date(borrow_date, return_date)?;

        tx.execute(
            "UPDATE borrowings SET return_date = ?2 WHERE id = ?1;",
            params![id_text, return_date],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn find_open_borrowing(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> RepoResult<Option<Borrowing>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BORROWING_SELECT_SQL}
             WHERE member_id = ?1
               AND book_id = ?2
               AND return_date IS NULL
             ORDER BY borrow_date ASC, id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([member_id.to_string(), book_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_borrowing_row(row)?));
        }
        Ok(None)
    }

    fn list_borrowings_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Borrowing>> {
        self.list_where("member_id = ?1", Some(member_id.to_string()))
    }

    fn list_borrowings_for_book(&self, book_id: BookId) -> RepoResult<Vec<Borrowing>> {
        self.list_where("book_id = ?1", Some(book_id.to_string()))
    }

    fn list_open_borrowings(&self) -> RepoResult<Vec<Borrowing>> {
        self.list_where("return_date IS NULL", None)
    }
}

fn parse_borrowing_row(row: &Row<'_>) -> RepoResult<Borrowing> {
    let id_text: String = row.get("id")?;
    let member_text: String = row.get("member_id")?;
    let book_text: String = row.get("book_id")?;

    let borrowing = Borrowing {
        id: parse_uuid(&id_text, "borrowings.id")?,
        member_id: parse_uuid(&member_text, "borrowings.member_id")?,
        book_id: parse_uuid(&book_text, "borrowings.book_id")?,
        borrow_date: row.get("borrow_date")?,
        return_date: row.get("return_date")?,
    };
    borrowing.validate()?;
    Ok(borrowing)
}
