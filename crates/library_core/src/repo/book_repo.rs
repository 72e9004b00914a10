//! Book repository contract and SQLite implementation.
//!
//! # Invariants
//! - `delete_book` removes the book and every borrowing referencing it in
//!   one immediate transaction, or changes nothing.

use crate::model::book::{Book, BookId, BookPatch};
use crate::repo::{ensure_library_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    genre,
    year_published
FROM books";

/// Repository interface for book records.
pub trait BookRepository {
    fn create_book(&self, book: &Book) -> RepoResult<BookId>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Returns the first book with an exact title match, ordered by id.
    fn find_book_by_title(&self, title: &str) -> RepoResult<Option<Book>>;
    /// Lists all books ordered by `title ASC, id ASC`.
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<()>;
    /// Deletes one book and its borrowings; returns the cascaded borrowing count.
    fn delete_book(&self, id: BookId) -> RepoResult<usize>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_library_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<BookId> {
        book.validate()?;

        self.conn.execute(
            "INSERT INTO books (
                id,
                title,
                author,
                genre,
                year_published
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                book.id.to_string(),
                book.title.as_str(),
                book.author.as_str(),
                book.genre.as_str(),
                book.year_published,
            ],
        )?;

        Ok(book.id)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }

    fn find_book_by_title(&self, title: &str) -> RepoResult<Option<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOK_SELECT_SQL} WHERE title = ?1 ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([title])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY title ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<()> {
        patch.validate()?;

        let changed = self.conn.execute(
            "UPDATE books
             SET
                title = COALESCE(?2, title),
                author = COALESCE(?3, author),
                genre = COALESCE(?4, genre),
                year_published = COALESCE(?5, year_published),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                patch.title.as_deref(),
                patch.author.as_deref(),
                patch.genre.as_deref(),
                patch.year_published,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::BookNotFound(id));
        }
        Ok(())
    }

    fn delete_book(&self, id: BookId) -> RepoResult<usize> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let cascaded = tx.execute(
            "DELETE FROM borrowings WHERE book_id = ?1;",
            [id_text.as_str()],
        )?;
        let removed = tx.execute("DELETE FROM books WHERE id = ?1;", [id_text.as_str()])?;
        if removed == 0 {
            return Err(RepoError::BookNotFound(id));
        }

        tx.commit()?;
        Ok(cascaded)
    }
}

pub(crate) fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id_text: String = row.get("id")?;
    let book = Book {
        id: parse_uuid(&id_text, "books.id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        genre: row.get("genre")?,
        year_published: row.get("year_published")?,
    };
    book.validate()?;
    Ok(book)
}
