//! Library use-case service.
//!
//! # Responsibility
//! - Expose the member/book/borrowing use-case API over repository contracts.
//! - Parse and validate raw caller input before it reaches persistence.
//! - Emit metadata-only `event=... module=service` log lines for mutations.
//!
//! # Invariants
//! - The service never bypasses repository validation or cascade logic.
//! - Log lines carry ids and counts only, never member names or titles.

use crate::model::book::{Book, BookId, BookPatch};
use crate::model::borrowing::{Borrowing, BorrowingId};
use crate::model::member::{Member, MemberId, MemberPatch, MembershipType};
use crate::model::validation::checked_age;
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::borrowing_repo::{BorrowingRepository, SqliteBorrowingRepository};
use crate::repo::member_repo::{MemberRepository, SqliteMemberRepository};
use crate::repo::report_repo::{ReportRepository, SqliteReportRepository};
use crate::repo::{RepoError, RepoResult};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Use-case façade over the four library repositories.
pub struct LibraryService<M, B, W, Q> {
    members: M,
    books: B,
    borrowings: W,
    reports: Q,
}

/// Library service wired to SQLite repositories sharing one connection.
pub type SqliteLibraryService<'conn> = LibraryService<
    SqliteMemberRepository<'conn>,
    SqliteBookRepository<'conn>,
    SqliteBorrowingRepository<'conn>,
    SqliteReportRepository<'conn>,
>;

impl<'conn> SqliteLibraryService<'conn> {
    /// Builds the SQLite-backed service from a migrated connection.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteMemberRepository::try_new(conn)?,
            SqliteBookRepository::try_new(conn)?,
            SqliteBorrowingRepository::try_new(conn)?,
            SqliteReportRepository::try_new(conn)?,
        ))
    }
}

impl<M, B, W, Q> LibraryService<M, B, W, Q>
where
    M: MemberRepository,
    B: BookRepository,
    W: BorrowingRepository,
    Q: ReportRepository,
{
    /// Creates a service using the provided repository implementations.
    pub fn new(members: M, books: B, borrowings: W, reports: Q) -> Self {
        Self {
            members,
            books,
            borrowings,
            reports,
        }
    }

    /// Registers a new member.
    ///
    /// # Errors
    /// - `Validation` when `age < 0`, the name is blank, or
    ///   `membership_type` is not `Gold|Silver|Bronze`.
    pub fn add_member(
        &self,
        name: &str,
        age: i64,
        membership_type: &str,
        join_year: i32,
    ) -> RepoResult<MemberId> {
        let age = checked_age(age)?;
        let membership_type = membership_type.parse::<MembershipType>()?;
        let member = Member::new(name, age, membership_type, join_year);
        let id = self.members.create_member(&member)?;
        debug!("event=member_add module=service status=ok member_id={id} membership_type={membership_type}");
        Ok(id)
    }

    pub fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.members.get_member(id)
    }

    pub fn find_member_by_name(&self, name: &str) -> RepoResult<Option<Member>> {
        self.members.find_member_by_name(name)
    }

    pub fn list_members(&self) -> RepoResult<Vec<Member>> {
        self.members.list_members()
    }

    /// Applies a partial update; repeating the same patch is a no-op.
    pub fn update_member(&self, id: MemberId, patch: &MemberPatch) -> RepoResult<()> {
        self.members.update_member(id, patch)?;
        debug!("event=member_update module=service status=ok member_id={id}");
        Ok(())
    }

    /// Deletes a member together with all of its borrowings.
    ///
    /// Returns the number of cascaded borrowings.
    pub fn delete_member(&self, id: MemberId) -> RepoResult<usize> {
        match self.members.delete_member(id) {
            Ok(cascaded) => {
                info!(
                    "event=member_delete module=service status=ok member_id={id} cascaded_borrowings={cascaded}"
                );
                Ok(cascaded)
            }
            Err(err) => {
                warn!("event=member_delete module=service status=error member_id={id} error={err}");
                Err(err)
            }
        }
    }

    /// Catalogues a new book.
    pub fn add_book(
        &self,
        title: &str,
        author: &str,
        genre: &str,
        year_published: i32,
    ) -> RepoResult<BookId> {
        let book = Book::new(title, author, genre, year_published);
        let id = self.books.create_book(&book)?;
        debug!("event=book_add module=service status=ok book_id={id}");
        Ok(id)
    }

    pub fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.books.get_book(id)
    }

    pub fn find_book_by_title(&self, title: &str) -> RepoResult<Option<Book>> {
        self.books.find_book_by_title(title)
    }

    pub fn list_books(&self) -> RepoResult<Vec<Book>> {
        self.books.list_books()
    }

    pub fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<()> {
        self.books.update_book(id, patch)?;
        debug!("event=book_update module=service status=ok book_id={id}");
        Ok(())
    }

    /// Deletes a book together with all of its borrowings.
    pub fn delete_book(&self, id: BookId) -> RepoResult<usize> {
        match self.books.delete_book(id) {
            Ok(cascaded) => {
                info!(
                    "event=book_delete module=service status=ok book_id={id} cascaded_borrowings={cascaded}"
                );
                Ok(cascaded)
            }
            Err(err) => {
                warn!("event=book_delete module=service status=error book_id={id} error={err}");
                Err(err)
            }
        }
    }

    /// Records that a member borrowed a book at `borrow_date` (epoch ms).
    ///
    /// # Errors
    /// - `MemberNotFound` / `BookNotFound` when either reference is unknown.
    pub fn borrow_book(
        &self,
        member_id: MemberId,
        book_id: BookId,
        borrow_date: i64,
    ) -> RepoResult<BorrowingId> {
        let borrowing = Borrowing::new(member_id, book_id, borrow_date);
        let id = self.borrowings.create_borrowing(&borrowing)?;
        info!(
            "event=book_borrow module=service status=ok borrowing_id={id} member_id={member_id} book_id={book_id}"
        );
        Ok(id)
    }

    /// Same as `borrow_book`, stamped with the current wall clock.
    pub fn borrow_book_now(&self, member_id: MemberId, book_id: BookId) -> RepoResult<BorrowingId> {
        self.borrow_book(member_id, book_id, now_epoch_ms())
    }

    /// Closes a borrowing.
    ///
    /// # Errors
    /// - `BorrowingNotFound` when the id is unknown.
    /// - `Validation` when `return_date` is earlier than the borrow date.
    pub fn return_book(&self, borrowing_id: BorrowingId, return_date: i64) -> RepoResult<()> {
        self.borrowings.set_return_date(borrowing_id, return_date)?;
        info!("event=book_return module=service status=ok borrowing_id={borrowing_id}");
        Ok(())
    }

    /// Closes the open borrowing of `book_id` by `member_id`.
    ///
    /// Returns the closed borrowing id, or `NoOpenBorrowing` when the pair has
    /// nothing outstanding.
    pub fn return_book_by_pair(
        &self,
        member_id: MemberId,
        book_id: BookId,
        return_date: i64,
    ) -> RepoResult<BorrowingId> {
        let open = self
            .borrowings
            .find_open_borrowing(member_id, book_id)?
            .ok_or(RepoError::NoOpenBorrowing { member_id, book_id })?;
        self.return_book(open.id, return_date)?;
        Ok(open.id)
    }

    pub fn get_borrowing(&self, id: BorrowingId) -> RepoResult<Option<Borrowing>> {
        self.borrowings.get_borrowing(id)
    }

    pub fn list_borrowings_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Borrowing>> {
        self.borrowings.list_borrowings_for_member(member_id)
    }

    pub fn list_borrowings_for_book(&self, book_id: BookId) -> RepoResult<Vec<Borrowing>> {
        self.borrowings.list_borrowings_for_book(book_id)
    }

    pub fn list_open_borrowings(&self) -> RepoResult<Vec<Borrowing>> {
        self.borrowings.list_open_borrowings()
    }

    /// Distinct members who borrowed the titled book. Unknown title → empty.
    pub fn find_members_by_book(&self, title: &str) -> RepoResult<Vec<Member>> {
        self.reports.members_by_book_title(title)
    }

    pub fn find_members_joined_before(&self, year: i32) -> RepoResult<Vec<Member>> {
        self.reports.members_joined_before(year)
    }

    /// Books paired with their distinct borrower count, filtered by `>= min_count`.
    pub fn find_books_with_min_borrowers(&self, min_count: u64) -> RepoResult<Vec<(Book, u64)>> {
        self.reports.books_with_min_borrowers(min_count)
    }

    pub fn find_books_borrowed_by_member(&self, name: &str) -> RepoResult<Vec<Book>> {
        self.reports.books_borrowed_by_member_name(name)
    }

    pub fn total_borrowed_per_member(&self) -> RepoResult<BTreeMap<MemberId, u64>> {
        self.reports.total_borrowed_per_member()
    }

    /// Average over borrowing *records* per tier.
    ///
    /// Every borrowing contributes `1` to its tier, so any tier with at least
    /// one borrowing reports `1.0`. Use
    /// [`Self::average_borrowed_per_member_by_membership_type`] for the
    /// per-member figure.
    pub fn average_borrowed_per_membership_type(
        &self,
    ) -> RepoResult<BTreeMap<MembershipType, f64>> {
        self.reports.average_borrowed_per_membership_type()
    }

    /// Borrowings per distinct borrowing member, per tier.
    pub fn average_borrowed_per_member_by_membership_type(
        &self,
    ) -> RepoResult<BTreeMap<MembershipType, f64>> {
        self.reports.average_borrowed_per_member_by_membership_type()
    }

    /// Members with strictly more than `n` borrowings, paired with their count.
    pub fn members_with_more_than(&self, n: u64) -> RepoResult<Vec<(MemberId, u64)>> {
        self.reports.members_with_more_than(n)
    }

    pub fn count_by_membership_type(&self) -> RepoResult<BTreeMap<MembershipType, u64>> {
        self.reports.count_by_membership_type()
    }
}

/// Current wall clock in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

