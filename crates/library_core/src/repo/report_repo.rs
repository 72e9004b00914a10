//! Read-only library reports: joins and grouped aggregations.
//!
//! # Responsibility
//! - Resolve member/book relations through SQL joins instead of caller-side
//!   "collect ids then filter" lookups.
//! - Provide grouped counts and averages over borrowings.
//!
//! # Invariants
//! - Member and book lists are distinct and deterministically ordered.
//! - Unknown titles or names yield empty results, never errors.
//! - Map-shaped reports only contain groups that have at least one row.

use crate::model::book::Book;
use crate::model::member::{Member, MemberId, MembershipType};
use crate::repo::book_repo::parse_book_row;
use crate::repo::member_repo::parse_member_row;
use crate::repo::{ensure_library_connection_ready, parse_count, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const MEMBER_COLUMNS: &str = "m.id AS id,
    m.name AS name,
    m.age AS age,
    m.membership_type AS membership_type,
    m.join_year AS join_year";

const BOOK_COLUMNS: &str = "b.id AS id,
    b.title AS title,
    b.author AS author,
    b.genre AS genre,
    b.year_published AS year_published";

/// Repository interface for cross-collection reports.
pub trait ReportRepository {
    /// Distinct members who borrowed any book with this exact title.
    fn members_by_book_title(&self, title: &str) -> RepoResult<Vec<Member>>;
    /// Members with `join_year < year`, ordered by `join_year, name`.
    fn members_joined_before(&self, year: i32) -> RepoResult<Vec<Member>>;
    /// Books whose distinct borrower count is at least `min_count`.
    fn books_with_min_borrowers(&self, min_count: u64) -> RepoResult<Vec<(Book, u64)>>;
    /// Distinct books borrowed by members with this exact name.
    fn books_borrowed_by_member_name(&self, name: &str) -> RepoResult<Vec<Book>>;
    /// Borrowing record count per member.
    fn total_borrowed_per_member(&self) -> RepoResult<BTreeMap<MemberId, u64>>;
    /// `AVG(1)` over borrowing records grouped by the borrower's tier.
    fn average_borrowed_per_membership_type(&self) -> RepoResult<BTreeMap<MembershipType, f64>>;
    /// Borrowings divided by distinct borrowing members, grouped by tier.
    fn average_borrowed_per_member_by_membership_type(
        &self,
    ) -> RepoResult<BTreeMap<MembershipType, f64>>;
    /// Members with strictly more than `n` borrowing records.
    fn members_with_more_than(&self, n: u64) -> RepoResult<Vec<(MemberId, u64)>>;
    /// Member count per tier.
    fn count_by_membership_type(&self) -> RepoResult<BTreeMap<MembershipType, u64>>;
}

/// SQLite-backed report repository.
pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_library_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_members(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn tier_averages(&self, sql: &str) -> RepoResult<BTreeMap<MembershipType, f64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut averages = BTreeMap::new();
        while let Some(row) = rows.next()? {
            averages.insert(parse_tier(row)?, row.get::<_, f64>("average")?);
        }
        Ok(averages)
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn members_by_book_title(&self, title: &str) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!(
                "SELECT DISTINCT {MEMBER_COLUMNS}
                 FROM members m
                 INNER JOIN borrowings br ON br.member_id = m.id
                 INNER JOIN books b ON b.id = br.book_id
                 WHERE b.title = ?1
                 ORDER BY m.name ASC, m.id ASC;"
            ),
            [title],
        )
    }

    fn members_joined_before(&self, year: i32) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!(
                "SELECT {MEMBER_COLUMNS}
                 FROM members m
                 WHERE m.join_year < ?1
                 ORDER BY m.join_year ASC, m.name ASC, m.id ASC;"
            ),
            [year],
        )
    }

    fn books_with_min_borrowers(&self, min_count: u64) -> RepoResult<Vec<(Book, u64)>> {
        let threshold = i64::try_from(min_count).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS},
                COUNT(DISTINCT br.member_id) AS borrowers
             FROM books b
             INNER JOIN borrowings br ON br.book_id = b.id
             GROUP BY b.id
             HAVING COUNT(DISTINCT br.member_id) >= ?1
             ORDER BY borrowers DESC, b.title ASC, b.id ASC;"
        ))?;
        let mut rows = stmt.query(params![threshold])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            let borrowers = parse_count(row.get("borrowers")?, "borrowers")?;
            books.push((parse_book_row(row)?, borrowers));
        }
        Ok(books)
    }

    fn books_borrowed_by_member_name(&self, name: &str) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT {BOOK_COLUMNS}
             FROM books b
             INNER JOIN borrowings br ON br.book_id = b.id
             INNER JOIN members m ON m.id = br.member_id
             WHERE m.name = ?1
             ORDER BY b.title ASC, b.id ASC;"
        ))?;
        let mut rows = stmt.query([name])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn total_borrowed_per_member(&self) -> RepoResult<BTreeMap<MemberId, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, COUNT(*) AS total
             FROM borrowings
             GROUP BY member_id;",
        )?;
        let mut rows = stmt.query([])?;
        let mut totals = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let member_text: String = row.get("member_id")?;
            totals.insert(
                parse_uuid(&member_text, "borrowings.member_id")?,
                parse_count(row.get("total")?, "total")?,
            );
        }
        Ok(totals)
    }

    fn average_borrowed_per_membership_type(&self) -> RepoResult<BTreeMap<MembershipType, f64>> {
        self.tier_averages(
            "SELECT m.membership_type AS membership_type, AVG(1) AS average
             FROM borrowings br
             INNER JOIN members m ON m.id = br.member_id
             GROUP BY m.membership_type;",
        )
    }

    fn average_borrowed_per_member_by_membership_type(
        &self,
    ) -> RepoResult<BTreeMap<MembershipType, f64>> {
        self.tier_averages(
            "SELECT
                m.membership_type AS membership_type,
                CAST(COUNT(*) AS REAL) / COUNT(DISTINCT br.member_id) AS average
             FROM borrowings br
             INNER JOIN members m ON m.id = br.member_id
             GROUP BY m.membership_type;",
        )
    }

    fn members_with_more_than(&self, n: u64) -> RepoResult<Vec<(MemberId, u64)>> {
        let threshold = i64::try_from(n).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT member_id, COUNT(*) AS total
             FROM borrowings
             GROUP BY member_id
             HAVING COUNT(*) > ?1
             ORDER BY total DESC, member_id ASC;",
        )?;
        let mut rows = stmt.query(params![threshold])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            let member_text: String = row.get("member_id")?;
            members.push((
                parse_uuid(&member_text, "borrowings.member_id")?,
                parse_count(row.get("total")?, "total")?,
            ));
        }
        Ok(members)
    }

    fn count_by_membership_type(&self) -> RepoResult<BTreeMap<MembershipType, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT membership_type, COUNT(*) AS total
             FROM members
             GROUP BY membership_type;",
        )?;
        let mut rows = stmt.query([])?;
        let mut counts = BTreeMap::new();
        while let Some(row) = rows.next()? {
            counts.insert(parse_tier(row)?, parse_count(row.get("total")?, "total")?);
        }
        Ok(counts)
    }
}

fn parse_tier(row: &Row<'_>) -> RepoResult<MembershipType> {
    let value: String = row.get("membership_type")?;
    value.parse::<MembershipType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid membership type `{value}` in members.membership_type"
        ))
    })
}
