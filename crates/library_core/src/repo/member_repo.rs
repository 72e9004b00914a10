//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `members` table.
//! - Own the member delete cascade onto `borrowings`.
//!
//! # Invariants
//! - `delete_member` removes the member and every borrowing referencing it
//!   in one immediate transaction, or changes nothing.
//! - `update_member` only touches the fields present in the patch.

use crate::model::member::{Member, MemberId, MemberPatch, MembershipType};
use crate::repo::{ensure_library_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const MEMBER_SELECT_SQL: &str = "SELECT
    id,
    name,
    age,
    membership_type,
    join_year
FROM members";

/// Repository interface for member records.
pub trait MemberRepository {
    /// Inserts one member and returns its stable id.
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Returns the first member with an exact name match, ordered by id.
    fn find_member_by_name(&self, name: &str) -> RepoResult<Option<Member>>;
    /// Lists all members ordered by `name ASC, id ASC`.
    fn list_members(&self) -> RepoResult<Vec<Member>>;
    /// Applies a partial update.
    fn update_member(&self, id: MemberId, patch: &MemberPatch) -> RepoResult<()>;
    /// Deletes one member and its borrowings; returns the cascaded borrowing count.
    fn delete_member(&self, id: MemberId) -> RepoResult<usize>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_library_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        member.validate()?;

        self.conn.execute(
            "INSERT INTO members (
                id,
                name,
                age,
                membership_type,
                join_year
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                member.id.to_string(),
                member.name.as_str(),
                i64::from(member.age),
                member.membership_type.as_str(),
                member.join_year,
            ],
        )?;

        Ok(member.id)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn find_member_by_name(&self, name: &str) -> RepoResult<Option<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members(&self) -> RepoResult<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn update_member(&self, id: MemberId, patch: &MemberPatch) -> RepoResult<()> {
        patch.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                name = COALESCE(?2, name),
                age = COALESCE(?3, age),
                membership_type = COALESCE(?4, membership_type),
                join_year = COALESCE(?5, join_year),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                patch.name.as_deref(),
                patch.age.map(i64::from),
                patch.membership_type.map(MembershipType::as_str),
                patch.join_year,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }
        Ok(())
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<usize> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let cascaded = tx.execute(
            "DELETE FROM borrowings WHERE member_id = ?1;",
            [id_text.as_str()],
        )?;
        let removed = tx.execute("DELETE FROM members WHERE id = ?1;", [id_text.as_str()])?;
        if removed == 0 {
            // Dropping `tx` rolls back.
            return Err(RepoError::MemberNotFound(id));
        }

        tx.commit()?;
        Ok(cascaded)
    }
}

/// Parses one row selected with `MEMBER_SELECT_SQL` column names.
pub(crate) fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "members.id")?;

    let age_value: i64 = row.get("age")?;
    let age = u32::try_from(age_value).map_err(|_| {
        RepoError::InvalidData(format!("invalid age `{age_value}` in members.age"))
    })?;

    let type_text: String = row.get("membership_type")?;
    let membership_type = type_text.parse::<MembershipType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid membership type `{type_text}` in members.membership_type"
        ))
    })?;

    let member = Member {
        id,
        name: row.get("name")?,
        age,
        membership_type,
        join_year: row.get("join_year")?,
    };
    member.validate()?;
    Ok(member)
}
