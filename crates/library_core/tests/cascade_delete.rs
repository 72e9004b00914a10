use library_core::db::open_db_in_memory;
use library_core::{seed_sample_data, RepoError, SqliteLibraryService};
use rusqlite::Connection;
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn delete_member_removes_exactly_their_borrowings() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    service
        .borrow_book(sample.alice, sample.python_basics, 1_715_000_000_000)
        .unwrap();

    let before = borrowing_ids(&conn);
    let alice_ids: HashSet<String> = service
        .list_borrowings_for_member(sample.alice)
        .unwrap()
        .into_iter()
        .map(|borrowing| borrowing.id.to_string())
        .collect();
    assert_eq!(alice_ids.len(), 2);

    let cascaded = service.delete_member(sample.alice).unwrap();

    assert_eq!(cascaded, 2);
    assert!(service.get_member(sample.alice).unwrap().is_none());
    let after = borrowing_ids(&conn);
    let expected: HashSet<String> = before.difference(&alice_ids).cloned().collect();
    assert_eq!(after, expected);
}

#[test]
fn delete_book_removes_exactly_its_borrowings() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let cascaded = service.delete_book(sample.modern_egypt).unwrap();

    assert_eq!(cascaded, 2);
    assert!(service.get_book(sample.modern_egypt).unwrap().is_none());
    assert_eq!(
        borrowing_ids(&conn),
        HashSet::from([sample.bob_python_basics.to_string()])
    );
    assert!(service.get_member(sample.alice).unwrap().is_some());
}

#[test]
fn delete_member_without_borrowings_cascades_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    assert_eq!(service.delete_member(sample.evan).unwrap(), 0);
    assert_eq!(borrowing_ids(&conn).len(), 3);
    assert!(service.find_member_by_name("Evan").unwrap().is_none());
}

#[test]
fn delete_unknown_member_or_book_returns_not_found_and_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    seed_sample_data(&service).unwrap();

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.delete_member(missing),
        Err(RepoError::MemberNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.delete_book(missing),
        Err(RepoError::BookNotFound(id)) if id == missing
    ));
    assert_eq!(borrowing_ids(&conn).len(), 3);
    assert_eq!(service.list_members().unwrap().len(), 5);
}

#[test]
fn failed_cascade_rolls_back_dependent_deletes() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_member_delete
         BEFORE DELETE ON members
         BEGIN
             SELECT RAISE(ABORT, 'member delete blocked');
         END;",
    )
    .unwrap();

    let err = service.delete_member(sample.alice).unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert!(service.get_member(sample.alice).unwrap().is_some());
    assert_eq!(
        service
            .list_borrowings_for_member(sample.alice)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(borrowing_ids(&conn).len(), 3);
}

#[test]
fn direct_parent_delete_is_rejected_as_integrity_error() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let raw = conn
        .execute(
            "DELETE FROM members WHERE id = ?1;",
            [sample.charlie.to_string()],
        )
        .unwrap_err();
    let err = RepoError::from(raw);

    assert!(matches!(err, RepoError::Integrity(_)));
    assert!(service.get_member(sample.charlie).unwrap().is_some());
}

#[test]
fn orphan_borrowing_insert_is_rejected_by_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let raw = conn
        .execute(
            "INSERT INTO borrowings (id, member_id, book_id, borrow_date)
             VALUES (?1, ?2, ?3, 0);",
            [
                Uuid::new_v4().to_string(),
                Uuid::new_v4().to_string(),
                sample.deep_space.to_string(),
            ],
        )
        .unwrap_err();

    assert!(matches!(RepoError::from(raw), RepoError::Integrity(_)));
}

fn borrowing_ids(conn: &Connection) -> HashSet<String> {
    let mut stmt = conn.prepare("SELECT id FROM borrowings;").unwrap();
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap();
    let ids = rows.map(Result::unwrap).collect();
    ids
}
