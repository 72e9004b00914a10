use library_core::db::open_db_in_memory;
use library_core::seed::{ALICE_BORROW_DATE, BOB_BORROW_DATE};
use library_core::{now_epoch_ms, seed_sample_data, RepoError, SqliteLibraryService, ValidationError};
use uuid::Uuid;

#[test]
fn borrow_book_requires_existing_member_and_book() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    let missing = Uuid::new_v4();

    let member_err = service
        .borrow_book(missing, sample.deep_space, 0)
        .unwrap_err();
    assert!(matches!(member_err, RepoError::MemberNotFound(id) if id == missing));

    let book_err = service.borrow_book(sample.diana, missing, 0).unwrap_err();
    assert!(matches!(book_err, RepoError::BookNotFound(id) if id == missing));

    assert_eq!(service.list_open_borrowings().unwrap().len(), 3);
}

#[test]
fn borrow_then_return_sets_return_date() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let borrowed = service.get_borrowing(sample.alice_modern_egypt).unwrap().unwrap();
    assert_eq!(borrowed.member_id, sample.alice);
    assert_eq!(borrowed.book_id, sample.modern_egypt);
    assert_eq!(borrowed.borrow_date, ALICE_BORROW_DATE);
    assert!(borrowed.is_open());

    let returned_at = ALICE_BORROW_DATE + 86_400_000;
    service
        .return_book(sample.alice_modern_egypt, returned_at)
        .unwrap();

    let loaded = service.get_borrowing(sample.alice_modern_egypt).unwrap().unwrap();
    assert_eq!(loaded.return_date, Some(returned_at));
    assert_eq!(service.list_open_borrowings().unwrap().len(), 2);
}

#[test]
fn return_before_borrow_date_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let err = service
        .return_book(sample.bob_python_basics, BOB_BORROW_DATE - 1)
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::ReturnBeforeBorrow {
            borrow_date: BOB_BORROW_DATE,
            return_date,
        }) if return_date == BOB_BORROW_DATE - 1
    ));
    let loaded = service.get_borrowing(sample.bob_python_basics).unwrap().unwrap();
    assert!(loaded.is_open());
}

#[test]
fn return_unknown_borrowing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = service.return_book(missing, 0).unwrap_err();
    assert!(matches!(err, RepoError::BorrowingNotFound(id) if id == missing));
}

#[test]
fn return_by_pair_closes_the_open_borrowing() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let closed = service
        .return_book_by_pair(sample.alice, sample.modern_egypt, now_epoch_ms())
        .unwrap();
    assert_eq!(closed, sample.alice_modern_egypt);

    let err = service
        .return_book_by_pair(sample.alice, sample.modern_egypt, now_epoch_ms())
        .unwrap_err();
    assert!(matches!(err, RepoError::NoOpenBorrowing { .. }));
    assert!(err.is_not_found());
}

#[test]
fn borrow_book_now_stamps_current_time() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let before = now_epoch_ms();
    let id = service
        .borrow_book_now(sample.diana, sample.modern_egypt)
        .unwrap();
    let after = now_epoch_ms();

    let borrowing = service.get_borrowing(id).unwrap().unwrap();
    assert!(borrowing.borrow_date >= before && borrowing.borrow_date <= after);
    assert_eq!(
        service
            .list_borrowings_for_book(sample.modern_egypt)
            .unwrap()
            .len(),
        3
    );
}
