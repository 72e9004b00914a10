//! Sample library data set.
//!
//! Five members, three books and three open borrowings from May 2024:
//! Alice and Charlie borrowed "Modern Egypt", Bob borrowed "Python Basics".

use crate::model::book::BookId;
use crate::model::borrowing::BorrowingId;
use crate::model::member::MemberId;
use crate::repo::book_repo::BookRepository;
use crate::repo::borrowing_repo::BorrowingRepository;
use crate::repo::member_repo::MemberRepository;
use crate::repo::report_repo::ReportRepository;
use crate::repo::RepoResult;
use crate::service::library_service::LibraryService;
use log::info;

/// 2024-05-01T00:00:00Z
pub const ALICE_BORROW_DATE: i64 = 1_714_521_600_000;
/// 2024-05-05T00:00:00Z
pub const BOB_BORROW_DATE: i64 = 1_714_867_200_000;
/// 2024-05-07T00:00:00Z
pub const CHARLIE_BORROW_DATE: i64 = 1_715_040_000_000;

/// Ids of every seeded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLibrary {
    pub alice: MemberId,
    pub bob: MemberId,
    pub charlie: MemberId,
    pub diana: MemberId,
    pub evan: MemberId,
    pub modern_egypt: BookId,
    pub python_basics: BookId,
    pub deep_space: BookId,
    pub alice_modern_egypt: BorrowingId,
    pub bob_python_basics: BorrowingId,
    pub charlie_modern_egypt: BorrowingId,
}

/// Inserts the sample data set through the service write paths.
pub fn seed_sample_data<M, B, W, Q>(
    service: &LibraryService<M, B, W, Q>,
) -> RepoResult<SampleLibrary>
where
    M: MemberRepository,
    B: BookRepository,
    W: BorrowingRepository,
    Q: ReportRepository,
{
    let alice = service.add_member("Alice", 25, "Gold", 2020)?;
    let bob = service.add_member("Bob", 30, "Silver", 2019)?;
    let charlie = service.add_member("Charlie", 28, "Gold", 2021)?;
    let diana = service.add_member("Diana", 22, "Bronze", 2022)?;
    let evan = service.add_member("Evan", 35, "Silver", 2018)?;

    let modern_egypt = service.add_book("Modern Egypt", "John Doe", "History", 2005)?;
    let python_basics = service.add_book("Python Basics", "Jane Smith", "Programming", 2015)?;
    let deep_space = service.add_book("Deep Space", "Arthur King", "Science Fiction", 2010)?;

    let alice_modern_egypt = service.borrow_book(alice, modern_egypt, ALICE_BORROW_DATE)?;
    let bob_python_basics = service.borrow_book(bob, python_basics, BOB_BORROW_DATE)?;
    let charlie_modern_egypt = service.borrow_book(charlie, modern_egypt, CHARLIE_BORROW_DATE)?;

    info!("event=seed module=seed status=ok members=5 books=3 borrowings=3");

    Ok(SampleLibrary {
        alice,
        bob,
        charlie,
        diana,
        evan,
        modern_egypt,
        python_basics,
        deep_space,
        alice_modern_egypt,
        bob_python_basics,
        charlie_modern_egypt,
    })
}
