//! Core domain logic for the library records store.
//! Members, books and borrowings with referential integrity owned here,
//! not by callers.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::LibraryConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{Book, BookId, BookPatch};
pub use model::borrowing::{Borrowing, BorrowingId};
pub use model::member::{Member, MemberId, MemberPatch, MembershipType};
pub use model::validation::ValidationError;
pub use repo::book_repo::{BookRepository, SqliteBookRepository};
pub use repo::borrowing_repo::{BorrowingRepository, SqliteBorrowingRepository};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::report_repo::{ReportRepository, SqliteReportRepository};
pub use repo::{RepoError, RepoResult};
pub use seed::{seed_sample_data, SampleLibrary};
pub use service::library_service::{now_epoch_ms, LibraryService, SqliteLibraryService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
