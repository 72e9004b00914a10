//! Library smoke runner.
//!
//! # Responsibility
//! - Seed the sample library, replay the maintenance steps and print every
//!   report, to check `library_core` wiring end to end.
//! - Settings come from `LIBRARY_DB_PATH`, `LIBRARY_LOG_LEVEL`, `LIBRARY_LOG_DIR`.

use library_core::{
    core_version, now_epoch_ms, seed_sample_data, BookPatch, LibraryConfig, MemberPatch,
    SqliteLibraryService,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=smoke_run module=cli status=error error={err}");
            eprintln!("library_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = LibraryConfig::from_env();
    config.init_logging()?;
    println!("library_core version={}", core_version());

    let conn = config.open_db()?;
    let service = SqliteLibraryService::try_from_connection(&conn)?;
    let sample = seed_sample_data(&service)?;

    let frank = service.add_member("Frank", 27, "Gold", 2023)?;
    println!("added member Frank id={frank}");

    service.update_member(sample.alice, &MemberPatch::age(26))?;
    let cascaded = service.delete_member(sample.evan)?;
    println!("deleted Evan cascaded_borrowings={cascaded}");

    service.update_book(sample.python_basics, &BookPatch::genre("Computer Science"))?;
    let cascaded = service.delete_book(sample.deep_space)?;
    println!("deleted Deep Space cascaded_borrowings={cascaded}");

    service.borrow_book_now(sample.diana, sample.modern_egypt)?;
    service.return_book_by_pair(sample.alice, sample.modern_egypt, now_epoch_ms())?;

    println!("-- members who borrowed Modern Egypt");
    for member in service.find_members_by_book("Modern Egypt")? {
        println!("{} ({})", member.name, member.membership_type);
    }

    println!("-- members joined before 2020");
    for member in service.find_members_joined_before(2020)? {
        println!("{} joined {}", member.name, member.join_year);
    }

    println!("-- books with at least 2 distinct borrowers");
    for (book, borrowers) in service.find_books_with_min_borrowers(2)? {
        println!("{} borrowers={borrowers}", book.title);
    }

    println!("-- books borrowed by Alice");
    for book in service.find_books_borrowed_by_member("Alice")? {
        println!("{} by {}", book.title, book.author);
    }

    println!("-- total borrowed per member");
    for (member_id, total) in service.total_borrowed_per_member()? {
        println!("{member_id} total={total}");
    }

    println!("-- average borrowed per membership type (per record)");
    for (tier, average) in service.average_borrowed_per_membership_type()? {
        println!("{tier} avg={average:.2}");
    }

    println!("-- average borrowed per membership type (per member)");
    for (tier, average) in service.average_borrowed_per_member_by_membership_type()? {
        println!("{tier} avg={average:.2}");
    }

    println!("-- members with more than 1 borrowing");
    for (member_id, total) in service.members_with_more_than(1)? {
        println!("{member_id} total={total}");
    }

    println!("-- members per membership type");
    for (tier, total) in service.count_by_membership_type()? {
        println!("{tier} members={total}");
    }

    Ok(())
}
