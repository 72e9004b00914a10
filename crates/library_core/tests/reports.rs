use library_core::db::open_db_in_memory;
use library_core::{
    seed_sample_data, MemberPatch, MembershipType, SampleLibrary, SqliteLibraryService,
};
use std::collections::BTreeMap;

fn names<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    items.into_iter().collect()
}

#[test]
fn members_by_book_returns_distinct_borrowers() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    // A second borrowing by Alice must not duplicate her.
    service
        .borrow_book(sample.alice, sample.modern_egypt, 1_716_000_000_000)
        .unwrap();

    let members = service.find_members_by_book("Modern Egypt").unwrap();

    assert_eq!(
        names(members.into_iter().map(|member| member.name)),
        ["Alice", "Charlie"]
    );
}

#[test]
fn members_by_unknown_title_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    seed_sample_data(&service).unwrap();

    assert!(service.find_members_by_book("Missing Book").unwrap().is_empty());
    assert!(service.find_members_by_book("Deep Space").unwrap().is_empty());
}

#[test]
fn members_joined_before_is_strict() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    seed_sample_data(&service).unwrap();

    let members = service.find_members_joined_before(2020).unwrap();
    assert_eq!(
        names(members.into_iter().map(|member| member.name)),
        ["Evan", "Bob"]
    );
}

#[test]
fn books_with_min_borrowers_counts_distinct_members() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    service
        .borrow_book(sample.bob, sample.python_basics, 1_716_000_000_000)
        .unwrap();

    let books = service.find_books_with_min_borrowers(2).unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].0.title, "Modern Egypt");
    assert_eq!(books[0].1, 2);

    let all = service.find_books_with_min_borrowers(1).unwrap();
    let titles: Vec<(&str, u64)> = all
        .iter()
        .map(|(book, count)| (book.title.as_str(), *count))
        .collect();
    assert_eq!(titles, [("Modern Egypt", 2), ("Python Basics", 1)]);
}

#[test]
fn books_borrowed_by_member_resolves_by_name() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    seed_sample_data(&service).unwrap();

    let books = service.find_books_borrowed_by_member("Alice").unwrap();
    assert_eq!(
        names(books.into_iter().map(|book| book.title)),
        ["Modern Egypt"]
    );
    assert!(service
        .find_books_borrowed_by_member("Diana")
        .unwrap()
        .is_empty());
}

#[test]
fn total_borrowed_per_member_counts_records() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    service
        .borrow_book(sample.bob, sample.modern_egypt, 1_716_000_000_000)
        .unwrap();

    let totals = service.total_borrowed_per_member().unwrap();

    let expected = BTreeMap::from([(sample.alice, 1), (sample.bob, 2), (sample.charlie, 1)]);
    assert_eq!(totals, expected);
}

#[test]
fn members_with_more_than_filters_strictly() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    assert!(service.members_with_more_than(1).unwrap().is_empty());

    service
        .borrow_book(sample.charlie, sample.python_basics, 1_716_000_000_000)
        .unwrap();

    assert_eq!(
        service.members_with_more_than(1).unwrap(),
        vec![(sample.charlie, 2)]
    );
}

#[test]
fn count_by_membership_type_matches_seed() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    service.delete_member(sample.evan).unwrap();

    let counts = service.count_by_membership_type().unwrap();

    let expected = BTreeMap::from([
        (MembershipType::Gold, 2),
        (MembershipType::Silver, 1),
        (MembershipType::Bronze, 1),
    ]);
    assert_eq!(counts, expected);
}

#[test]
fn record_average_is_one_per_present_tier() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    add_extra_gold_borrowings(&service, &sample);

    let averages = service.average_borrowed_per_membership_type().unwrap();

    assert_eq!(
        averages,
        BTreeMap::from([(MembershipType::Gold, 1.0), (MembershipType::Silver, 1.0)])
    );
}

#[test]
fn per_member_average_divides_by_distinct_borrowers() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();
    add_extra_gold_borrowings(&service, &sample);

    let averages = service
        .average_borrowed_per_member_by_membership_type()
        .unwrap();

    // Gold: Alice 2 + Charlie 1 over two members; Silver: Bob 1.
    assert_eq!(averages.get(&MembershipType::Gold), Some(&1.5));
    assert_eq!(averages.get(&MembershipType::Silver), Some(&1.0));
    assert!(!averages.contains_key(&MembershipType::Bronze));
}

#[test]
fn reports_follow_member_updates() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteLibraryService::try_from_connection(&conn).unwrap();
    let sample = seed_sample_data(&service).unwrap();

    let patch = MemberPatch {
        membership_type: Some(MembershipType::Bronze),
        ..MemberPatch::default()
    };
    service.update_member(sample.charlie, &patch).unwrap();

    let counts = service.count_by_membership_type().unwrap();
    assert_eq!(counts.get(&MembershipType::Gold), Some(&1));
    assert_eq!(counts.get(&MembershipType::Bronze), Some(&2));
}

fn add_extra_gold_borrowings(service: &SqliteLibraryService<'_>, sample: &SampleLibrary) {
    service
        .borrow_book(sample.alice, sample.python_basics, 1_716_000_000_000)
        .unwrap();
}
