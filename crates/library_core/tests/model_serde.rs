use library_core::{Borrowing, Member, MembershipType};
use serde_json::json;
use uuid::Uuid;

#[test]
fn member_serializes_tier_with_stored_label() {
    let id = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
    let member = Member::with_id(id, "Alice", 25, MembershipType::Gold, 2020);

    let value = serde_json::to_value(&member).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "00000000-0000-4000-8000-000000000001",
            "name": "Alice",
            "age": 25,
            "membership_type": "Gold",
            "join_year": 2020
        })
    );
}

#[test]
fn unknown_tier_label_fails_to_deserialize() {
    let raw = json!({
        "id": Uuid::new_v4(),
        "name": "Zed",
        "age": 40,
        "membership_type": "Platinum",
        "join_year": 2020
    });
    assert!(serde_json::from_value::<Member>(raw).is_err());
}

#[test]
fn open_borrowing_serializes_null_return_date() {
    let borrowing = Borrowing::new(Uuid::new_v4(), Uuid::new_v4(), 1_714_521_600_000);
    let value = serde_json::to_value(&borrowing).unwrap();
    assert_eq!(value["return_date"], serde_json::Value::Null);
    assert_eq!(value["borrow_date"], 1_714_521_600_000_i64);
}
