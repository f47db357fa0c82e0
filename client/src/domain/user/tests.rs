//! Tests for the domain user model.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case(" 42", UserValidationError::PaddedId)]
#[case("42\n", UserValidationError::PaddedId)]
fn user_id_rejects_blank_or_padded_values(
    #[case] raw: &str,
    #[case] expected: UserValidationError,
) {
    let error = UserId::new(raw).expect_err("id must be rejected");
    assert_eq!(error, expected);
}

#[test]
fn user_id_is_opaque() {
    let id = UserId::new("65f1c0ffee").expect("opaque ids are accepted");
    assert_eq!(id.to_string(), "65f1c0ffee");
}

#[test]
fn deserialises_server_record_and_ignores_extra_fields() {
    let value = json!({
        "_id": "42",
        "name": "Jane",
        "email": "jane@x.com",
        "address": "1 Main St",
        "__v": 0,
        "createdAt": "2024-01-01T00:00:00Z"
    });

    let user: User = serde_json::from_value(value).expect("record decodes");
    assert_eq!(user.id().as_ref(), "42");
    assert_eq!(user.name(), "Jane");
    assert_eq!(user.email(), "jane@x.com");
    assert_eq!(user.address(), "1 Main St");
}

#[test]
fn serialises_with_underscore_id() {
    let user = User::new(
        UserId::new("42").expect("valid id"),
        UserDraft::new("Jane", "jane@x.com", "1 Main St"),
    );

    let value = serde_json::to_value(&user).expect("record encodes");
    assert_eq!(
        value,
        json!({
            "_id": "42",
            "name": "Jane",
            "email": "jane@x.com",
            "address": "1 Main St"
        })
    );
}

#[test]
fn rejects_record_without_identifier() {
    let value = json!({ "_id": "", "name": "Jane", "email": "j@x.io", "address": "x" });
    let result = serde_json::from_value::<User>(value);
    assert!(result.is_err(), "empty ids must not decode into a User");
}

#[test]
fn draft_round_trips_through_field_accessors() {
    let mut draft = UserDraft::default();
    for field in Field::ALL {
        draft.set(field, format!("{field}-value"));
    }

    assert_eq!(draft.get(Field::Name), "name-value");
    assert_eq!(draft.get(Field::Email), "email-value");
    assert_eq!(draft.get(Field::Address), "address-value");
}

#[test]
fn to_draft_copies_editable_fields() {
    let user = User::new(
        UserId::new("7").expect("valid id"),
        UserDraft::new("Ada", "ada@example.org", "12 Analytical Row"),
    );

    assert_eq!(
        user.to_draft(),
        UserDraft::new("Ada", "ada@example.org", "12 Analytical Row")
    );
}
