use bookmark_core::{
    Bookmark, EnglishCatalog, ErrorField, MessageCatalog, MessageId, ReminderType,
    ValidationError, ValidationErrors,
};
use chrono::{TimeZone, Utc};

#[test]
fn bookmark_serialization_uses_expected_wire_fields() {
    let at = Utc.with_ymd_and_hms(2026, 11, 2, 8, 30, 0).unwrap();
    let mut bookmark = Bookmark::new(1, 5, 9)
        .with_name("read later")
        .with_reminder(ReminderType::NextBusinessDay, Some(at));
    bookmark.id = Some(12);

    let json = serde_json::to_value(&bookmark).unwrap();
    assert_eq!(json["id"], 12);
    assert_eq!(json["user_id"], 1);
    assert_eq!(json["post_id"], 5);
    assert_eq!(json["topic_id"], 9);
    assert_eq!(json["name"], "read later");
    assert_eq!(json["reminder_type"], "next_business_day");
    assert_eq!(json["reminder_at"], "2026-11-02T08:30:00Z");
    assert!(json["reminder_last_sent_at"].is_null());

    let decoded: Bookmark = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, bookmark);
}

#[test]
fn unknown_reminder_type_is_rejected_on_deserialize() {
    let value = serde_json::json!({
        "id": null,
        "user_id": 1,
        "post_id": 5,
        "topic_id": 9,
        "name": null,
        "reminder_type": "someday",
        "reminder_at": null,
        "reminder_last_sent_at": null,
        "created_at": null,
        "updated_at": null
    });

    let err = serde_json::from_value::<Bookmark>(value).unwrap_err();
    assert!(err.to_string().contains("someday"), "unexpected error: {err}");
}

#[test]
fn validation_errors_serialize_as_field_and_message_id() {
    let errors = ValidationErrors::from(ValidationError::base(MessageId::CannotSetPastReminder));

    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json[0]["field"], "base");
    assert_eq!(json[0]["message"]["id"], "cannot_set_past_reminder");
    assert_eq!(errors.iter().next().unwrap().field, ErrorField::Base);
}

#[test]
fn every_message_id_has_an_english_rendering() {
    let catalog = EnglishCatalog::default();
    for id in [
        MessageId::TimeMustBeProvided,
        MessageId::AlreadyBookmarkedPost,
        MessageId::CannotSetPastReminder,
        MessageId::CannotSetReminderInDistantFuture,
    ] {
        assert!(catalog.template(id.key()).is_some(), "missing text for {id}");
    }
    for kind in ReminderType::ALL {
        assert!(catalog.template(kind.label_key()).is_some(), "missing label for {kind:?}");
    }
}
