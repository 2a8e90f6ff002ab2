use chrono::{Duration, Utc};
use planbot_core::UserId;

use super::create_test_storage;

const OWNER: UserId = UserId(42);

#[test]
fn edit_keeps_previous_text() {
    let (storage, _dir) = create_test_storage();
    let note = storage.insert_note(OWNER, "идея").unwrap();
    let edited = storage.update_note_text(OWNER, note.id, "идея получше").unwrap();
    assert_eq!(edited.text, "идея получше");
    assert_eq!(edited.history.len(), 1);
    assert_eq!(edited.history[0].text, "идея");
    assert_eq!(storage.require_note(OWNER, note.id).unwrap(), edited);
}

#[test]
fn archived_notes_are_hidden_by_default() {
    let (storage, _dir) = create_test_storage();
    let first = storage.insert_note(OWNER, "one").unwrap();
    storage.insert_note(OWNER, "two").unwrap();
    storage.archive_note(OWNER, first.id).unwrap();

    let visible = storage.list_notes(OWNER, false).unwrap();
    assert_eq!(visible.iter().map(|n| n.text.as_str()).collect::<Vec<_>>(), vec!["two"]);
    assert_eq!(storage.list_notes(OWNER, true).unwrap().len(), 2);
    assert!(storage.archive_note(UserId(1), first.id).unwrap_err().is_not_found());
}

#[test]
fn counts_notes_created_in_window() {
    let (storage, _dir) = create_test_storage();
    storage.insert_note(OWNER, "a").unwrap();
    let archived = storage.insert_note(OWNER, "b").unwrap();
    storage.archive_note(OWNER, archived.id).unwrap();
    storage.insert_note(UserId(1), "чужая").unwrap();

    let now = Utc::now();
    let count = storage
        .count_notes_created_between(OWNER, now - Duration::hours(1), now + Duration::hours(1))
        .unwrap();
    assert_eq!(count, 1);
    let none = storage
        .count_notes_created_between(OWNER, now + Duration::hours(1), now + Duration::hours(2))
        .unwrap();
    assert_eq!(none, 0);
}
