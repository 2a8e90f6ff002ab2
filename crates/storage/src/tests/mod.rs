//! Test utilities and module declarations for storage tests.

use chrono::NaiveDate;
use tempfile::TempDir;

use crate::Storage;

mod inbox_tests;
mod settings_tests;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::open_with_pool_size(&db_path, 2).unwrap();
    (storage, temp_dir)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn reopen_keeps_schema_version_and_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("planbot.db");
    let owner = planbot_core::UserId(7);

    let storage = Storage::open_with_pool_size(&db_path, 1).unwrap();
    storage.insert_note(owner, "первая мысль").unwrap();
    storage.close().unwrap();

    let storage = Storage::open_with_pool_size(&db_path, 1).unwrap();
    let conn = storage.pool.get().unwrap();
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0)).unwrap();
    assert_eq!(version, crate::SCHEMA_VERSION);
    drop(conn);
    assert_eq!(storage.list_notes(owner, false).unwrap().len(), 1);
}
