use chrono::{DateTime, Utc};
use planbot_core::{InboxNote, NoteRevision, UserId};
use rusqlite::{OptionalExtension as _, Row, params};

use super::{Storage, format_ts, get_conn, log_row_error, parse_json, parse_utc};
use crate::error::{Result, StorageError};

const NOTE_COLUMNS: &str = "id, owner, text, created_at, archived, history";

fn row_to_note(row: &Row<'_>) -> rusqlite::Result<InboxNote> {
    Ok(InboxNote {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        text: row.get(2)?,
        created_at: parse_utc(3, &row.get::<_, String>(3)?)?,
        archived: row.get(4)?,
        history: parse_json(5, &row.get::<_, String>(5)?)?,
    })
}

impl Storage {
    /// Save a new inbox note.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn insert_note(&self, owner: UserId, text: &str) -> Result<InboxNote> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO inbox (owner, text, archived, history, created_at) VALUES (?1, ?2, 0, '[]', ?3)",
            params![owner.0, text, format_ts(&Utc::now())],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);
        self.require_note(owner, id)
    }

    /// # Errors
    /// Returns error if database query fails or the row is corrupt.
    pub fn get_note(&self, owner: UserId, id: i64) -> Result<Option<InboxNote>> {
        let conn = get_conn(&self.pool)?;
        let note = conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM inbox WHERE id = ?1 AND owner = ?2"),
                params![id, owner.0],
                row_to_note,
            )
            .optional()?;
        Ok(note)
    }

    /// # Errors
    /// Returns `NotFound` for an unknown note, or a database error.
    pub fn require_note(&self, owner: UserId, id: i64) -> Result<InboxNote> {
        self.get_note(owner, id)?.ok_or(StorageError::NotFound { entity: "note", id })
    }

    /// Notes in insertion order; archived ones only when asked for.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_notes(&self, owner: UserId, include_archived: bool) -> Result<Vec<InboxNote>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM inbox WHERE owner = ?1 AND (?2 OR archived = 0) ORDER BY id"
        ))?;
        let notes = stmt
            .query_map(params![owner.0, include_archived], row_to_note)?
            .filter_map(log_row_error)
            .collect();
        Ok(notes)
    }

    /// Replace the note text, keeping the old one in `history`.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown note, or a database error.
    pub fn update_note_text(&self, owner: UserId, id: i64, text: &str) -> Result<InboxNote> {
        let mut note = self.require_note(owner, id)?;
        note.history.push(NoteRevision { ts: Utc::now(), text: std::mem::replace(&mut note.text, text.to_owned()) });
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "UPDATE inbox SET text = ?1, history = ?2 WHERE id = ?3 AND owner = ?4",
            params![note.text, serde_json::to_string(&note.history)?, id, owner.0],
        )?;
        Ok(note)
    }

    /// Soft-delete a note.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown note, or a database error.
    pub fn archive_note(&self, owner: UserId, id: i64) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let changed =
            conn.execute("UPDATE inbox SET archived = 1 WHERE id = ?1 AND owner = ?2", params![id, owner.0])?;
        if changed == 0 {
            return Err(StorageError::NotFound { entity: "note", id });
        }
        Ok(())
    }

    /// Non-archived notes created within `[from, to)`.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn count_notes_created_between(
        &self,
        owner: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize> {
        let count = self
            .list_notes(owner, false)?
            .iter()
            .filter(|note| note.created_at >= from && note.created_at < to)
            .count();
        Ok(count)
    }
}
