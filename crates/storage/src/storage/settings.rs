use planbot_core::{KnownChat, Setting, UserId};
use rusqlite::{OptionalExtension as _, params};

use super::{Storage, get_conn, log_row_error, parse_json};
use crate::error::Result;

impl Storage {
    /// # Errors
    /// Returns error if database query fails or the stored value is not JSON.
    pub fn get_setting(&self, owner: UserId, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = get_conn(&self.pool)?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE owner = ?1 AND key = ?2",
                params![owner.0, key],
                |row| parse_json(0, &row.get::<_, String>(0)?),
            )
            .optional()?;
        Ok(value)
    }

    /// Upsert one preference.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn set_setting(&self, owner: UserId, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO settings (owner, key, value) VALUES (?1, ?2, ?3)
               ON CONFLICT(owner, key) DO UPDATE SET value = excluded.value",
            params![owner.0, key, serde_json::to_string(value)?],
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_settings(&self, owner: UserId) -> Result<Vec<Setting>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT key, value FROM settings WHERE owner = ?1 ORDER BY key")?;
        let settings = stmt
            .query_map(params![owner.0], |row| {
                Ok(Setting { owner, key: row.get(0)?, value: parse_json(1, &row.get::<_, String>(1)?)? })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(settings)
    }

    /// Remember (or update) the chat an owner talks from.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn remember_chat(&self, owner: UserId, chat_id: i64) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO known_chats (owner, chat_id) VALUES (?1, ?2)
               ON CONFLICT(owner) DO UPDATE SET chat_id = excluded.chat_id",
            params![owner.0, chat_id],
        )?;
        Ok(())
    }

    /// Every remembered `(owner, chat)` pair.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn known_chats(&self) -> Result<Vec<KnownChat>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT owner, chat_id FROM known_chats ORDER BY owner")?;
        let chats = stmt
            .query_map([], |row| Ok(KnownChat { owner: UserId(row.get(0)?), chat_id: row.get(1)? }))?
            .filter_map(log_row_error)
            .collect();
        Ok(chats)
    }
}
