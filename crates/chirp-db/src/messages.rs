use anyhow::Result;
use chirp_types::models::Message;
use rusqlite::{OptionalExtension, Row};

use crate::Database;

const MESSAGE_COLUMNS: &str = "message_id, posted_by, message_text, time_posted_epoch";

impl Database {
    pub fn insert_message(&self, message: &Message) -> Result<Message> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO message (posted_by, message_text, time_posted_epoch) VALUES (?1, ?2, ?3)",
                (message.posted_by, &message.message_text, message.time_posted_epoch),
            )?;
            Ok(Message {
                message_id: conn.last_insert_rowid(),
                ..message.clone()
            })
        })
    }

    /// Every message, oldest first.
    pub fn get_all_messages(&self) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM message ORDER BY message_id"
            ))?;
            let rows = stmt
                .query_map([], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_message_by_id(&self, message_id: i64) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM message WHERE message_id = ?1"
            ))?;
            let row = stmt.query_row([message_id], message_from_row).optional()?;
            Ok(row)
        })
    }

    /// Returns the number of rows removed (0 when the id is unknown).
    pub fn delete_message(&self, message_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM message WHERE message_id = ?1", [message_id])?;
            Ok(n)
        })
    }

    /// Overwrites only `message_text`; other columns are left alone.
    pub fn update_message_text(&self, message: &Message) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE message SET message_text = ?1 WHERE message_id = ?2",
                (&message.message_text, message.message_id),
            )?;
            Ok(n)
        })
    }

    pub fn get_messages_by_poster(&self, posted_by: i64) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM message WHERE posted_by = ?1 ORDER BY message_id"
            ))?;
            let rows = stmt
                .query_map([posted_by], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        message_id: row.get(0)?,
        posted_by: row.get(1)?,
        message_text: row.get(2)?,
        time_posted_epoch: row.get(3)?,
    })
}
