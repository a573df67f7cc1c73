use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::error::CoreError;
use crate::models::{
    ArchiveStats, DialogKind, DialogRecord, MessageKind, MessageRecord, PeerKind, UserKind,
    UserRecord,
};
use crate::payload::{decode_message, decode_text_message};
use crate::protocol::{Message, TextMessage};

/// Highest stored message id, 0 when there is none.
///
/// A failing query is treated the same as an empty archive; callers use this
/// only to decide where fetching resumes.
pub fn top_message_id(conn: &Connection) -> i64 {
    match conn.query_row("SELECT MAX(id) FROM messages;", [], |row| row.get::<_, Option<i64>>(0)) {
        Ok(max) => max.unwrap_or(0),
        Err(err) => {
            warn!(error = %err, "could not read top message id, assuming empty archive");
            0
        }
    }
}

/// Exact number of stored messages. Unlike `top_message_id` this does not degrade.
pub fn message_count(conn: &Connection) -> Result<i64, CoreError> {
    conn.query_row("SELECT COUNT(*) FROM messages;", [], |row| row.get(0))
        .map_err(CoreError::from)
}

/// Every message flagged with media, rebuilt from its stored body.
pub fn messages_with_media(conn: &Connection) -> Result<Vec<TextMessage>, CoreError> {
    let mut stmt = conn.prepare("SELECT data FROM messages WHERE has_media = 1 ORDER BY id ASC;")?;
    let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;
    let mut messages = Vec::new();
    for data in rows {
        messages.push(decode_text_message(&data?)?);
    }
    Ok(messages)
}

pub fn load_message(conn: &Connection, id: i64) -> Result<Option<Message>, CoreError> {
    let data: Option<Option<Vec<u8>>> = conn
        .query_row(
            "SELECT data FROM messages WHERE id = ?1;",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    match data.flatten() {
        Some(bytes) => Ok(Some(decode_message(&bytes)?)),
        None => Ok(None),
    }
}

/// The stored row for `id`, as written by the normalizer.
pub fn get_message_row(conn: &Connection, id: i64) -> Result<Option<MessageRecord>, CoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, dialog_id, to_id, from_id, from_type, text, time, has_media, sticker, data, type
         FROM messages WHERE id = ?1;",
    )?;
    let mut rows = stmt.query(params![id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let from_type = match row.get::<_, Option<String>>(4)? {
        Some(raw) => Some(
            PeerKind::parse(&raw).ok_or_else(|| CoreError::unexpected("stored peer type", raw))?,
        ),
        None => None,
    };
    let kind: String = row.get(10)?;
    let kind = MessageKind::parse(&kind)
        .ok_or_else(|| CoreError::unexpected("stored message type", kind))?;
    Ok(Some(MessageRecord {
        id: row.get(0)?,
        dialog_id: row.get(1)?,
        to_id: row.get(2)?,
        from_id: row.get(3)?,
        from_type,
        text: row.get(5)?,
        time: row.get(6)?,
        has_media: row.get(7)?,
        sticker: row.get(8)?,
        data: row.get(9)?,
        kind,
    }))
}

pub fn get_dialog(conn: &Connection, id: i64) -> Result<Option<DialogRecord>, CoreError> {
    let row: Option<(i64, Option<String>, String)> = conn
        .query_row(
            "SELECT id, name, type FROM dialogs WHERE id = ?1;",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    row.map(|(id, name, kind)| -> Result<DialogRecord, CoreError> {
        let kind = DialogKind::parse(&kind)
            .ok_or_else(|| CoreError::unexpected("stored dialog type", kind))?;
        Ok(DialogRecord { id, name, kind })
    })
    .transpose()
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<UserRecord>, CoreError> {
    let row = conn
        .query_row(
            "SELECT id, first_name, last_name, username, phone, type FROM users WHERE id = ?1;",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;
    row.map(|(id, first_name, last_name, username, phone, kind)| -> Result<UserRecord, CoreError> {
        let kind = UserKind::parse(&kind)
            .ok_or_else(|| CoreError::unexpected("stored user type", kind))?;
        Ok(UserRecord {
            id,
            first_name,
            last_name,
            username,
            phone,
            kind,
        })
    })
    .transpose()
}

pub fn archive_stats(conn: &Connection) -> Result<ArchiveStats, CoreError> {
    Ok(ArchiveStats {
        messages: message_count(conn)?,
        dialogs: conn.query_row("SELECT COUNT(*) FROM dialogs;", [], |row| row.get(0))?,
        users: conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?,
        messages_with_media: conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE has_media = 1;",
            [],
            |row| row.get(0),
        )?,
    })
}
