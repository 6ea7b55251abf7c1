//! Interaction history persistence.
//!
//! Rows in `chat_history` are written once by [`insert_chat`] and read back
//! newest first. The store, not the caller, assigns `id` and `created_at`.

use kisan_types::{ChatRecord, NewChatRecord};
use rusqlite::{params, Connection, Row};
use thiserror::Error;

/// Errors from history reads and writes.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A database operation failed.
    #[error("history database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A pagination argument was negative.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),
}

const SELECT_COLUMNS: &str =
    "id, farmer_id, farmer_name, question, answer, language, created_at";

fn map_row_to_record(row: &Row<'_>) -> rusqlite::Result<ChatRecord> {
    Ok(ChatRecord {
        id: row.get(0)?,
        farmer_id: row.get(1)?,
        farmer_name: row.get(2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        language: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Appends one interaction and returns it with its assigned id and timestamp.
///
/// `created_at` is the later of the current clock and the newest stored
/// timestamp, computed inside the same statement, so timestamps never go
/// backwards even if the system clock does.
///
/// # Errors
///
/// Returns `HistoryError::Database` on SQL failure.
pub fn insert_chat(conn: &Connection, record: &NewChatRecord) -> Result<ChatRecord, HistoryError> {
    let sql = format!(
        "INSERT INTO chat_history (farmer_id, farmer_name, question, answer, language, created_at)
         VALUES (
            ?1, ?2, ?3, ?4, ?5,
            MAX(
                strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                COALESCE((SELECT MAX(created_at) FROM chat_history), '')
            )
         )
         RETURNING {SELECT_COLUMNS}"
    );

    let stored = conn.query_row(
        &sql,
        params![
            record.farmer_id,
            record.farmer_name,
            record.question,
            record.answer,
            record.language,
        ],
        map_row_to_record,
    )?;

    tracing::debug!(
        id = stored.id,
        farmer_id = %stored.farmer_id,
        "stored chat record"
    );

    Ok(stored)
}

/// Lists every interaction for `farmer_id`, most recent first.
///
/// # Errors
///
/// Returns `HistoryError::Database` on SQL failure.
pub fn list_chats_by_farmer(
    conn: &Connection,
    farmer_id: &str,
) -> Result<Vec<ChatRecord>, HistoryError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS}
         FROM chat_history
         WHERE farmer_id = ?1
         ORDER BY created_at DESC, id DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![farmer_id], map_row_to_record)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Lists one page of all interactions, most recent first.
///
/// # Errors
///
/// Returns `HistoryError::InvalidPagination` if `offset` or `limit` is
/// negative, or `HistoryError::Database` on SQL failure.
pub fn list_all_chats(
    conn: &Connection,
    offset: i64,
    limit: i64,
) -> Result<Vec<ChatRecord>, HistoryError> {
    if offset < 0 {
        return Err(HistoryError::InvalidPagination(format!(
            "offset must be non-negative, got {offset}"
        )));
    }
    if limit < 0 {
        return Err(HistoryError::InvalidPagination(format!(
            "limit must be non-negative, got {limit}"
        )));
    }

    let sql = format!(
        "SELECT {SELECT_COLUMNS}
         FROM chat_history
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit, offset], map_row_to_record)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}
