//! Async access to the interaction history.
//!
//! The `kisan-db` functions are synchronous; [`HistoryStore`] runs each one
//! on the blocking pool with a connection checked out for the duration of
//! the closure.

use kisan_db::{DbPool, HistoryError};
use kisan_types::{ChatRecord, NewChatRecord};
use rusqlite::Connection;
use thiserror::Error;

/// Failures of a history operation, by where they happened.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be checked out of the pool.
    #[error("db connection failed: {0}")]
    Pool(#[from] r2d2::Error),

    /// The blocking task panicked or was cancelled.
    #[error("task join error: {0}")]
    Join(String),

    /// The statement itself failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl StoreError {
    /// Short label used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::Pool(_) => "pool",
            StoreError::Join(_) => "task",
            StoreError::History(HistoryError::InvalidPagination(_)) => "input",
            StoreError::History(HistoryError::Database(_)) => "database",
        }
    }
}

/// Pool-backed history store.
#[derive(Clone)]
pub struct HistoryStore {
    pool: DbPool,
}

impl HistoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Stores one interaction and returns it with its id and timestamp.
    pub async fn append(&self, record: NewChatRecord) -> Result<ChatRecord, StoreError> {
        self.with_conn(move |conn| Ok(kisan_db::insert_chat(conn, &record)?))
            .await
    }

    /// Every interaction for `farmer_id`, most recent first.
    pub async fn list_by_farmer(&self, farmer_id: String) -> Result<Vec<ChatRecord>, StoreError> {
        self.with_conn(move |conn| Ok(kisan_db::list_chats_by_farmer(conn, &farmer_id)?))
            .await
    }

    /// One page of all interactions, most recent first.
    pub async fn list_all(&self, offset: i64, limit: i64) -> Result<Vec<ChatRecord>, StoreError> {
        self.with_conn(move |conn| Ok(kisan_db::list_all_chats(conn, offset, limit)?))
            .await
    }

    /// Runs `SELECT 1` on a pooled connection.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            kisan_db::ping(conn).map_err(HistoryError::Database)?;
            Ok(())
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }
}
