//! Database layer for the Kisan voice backend.
//!
//! Provides the SQLite connection pool (via `r2d2`), embedded SQL
//! migrations, and the interaction-history queries. The history table is
//! append-only: rows are inserted once per completed chat turn and never
//! updated or deleted here.
//!
//! All functions take a borrowed `rusqlite::Connection` and are
//! synchronous. Async callers check a connection out of the pool inside
//! `tokio::task::spawn_blocking`.

mod history;
mod migrations;
mod pool;

pub use history::{insert_chat, list_all_chats, list_chats_by_farmer, HistoryError};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, normalize_db_path, ping, DbPool, DbRuntimeSettings, PoolError};
