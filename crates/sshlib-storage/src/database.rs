// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use sshlib_config::model::StorageConfig;
use sshlib_core::SshlibError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Result of a closure run on the database thread: the outer error is a
/// SQLite failure, the inner one a domain rejection. Returning the inner
/// error without committing rolls back any open transaction.
pub type Outcome<T> = Result<Result<T, SshlibError>, rusqlite::Error>;

/// Convert a tokio-rusqlite error into SshlibError::Storage.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SshlibError {
    SshlibError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the connection library database.
///
/// Wraps the single `tokio_rusqlite::Connection` that owns the file.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL enabled.
    pub async fn open(path: &str) -> Result<Self, SshlibError> {
        Self::open_with(path, true).await
    }

    /// Open the database described by the `[storage]` config section.
    pub async fn open_with_config(config: &StorageConfig) -> Result<Self, SshlibError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    /// Open the database, apply connection PRAGMAs and run pending migrations.
    ///
    /// The parent directory is created when missing.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, SshlibError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| SshlibError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| SshlibError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Outcome<()> {
            if wal_mode {
                // journal_mode reports the resulting mode as a row.
                conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;
            }
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Run `f` on the database thread and flatten both error layers.
    pub async fn call<T, F>(&self, f: F) -> Result<T, SshlibError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Outcome<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn.call(f).await.map_err(map_tr_err)?
    }

    /// Close the connection, flushing the WAL.
    pub async fn close(self) -> Result<(), SshlibError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}
