// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the SSH connection library.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and a [`ConnectionStore`]
//! implementation that keeps host, username and password encrypted at rest.
//!
//! [`ConnectionStore`]: sshlib_core::ConnectionStore

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use database::Database;
pub use models::*;
pub use store::SqliteStore;
