// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row models for storage entities.
//!
//! Secret columns hold sealed tokens only. Decryption happens in
//! [`crate::store::SqliteStore`], never inside a query.

use sshlib_core::types::{ConnectionId, FolderId};

pub use sshlib_core::types::Folder;

/// A connection row as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    pub name: String,
    pub host_enc: String,
    pub username_enc: String,
    pub password_enc: String,
    pub port: Option<u16>,
    pub port_is_dynamic: bool,
    pub folder_id: FolderId,
    pub sort_order: i64,
}

/// Column values for an insert or update, secrets already sealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedConnection {
    pub name: String,
    pub host_enc: String,
    pub username_enc: String,
    pub password_enc: String,
    pub port: Option<u16>,
    pub port_is_dynamic: bool,
    /// `None` targets the default folder.
    pub folder_id: Option<FolderId>,
    /// `None` appends to the end of the target folder.
    pub sort_order: Option<i64>,
}

pub(crate) const CONNECTION_COLUMNS: &str = "id, name, host_enc, username_enc, password_enc, \
     port, port_is_dynamic, folder_id, sort_order";

pub(crate) const FOLDER_COLUMNS: &str = "id, name, sort_order, is_default";

pub(crate) fn connection_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConnectionRecord> {
    Ok(ConnectionRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        host_enc: row.get(2)?,
        username_enc: row.get(3)?,
        password_enc: row.get(4)?,
        port: row.get(5)?,
        port_is_dynamic: row.get(6)?,
        folder_id: row.get(7)?,
        sort_order: row.get(8)?,
    })
}

pub(crate) fn folder_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get(0)?,
        name: row.get(1)?,
        sort_order: row.get(2)?,
        is_default: row.get(3)?,
    })
}
