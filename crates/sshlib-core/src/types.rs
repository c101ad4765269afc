// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the store, the transfer codec, and the CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SshlibError;

/// Name of the reserved folder that collects unassigned connections.
pub const DEFAULT_FOLDER_NAME: &str = "Unsorted";

/// Largest sort order or imported folder id taken as given. Larger values
/// are treated as absent and replaced with the next free slot.
pub const MAX_POSITION: i64 = i32::MAX as i64;

/// Row identifier of a folder.
pub type FolderId = i64;

/// Row identifier of a connection.
pub type ConnectionId = i64;

/// A named group of connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub sort_order: i64,
    /// Set on exactly one folder: the reserved [`DEFAULT_FOLDER_NAME`] folder.
    #[serde(default)]
    pub is_default: bool,
}

/// A decrypted SSH connection profile.
///
/// `host`, `username` and `password` only exist in cleartext in memory; the
/// store persists them encrypted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub name: String,
    pub host: String,
    pub username: String,
    pub password: String,
    /// `None` when `port_is_dynamic` is set; the port is then supplied at connect time.
    pub port: Option<u16>,
    pub port_is_dynamic: bool,
    pub folder_id: FolderId,
    pub sort_order: i64,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("port", &self.port)
            .field("port_is_dynamic", &self.port_is_dynamic)
            .field("folder_id", &self.folder_id)
            .field("sort_order", &self.sort_order)
            .finish()
    }
}

/// Caller-supplied fields for creating or updating a connection.
///
/// Values arrive already type-coerced but unvalidated; call
/// [`ConnectionInput::validate`] before persisting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionInput {
    pub name: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: Option<i64>,
    pub port_is_dynamic: bool,
    pub folder_id: Option<FolderId>,
    pub sort_order: Option<i64>,
}

/// A validated connection, ready to be encrypted and written.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDraft {
    pub name: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: Option<u16>,
    pub port_is_dynamic: bool,
    /// `None` means "the default folder".
    pub folder_id: Option<FolderId>,
    /// `None` means "append to the end of the folder".
    pub sort_order: Option<i64>,
}

impl fmt::Debug for ConnectionDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDraft")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("port_is_dynamic", &self.port_is_dynamic)
            .field("folder_id", &self.folder_id)
            .field("sort_order", &self.sort_order)
            .finish_non_exhaustive()
    }
}

impl ConnectionInput {
    /// Trim and check the input.
    ///
    /// `name`, `host` and `username` must be non-empty after trimming. A static
    /// connection needs a port in `1..=65535`; a dynamic one drops whatever
    /// port was given. The password is kept verbatim and may be empty.
    /// Sort orders outside `1..=MAX_POSITION` are treated as absent.
    pub fn validate(self) -> Result<ConnectionDraft, SshlibError> {
        let name = self.name.trim().to_string();
        let host = self.host.trim().to_string();
        let username = self.username.trim().to_string();
        if name.is_empty() || host.is_empty() || username.is_empty() {
            return Err(SshlibError::Validation(
                "name, host, and username are required".to_string(),
            ));
        }

        let port = if self.port_is_dynamic {
            None
        } else {
            match self.port.and_then(|p| u16::try_from(p).ok()) {
                Some(p) if p > 0 => Some(p),
                _ => {
                    return Err(SshlibError::Validation(
                        "static port must be an integer between 1 and 65535".to_string(),
                    ));
                }
            }
        };

        Ok(ConnectionDraft {
            name,
            host,
            username,
            password: self.password,
            port,
            port_is_dynamic: self.port_is_dynamic,
            folder_id: self.folder_id,
            sort_order: self.sort_order.filter(|s| (1..=MAX_POSITION).contains(s)),
        })
    }
}

/// Trim a folder name and reject empty ones.
pub fn validate_folder_name(name: &str) -> Result<String, SshlibError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SshlibError::Validation("folder name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// A full snapshot of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub folders: Vec<Folder>,
    pub connections: Vec<Connection>,
}

/// A normalized dataset that replaces the whole store in one transaction.
///
/// Folder ids are kept as given. Every connection references one of the
/// folders and carries an explicit sort order.
#[derive(Debug, Clone, Default)]
pub struct DatasetReplacement {
    pub folders: Vec<Folder>,
    pub connections: Vec<ConnectionDraft>,
}
