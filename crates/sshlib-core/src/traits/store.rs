// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for folder and connection persistence.

use async_trait::async_trait;

use crate::error::SshlibError;
use crate::types::{
    Connection, ConnectionId, ConnectionInput, Dataset, DatasetReplacement, Folder, FolderId,
};

/// Persistence of folders and encrypted connection profiles.
///
/// Implementations own the canonical records and their sort order. Secrets
/// cross this boundary in cleartext and must be encrypted before they reach
/// durable storage. Every mutating method is serializable with respect to the
/// others; multi-step mutations run in a single transaction.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// All connections ordered by `(folder_id, sort_order, name)`.
    async fn list_connections(&self) -> Result<Vec<Connection>, SshlibError>;

    /// A single connection, or `None` if the id is unknown.
    async fn get_connection(&self, id: ConnectionId) -> Result<Option<Connection>, SshlibError>;

    /// Validate and insert a connection, returning it as stored.
    async fn create_connection(&self, input: ConnectionInput) -> Result<Connection, SshlibError>;

    /// Validate and overwrite a connection. `None` if the id is unknown.
    async fn update_connection(
        &self,
        id: ConnectionId,
        input: ConnectionInput,
    ) -> Result<Option<Connection>, SshlibError>;

    /// Remove a connection. Returns whether a row was removed.
    async fn delete_connection(&self, id: ConnectionId) -> Result<bool, SshlibError>;

    /// All folders ordered by `(sort_order, name)`.
    async fn list_folders(&self) -> Result<Vec<Folder>, SshlibError>;

    /// Create a folder at the end of the folder list.
    async fn create_folder(&self, name: &str) -> Result<Folder, SshlibError>;

    /// Rename a folder. `None` if the id is unknown.
    async fn update_folder(&self, id: FolderId, name: &str) -> Result<Option<Folder>, SshlibError>;

    /// Delete a folder, moving its connections into the default folder.
    async fn delete_folder(&self, id: FolderId) -> Result<bool, SshlibError>;

    /// Apply `ordered_ids` as the 1-based order of `folder_id`, moving any
    /// listed connection from another folder into it.
    async fn reorder_connections(
        &self,
        folder_id: FolderId,
        ordered_ids: &[ConnectionId],
    ) -> Result<(), SshlibError>;

    /// Id of the reserved default folder, creating it if needed.
    async fn default_folder_id(&self) -> Result<FolderId, SshlibError>;

    /// A consistent cleartext snapshot of every folder and connection.
    async fn snapshot(&self) -> Result<Dataset, SshlibError>;

    /// Atomically replace every folder and connection.
    ///
    /// On any failure the previous dataset is left untouched.
    async fn replace_all(&self, replacement: DatasetReplacement) -> Result<(), SshlibError>;
}
