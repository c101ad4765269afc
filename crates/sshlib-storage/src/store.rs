// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConnectionStore trait.

use async_trait::async_trait;
use tracing::debug;

use sshlib_config::model::StorageConfig;
use sshlib_core::types::{
    Connection, ConnectionDraft, ConnectionId, ConnectionInput, Dataset, DatasetReplacement,
    Folder, FolderId, validate_folder_name,
};
use sshlib_core::{ConnectionStore, SshlibError};
use sshlib_vault::FieldCipher;

use crate::database::Database;
use crate::models::{ConnectionRecord, SealedConnection};
use crate::queries;

/// SQLite-backed connection store.
///
/// Host, username and password are sealed with the [`FieldCipher`] before
/// they reach a query and opened after they come back, so the file never
/// holds them in cleartext.
pub struct SqliteStore {
    db: Database,
    cipher: FieldCipher,
}

impl SqliteStore {
    /// Open the configured database and bring it to a consistent state: the
    /// default folder exists and every connection has a valid folder.
    pub async fn open(config: &StorageConfig, cipher: FieldCipher) -> Result<Self, SshlibError> {
        let db = Database::open_with_config(config).await?;
        let store = Self::new(db, cipher).await?;
        debug!(path = %config.database_path, "SQLite connection store initialized");
        Ok(store)
    }

    /// Wrap an already opened database.
    pub async fn new(db: Database, cipher: FieldCipher) -> Result<Self, SshlibError> {
        queries::connections::adopt_orphans(&db).await?;
        Ok(Self { db, cipher })
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), SshlibError> {
        self.db
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(Ok(()))
            })
            .await?;
        debug!("WAL checkpoint complete");
        self.db.close().await
    }

    fn seal(&self, draft: ConnectionDraft) -> Result<SealedConnection, SshlibError> {
        Ok(SealedConnection {
            host_enc: self.cipher.encrypt(&draft.host)?,
            username_enc: self.cipher.encrypt(&draft.username)?,
            password_enc: self.cipher.encrypt(&draft.password)?,
            name: draft.name,
            port: draft.port,
            port_is_dynamic: draft.port_is_dynamic,
            folder_id: draft.folder_id,
            sort_order: draft.sort_order,
        })
    }

    fn unseal(&self, record: ConnectionRecord) -> Result<Connection, SshlibError> {
        Ok(Connection {
            id: record.id,
            host: self.cipher.decrypt(&record.host_enc)?,
            username: self.cipher.decrypt(&record.username_enc)?,
            password: self.cipher.decrypt(&record.password_enc)?,
            name: record.name,
            port: record.port,
            port_is_dynamic: record.port_is_dynamic,
            folder_id: record.folder_id,
            sort_order: record.sort_order,
        })
    }

    fn unseal_all(&self, records: Vec<ConnectionRecord>) -> Result<Vec<Connection>, SshlibError> {
        records.into_iter().map(|r| self.unseal(r)).collect()
    }
}

#[async_trait]
impl ConnectionStore for SqliteStore {
    async fn list_connections(&self) -> Result<Vec<Connection>, SshlibError> {
        let records = queries::connections::list_connections(&self.db).await?;
        self.unseal_all(records)
    }

    async fn get_connection(&self, id: ConnectionId) -> Result<Option<Connection>, SshlibError> {
        queries::connections::get_connection(&self.db, id)
            .await?
            .map(|r| self.unseal(r))
            .transpose()
    }

    async fn create_connection(&self, input: ConnectionInput) -> Result<Connection, SshlibError> {
        let row = self.seal(input.validate()?)?;
        let record = queries::connections::insert_connection(&self.db, row).await?;
        self.unseal(record)
    }

    async fn update_connection(
        &self,
        id: ConnectionId,
        input: ConnectionInput,
    ) -> Result<Option<Connection>, SshlibError> {
        let row = self.seal(input.validate()?)?;
        queries::connections::update_connection(&self.db, id, row)
            .await?
            .map(|r| self.unseal(r))
            .transpose()
    }

    async fn delete_connection(&self, id: ConnectionId) -> Result<bool, SshlibError> {
        queries::connections::delete_connection(&self.db, id).await
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, SshlibError> {
        queries::folders::list_folders(&self.db).await
    }

    async fn create_folder(&self, name: &str) -> Result<Folder, SshlibError> {
        let name = validate_folder_name(name)?;
        queries::folders::create_folder(&self.db, name).await
    }

    async fn update_folder(&self, id: FolderId, name: &str) -> Result<Option<Folder>, SshlibError> {
        let name = validate_folder_name(name)?;
        queries::folders::rename_folder(&self.db, id, name).await
    }

    async fn delete_folder(&self, id: FolderId) -> Result<bool, SshlibError> {
        queries::folders::delete_folder(&self.db, id).await
    }

    async fn reorder_connections(
        &self,
        folder_id: FolderId,
        ordered_ids: &[ConnectionId],
    ) -> Result<(), SshlibError> {
        queries::connections::reorder_connections(&self.db, folder_id, ordered_ids.to_vec()).await
    }

    async fn default_folder_id(&self) -> Result<FolderId, SshlibError> {
        queries::folders::default_folder_id(&self.db).await
    }

    async fn snapshot(&self) -> Result<Dataset, SshlibError> {
        let (folders, records) = queries::dataset::snapshot(&self.db).await?;
        Ok(Dataset {
            folders,
            connections: self.unseal_all(records)?,
        })
    }

    async fn replace_all(&self, replacement: DatasetReplacement) -> Result<(), SshlibError> {
        // Seal everything before the transaction starts.
        let rows = replacement
            .connections
            .into_iter()
            .map(|draft| self.seal(draft))
            .collect::<Result<Vec<_>, _>>()?;
        queries::dataset::replace_all(&self.db, replacement.folders, rows).await
    }
}
