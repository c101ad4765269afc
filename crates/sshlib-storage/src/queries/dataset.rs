// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-dataset reads and replacement.

use rusqlite::params;
use sshlib_core::SshlibError;
use tracing::info;

use crate::database::Database;
use crate::models::{ConnectionRecord, Folder, SealedConnection};
use crate::queries::connections::{next_connection_sort, select_connections};
use crate::queries::folders::{ensure_default_folder, select_folders};

/// Read every folder and connection row in one call on the database thread.
pub async fn snapshot(db: &Database) -> Result<(Vec<Folder>, Vec<ConnectionRecord>), SshlibError> {
    db.call(|conn| {
        let folders = select_folders(conn)?;
        let connections = select_connections(conn)?;
        Ok(Ok((folders, connections)))
    })
    .await
}

/// Delete everything and insert the given rows in a single transaction.
///
/// Folder ids are written as given. A connection without a folder goes to the
/// default folder; one without a sort order is appended. Any failure rolls
/// back to the previous contents.
pub async fn replace_all(
    db: &Database,
    folders: Vec<Folder>,
    connections: Vec<SealedConnection>,
) -> Result<(), SshlibError> {
    let (folder_count, connection_count) = (folders.len(), connections.len());

    db.call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM connections", [])?;
        tx.execute("DELETE FROM folders", [])?;

        for folder in &folders {
            tx.execute(
                "INSERT INTO folders (id, name, sort_order, is_default) VALUES (?1, ?2, ?3, ?4)",
                params![folder.id, folder.name, folder.sort_order, folder.is_default],
            )?;
        }
        let default_id = ensure_default_folder(&tx)?;

        for row in &connections {
            let folder_id = row.folder_id.unwrap_or(default_id);
            let sort_order = match row.sort_order {
                Some(order) => order,
                None => next_connection_sort(&tx, folder_id)?,
            };
            tx.execute(
                "INSERT INTO connections (name, host_enc, username_enc, password_enc, \
                 port, port_is_dynamic, folder_id, sort_order) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.name,
                    row.host_enc,
                    row.username_enc,
                    row.password_enc,
                    row.port,
                    row.port_is_dynamic,
                    folder_id,
                    sort_order,
                ],
            )?;
        }

        tx.commit()?;
        Ok(Ok(()))
    })
    .await?;

    info!(
        folders = folder_count,
        connections = connection_count,
        "dataset replaced"
    );
    Ok(())
}
