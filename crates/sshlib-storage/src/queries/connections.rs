// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection row operations.
//!
//! Rows carry sealed secrets; callers encrypt before writing and decrypt after
//! reading.

use rusqlite::{OptionalExtension, params};
use sshlib_core::types::{ConnectionId, FolderId, MAX_POSITION};
use sshlib_core::SshlibError;
use tracing::{debug, info};

use crate::database::Database;
use crate::models::{CONNECTION_COLUMNS, ConnectionRecord, SealedConnection, connection_from_row};
use crate::queries::folders::{ensure_default_folder, select_folder};

/// Next slot at the end of a folder. Rows above [`MAX_POSITION`] are ignored
/// so the result always stays an integer.
pub(crate) fn next_connection_sort(
    conn: &rusqlite::Connection,
    folder_id: FolderId,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM connections \
         WHERE folder_id = ?1 AND sort_order <= ?2",
        params![folder_id, MAX_POSITION],
        |row| row.get(0),
    )
}

pub(crate) fn select_connections(
    conn: &rusqlite::Connection,
) -> rusqlite::Result<Vec<ConnectionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONNECTION_COLUMNS} FROM connections \
         ORDER BY folder_id ASC, sort_order ASC, name ASC"
    ))?;
    let rows = stmt.query_map([], connection_from_row)?;
    rows.collect()
}

fn select_connection(
    conn: &rusqlite::Connection,
    id: ConnectionId,
) -> rusqlite::Result<Option<ConnectionRecord>> {
    conn.query_row(
        &format!("SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = ?1"),
        params![id],
        connection_from_row,
    )
    .optional()
}

/// Resolve the folder a write targets: the given one if it exists, otherwise
/// the default folder when none was given.
fn target_folder(
    conn: &rusqlite::Connection,
    folder_id: Option<FolderId>,
) -> rusqlite::Result<Result<FolderId, SshlibError>> {
    match folder_id {
        Some(id) => Ok(match select_folder(conn, id)? {
            Some(_) => Ok(id),
            None => Err(SshlibError::Validation(format!("folder {id} does not exist"))),
        }),
        None => Ok(Ok(ensure_default_folder(conn)?)),
    }
}

/// Move rows with no folder, or a folder that no longer exists, to the end of
/// the default folder. Rows without a sort order get one. Returns the number
/// of rows touched.
pub async fn adopt_orphans(db: &Database) -> Result<usize, SshlibError> {
    let touched = db
        .call(|conn| {
            let tx = conn.transaction()?;
            let default_id = ensure_default_folder(&tx)?;

            let orphans: Vec<ConnectionId> = {
                let mut stmt = tx.prepare(
                    "SELECT c.id FROM connections c \
                     LEFT JOIN folders f ON f.id = c.folder_id \
                     WHERE f.id IS NULL \
                     ORDER BY c.sort_order ASC, c.name ASC, c.id ASC",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<_, _>>()?
            };
            let base = next_connection_sort(&tx, default_id)?;
            for (offset, id) in orphans.iter().enumerate() {
                tx.execute(
                    "UPDATE connections SET folder_id = ?1, sort_order = ?2 WHERE id = ?3",
                    params![default_id, base + offset as i64, id],
                )?;
            }

            let unordered: Vec<(ConnectionId, FolderId)> = {
                let mut stmt = tx.prepare(
                    "SELECT id, folder_id FROM connections WHERE sort_order IS NULL \
                     ORDER BY name ASC, id ASC",
                )?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect::<Result<_, _>>()?
            };
            for (id, folder_id) in &unordered {
                let next = next_connection_sort(&tx, *folder_id)?;
                tx.execute(
                    "UPDATE connections SET sort_order = ?1 WHERE id = ?2",
                    params![next, id],
                )?;
            }

            tx.commit()?;
            Ok(Ok(orphans.len() + unordered.len()))
        })
        .await?;

    if touched > 0 {
        info!(count = touched, "repaired connections without a valid folder or order");
    }
    Ok(touched)
}

/// List all connection rows ordered by `(folder_id, sort_order, name)`.
pub async fn list_connections(db: &Database) -> Result<Vec<ConnectionRecord>, SshlibError> {
    db.call(|conn| Ok(Ok(select_connections(conn)?))).await
}

/// Get a connection row by ID.
pub async fn get_connection(
    db: &Database,
    id: ConnectionId,
) -> Result<Option<ConnectionRecord>, SshlibError> {
    db.call(move |conn| Ok(Ok(select_connection(conn, id)?))).await
}

/// Insert a connection, resolving its folder and sort order.
pub async fn insert_connection(
    db: &Database,
    row: SealedConnection,
) -> Result<ConnectionRecord, SshlibError> {
    let record = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let folder_id = match target_folder(&tx, row.folder_id)? {
                Ok(id) => id,
                Err(e) => return Ok(Err(e)),
            };
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
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Ok(ConnectionRecord {
                id,
                name: row.name,
                host_enc: row.host_enc,
                username_enc: row.username_enc,
                password_enc: row.password_enc,
                port: row.port,
                port_is_dynamic: row.port_is_dynamic,
                folder_id,
                sort_order,
            }))
        })
        .await?;

    debug!(connection_id = record.id, folder_id = record.folder_id, "connection created");
    Ok(record)
}

/// Overwrite a connection. Returns `None` when the id is unknown.
///
/// Moving to another folder always appends at the end of the destination;
/// otherwise an absent sort order keeps the current position.
pub async fn update_connection(
    db: &Database,
    id: ConnectionId,
    row: SealedConnection,
) -> Result<Option<ConnectionRecord>, SshlibError> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let Some(existing) = select_connection(&tx, id)? else {
            return Ok(Ok(None));
        };
        let folder_id = match target_folder(&tx, row.folder_id)? {
            Ok(id) => id,
            Err(e) => return Ok(Err(e)),
        };
        let sort_order = if folder_id != existing.folder_id {
            next_connection_sort(&tx, folder_id)?
        } else {
            row.sort_order.unwrap_or(existing.sort_order)
        };
        tx.execute(
            "UPDATE connections SET name = ?1, host_enc = ?2, username_enc = ?3, \
             password_enc = ?4, port = ?5, port_is_dynamic = ?6, folder_id = ?7, \
             sort_order = ?8 WHERE id = ?9",
            params![
                row.name,
                row.host_enc,
                row.username_enc,
                row.password_enc,
                row.port,
                row.port_is_dynamic,
                folder_id,
                sort_order,
                id,
            ],
        )?;
        tx.commit()?;
        Ok(Ok(Some(ConnectionRecord {
            id,
            name: row.name,
            host_enc: row.host_enc,
            username_enc: row.username_enc,
            password_enc: row.password_enc,
            port: row.port,
            port_is_dynamic: row.port_is_dynamic,
            folder_id,
            sort_order,
        })))
    })
    .await
}

/// Delete a connection. Returns whether a row was removed.
pub async fn delete_connection(db: &Database, id: ConnectionId) -> Result<bool, SshlibError> {
    db.call(move |conn| {
        let n = conn.execute("DELETE FROM connections WHERE id = ?1", params![id])?;
        Ok(Ok(n > 0))
    })
    .await
}

/// Assign sort orders `1..=n` in `ordered_ids` order, moving each listed
/// connection into `folder_id`. Unknown ids are skipped without leaving a gap.
pub async fn reorder_connections(
    db: &Database,
    folder_id: FolderId,
    ordered_ids: Vec<ConnectionId>,
) -> Result<(), SshlibError> {
    if ordered_ids.is_empty() {
        return Err(SshlibError::Validation(
            "ordered connection ids are required".to_string(),
        ));
    }

    let updated = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            if select_folder(&tx, folder_id)?.is_none() {
                return Ok(Err(SshlibError::Validation(format!(
                    "folder {folder_id} does not exist"
                ))));
            }
            let mut updated: i64 = 0;
            for id in &ordered_ids {
                updated += tx.execute(
                    "UPDATE connections SET folder_id = ?1, sort_order = ?2 WHERE id = ?3",
                    params![folder_id, updated + 1, id],
                )? as i64;
            }
            tx.commit()?;
            Ok(Ok(updated))
        })
        .await?;

    debug!(folder_id, updated, "connections reordered");
    Ok(())
}
