// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folder operations, including maintenance of the reserved default folder.

use rusqlite::{OptionalExtension, params};
use sshlib_core::types::{DEFAULT_FOLDER_NAME, FolderId, MAX_POSITION};
use sshlib_core::SshlibError;
use tracing::{debug, info};

use crate::database::Database;
use crate::models::{FOLDER_COLUMNS, Folder, folder_from_row};
use crate::queries::connections::next_connection_sort;

pub(crate) fn select_folder(
    conn: &rusqlite::Connection,
    id: FolderId,
) -> rusqlite::Result<Option<Folder>> {
    conn.query_row(
        &format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1"),
        params![id],
        folder_from_row,
    )
    .optional()
}

pub(crate) fn select_folders(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<Folder>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FOLDER_COLUMNS} FROM folders ORDER BY sort_order ASC, name ASC"
    ))?;
    let rows = stmt.query_map([], folder_from_row)?;
    rows.collect()
}

fn next_folder_sort(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM folders WHERE sort_order <= ?1",
        params![MAX_POSITION],
        |row| row.get(0),
    )
}

fn name_taken(
    conn: &rusqlite::Connection,
    name: &str,
    except: Option<FolderId>,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM folders WHERE name = ?1 AND id IS NOT ?2)",
        params![name, except],
        |row| row.get(0),
    )
}

/// Return the default folder id, creating the folder when it is missing.
///
/// A pre-existing `Unsorted` folder without the flag is adopted as the default.
pub(crate) fn ensure_default_folder(conn: &rusqlite::Connection) -> rusqlite::Result<FolderId> {
    if let Some(id) = conn
        .query_row("SELECT id FROM folders WHERE is_default = 1", [], |row| {
            row.get(0)
        })
        .optional()?
    {
        return Ok(id);
    }

    if let Some(id) = conn
        .query_row(
            "SELECT id FROM folders WHERE name = ?1",
            params![DEFAULT_FOLDER_NAME],
            |row| row.get::<_, FolderId>(0),
        )
        .optional()?
    {
        conn.execute("UPDATE folders SET is_default = 1 WHERE id = ?1", params![id])?;
        info!(folder_id = id, "flagged existing folder as default");
        return Ok(id);
    }

    let sort_order = next_folder_sort(conn)?;
    conn.execute(
        "INSERT INTO folders (name, sort_order, is_default) VALUES (?1, ?2, 1)",
        params![DEFAULT_FOLDER_NAME, sort_order],
    )?;
    let id = conn.last_insert_rowid();
    info!(folder_id = id, "created default folder");
    Ok(id)
}

/// List all folders ordered by `(sort_order, name)`.
pub async fn list_folders(db: &Database) -> Result<Vec<Folder>, SshlibError> {
    db.call(|conn| Ok(Ok(select_folders(conn)?))).await
}

/// Id of the default folder, created on first access.
pub async fn default_folder_id(db: &Database) -> Result<FolderId, SshlibError> {
    db.call(|conn| Ok(Ok(ensure_default_folder(conn)?))).await
}

/// Create a folder after the current last one.
///
/// `name` must already be trimmed and non-empty.
pub async fn create_folder(db: &Database, name: String) -> Result<Folder, SshlibError> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        if name_taken(&tx, &name, None)? {
            return Ok(Err(SshlibError::Validation(format!(
                "folder \"{name}\" already exists"
            ))));
        }
        let sort_order = next_folder_sort(&tx)?;
        tx.execute(
            "INSERT INTO folders (name, sort_order, is_default) VALUES (?1, ?2, 0)",
            params![name, sort_order],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        debug!(folder_id = id, "folder created");
        Ok(Ok(Folder {
            id,
            name,
            sort_order,
            is_default: false,
        }))
    })
    .await
}

/// Rename a folder. Returns `None` when the id is unknown.
///
/// The default folder keeps its name, and no other folder may take it.
pub async fn rename_folder(
    db: &Database,
    id: FolderId,
    name: String,
) -> Result<Option<Folder>, SshlibError> {
    if name == DEFAULT_FOLDER_NAME {
        return Err(SshlibError::InvalidOperation(format!(
            "\"{DEFAULT_FOLDER_NAME}\" is reserved for the default folder"
        )));
    }

    db.call(move |conn| {
        let tx = conn.transaction()?;
        let Some(folder) = select_folder(&tx, id)? else {
            return Ok(Ok(None));
        };
        if folder.is_default {
            return Ok(Err(SshlibError::InvalidOperation(
                "the default folder cannot be renamed".to_string(),
            )));
        }
        if name_taken(&tx, &name, Some(id))? {
            return Ok(Err(SshlibError::Validation(format!(
                "folder \"{name}\" already exists"
            ))));
        }
        tx.execute(
            "UPDATE folders SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        tx.commit()?;
        Ok(Ok(Some(Folder { name, ..folder })))
    })
    .await
}

/// Delete a folder, appending its connections to the default folder in their
/// current order. Returns `false` when the id is unknown.
pub async fn delete_folder(db: &Database, id: FolderId) -> Result<bool, SshlibError> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let default_id = ensure_default_folder(&tx)?;
        if id == default_id {
            return Ok(Err(SshlibError::InvalidOperation(
                "the default folder cannot be deleted".to_string(),
            )));
        }
        if select_folder(&tx, id)?.is_none() {
            return Ok(Ok(false));
        }

        let moved: Vec<i64> = {
            let mut stmt = tx.prepare(
                "SELECT id FROM connections WHERE folder_id = ?1 \
                 ORDER BY sort_order ASC, name ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![id], |row| row.get(0))?;
            rows.collect::<Result<_, _>>()?
        };

        let base = next_connection_sort(&tx, default_id)?;
        for (offset, connection_id) in moved.iter().enumerate() {
            tx.execute(
                "UPDATE connections SET folder_id = ?1, sort_order = ?2 WHERE id = ?3",
                params![default_id, base + offset as i64, connection_id],
            )?;
        }
        tx.execute("DELETE FROM folders WHERE id = ?1", params![id])?;
        tx.commit()?;

        info!(
            folder_id = id,
            moved = moved.len(),
            "folder deleted, connections moved to default"
        );
        Ok(Ok(true))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn default_folder_is_created_once() {
        let (db, _dir) = setup_db().await;
        let first = default_folder_id(&db).await.unwrap();
        let second = default_folder_id(&db).await.unwrap();
        assert_eq!(first, second);

        let folders = list_folders(&db).await.unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, DEFAULT_FOLDER_NAME);
        assert!(folders[0].is_default);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn legacy_unsorted_folder_is_adopted() {
        let (db, _dir) = setup_db().await;
        db.call(|conn| {
            conn.execute(
                "INSERT INTO folders (name, sort_order, is_default) VALUES ('Unsorted', 7, 0)",
                [],
            )?;
            Ok(Ok(conn.last_insert_rowid()))
        })
        .await
        .unwrap();

        let id = default_folder_id(&db).await.unwrap();
        let folders = list_folders(&db).await.unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id, id);
        assert!(folders[0].is_default);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_appends_and_rejects_duplicates() {
        let (db, _dir) = setup_db().await;
        default_folder_id(&db).await.unwrap();
        let prod = create_folder(&db, "Prod".into()).await.unwrap();
        let staging = create_folder(&db, "Staging".into()).await.unwrap();
        assert!(staging.sort_order > prod.sort_order);

        let err = create_folder(&db, "Prod".into()).await.unwrap_err();
        assert!(matches!(err, SshlibError::Validation(_)));

        let err = create_folder(&db, DEFAULT_FOLDER_NAME.into()).await.unwrap_err();
        assert!(matches!(err, SshlibError::Validation(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn rename_rules() {
        let (db, _dir) = setup_db().await;
        let default_id = default_folder_id(&db).await.unwrap();
        let prod = create_folder(&db, "Prod".into()).await.unwrap();
        create_folder(&db, "Staging".into()).await.unwrap();

        let renamed = rename_folder(&db, prod.id, "Production".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Production");
        assert_eq!(renamed.sort_order, prod.sort_order);

        assert!(matches!(
            rename_folder(&db, default_id, "Inbox".into()).await,
            Err(SshlibError::InvalidOperation(_))
        ));
        assert!(matches!(
            rename_folder(&db, prod.id, DEFAULT_FOLDER_NAME.into()).await,
            Err(SshlibError::InvalidOperation(_))
        ));
        assert!(matches!(
            rename_folder(&db, prod.id, "Staging".into()).await,
            Err(SshlibError::Validation(_))
        ));
        assert_eq!(rename_folder(&db, 999, "Ghost".into()).await.unwrap(), None);

        // Renaming to the current name is not a conflict.
        assert!(rename_folder(&db, prod.id, "Production".into())
            .await
            .unwrap()
            .is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_protects_default_and_reports_missing() {
        let (db, _dir) = setup_db().await;
        let default_id = default_folder_id(&db).await.unwrap();
        assert!(matches!(
            delete_folder(&db, default_id).await,
            Err(SshlibError::InvalidOperation(_))
        ));
        assert!(!delete_folder(&db, 4242).await.unwrap());

        let tmp = create_folder(&db, "Tmp".into()).await.unwrap();
        assert!(delete_folder(&db, tmp.id).await.unwrap());
        assert_eq!(list_folders(&db).await.unwrap().len(), 1);
        db.close().await.unwrap();
    }
}
