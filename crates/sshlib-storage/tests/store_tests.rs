// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the encrypted SQLite connection store.

use sshlib_config::model::StorageConfig;
use sshlib_core::{ConnectionInput, ConnectionStore, DEFAULT_FOLDER_NAME, SshlibError};
use sshlib_storage::SqliteStore;
use sshlib_vault::FieldCipher;
use sshlib_vault::crypto::generate_random_key;
use tempfile::TempDir;

fn config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        database_path: dir.path().join("library.sqlite").display().to_string(),
        wal_mode: true,
    }
}

fn cipher() -> FieldCipher {
    FieldCipher::new(generate_random_key().unwrap())
}

async fn open_store() -> (SqliteStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&config(&dir), cipher()).await.unwrap();
    (store, dir)
}

fn web1(folder_id: Option<i64>) -> ConnectionInput {
    ConnectionInput {
        name: "web1".into(),
        host: "10.0.0.5".into(),
        username: "root".into(),
        password: "s3cret".into(),
        port: Some(22),
        port_is_dynamic: false,
        folder_id,
        sort_order: None,
    }
}

#[tokio::test]
async fn open_creates_default_folder() {
    let (store, _dir) = open_store().await;
    let folders = store.list_folders().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, DEFAULT_FOLDER_NAME);
    assert_eq!(store.default_folder_id().await.unwrap(), folders[0].id);
    store.close().await.unwrap();
}

#[tokio::test]
async fn secrets_are_encrypted_at_rest() {
    let (store, _dir) = open_store().await;
    let created = store.create_connection(web1(None)).await.unwrap();
    assert_eq!(created.host, "10.0.0.5");
    assert_eq!(created.password, "s3cret");

    let raw: (String, String, String, String) = store
        .database()
        .call(|conn| {
            Ok(Ok(conn.query_row(
                "SELECT name, host_enc, username_enc, password_enc FROM connections",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?))
        })
        .await
        .unwrap();
    assert_eq!(raw.0, "web1");
    for (column, plaintext) in [(&raw.1, "10.0.0.5"), (&raw.2, "root"), (&raw.3, "s3cret")] {
        assert!(!column.contains(plaintext), "{column} leaks {plaintext}");
    }

    let fetched = store.get_connection(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
    store.close().await.unwrap();
}

#[tokio::test]
async fn reopen_with_same_key_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let cipher = cipher();

    let store = SqliteStore::open(&config(&dir), cipher.clone()).await.unwrap();
    let id = store.create_connection(web1(None)).await.unwrap().id;
    store.close().await.unwrap();

    let store = SqliteStore::open(&config(&dir), cipher).await.unwrap();
    let conn = store.get_connection(id).await.unwrap().unwrap();
    assert_eq!(conn.username, "root");
    store.close().await.unwrap();
}

#[tokio::test]
async fn reading_with_another_key_fails_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&config(&dir), cipher()).await.unwrap();
    store.create_connection(web1(None)).await.unwrap();
    store.close().await.unwrap();

    let store = SqliteStore::open(&config(&dir), cipher()).await.unwrap();
    assert!(matches!(
        store.list_connections().await,
        Err(SshlibError::Authentication(_))
    ));
    store.close().await.unwrap();
}

#[tokio::test]
async fn validation_happens_before_storage() {
    let (store, _dir) = open_store().await;
    let mut input = web1(None);
    input.port = Some(0);
    assert!(matches!(
        store.create_connection(input).await,
        Err(SshlibError::Validation(_))
    ));
    assert!(matches!(
        store.create_folder("   ").await,
        Err(SshlibError::Validation(_))
    ));
    assert!(store.list_connections().await.unwrap().is_empty());
    store.close().await.unwrap();
}

#[tokio::test]
async fn dynamic_connection_has_no_port() {
    let (store, _dir) = open_store().await;
    let mut input = web1(None);
    input.port_is_dynamic = true;
    input.port = Some(2222);
    let conn = store.create_connection(input).await.unwrap();
    assert_eq!(conn.port, None);
    assert!(conn.port_is_dynamic);
    store.close().await.unwrap();
}

#[tokio::test]
async fn folder_lifecycle_keeps_connections() {
    let (store, _dir) = open_store().await;
    let default_id = store.default_folder_id().await.unwrap();
    let prod = store.create_folder("  Prod ").await.unwrap();
    assert_eq!(prod.name, "Prod");

    let a = store.create_connection(web1(Some(prod.id))).await.unwrap();
    let mut other = web1(Some(prod.id));
    other.name = "db1".into();
    let b = store.create_connection(other).await.unwrap();

    store.reorder_connections(prod.id, &[b.id, a.id]).await.unwrap();
    let ordered: Vec<_> = store
        .list_connections()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(ordered, vec!["db1", "web1"]);

    let renamed = store.update_folder(prod.id, "Production").await.unwrap().unwrap();
    assert_eq!(renamed.name, "Production");

    assert!(store.delete_folder(prod.id).await.unwrap());
    let after = store.list_connections().await.unwrap();
    assert_eq!(after.len(), 2);
    assert!(after.iter().all(|c| c.folder_id == default_id));
    assert_eq!(after[0].name, "db1");

    assert!(matches!(
        store.delete_folder(default_id).await,
        Err(SshlibError::InvalidOperation(_))
    ));
    store.close().await.unwrap();
}

#[tokio::test]
async fn update_and_delete_unknown_ids() {
    let (store, _dir) = open_store().await;
    assert!(store.update_connection(404, web1(None)).await.unwrap().is_none());
    assert!(!store.delete_connection(404).await.unwrap());
    assert!(store.update_folder(404, "x").await.unwrap().is_none());
    assert!(!store.delete_folder(404).await.unwrap());
    assert!(store.get_connection(404).await.unwrap().is_none());
    store.close().await.unwrap();
}

#[tokio::test]
async fn update_reencrypts_secrets() {
    let (store, _dir) = open_store().await;
    let created = store.create_connection(web1(None)).await.unwrap();
    let mut input = web1(None);
    input.password = "rotated".into();
    let updated = store
        .update_connection(created.id, input)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.password, "rotated");
    assert_eq!(updated.sort_order, created.sort_order);
    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.connections[0].password, "rotated");
    store.close().await.unwrap();
}

#[tokio::test]
async fn oversized_sort_order_is_replaced_with_next_slot() {
    let (store, _dir) = open_store().await;
    let prod = store.create_folder("Prod").await.unwrap();

    let mut pinned = web1(Some(prod.id));
    pinned.sort_order = Some(i64::MAX);
    let first = store.create_connection(pinned).await.unwrap();
    assert_eq!(first.sort_order, 1);

    let second = store.create_connection(web1(Some(prod.id))).await.unwrap();
    assert_eq!(second.sort_order, 2);

    store.create_connection(web1(None)).await.unwrap();
    assert!(store.delete_folder(prod.id).await.unwrap());
    let orders: Vec<_> = store
        .list_connections()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.sort_order)
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
    store.close().await.unwrap();
}
