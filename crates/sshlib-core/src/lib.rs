// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the SSH connection library.
//!
//! Defines the shared error taxonomy, the folder/connection domain types with
//! their input validation, and the [`ConnectionStore`] trait implemented by the
//! storage crate and consumed by the transfer codec and the CLI.

pub mod error;
pub mod traits;
pub mod types;

pub use error::SshlibError;
pub use traits::ConnectionStore;
pub use types::{
    Connection, ConnectionDraft, ConnectionId, ConnectionInput, DEFAULT_FOLDER_NAME, Dataset,
    DatasetReplacement, Folder, FolderId, MAX_POSITION,
};
