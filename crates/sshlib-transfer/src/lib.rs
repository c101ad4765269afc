// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-protected export and import for the SSH connection library.
//!
//! [`DatasetCodec::export`] seals a full snapshot into an [`ExportBlob`];
//! [`DatasetCodec::import`] opens one, repairs folder references and replaces
//! the store in a single transaction.

pub mod blob;
pub mod codec;
mod normalize;

pub use blob::{BLOB_VERSION, ExportBlob};
pub use codec::DatasetCodec;
