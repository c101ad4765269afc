// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the credential store and its consumers.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod store;

pub use store::ConnectionStore;
