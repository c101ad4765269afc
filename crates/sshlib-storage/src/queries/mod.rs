// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for folder and connection rows.

pub mod connections;
pub mod dataset;
pub mod folders;
