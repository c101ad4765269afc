// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sshlib folder` subcommands.

use clap::Subcommand;
use sshlib_core::{ConnectionStore, FolderId, SshlibError};

/// Folder management actions.
#[derive(Subcommand, Debug)]
pub enum FolderCommand {
    /// List folders in display order.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Create a folder at the end of the list.
    Add { name: String },
    /// Rename a folder.
    Rename { id: FolderId, name: String },
    /// Delete a folder; its connections move to the default folder.
    Rm { id: FolderId },
}

/// Run a `sshlib folder` action.
pub async fn run_folder(
    store: &dyn ConnectionStore,
    command: FolderCommand,
) -> Result<(), SshlibError> {
    match command {
        FolderCommand::List { json } => {
            let folders = store.list_folders().await?;
            if json {
                let out = serde_json::to_string_pretty(&folders).map_err(|e| {
                    SshlibError::Internal(format!("failed to serialize folders: {e}"))
                })?;
                println!("{out}");
            } else {
                for folder in folders {
                    let marker = if folder.is_default { " (default)" } else { "" };
                    println!("{:>4}  {}{marker}", folder.id, folder.name);
                }
            }
        }
        FolderCommand::Add { name } => {
            let folder = store.create_folder(&name).await?;
            eprintln!("Created folder {} ({})", folder.id, folder.name);
            println!("{}", folder.id);
        }
        FolderCommand::Rename { id, name } => {
            let folder = store
                .update_folder(id, &name)
                .await?
                .ok_or_else(|| SshlibError::Validation(format!("folder {id} not found")))?;
            eprintln!("Renamed folder {} to {}", folder.id, folder.name);
        }
        FolderCommand::Rm { id } => {
            if !store.delete_folder(id).await? {
                return Err(SshlibError::Validation(format!("folder {id} not found")));
            }
            eprintln!("Deleted folder {id}");
        }
    }
    Ok(())
}
