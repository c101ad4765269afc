// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! sshlib - an encrypted library of SSH connection profiles.
//!
//! This is the binary entry point for the `sshlib` command.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod connections;
mod folders;
mod ssh;
mod transfer;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sshlib_config::model::SshlibConfig;
use sshlib_core::{ConnectionId, FolderId, SshlibError};
use sshlib_storage::SqliteStore;
use sshlib_vault::KeyProvider;
use tracing::error;

use crate::connections::ConnectionArgs;
use crate::folders::FolderCommand;

/// sshlib - an encrypted library of SSH connection profiles.
#[derive(Parser, Debug)]
#[command(name = "sshlib", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List folders and their connections.
    List {
        /// Output as JSON (passwords omitted).
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Show one connection.
    Show {
        id: ConnectionId,
        /// Print the password in clear text.
        #[arg(long)]
        reveal: bool,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a connection.
    Add(ConnectionArgs),
    /// Change fields of a connection.
    Edit {
        id: ConnectionId,
        #[command(flatten)]
        args: ConnectionArgs,
    },
    /// Remove a connection.
    Rm { id: ConnectionId },
    /// Set the order of connections in a folder, moving listed ones into it.
    Reorder {
        folder: FolderId,
        #[arg(required = true)]
        ids: Vec<ConnectionId>,
    },
    /// Manage folders.
    Folder {
        #[command(subcommand)]
        action: FolderCommand,
    },
    /// Print the SSH command for a connection.
    Ssh {
        id: ConnectionId,
        /// Port for a dynamic connection.
        #[arg(long)]
        port: Option<i64>,
        /// Print an ssh:// URL instead of a command line.
        #[arg(long)]
        url: bool,
    },
    /// Export the library as a passphrase-encrypted blob.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
    /// Replace the library with the contents of an export blob.
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => sshlib_config::load_and_validate_path(path),
        None => sshlib_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            sshlib_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let Some(command) = cli.command else {
        println!("sshlib: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, &config).await {
        if e.is_caller_facing() || matches!(e, SshlibError::Config(_)) {
            eprintln!("error: {e}");
        } else {
            // Storage and internal details stay in the log.
            error!(kind = e.kind(), error = %e, "command failed");
            eprintln!("error: {} failure, see log output for details", e.kind());
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &SshlibConfig) -> Result<(), SshlibError> {
    // The key must be settled (and persisted if new) before anything is encrypted.
    let cipher = KeyProvider::from_config(&config.vault)
        .resolve()?
        .into_cipher();
    let store = SqliteStore::open(&config.storage, cipher).await?;

    let result = dispatch(command, &store, config).await;
    store.close().await?;
    result
}

async fn dispatch(
    command: Commands,
    store: &SqliteStore,
    config: &SshlibConfig,
) -> Result<(), SshlibError> {
    match command {
        Commands::List { json, plain } => connections::run_list(store, json, plain).await,
        Commands::Show { id, reveal, json } => {
            connections::run_show(store, id, reveal, json).await
        }
        Commands::Add(args) => connections::run_add(store, args).await,
        Commands::Edit { id, args } => connections::run_edit(store, id, args).await,
        Commands::Rm { id } => connections::run_rm(store, id).await,
        Commands::Reorder { folder, ids } => connections::run_reorder(store, folder, &ids).await,
        Commands::Folder { action } => folders::run_folder(store, action).await,
        Commands::Ssh { id, port, url } => {
            connections::run_ssh(store, id, port, url, &config.ssh.relay_target).await
        }
        Commands::Export { out } => transfer::run_export(store, config, out.as_deref()).await,
        Commands::Import { file } => transfer::run_import(store, &file).await,
    }
}

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sshlib={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
