// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sshlib export` and `sshlib import` command implementations.
//!
//! The passphrase comes from `SSHLIB_PASSPHRASE` or an interactive prompt.

use std::path::Path;

use sshlib_config::model::SshlibConfig;
use sshlib_core::{ConnectionStore, SshlibError};
use sshlib_transfer::{DatasetCodec, ExportBlob};
use sshlib_vault::{KdfParams, get_passphrase, get_passphrase_with_confirm};

fn io_err(path: &Path, e: std::io::Error) -> SshlibError {
    SshlibError::Validation(format!("{}: {e}", path.display()))
}

/// Run `sshlib export`, writing the blob to `out` or stdout.
pub async fn run_export(
    store: &dyn ConnectionStore,
    config: &SshlibConfig,
    out: Option<&Path>,
) -> Result<(), SshlibError> {
    let passphrase = get_passphrase_with_confirm("Export passphrase")?;
    let codec = DatasetCodec::new(KdfParams::from_config(&config.vault));
    let json = codec.export(store, &passphrase).await?.to_json_pretty()?;

    match out {
        Some(path) => {
            std::fs::write(path, format!("{json}\n")).map_err(|e| io_err(path, e))?;
            eprintln!("Export written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Run `sshlib import <file>`, replacing the whole library.
pub async fn run_import(store: &dyn ConnectionStore, file: &Path) -> Result<(), SshlibError> {
    let text = std::fs::read_to_string(file).map_err(|e| io_err(file, e))?;
    let blob = ExportBlob::from_json(&text)?;
    let passphrase = get_passphrase("Import passphrase")?;

    let dataset = DatasetCodec::default().import(store, &passphrase, &blob).await?;
    eprintln!(
        "Import complete: {} folder(s), {} connection(s)",
        dataset.folders.len(),
        dataset.connections.len()
    );
    Ok(())
}
