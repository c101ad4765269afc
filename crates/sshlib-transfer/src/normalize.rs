// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation and referential repair of a decrypted import payload.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use sshlib_core::types::{
    ConnectionInput, DEFAULT_FOLDER_NAME, DatasetReplacement, Folder, FolderId, MAX_POSITION,
    validate_folder_name,
};
use sshlib_core::SshlibError;
use tracing::debug;

/// The decrypted payload. Both collections must be present.
#[derive(Debug, Deserialize)]
pub(crate) struct Payload {
    folders: Vec<FolderEntry>,
    connections: Vec<ConnectionInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderEntry {
    #[serde(default)]
    id: Option<FolderId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sort_order: Option<i64>,
}

impl Payload {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self, SshlibError> {
        serde_json::from_slice(bytes)
            .map_err(|e| SshlibError::Validation(format!("import payload is malformed: {e}")))
    }
}

/// Turn a payload into a replacement set the store can write as is.
///
/// Folder ids that are positive and unique are kept; others are reassigned
/// above the largest kept id. The folder named [`DEFAULT_FOLDER_NAME`]
/// becomes the default and is appended when missing. Connections referencing
/// an unknown folder are moved to the default folder.
pub(crate) fn normalize(payload: Payload) -> Result<DatasetReplacement, SshlibError> {
    let mut names = HashSet::new();
    let mut taken_ids = HashSet::new();
    let mut staged = Vec::with_capacity(payload.folders.len() + 1);

    for (index, entry) in payload.folders.into_iter().enumerate() {
        let name = validate_folder_name(&entry.name)
            .map_err(|_| SshlibError::Validation(format!("folder #{} has no name", index + 1)))?;
        if !names.insert(name.clone()) {
            return Err(SshlibError::Validation(format!(
                "folder \"{name}\" appears more than once"
            )));
        }
        let kept_id = entry
            .id
            .filter(|id| in_range(*id) && taken_ids.insert(*id));
        staged.push((entry.id, kept_id, name, entry.sort_order.filter(|s| in_range(*s))));
    }

    // Kept values are bounded, so counting up from them cannot overflow.
    let mut next_id = taken_ids.iter().copied().max().unwrap_or(0) + 1;
    let mut next_sort = staged
        .iter()
        .filter_map(|(_, _, _, sort)| *sort)
        .max()
        .unwrap_or(0)
        + 1;

    // Imported ids that the normalized set still answers to.
    let mut id_map: HashMap<FolderId, FolderId> = HashMap::new();
    let mut folders = Vec::with_capacity(staged.len() + 1);
    for (original, kept, name, sort_order) in staged {
        let id = kept.unwrap_or_else(|| {
            let id = next_id;
            next_id += 1;
            id
        });
        if let Some(original) = original {
            id_map.entry(original).or_insert(id);
        }
        let sort_order = sort_order.unwrap_or_else(|| {
            let sort = next_sort;
            next_sort += 1;
            sort
        });
        folders.push(Folder {
            is_default: name == DEFAULT_FOLDER_NAME,
            id,
            name,
            sort_order,
        });
    }

    let existing_default = folders.iter().find(|f| f.is_default).map(|f| f.id);
    let default_id = match existing_default {
        Some(id) => id,
        None => {
            folders.push(Folder {
                id: next_id,
                name: DEFAULT_FOLDER_NAME.to_string(),
                sort_order: next_sort,
                is_default: true,
            });
            debug!(folder_id = next_id, "import payload lacked a default folder");
            next_id
        }
    };

    let mut repaired = 0usize;
    let mut connections = Vec::with_capacity(payload.connections.len());
    for (index, input) in payload.connections.into_iter().enumerate() {
        let mut draft = input.validate().map_err(|e| match e {
            SshlibError::Validation(reason) => {
                SshlibError::Validation(format!("connection #{}: {reason}", index + 1))
            }
            other => other,
        })?;
        let folder_id = draft.folder_id.and_then(|id| id_map.get(&id).copied());
        if folder_id.is_none() {
            repaired += 1;
        }
        draft.folder_id = Some(folder_id.unwrap_or(default_id));
        connections.push(draft);
    }

    debug!(
        folders = folders.len(),
        connections = connections.len(),
        repaired,
        "import payload normalized"
    );
    Ok(DatasetReplacement {
        folders,
        connections,
    })
}

fn in_range(value: i64) -> bool {
    (1..=MAX_POSITION).contains(&value)
}
