// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection subcommands: `list`, `show`, `add`, `edit`, `rm`, `reorder`, `ssh`.

use std::io::IsTerminal;

use clap::Args;
use colored::Colorize;
use sshlib_core::{
    Connection, ConnectionId, ConnectionInput, ConnectionStore, Folder, FolderId, SshlibError,
};
use sshlib_vault::prompt_password;

use crate::ssh::SshTarget;

/// Field flags shared by `add` and `edit`.
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Display name.
    #[arg(long)]
    pub name: Option<String>,
    /// Host name or address.
    #[arg(long)]
    pub host: Option<String>,
    /// Login user name.
    #[arg(long, short = 'u')]
    pub user: Option<String>,
    /// Fixed SSH port.
    #[arg(long, short = 'p')]
    pub port: Option<i64>,
    /// The port is supplied at connect time through the relay.
    #[arg(long, conflicts_with = "fixed")]
    pub dynamic: bool,
    /// Switch a dynamic connection back to a fixed port.
    #[arg(long)]
    pub fixed: bool,
    /// Target folder id (default folder when omitted on add).
    #[arg(long)]
    pub folder: Option<FolderId>,
    /// Position within the folder.
    #[arg(long)]
    pub sort_order: Option<i64>,
    /// Prompt for the connection password.
    #[arg(long)]
    pub ask_password: bool,
}

impl ConnectionArgs {
    fn password(&self) -> Result<Option<String>, SshlibError> {
        if self.ask_password {
            prompt_password("Connection password").map(Some)
        } else {
            Ok(None)
        }
    }

    /// Input for a new connection; missing fields are left for validation to reject.
    pub fn into_new_input(self) -> Result<ConnectionInput, SshlibError> {
        let password = self.password()?.unwrap_or_default();
        Ok(ConnectionInput {
            name: self.name.unwrap_or_default(),
            host: self.host.unwrap_or_default(),
            username: self.user.unwrap_or_default(),
            password,
            port: self.port,
            port_is_dynamic: self.dynamic,
            folder_id: self.folder,
            sort_order: self.sort_order,
        })
    }

    /// Input that overwrites only the flags that were given.
    pub fn merge_into(self, existing: Connection) -> Result<ConnectionInput, SshlibError> {
        let password = self.password()?.unwrap_or(existing.password);
        let port_is_dynamic = if self.dynamic {
            true
        } else if self.fixed {
            false
        } else {
            existing.port_is_dynamic
        };
        Ok(ConnectionInput {
            name: self.name.unwrap_or(existing.name),
            host: self.host.unwrap_or(existing.host),
            username: self.user.unwrap_or(existing.username),
            password,
            port: self.port.or(existing.port.map(i64::from)),
            port_is_dynamic,
            folder_id: Some(self.folder.unwrap_or(existing.folder_id)),
            sort_order: self.sort_order.or(Some(existing.sort_order)),
        })
    }
}

fn not_found(id: ConnectionId) -> SshlibError {
    SshlibError::Validation(format!("connection {id} not found"))
}

fn endpoint(conn: &Connection) -> String {
    match conn.port {
        Some(port) if !conn.port_is_dynamic => format!("{}@{}:{port}", conn.username, conn.host),
        _ => format!("{}@{} (dynamic port)", conn.username, conn.host),
    }
}

/// Serialize a connection for `--json`, dropping the password unless revealed.
fn to_json(conn: &Connection, reveal: bool) -> Result<serde_json::Value, SshlibError> {
    let mut value = serde_json::to_value(conn)
        .map_err(|e| SshlibError::Internal(format!("failed to serialize connection: {e}")))?;
    if !reveal && let Some(object) = value.as_object_mut() {
        object.remove("password");
    }
    Ok(value)
}

fn pretty(value: &serde_json::Value) -> Result<String, SshlibError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SshlibError::Internal(format!("failed to serialize output: {e}")))
}

/// Render the folder tree as text lines.
pub fn render_tree(folders: &[Folder], connections: &[Connection], color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for folder in folders {
        let header = format!("{} [{}]", folder.name, folder.id);
        lines.push(if color {
            header.bold().to_string()
        } else {
            header
        });
        for conn in connections.iter().filter(|c| c.folder_id == folder.id) {
            let detail = endpoint(conn);
            let detail = if color {
                detail.dimmed().to_string()
            } else {
                detail
            };
            lines.push(format!("  {:>4}  {}  {detail}", conn.id, conn.name));
        }
    }
    lines
}

/// Run `sshlib list`.
pub async fn run_list(
    store: &dyn ConnectionStore,
    json: bool,
    plain: bool,
) -> Result<(), SshlibError> {
    let dataset = store.snapshot().await?;
    if json {
        let connections = dataset
            .connections
            .iter()
            .map(|c| to_json(c, false))
            .collect::<Result<Vec<_>, _>>()?;
        let out = serde_json::json!({
            "folders": dataset.folders,
            "connections": connections,
        });
        println!("{}", pretty(&out)?);
        return Ok(());
    }

    let color = !plain && std::io::stdout().is_terminal();
    for line in render_tree(&dataset.folders, &dataset.connections, color) {
        println!("{line}");
    }
    Ok(())
}

/// Run `sshlib show <id>`.
pub async fn run_show(
    store: &dyn ConnectionStore,
    id: ConnectionId,
    reveal: bool,
    json: bool,
) -> Result<(), SshlibError> {
    let conn = store.get_connection(id).await?.ok_or_else(|| not_found(id))?;
    if json {
        let value = to_json(&conn, reveal)?;
        println!("{}", pretty(&value)?);
        return Ok(());
    }

    println!("id:        {}", conn.id);
    println!("name:      {}", conn.name);
    println!("host:      {}", conn.host);
    println!("username:  {}", conn.username);
    println!(
        "password:  {}",
        if reveal { conn.password.as_str() } else { "********" }
    );
    match conn.port {
        Some(port) if !conn.port_is_dynamic => println!("port:      {port}"),
        _ => println!("port:      dynamic"),
    }
    println!("folder:    {}", conn.folder_id);
    println!("order:     {}", conn.sort_order);
    Ok(())
}

/// Run `sshlib add`.
pub async fn run_add(store: &dyn ConnectionStore, args: ConnectionArgs) -> Result<(), SshlibError> {
    let conn = store.create_connection(args.into_new_input()?).await?;
    eprintln!("Added connection {} ({})", conn.id, conn.name);
    println!("{}", conn.id);
    Ok(())
}

/// Run `sshlib edit <id>`.
pub async fn run_edit(
    store: &dyn ConnectionStore,
    id: ConnectionId,
    args: ConnectionArgs,
) -> Result<(), SshlibError> {
    let existing = store.get_connection(id).await?.ok_or_else(|| not_found(id))?;
    let input = args.merge_into(existing)?;
    let conn = store
        .update_connection(id, input)
        .await?
        .ok_or_else(|| not_found(id))?;
    eprintln!("Updated connection {} ({})", conn.id, conn.name);
    Ok(())
}

/// Run `sshlib rm <id>`.
pub async fn run_rm(store: &dyn ConnectionStore, id: ConnectionId) -> Result<(), SshlibError> {
    if !store.delete_connection(id).await? {
        return Err(not_found(id));
    }
    eprintln!("Removed connection {id}");
    Ok(())
}

/// Run `sshlib reorder <folder> <ids>...`.
pub async fn run_reorder(
    store: &dyn ConnectionStore,
    folder_id: FolderId,
    ids: &[ConnectionId],
) -> Result<(), SshlibError> {
    store.reorder_connections(folder_id, ids).await?;
    eprintln!("Reordered {} connection(s) in folder {folder_id}", ids.len());
    Ok(())
}

/// Run `sshlib ssh <id>`.
pub async fn run_ssh(
    store: &dyn ConnectionStore,
    id: ConnectionId,
    port: Option<i64>,
    url: bool,
    relay_target: &str,
) -> Result<(), SshlibError> {
    let conn = store.get_connection(id).await?.ok_or_else(|| not_found(id))?;
    let target = SshTarget::for_connection(&conn, port)?;
    if url {
        println!("{}", target.url());
    } else {
        println!("{}", target.command(relay_target));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> Connection {
        Connection {
            id: 3,
            name: "web1".into(),
            host: "10.0.0.5".into(),
            username: "root".into(),
            password: "s3cret".into(),
            port: Some(22),
            port_is_dynamic: false,
            folder_id: 2,
            sort_order: 4,
        }
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let args = ConnectionArgs {
            host: Some("10.0.0.6".into()),
            ..ConnectionArgs::default()
        };
        let input = args.merge_into(existing()).unwrap();
        assert_eq!(input.host, "10.0.0.6");
        assert_eq!(input.name, "web1");
        assert_eq!(input.password, "s3cret");
        assert_eq!(input.port, Some(22));
        assert_eq!(input.folder_id, Some(2));
        assert_eq!(input.sort_order, Some(4));
    }

    #[test]
    fn merge_switches_port_mode() {
        let args = ConnectionArgs {
            dynamic: true,
            ..ConnectionArgs::default()
        };
        assert!(args.merge_into(existing()).unwrap().port_is_dynamic);

        let mut dynamic = existing();
        dynamic.port_is_dynamic = true;
        dynamic.port = None;
        let args = ConnectionArgs {
            fixed: true,
            port: Some(2200),
            ..ConnectionArgs::default()
        };
        let input = args.merge_into(dynamic).unwrap();
        assert!(!input.port_is_dynamic);
        assert_eq!(input.port, Some(2200));
    }

    #[test]
    fn new_input_leaves_blanks_for_validation() {
        let input = ConnectionArgs::default().into_new_input().unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn json_hides_password_unless_revealed() {
        let hidden = to_json(&existing(), false).unwrap();
        assert!(hidden.get("password").is_none());
        assert_eq!(hidden["portIsDynamic"], false);
        let shown = to_json(&existing(), true).unwrap();
        assert_eq!(shown["password"], "s3cret");
    }

    #[test]
    fn show_json_output_is_pretty_and_hides_password() {
        let text = pretty(&to_json(&existing(), false).unwrap()).unwrap();
        assert!(text.starts_with("{\n"), "{text}");
        assert!(text.contains("\"name\": \"web1\""), "{text}");
        assert!(!text.contains("s3cret"));
    }

    #[test]
    fn tree_groups_connections_under_folders() {
        let folders = vec![
            Folder {
                id: 1,
                name: "Unsorted".into(),
                sort_order: 1,
                is_default: true,
            },
            Folder {
                id: 2,
                name: "Prod".into(),
                sort_order: 2,
                is_default: false,
            },
        ];
        let lines = render_tree(&folders, &[existing()], false);
        assert_eq!(lines[0], "Unsorted [1]");
        assert_eq!(lines[1], "Prod [2]");
        assert_eq!(lines[2], "     3  web1  root@10.0.0.5:22");
    }
}
