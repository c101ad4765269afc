// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `sshlib` binary.
//!
//! Each test gets its own temp directory holding the config, database and key
//! file. Tests are independent and order-insensitive.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = format!(
            "[app]\nlog_level = \"warn\"\n\n\
             [storage]\ndatabase_path = \"{db}\"\n\n\
             [vault]\nkey_file = \"{key}\"\nkdf_memory_cost = 32768\nkdf_iterations = 2\nkdf_parallelism = 1\n\n\
             [ssh]\nrelay_target = \"ops@relay\"\n",
            db = dir.path().join("data").join("library.sqlite").display(),
            key = dir.path().join("data").join("key").display(),
        );
        std::fs::write(dir.path().join("sshlib.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_with_passphrase(args, None)
    }

    fn run_with_passphrase(&self, args: &[&str], passphrase: Option<&str>) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sshlib"));
        cmd.current_dir(self.dir.path())
            .arg("--config")
            .arg(self.path("sshlib.toml"))
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("SSHLIB_PASSPHRASE");
        if let Some(passphrase) = passphrase {
            cmd.env("SSHLIB_PASSPHRASE", passphrase);
        }
        cmd.output().unwrap()
    }

    fn ok(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "sshlib {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8(out.stdout).unwrap()
    }
}

fn stdout_json(out: &str) -> serde_json::Value {
    serde_json::from_str(out).unwrap()
}

fn add_web1(ws: &Workspace, folder: &str) -> String {
    ws.ok(&[
        "add", "--name", "web1", "--host", "10.0.0.5", "--user", "root", "--port", "22",
        "--folder", folder,
    ])
    .trim()
    .to_string()
}

#[test]
fn first_run_generates_key_and_default_folder() {
    let ws = Workspace::new();
    let out = ws.ok(&["folder", "list", "--json"]);
    let folders = stdout_json(&out);
    assert_eq!(folders[0]["name"], "Unsorted");
    assert_eq!(folders[0]["isDefault"], true);
    assert!(ws.path("data/key").exists());
}

#[test]
fn add_list_show_and_ssh() {
    let ws = Workspace::new();
    let prod = ws.ok(&["folder", "add", "Prod"]).trim().to_string();
    let id = add_web1(&ws, &prod);

    let listing = stdout_json(&ws.ok(&["list", "--json"]));
    let conn = &listing["connections"][0];
    assert_eq!(conn["name"], "web1");
    assert_eq!(conn["host"], "10.0.0.5");
    assert!(conn.get("password").is_none());

    let shown = ws.ok(&["show", &id]);
    assert!(shown.contains("********"));

    assert_eq!(ws.ok(&["ssh", &id]).trim(), "ssh root@10.0.0.5 -p 22");
    assert_eq!(ws.ok(&["ssh", &id, "--url"]).trim(), "ssh://root@10.0.0.5:22");
}

#[test]
fn dynamic_connection_uses_relay() {
    let ws = Workspace::new();
    let id = ws
        .ok(&["add", "--name", "tunnel", "--host", "box", "--user", "pi", "--dynamic"])
        .trim()
        .to_string();
    assert_eq!(
        ws.ok(&["ssh", &id, "--port", "40022"]).trim(),
        "ssh -p 40022 ops@relay"
    );
    assert!(!ws.run(&["ssh", &id]).status.success());
}

#[test]
fn database_holds_no_cleartext_secrets() {
    let ws = Workspace::new();
    add_web1(&ws, "1");
    let bytes = std::fs::read(ws.path("data/library.sqlite")).unwrap();
    let haystack = String::from_utf8_lossy(&bytes);
    assert!(haystack.contains("web1"));
    assert!(!haystack.contains("10.0.0.5"));
}

#[test]
fn invalid_input_is_rejected() {
    let ws = Workspace::new();
    let out = ws.run(&["add", "--name", "x", "--host", "h", "--user", "u", "--port", "0"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("validation error"));

    let out = ws.run(&["folder", "rm", "1"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid operation"));
}

#[test]
fn export_import_round_trip_between_workspaces() {
    let source = Workspace::new();
    let prod = source.ok(&["folder", "add", "Prod"]).trim().to_string();
    add_web1(&source, &prod);

    let blob_path = source.path("backup.json");
    let out = source.run_with_passphrase(
        &["export", "--out", blob_path.to_str().unwrap()],
        Some("p@ss"),
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let blob = stdout_json(&std::fs::read_to_string(&blob_path).unwrap());
    assert_eq!(blob["version"], 1);

    let target = Workspace::new();
    let import = |pass: &str| {
        target.run_with_passphrase(&["import", blob_path.to_str().unwrap()], Some(pass))
    };
    assert!(!import("wrong").status.success());
    assert!(import("p@ss").status.success());

    let listing = stdout_json(&target.ok(&["list", "--json"]));
    assert_eq!(listing["connections"][0]["host"], "10.0.0.5");
    assert_eq!(listing["folders"][1]["name"], "Prod");
}

#[test]
fn export_without_passphrase_fails_non_interactively() {
    let ws = Workspace::new();
    let out = ws.run(&["export"]);
    assert!(!out.status.success());
}

#[test]
fn config_errors_exit_nonzero() {
    let ws = Workspace::new();
    std::fs::write(ws.path("bad.toml"), "[vault]\nkey_fiel = \"x\"\n").unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_sshlib"))
        .current_dir(ws.dir.path())
        .args(["--config", ws.path("bad.toml").to_str().unwrap(), "list"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}
