// SPDX-FileCopyrightText: 2026 SSH Library Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSH command and URL construction for a decrypted connection.
//!
//! Pure formatting: nothing here opens a network connection.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sshlib_core::{Connection, SshlibError};

/// Characters left unescaped in the userinfo part of an `ssh://` URL.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A resolved SSH endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub username: String,
    pub host: String,
    pub port: u16,
    pub dynamic: bool,
}

impl SshTarget {
    /// Resolve the endpoint for `connection`.
    ///
    /// Dynamic connections take their port from `requested_port`; static ones
    /// use the stored port and ignore the request.
    pub fn for_connection(
        connection: &Connection,
        requested_port: Option<i64>,
    ) -> Result<Self, SshlibError> {
        let port = if connection.port_is_dynamic {
            requested_port.and_then(|p| u16::try_from(p).ok())
        } else {
            connection.port
        };
        let port = port.filter(|p| *p > 0).ok_or_else(|| {
            SshlibError::Validation(if connection.port_is_dynamic {
                "a port between 1 and 65535 is required for a dynamic connection".to_string()
            } else {
                "connection has no valid port".to_string()
            })
        })?;

        Ok(Self {
            username: connection.username.clone(),
            host: sanitize_host(&connection.host),
            port,
            dynamic: connection.port_is_dynamic,
        })
    }

    /// `ssh://user@host:port` with the username percent-encoded.
    pub fn url(&self) -> String {
        format!(
            "ssh://{}@{}:{}",
            utf8_percent_encode(&self.username, USERINFO),
            self.host,
            self.port
        )
    }

    /// The shell command to connect.
    ///
    /// Dynamic ports are reverse tunnels reached through `relay_target`.
    pub fn command(&self, relay_target: &str) -> String {
        if self.dynamic {
            format!("ssh -p {} {relay_target}", self.port)
        } else {
            format!("ssh {}@{} -p {}", self.username, self.host, self.port)
        }
    }
}

/// Reduce a pasted host to its bare name: drop any `scheme://`, path and port.
pub fn sanitize_host(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    let without_path = without_scheme.split('/').next().unwrap_or_default();
    without_path
        .split(':')
        .next()
        .unwrap_or_default()
        .to_string()
}
