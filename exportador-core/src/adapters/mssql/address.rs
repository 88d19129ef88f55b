//! Server name parsing for SQL Server.
//!
//! Accepts the forms operators type into connection dialogs:
//! `host`, `host\instance`, `host,port`, plus the `.`/`(local)` aliases
//! and an optional `tcp:` prefix.

use crate::error::ExportError;

/// Where to reach a SQL Server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    /// Host name or IP address
    pub host: String,
    /// Named instance resolved through SQL Browser
    pub instance: Option<String>,
    /// TCP port; ignored by the driver when an instance name is set
    pub port: u16,
}

/// Parses a server name, using `default_port` when none is given.
///
/// # Errors
/// Returns a configuration error for an empty host or an invalid port.
pub fn parse_server(server: &str, default_port: u16) -> crate::Result<ServerAddress> {
    let trimmed = server.trim();
    let trimmed = trimmed
        .strip_prefix("tcp:")
        .or_else(|| trimmed.strip_prefix("TCP:"))
        .unwrap_or(trimmed);

    let (rest, port) = match trimmed.split_once(',') {
        Some((rest, port)) => {
            let port = port.trim().parse::<u16>().ok().filter(|p| *p > 0).ok_or_else(|| {
                ExportError::configuration(format!("Invalid port in server name '{server}'."))
            })?;
            (rest, port)
        }
        None => (trimmed, default_port),
    };

    let (host, instance) = match rest.split_once('\\') {
        Some((host, instance)) if !instance.trim().is_empty() => {
            (host, Some(instance.trim().to_string()))
        }
        Some((host, _)) => (host, None),
        None => (rest, None),
    };

    let host = match host.trim() {
        "." | "(local)" | "(localdb)" => "localhost",
        other => other,
    };

    if host.is_empty() {
        return Err(ExportError::configuration("Server name cannot be empty."));
    }

    Ok(ServerAddress {
        host: host.to_string(),
        instance,
        port,
    })
}
