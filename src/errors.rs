// Error taxonomy for the Deluge JSON-RPC client
//
// Every failure the library can surface is one `RpcError` variant. The CLI
// adds user-friendly suggestions on top via `RpcError::hint`.

use std::fmt;

use thiserror::Error;

/// Result alias used across the library
pub type Result<T, E = RpcError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection parameters could not be parsed; the client cannot be built
    #[error("invalid connection parameters: {0}")]
    Configuration(String),

    /// The transport handle could not be created; fatal for the client instance
    #[error("unable to connect to Deluge: {0}")]
    Connection(String),

    /// The probe/login preamble could not establish an authenticated session
    #[error("session error: {0}")]
    Session(String),

    /// The HTTP exchange itself failed
    #[error("request failed: {0}")]
    Request(String),

    /// The response could not be correlated with its request
    #[error("invalid response: {0}")]
    Response(String),

    #[error("command {name} does not exist in namespace {namespace}")]
    UnknownCommand { name: String, namespace: String },

    #[error("namespace {name} does not exist in namespace {namespace}")]
    UnknownNamespace { name: String, namespace: String },

    /// The daemon reported an application-level error
    #[error("daemon returned error: {message} (code {code})")]
    Command { code: i64, message: String },
}

impl RpcError {
    pub(crate) fn unknown_command(name: impl fmt::Display, namespace: &str) -> Self {
        Self::UnknownCommand {
            name: name.to_string(),
            namespace: display_namespace(namespace),
        }
    }

    pub(crate) fn unknown_namespace(name: impl fmt::Display, namespace: &str) -> Self {
        Self::UnknownNamespace {
            name: name.to_string(),
            namespace: display_namespace(namespace),
        }
    }

    /// True for errors raised while addressing the command tree (no network I/O happened)
    pub fn is_addressing_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand { .. } | Self::UnknownNamespace { .. }
        )
    }

    /// Actionable suggestion for the user, if one applies
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Configuration(_) => Some(with_causes(
                &["Port is not a number", "Host contains invalid characters"],
                &["Check ~/.deluge-rpc/config.toml", "Pass --host and --port explicitly"],
            )),
            Self::Request(_) => Some(with_causes(
                &[
                    "deluge-web is not running",
                    "Wrong host or port",
                    "A firewall blocks the connection",
                ],
                &[
                    "Start the web UI: deluge-web",
                    "Default endpoint is http://localhost:8181/json",
                ],
            )),
            Self::Session(_) => Some(with_causes(
                &[
                    "Password is wrong or missing",
                    "Cookie file is not writable",
                ],
                &[
                    "Set DELUGE_PASSWORD or pass --password",
                    "Check permissions of the --cookie-path file",
                ],
            )),
            Self::UnknownCommand { .. } | Self::UnknownNamespace { .. } => Some(with_causes(
                &["The method is provided by a plugin that is not enabled"],
                &["List available methods: deluge-rpc methods"],
            )),
            Self::Connection(_) | Self::Response(_) | Self::Command { .. } => None,
        }
    }
}

fn display_namespace(namespace: &str) -> String {
    if namespace.is_empty() {
        "root".to_string()
    } else {
        namespace.to_string()
    }
}

fn with_causes(causes: &[&str], tries: &[&str]) -> String {
    let mut out = String::from("\x1b[1;33mPossible causes:\x1b[0m\n");
    for cause in causes {
        out.push_str(&format!("• {}\n", cause));
    }
    out.push_str("\n\x1b[1;32mTry:\x1b[0m\n");
    for (i, step) in tries.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, step));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_names_root() {
        let err = RpcError::unknown_command("get_torrents", "");
        assert_eq!(
            err.to_string(),
            "command get_torrents does not exist in namespace root"
        );
        assert!(err.is_addressing_error());
    }

    #[test]
    fn test_unknown_namespace_names_path() {
        let err = RpcError::unknown_namespace("missing", "core.stats");
        assert!(err.to_string().contains("namespace core.stats"));
    }

    #[test]
    fn test_request_error_has_helpful_hint() {
        let hint = RpcError::Request("connection refused".into()).hint().unwrap();
        assert!(hint.contains("deluge-web"));
        assert!(hint.contains("8181"));
    }

    #[test]
    fn test_command_error_has_no_hint() {
        let err = RpcError::Command {
            code: 4,
            message: "Torrent already in session".into(),
        };
        assert!(err.hint().is_none());
        assert!(err.to_string().contains("code 4"));
    }
}
