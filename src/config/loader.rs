// Configuration loader
// Loads connection parameters from ~/.deluge-rpc/config.toml and the environment

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::ConnectionParameters;

/// Default location of the config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".deluge-rpc/config.toml"))
}

/// Load connection parameters
///
/// Reads `path` (or the default config file) when it exists, otherwise starts
/// from defaults, then applies `DELUGE_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<ConnectionParameters> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path(),
    };

    let params = match path {
        Some(ref p) if p.exists() => load_from_file(p)?,
        _ => {
            tracing::debug!("No config file found, using defaults");
            ConnectionParameters::default()
        }
    };

    apply_env_overrides(params, |key| std::env::var(key).ok())
}

fn load_from_file(path: &Path) -> Result<ConnectionParameters> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let params: ConnectionParameters = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(params)
}

/// Apply `DELUGE_HOST`, `DELUGE_PORT`, `DELUGE_PASSWORD` and `DELUGE_COOKIE_PATH`
pub fn apply_env_overrides<F>(mut params: ConnectionParameters, var: F) -> Result<ConnectionParameters>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = var("DELUGE_HOST").filter(|v| !v.is_empty()) {
        params.host = host;
    }
    if let Some(port) = var("DELUGE_PORT").filter(|v| !v.is_empty()) {
        params.port = port
            .trim()
            .parse()
            .with_context(|| format!("DELUGE_PORT is not a valid port: {}", port))?;
    }
    if let Some(password) = var("DELUGE_PASSWORD").filter(|v| !v.is_empty()) {
        params.password = Some(password);
    }
    if let Some(cookie_path) = var("DELUGE_COOKIE_PATH").filter(|v| !v.is_empty()) {
        params.cookie_path = Some(PathBuf::from(cookie_path));
    }
    Ok(params)
}
