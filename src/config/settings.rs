// Connection parameters

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::{Result, RpcError};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8181;
/// Seconds to wait for the daemon before giving up on a request
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where and how to reach the Deluge web daemon
///
/// Unknown keys are ignored when deserializing; missing keys fall back to
/// the defaults (`localhost:8181`, 15 second timeout, no credentials).
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawParameters")]
pub struct ConnectionParameters {
    pub host: String,
    pub port: u16,
    /// Reserved; the web daemon authenticates by password only
    pub user: Option<String>,
    pub password: Option<String>,
    /// File holding the persisted session cookie
    pub cookie_path: Option<PathBuf>,
    /// Per-request timeout in seconds; 0 disables the timeout
    pub timeout_secs: u64,
}

/// Keys as they appear in a config mapping
///
/// `cookie` and `cookiePath` are read separately so that a mapping holding
/// both is not a duplicate-field error; `cookiePath` wins.
#[derive(Deserialize)]
#[serde(default)]
struct RawParameters {
    host: String,
    #[serde(deserialize_with = "deserialize_port")]
    port: u16,
    user: Option<String>,
    pass: Option<String>,
    #[serde(rename = "cookiePath")]
    cookie_path: Option<PathBuf>,
    cookie: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_timeout")]
    timeout: u64,
}

impl Default for RawParameters {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: None,
            pass: None,
            cookie_path: None,
            cookie: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl From<RawParameters> for ConnectionParameters {
    fn from(raw: RawParameters) -> Self {
        Self {
            host: raw.host,
            port: raw.port,
            user: raw.user,
            password: raw.pass,
            cookie_path: raw.cookie_path.or(raw.cookie),
            timeout_secs: raw.timeout,
        }
    }
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: None,
            password: None,
            cookie_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cookie_path", &self.cookie_path)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ConnectionParameters {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Parse parameters from a key/value mapping
    ///
    /// Anything other than a JSON object is rejected, as are recognised keys
    /// holding values of the wrong type.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(RpcError::Configuration(format!(
                "expected a key/value mapping, got {}",
                value_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| RpcError::Configuration(e.to_string()))
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_path = Some(path.into());
        self
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// JSON endpoint of the web daemon
    pub fn endpoint(&self) -> Result<Url> {
        let raw = format!("http://{}:{}/json", self.host, self.port);
        Url::parse(&raw).map_err(|e| {
            RpcError::Configuration(format!(
                "unable to parse server parameters into a valid URI ({}): {}",
                raw, e
            ))
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

impl IntOrString {
    fn into_i64(self) -> std::result::Result<i64, String> {
        match self {
            Self::Int(n) => Ok(n),
            Self::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("expected an integer, got \"{}\"", s)),
        }
    }
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IntOrString::deserialize(deserializer)?
        .into_i64()
        .map_err(serde::de::Error::custom)?;
    u16::try_from(raw)
        .map_err(|_| serde::de::Error::custom(format!("port {} is out of range", raw)))
}

fn deserialize_timeout<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IntOrString::deserialize(deserializer)?
        .into_i64()
        .map_err(serde::de::Error::custom)?;
    // Negative timeouts clamp to zero
    Ok(raw.max(0) as u64)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
