// Persistent cookie store for the daemon session
//
// The web daemon tracks logins with a single session cookie. The jar keeps
// name/value pairs for the one daemon a client talks to and mirrors them to a
// JSON file so a later process can reuse the session.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::Url;

#[derive(Debug, Default)]
pub struct FileCookieJar {
    path: Option<PathBuf>,
    cookies: RwLock<BTreeMap<String, String>>,
}

impl FileCookieJar {
    /// Jar that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Jar backed by `path`, pre-loaded with any cookies already stored there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cookies = match load(&path) {
            Ok(cookies) => cookies,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring unreadable cookie file: {}", e);
                BTreeMap::new()
            }
        };
        tracing::debug!(path = %path.display(), count = cookies.len(), "Opened cookie jar");

        Self {
            path: Some(path),
            cookies: RwLock::new(cookies),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn persist(&self, cookies: &BTreeMap<String, String>) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cookies)?;
        fs::write(path, data)
    }
}

impl CookieStore for FileCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {
        let mut cookies = self
            .cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut changed = false;
        for header in cookie_headers {
            let Some(cookie) = header.to_str().ok().and_then(SetCookie::parse) else {
                continue;
            };
            if cookie.expired {
                changed |= cookies.remove(&cookie.name).is_some();
            } else if cookies.get(&cookie.name) != Some(&cookie.value) {
                cookies.insert(cookie.name, cookie.value);
                changed = true;
            }
        }

        if changed {
            if let Err(e) = self.persist(&cookies) {
                tracing::warn!(
                    path = ?self.path,
                    "Failed to save session cookie: {}",
                    e
                );
            }
        }
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        if cookies.is_empty() {
            return None;
        }
        let header = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}

fn load(path: &Path) -> io::Result<BTreeMap<String, String>> {
    let data = fs::read(path)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    serde_json::from_slice(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// The parts of a `Set-Cookie` header the jar cares about
#[derive(Debug, PartialEq, Eq)]
struct SetCookie {
    name: String,
    value: String,
    expired: bool,
}

impl SetCookie {
    fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let expired = parts.any(|attr| {
            let Some((key, val)) = attr.split_once('=') else {
                return false;
            };
            key.trim().eq_ignore_ascii_case("max-age")
                && val.trim().parse::<i64>().map(|age| age <= 0).unwrap_or(false)
        });

        Some(Self {
            name: name.to_string(),
            value: value.trim().trim_matches('"').to_string(),
            expired,
        })
    }
}
