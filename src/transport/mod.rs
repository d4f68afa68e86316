// Transport layer
//
// `Transport` is the "send bytes, get bytes" boundary. `HttpTransport` talks
// to the web daemon; `Session` layers the probe/login handshake on top of any
// transport.

use async_trait::async_trait;

use crate::errors::Result;

mod cookies;
mod http;
mod session;

pub use cookies::FileCookieJar;
pub use http::HttpTransport;
pub use session::{Session, SessionState, LOGIN_METHOD, PROBE_METHOD};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one encoded request and return the raw response body
    async fn exchange(&self, payload: Vec<u8>) -> Result<Vec<u8>>;

    /// Short description for logs (usually the endpoint)
    fn describe(&self) -> String {
        "transport".to_string()
    }
}
