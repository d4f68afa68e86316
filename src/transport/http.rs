// HTTP transport for the Deluge web daemon
//
// POSTs JSON-RPC payloads to http://host:port/json. The reqwest client is
// built on first use and shares one cookie jar across every exchange.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::cookies::FileCookieJar;
use super::Transport;
use crate::config::ConnectionParameters;
use crate::errors::{Result, RpcError};

pub struct HttpTransport {
    endpoint: Url,
    timeout: Option<Duration>,
    cookies: Arc<FileCookieJar>,
    client: OnceCell<Client>,
    /// Set when building the client failed; the transport stays unusable
    init_failure: OnceCell<String>,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Option<Duration>, cookies: Arc<FileCookieJar>) -> Self {
        Self {
            endpoint,
            timeout,
            cookies,
            client: OnceCell::new(),
            init_failure: OnceCell::new(),
        }
    }

    /// Transport for `params`, with the cookie jar at `params.cookie_path` if set
    pub fn from_parameters(params: &ConnectionParameters) -> Result<Self> {
        let endpoint = params.endpoint()?;
        let cookies = match &params.cookie_path {
            Some(path) => FileCookieJar::open(path),
            None => FileCookieJar::in_memory(),
        };
        Ok(Self::new(endpoint, params.timeout(), Arc::new(cookies)))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn cookies(&self) -> &Arc<FileCookieJar> {
        &self.cookies
    }

    fn handle(&self) -> Result<&Client> {
        if let Some(reason) = self.init_failure.get() {
            return Err(RpcError::Connection(reason.clone()));
        }

        self.client.get_or_try_init(|| {
            let mut builder = Client::builder()
                .cookie_provider(Arc::clone(&self.cookies))
                .gzip(true);
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            builder.build().map_err(|e| {
                let reason = format!("failed to build HTTP client: {}", e);
                error!("{}", reason);
                let _ = self.init_failure.set(reason.clone());
                RpcError::Connection(reason)
            })
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        let client = self.handle()?;

        let response = client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    "TIMEOUT"
                } else if e.is_connect() {
                    "CONNECTION"
                } else if e.is_request() {
                    "REQUEST"
                } else {
                    "OTHER"
                };
                error!(endpoint = %self.endpoint, kind, "HTTP request failed: {}", e);
                RpcError::Request(format!("could not make a request to the server: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "Daemon answered with non-success status");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RpcError::Request(format!("failed to read response body: {}", e)))?;

        if body.is_empty() {
            return Err(RpcError::Request(format!(
                "empty response from the server (status {})",
                status
            )));
        }

        debug!(status = %status, bytes = body.len(), "Received response");
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}
