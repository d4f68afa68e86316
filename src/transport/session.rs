// Authenticated session over a transport
//
// Every outbound payload is preceded by a probe. If the probe reports an
// error the session logs in once, re-probes once, and only then sends the
// payload. The whole sequence runs under one async lock so concurrent calls
// on the same client cannot interleave their probe/login steps.

use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::Transport;
use crate::errors::{Result, RpcError};
use crate::rpc::{RequestIdGenerator, RpcRequest, RpcResponse};

/// "Am I connected" method; errors mean "not authenticated"
pub const PROBE_METHOD: &str = "web.connected";
/// Login method, called with the password as its only parameter
pub const LOGIN_METHOD: &str = "auth.login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No exchange has happened yet
    Disconnected,
    /// The last probe succeeded
    ProbedConnected,
    /// The last probe reported an error
    ProbedUnauthenticated,
}

pub struct Session {
    transport: Box<dyn Transport>,
    ids: Arc<dyn RequestIdGenerator>,
    password: Option<String>,
    state: Mutex<SessionState>,
    gate: tokio::sync::Mutex<()>,
}

impl Session {
    pub fn new(
        transport: Box<dyn Transport>,
        ids: Arc<dyn RequestIdGenerator>,
        password: Option<String>,
    ) -> Self {
        Self {
            transport,
            ids,
            password,
            state: Mutex::new(SessionState::Disconnected),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Send `payload` over an authenticated session and return the raw response
    pub async fn send(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        let _guard = self.gate.lock().await;

        if self.probe().await? {
            return self.transport.exchange(payload).await;
        }

        if !self.login().await? {
            return Err(RpcError::Session(
                "not able to log in to the Deluge server; check the server details and password"
                    .to_string(),
            ));
        }

        if self.probe().await? {
            self.transport.exchange(payload).await
        } else {
            Err(RpcError::Session(
                "login succeeded but the session cookie could not be saved or read".to_string(),
            ))
        }
    }

    /// Returns whether the daemon considers this session authenticated
    async fn probe(&self) -> Result<bool> {
        let id = self.ids.next_id();
        let request = RpcRequest::new(PROBE_METHOD, Vec::new(), id.clone());
        debug!(method = PROBE_METHOD, id = %id, "Probing session");

        let raw = self.transport.exchange(request.to_bytes()?).await?;
        let response = RpcResponse::parse(&raw)?;
        if !response.answers(&id) {
            return Err(RpcError::Response(format!(
                "JSON RPC request/response ID mismatch on session probe (sent {}, received {})",
                id, response.id
            )));
        }

        if response.is_error() {
            warn!(transport = %self.transport.describe(), "Session probe failed, not authenticated");
            self.set_state(SessionState::ProbedUnauthenticated);
            Ok(false)
        } else {
            self.set_state(SessionState::ProbedConnected);
            Ok(true)
        }
    }

    /// Returns whether the daemon accepted the configured password
    async fn login(&self) -> Result<bool> {
        let Some(password) = &self.password else {
            return Err(RpcError::Session(
                "the daemon requires a login but no password is configured".to_string(),
            ));
        };

        let id = self.ids.next_id();
        let request = RpcRequest::new(LOGIN_METHOD, vec![Value::String(password.clone())], id.clone());
        debug!(method = LOGIN_METHOD, id = %id, "Logging in (params redacted)");

        let raw = self.transport.exchange(request.to_bytes()?).await.map_err(|e| {
            RpcError::Session(format!("not able to reach the Deluge server to log in: {}", e))
        })?;

        let accepted = match RpcResponse::parse(&raw) {
            Ok(response) if !response.is_error() => {
                response.result.as_ref().map(is_login_success).unwrap_or(false)
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Unreadable login response: {}", e);
                false
            }
        };

        if accepted {
            info!(transport = %self.transport.describe(), "Logged in to Deluge");
        } else {
            warn!(transport = %self.transport.describe(), "Login rejected");
        }
        Ok(accepted)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(transport = %self.transport.describe(), "Closing session");
    }
}

/// The daemon answers a good login with `true`; older builds send `1`
/// `true`, or anything numerically equal to 1 (`1`, `1.0`, `"1"`)
fn is_login_success(result: &Value) -> bool {
    match result {
        Value::Bool(ok) => *ok,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s.trim().parse::<f64>().map_or(false, |n| n == 1.0),
        _ => false,
    }
}
