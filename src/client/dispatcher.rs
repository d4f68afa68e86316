// RPC dispatch shared by the client, its namespaces and commands

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::command::Command;
use crate::errors::Result;
use crate::rpc::{parse_response, RequestIdGenerator, RpcRequest};
use crate::transport::{Session, SessionState};

/// Turns a method name and params into one correlated request/response exchange
pub struct Dispatcher {
    session: Session,
    ids: Arc<dyn RequestIdGenerator>,
}

impl Dispatcher {
    pub fn new(session: Session, ids: Arc<dyn RequestIdGenerator>) -> Self {
        Self { session, ids }
    }

    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let id = self.ids.next_id();
        let request = RpcRequest::new(method, params, id.clone());
        debug!(method, id = %id, "Sending RPC");

        let raw = self.session.send(request.to_bytes()?).await?;
        parse_response(&raw, &id)
    }

    pub async fn execute(&self, command: &Command) -> Result<Value> {
        self.call(&command.full_name(), command.arguments().to_vec())
            .await
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }
}
