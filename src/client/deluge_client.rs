// Deluge client implementation
//
// Connects to the web daemon, asks it for its method list, and exposes the
// result as a tree of namespaces and commands.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::Dispatcher;
use crate::command::Command;
use crate::config::ConnectionParameters;
use crate::errors::{Result, RpcError};
use crate::namespace::Namespace;
use crate::rpc::{RandomIdGenerator, RequestIdGenerator};
use crate::transport::{HttpTransport, Session, SessionState, Transport};
use crate::tree::{CommandTree, Segment};

/// Introspection method returning every dotted method name the daemon serves
pub const DISCOVERY_METHOD: &str = "daemon.get_method_list";

/// Client for the Deluge web daemon's JSON-RPC endpoint
///
/// Calls run one at a time: each waits for its probe, optional login and
/// request to finish before the next one starts.
pub struct DelugeClient {
    params: ConnectionParameters,
    dispatcher: Arc<Dispatcher>,
    root: Namespace,
}

impl DelugeClient {
    /// Connect over HTTP and discover the daemon's commands
    pub async fn connect(params: ConnectionParameters) -> Result<Self> {
        let transport = HttpTransport::from_parameters(&params)?;
        info!(endpoint = %transport.endpoint(), "Connecting to Deluge");
        Self::with_transport(params, transport, RandomIdGenerator).await
    }

    /// Connect using a key/value mapping of connection parameters
    pub async fn connect_with(parameters: Value) -> Result<Self> {
        Self::connect(ConnectionParameters::from_value(parameters)?).await
    }

    /// Build a client on any transport and id generator
    pub async fn with_transport<T, G>(params: ConnectionParameters, transport: T, ids: G) -> Result<Self>
    where
        T: Transport + 'static,
        G: RequestIdGenerator + 'static,
    {
        let ids: Arc<dyn RequestIdGenerator> = Arc::new(ids);
        let session = Session::new(Box::new(transport), Arc::clone(&ids), params.password.clone());
        let dispatcher = Arc::new(Dispatcher::new(session, ids));

        let tree = discover(&dispatcher).await?;
        info!(commands = tree.command_count(), "Discovered daemon commands");

        Ok(Self {
            params,
            root: Namespace::root(tree, Arc::clone(&dispatcher)),
            dispatcher,
        })
    }

    pub fn parameters(&self) -> &ConnectionParameters {
        &self.params
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    /// Top-level namespace `name`
    pub fn namespace(&self, name: impl Into<Segment>) -> Result<Arc<Namespace>> {
        self.root.resolve_namespace(name)
    }

    /// Invoke root-level command `name`
    pub async fn call(&self, name: &str, arguments: Vec<Value>) -> Result<Value> {
        self.root.call(name, arguments).await
    }

    /// Bound command for a fully-qualified method name
    pub fn command(&self, method: &str) -> Result<Command> {
        self.root.resolve(method)
    }

    /// Resolve `method` through the tree and invoke it
    pub async fn invoke(&self, method: &str, arguments: Vec<Value>) -> Result<Value> {
        self.command(method)?
            .with_arguments(arguments)
            .execute()
            .await
    }

    pub async fn execute_command(&self, command: &Command) -> Result<Value> {
        self.dispatcher.execute(command).await
    }

    /// The discovered command tree
    pub fn help(&self) -> &CommandTree {
        self.root.children()
    }

    pub fn commands(&self) -> &CommandTree {
        self.help()
    }

    pub fn session_state(&self) -> SessionState {
        self.dispatcher.session_state()
    }
}

impl Drop for DelugeClient {
    fn drop(&mut self) {
        debug!(host = %self.params.host, port = self.params.port, "Dropping Deluge client");
    }
}

async fn discover(dispatcher: &Dispatcher) -> Result<CommandTree> {
    let listing = dispatcher
        .call(DISCOVERY_METHOD, Vec::new())
        .await
        .map_err(discovery_error)?;

    let methods = match listing {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(method) => Ok(method),
                other => Err(RpcError::Response(format!(
                    "expected method names, got {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map_err(discovery_error)?,
        other => {
            return Err(discovery_error(RpcError::Response(format!(
                "expected an array of method names, got {}",
                other
            ))))
        }
    };

    Ok(CommandTree::build(methods))
}

/// Fatal construction errors pass through; everything else becomes a request error
fn discovery_error(error: RpcError) -> RpcError {
    match error {
        RpcError::Connection(_) | RpcError::Configuration(_) => error,
        other => RpcError::Request(format!(
            "unable to retrieve list of available commands: {}",
            other
        )),
    }
}
