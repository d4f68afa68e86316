// deluge-rpc - JSON-RPC client for the Deluge web daemon
// Library exports

pub mod client; // Client facade, discovery and dispatch
pub mod command;
pub mod config;
pub mod errors;
pub mod namespace;
pub mod rpc; // Request envelopes and response correlation
pub mod transport; // HTTP transport, cookie jar, session handshake
pub mod tree; // Command tree built from the daemon's method list

pub use client::DelugeClient;
pub use command::Command;
pub use config::ConnectionParameters;
pub use errors::{Result, RpcError};
pub use namespace::Namespace;
pub use tree::{CommandTree, Segment};
