// Client for the Deluge web daemon
//
// DelugeClient owns the session and the discovered command tree;
// Dispatcher performs the individual RPC exchanges.

mod deluge_client;
mod dispatcher;

pub use deluge_client::{DelugeClient, DISCOVERY_METHOD};
pub use dispatcher::Dispatcher;
