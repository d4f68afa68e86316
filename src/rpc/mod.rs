// JSON-RPC envelope and correlation
//
// Builds request envelopes, generates per-call ids, and matches responses to
// the request that produced them. Nothing here retries.

mod envelope;
mod id;

pub use envelope::{parse_response, ErrorObject, RpcRequest, RpcResponse};
pub use id::{RandomIdGenerator, RequestIdGenerator, SequentialIdGenerator};
