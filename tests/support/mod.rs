// Scripted in-memory transport shared by the integration tests
//
// Each exchange records the decoded request and answers with the next
// scripted reply, echoing the request id unless told otherwise.

#![allow(dead_code)]

use async_trait::async_trait;
use deluge_rpc::transport::Transport;
use deluge_rpc::RpcError;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum Reply {
    /// `{"id": <echo>, "result": value, "error": null}`
    Result(Value),
    /// `{"id": <echo>, "result": null, "error": {"message": .., "code": ..}}`
    Error(&'static str, i64),
    /// Result with an id that does not match the request
    WrongId(Value),
    /// Raw response bytes
    Raw(&'static str),
    /// Transport failure
    Fail(&'static str),
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    requests: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let transport = Self::default();
        transport.push(replies);
        transport
    }

    pub fn push(&self, replies: impl IntoIterator<Item = Reply>) {
        self.script.lock().unwrap().replies.extend(replies);
    }

    /// Every request sent so far, decoded
    pub fn requests(&self) -> Vec<Value> {
        self.script.lock().unwrap().requests.clone()
    }

    /// Method names of every request sent so far
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().replies.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn exchange(&self, payload: Vec<u8>) -> deluge_rpc::Result<Vec<u8>> {
        let request: Value = serde_json::from_slice(&payload).expect("request is JSON");
        let id = request["id"].clone();

        let reply = {
            let mut script = self.script.lock().unwrap();
            script.requests.push(request);
            script.replies.pop_front()
        };

        let body = match reply {
            Some(Reply::Result(result)) => json!({"id": id, "result": result, "error": null}),
            Some(Reply::Error(message, code)) => {
                json!({"id": id, "result": null, "error": {"message": message, "code": code}})
            }
            Some(Reply::WrongId(result)) => {
                json!({"id": "not-the-request-id", "result": result, "error": null})
            }
            Some(Reply::Raw(raw)) => return Ok(raw.as_bytes().to_vec()),
            Some(Reply::Fail(reason)) => return Err(RpcError::Request(reason.to_string())),
            None => return Err(RpcError::Request("script exhausted".to_string())),
        };

        Ok(serde_json::to_vec(&body).unwrap())
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub fn connected() -> Reply {
    Reply::Result(json!(true))
}

pub fn not_authenticated() -> Reply {
    Reply::Error("Not authenticated", 1)
}

/// Replies for a successful construction: probe, then the method list
pub fn discovery(methods: &[&str]) -> Vec<Reply> {
    vec![connected(), Reply::Result(json!(methods))]
}
