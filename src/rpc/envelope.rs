// JSON-RPC 2.0 request/response framing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, RpcError};

/// A JSON-RPC 2.0 request as sent to the daemon
///
/// Serializes to exactly `{"jsonrpc":"2.0","method":..,"params":[..],"id":".."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Vec<Value>,
    pub id: String,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id: id.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| RpcError::Request(format!("unable to encode request: {}", e)))
    }
}

/// Error object reported by the daemon
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ErrorObject {
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(message) => Self { code: 0, message },
            other => serde_json::from_value(other.clone()).unwrap_or(Self {
                code: 0,
                message: other.to_string(),
            }),
        }
    }
}

impl From<ErrorObject> for RpcError {
    fn from(error: ErrorObject) -> Self {
        RpcError::Command {
            code: error.code,
            message: error.message,
        }
    }
}

/// A decoded daemon response
///
/// `result` is `Some(Value::Null)` when the daemon sent `"result": null`, and
/// `None` when the field was missing. A null `error` counts as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub id: Value,
    pub result: Option<Value>,
    pub error: Option<ErrorObject>,
}

impl RpcResponse {
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| RpcError::Response(format!("malformed JSON in response: {}", e)))?;

        let mut object: Map<String, Value> = match value {
            Value::Object(object) => object,
            other => {
                return Err(RpcError::Response(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            id: object.remove("id").unwrap_or(Value::Null),
            result: object.remove("result"),
            error: object
                .remove("error")
                .filter(|e| !e.is_null())
                .map(ErrorObject::from_value),
        })
    }

    /// Whether this response answers the request with `expected_id`
    ///
    /// String ids must match exactly; numeric ids match on their decimal text.
    pub fn answers(&self, expected_id: &str) -> bool {
        match &self.id {
            Value::String(id) => id == expected_id,
            Value::Number(id) => id.to_string() == expected_id,
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The result value, or the daemon's error as `RpcError::Command`
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        self.result.ok_or_else(|| {
            RpcError::Response("response carries neither a result nor an error".to_string())
        })
    }
}

/// Decode `raw`, check it answers `expected_id`, and unwrap the result
pub fn parse_response(raw: &[u8], expected_id: &str) -> Result<Value> {
    let response = RpcResponse::parse(raw)?;
    if !response.answers(expected_id) {
        return Err(RpcError::Response(format!(
            "JSON RPC request/response ID mismatch (sent {}, received {})",
            expected_id, response.id
        )));
    }
    response.into_result()
}
