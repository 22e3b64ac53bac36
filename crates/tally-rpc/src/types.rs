//! RPC request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_crypto::Signature;
use tally_primitives::Address;
use tally_types::{LedgerCall, SignedCall};

use crate::error::JsonRpcError;

/// JSON-RPC request ID (can be number, string, or null)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// Numeric ID
    Number(u64),
    /// String ID
    String(String),
    /// Null ID
    #[default]
    Null,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID
    #[serde(default)]
    pub id: JsonRpcId,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Vec<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Request ID
    pub id: JsonRpcId,
    /// Result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create success response
    pub fn success(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create error response
    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Parse address from JSON value
pub fn parse_address(value: &Value) -> Result<Address, JsonRpcError> {
    let s = value
        .as_str()
        .ok_or_else(|| JsonRpcError::invalid_params("address must be a string"))?;
    Address::from_hex(s)
        .map_err(|e| JsonRpcError::invalid_params(format!("invalid address: {}", e)))
}

/// Parse u64 from a JSON number or a `0x` hex string
pub fn parse_u64(value: &Value) -> Result<u64, JsonRpcError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| JsonRpcError::invalid_params("quantity must be a non-negative integer")),
        Value::String(s) => {
            let digits = s
                .strip_prefix("0x")
                .ok_or_else(|| JsonRpcError::invalid_params("quantity string must be 0x-prefixed"))?;
            u64::from_str_radix(digits, 16)
                .map_err(|e| JsonRpcError::invalid_params(format!("invalid quantity: {}", e)))
        }
        _ => Err(JsonRpcError::invalid_params("invalid quantity type")),
    }
}

/// Fetch a required positional parameter
pub fn required_param<'a>(params: &'a [Value], pos: usize, name: &str) -> Result<&'a Value, JsonRpcError> {
    params
        .get(pos)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("missing {} parameter", name)))
}

/// Signed call envelope (raw JSON form)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedCallRaw {
    /// The operation
    pub call: LedgerCall,
    /// Per-signer sequence number
    pub nonce: u64,
    /// `0x`-prefixed 65-byte `r || s || v`
    pub signature: String,
}

impl SignedCallRaw {
    /// Build the raw form of a signed call, for clients
    pub fn from_signed(signed: &SignedCall) -> Self {
        Self {
            call: signed.call.clone(),
            nonce: signed.nonce,
            signature: signed.signature.to_hex(),
        }
    }

    /// Parse into a [`SignedCall`]
    pub fn into_signed(self) -> Result<SignedCall, JsonRpcError> {
        let signature = Signature::from_hex(&self.signature)
            .map_err(|e| JsonRpcError::invalid_params(format!("invalid signature: {}", e)))?;
        Ok(SignedCall {
            call: self.call,
            nonce: self.nonce,
            signature,
        })
    }
}

/// Parse a signed call envelope from JSON value
pub fn parse_signed_call(value: &Value) -> Result<SignedCall, JsonRpcError> {
    let raw: SignedCallRaw = serde_json::from_value(value.clone())
        .map_err(|e| JsonRpcError::invalid_params(format!("invalid signed call: {}", e)))?;
    raw.into_signed()
}
