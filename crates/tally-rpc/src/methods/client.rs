//! Server information methods

use std::sync::Arc;

use serde_json::Value;

use crate::error::JsonRpcError;
use crate::handler::RpcContext;

/// Client version string
const CLIENT_VERSION: &str = concat!("Tally/", env!("CARGO_PKG_VERSION"));

/// tally_clientVersion - Returns the client version
pub async fn tally_client_version(
    _ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    Ok(Value::String(CLIENT_VERSION.to_string()))
}
