//! Request handler and method dispatcher

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tally_ledger::{CallContext, CallReceipt, Clock, VotingLedger};
use tally_types::SignedCall;
use tracing::debug;

use crate::auth::Authenticator;
use crate::error::JsonRpcError;
use crate::methods::{client, ledger};
use crate::types::{JsonRpcId, JsonRpcRequest, JsonRpcResponse};

/// Type alias for async method handler
pub type MethodFn = Box<
    dyn Fn(Arc<RpcContext>, Vec<Value>) -> Pin<Box<dyn Future<Output = Result<Value, JsonRpcError>> + Send>>
        + Send
        + Sync,
>;

/// Shared context for RPC handlers
pub struct RpcContext {
    /// The ledger served
    pub ledger: Arc<VotingLedger>,
    /// Source of call timestamps
    pub clock: Arc<dyn Clock>,
    /// Signature and nonce checks for mutations
    pub auth: Authenticator,
}

impl RpcContext {
    /// Create a new RPC context
    pub fn new(ledger: Arc<VotingLedger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            clock,
            auth: Authenticator::new(),
        }
    }

    /// Authenticate `signed` and run it against the ledger at the current time.
    ///
    /// `op` is the call type the method accepts, e.g. `"vote"`.
    pub fn execute(&self, op: &str, signed: &SignedCall) -> Result<CallReceipt, JsonRpcError> {
        if signed.call.name() != op {
            return Err(JsonRpcError::invalid_params(format!(
                "call type {} does not match method (expected {})",
                signed.call.name(),
                op
            )));
        }

        let sender = self.auth.authenticate(signed)?;
        let ctx = CallContext::at(sender, self.clock.as_ref());
        debug!(%sender, call = op, timestamp = ctx.timestamp(), "executing signed call");

        Ok(self.ledger.apply(&ctx, &signed.call)?)
    }
}

/// Method registry for dispatching RPC calls
pub struct MethodRegistry {
    methods: HashMap<String, MethodFn>,
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodRegistry {
    /// Create a new method registry with all methods registered
    pub fn new() -> Self {
        let mut registry = Self {
            methods: HashMap::new(),
        };

        // Reads
        registry.register("tally_admin", ledger::tally_admin);
        registry.register("tally_totalCandidates", ledger::tally_total_candidates);
        registry.register("tally_getCandidate", ledger::tally_get_candidate);
        registry.register("tally_listCandidates", ledger::tally_list_candidates);
        registry.register("tally_activeCandidates", ledger::tally_active_candidates);
        registry.register("tally_votingPeriod", ledger::tally_voting_period);
        registry.register("tally_currentPhase", ledger::tally_current_phase);
        registry.register("tally_voterStatus", ledger::tally_voter_status);
        registry.register("tally_totalVotes", ledger::tally_total_votes);
        registry.register("tally_stateVersion", ledger::tally_state_version);
        registry.register("tally_snapshot", ledger::tally_snapshot);
        registry.register("tally_nonce", ledger::tally_nonce);

        // Signed mutations
        registry.register("tally_addCandidate", ledger::tally_add_candidate);
        registry.register("tally_deactivateCandidate", ledger::tally_deactivate_candidate);
        registry.register("tally_setVotingPeriod", ledger::tally_set_voting_period);
        registry.register("tally_vote", ledger::tally_vote);

        registry.register("tally_clientVersion", client::tally_client_version);

        registry
    }

    /// Register a method handler
    pub fn register<F, Fut>(&mut self, name: &str, handler: F)
    where
        F: Fn(Arc<RpcContext>, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, JsonRpcError>> + Send + 'static,
    {
        self.methods.insert(
            name.to_string(),
            Box::new(move |ctx, params| Box::pin(handler(ctx, params))),
        );
    }

    /// Dispatch a method call
    pub async fn dispatch(
        &self,
        ctx: Arc<RpcContext>,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, JsonRpcError> {
        match self.methods.get(method) {
            Some(handler) => handler(ctx, params).await,
            None => Err(JsonRpcError::method_not_found(method)),
        }
    }

    /// Get list of registered methods
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(|s| s.as_str()).collect()
    }
}

/// RPC request handler
pub struct RpcHandler {
    ctx: Arc<RpcContext>,
    registry: MethodRegistry,
}

impl RpcHandler {
    /// Create a new RPC handler
    pub fn new(ctx: Arc<RpcContext>) -> Self {
        let registry = MethodRegistry::new();
        debug!(methods = registry.method_names().len(), "rpc methods registered");
        Self { ctx, registry }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("invalid JSON-RPC version"),
            );
        }

        match self
            .registry
            .dispatch(self.ctx.clone(), &request.method, request.params)
            .await
        {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(error) => {
                debug!(method = %request.method, code = error.code, "request failed");
                JsonRpcResponse::error(request.id, error)
            }
        }
    }

    /// Decode a raw request body and handle it.
    ///
    /// Invalid JSON yields a parse error; JSON that is not a request object
    /// yields an invalid-request error, echoing the `id` when one is readable.
    pub async fn handle_body(&self, body: &[u8]) -> JsonRpcResponse {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "unparseable request body");
                return JsonRpcResponse::error(JsonRpcId::Null, JsonRpcError::parse_error());
            }
        };

        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<JsonRpcId>(id.clone()).ok())
            .unwrap_or_default();

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::invalid_request(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_registry_default_methods() {
        let registry = MethodRegistry::new();

        let names = registry.method_names();

        assert!(names.contains(&"tally_admin"));
        assert!(names.contains(&"tally_vote"));
        assert!(names.contains(&"tally_clientVersion"));
        assert!(!names.contains(&"eth_chainId"));
    }

    #[test]
    fn test_method_registry_all_mutations() {
        let registry = MethodRegistry::new();
        let names = registry.method_names();

        for method in [
            "tally_addCandidate",
            "tally_deactivateCandidate",
            "tally_setVotingPeriod",
            "tally_vote",
        ] {
            assert!(names.contains(&method), "Missing method: {}", method);
        }
    }

    #[test]
    fn test_method_registry_custom_handler() {
        let mut registry = MethodRegistry::new();

        async fn custom_handler(
            _ctx: Arc<RpcContext>,
            _params: Vec<Value>,
        ) -> Result<Value, JsonRpcError> {
            Ok(Value::String("custom".to_string()))
        }

        registry.register("custom_method", custom_handler);

        assert!(registry.method_names().contains(&"custom_method"));
    }

    #[test]
    fn test_method_count() {
        // 12 reads + 4 mutations + clientVersion
        assert_eq!(MethodRegistry::new().method_names().len(), 17);
    }
}
