//! RPC error types

use serde::Serialize;
use serde_json::{json, Value};
use tally_ledger::LedgerError;
use thiserror::Error;

/// JSON-RPC error codes
pub mod error_code {
    /// Parse error: Invalid JSON was received
    pub const PARSE_ERROR: i64 = -32700;
    /// Invalid Request: The JSON is not a valid Request object
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i64 = -32603;

    // Ledger error codes
    /// Caller lacks the admin role
    pub const UNAUTHORIZED: i64 = -32010;
    /// Malformed call argument
    pub const INVALID_ARGUMENT: i64 = -32011;
    /// Unknown or inactive candidate
    pub const NOT_FOUND: i64 = -32012;
    /// Identity has already voted
    pub const ALREADY_VOTED: i64 = -32013;
    /// Candidate already inactive
    pub const ALREADY_INACTIVE: i64 = -32014;
    /// Vote outside the open window
    pub const VOTING_CLOSED: i64 = -32015;
    /// Storage or consistency failure
    pub const LEDGER_FAILURE: i64 = -32016;

    /// Bad signature or replayed nonce
    pub const AUTHENTICATION_FAILED: i64 = -32020;
}

/// JSON-RPC error response
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create error with additional data
    pub fn with_data(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error
    pub fn parse_error() -> Self {
        Self::new(error_code::PARSE_ERROR, "Parse error")
    }

    /// Invalid request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_REQUEST, message)
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_code::METHOD_NOT_FOUND,
            format!("method not found: {}", method),
        )
    }

    /// Invalid params
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_PARAMS, message)
    }

    /// Internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_code::INTERNAL_ERROR, message)
    }

    /// Signature or nonce rejected
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::new(error_code::AUTHENTICATION_FAILED, message)
    }
}

impl From<LedgerError> for JsonRpcError {
    fn from(e: LedgerError) -> Self {
        let code = match &e {
            LedgerError::Unauthorized { .. } => error_code::UNAUTHORIZED,
            LedgerError::InvalidArgument(_) => error_code::INVALID_ARGUMENT,
            LedgerError::NotFound(_) => error_code::NOT_FOUND,
            LedgerError::AlreadyVoted(_) => error_code::ALREADY_VOTED,
            LedgerError::AlreadyInactive(_) => error_code::ALREADY_INACTIVE,
            LedgerError::VotingClosed { .. } => error_code::VOTING_CLOSED,
            LedgerError::AdminMismatch { .. }
            | LedgerError::Inconsistent(_)
            | LedgerError::Storage(_) => error_code::LEDGER_FAILURE,
        };
        match &e {
            LedgerError::VotingClosed { phase } => {
                Self::with_data(code, e.to_string(), json!({ "phase": phase.as_str() }))
            }
            _ => Self::new(code, e.to_string()),
        }
    }
}

/// RPC server errors
#[derive(Debug, Error)]
pub enum RpcError {
    /// Server bind error
    #[error("failed to bind server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tally_primitives::Address;
    use tally_types::Phase;

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code::PARSE_ERROR, -32700);
        assert_eq!(error_code::INVALID_PARAMS, -32602);
        assert_eq!(error_code::UNAUTHORIZED, -32010);
        assert_eq!(error_code::VOTING_CLOSED, -32015);
        assert_eq!(error_code::AUTHENTICATION_FAILED, -32020);
    }

    #[test]
    fn test_json_rpc_error_method_not_found() {
        let err = JsonRpcError::method_not_found("tally_unknown");
        assert_eq!(err.code, error_code::METHOD_NOT_FOUND);
        assert!(err.message.contains("tally_unknown"));
    }

    #[test]
    fn test_json_rpc_error_serialize_without_data() {
        let err = JsonRpcError::invalid_params("test");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":-32602"));
        assert!(json.contains("\"message\":\"test\""));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_voting_closed_carries_phase() {
        let err = JsonRpcError::from(LedgerError::VotingClosed {
            phase: Phase::NotStarted,
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["data"]["phase"], "notStarted");

        let err = JsonRpcError::from(LedgerError::NotFound(2));
        assert!(err.data.is_none());
    }

    #[test]
    fn test_ledger_error_mapping() {
        let cases = [
            (
                LedgerError::Unauthorized {
                    caller: Address::ZERO,
                },
                error_code::UNAUTHORIZED,
            ),
            (
                LedgerError::InvalidArgument("empty".into()),
                error_code::INVALID_ARGUMENT,
            ),
            (LedgerError::NotFound(3), error_code::NOT_FOUND),
            (LedgerError::AlreadyVoted(Address::ZERO), error_code::ALREADY_VOTED),
            (LedgerError::AlreadyInactive(1), error_code::ALREADY_INACTIVE),
            (
                LedgerError::VotingClosed {
                    phase: Phase::Closed,
                },
                error_code::VOTING_CLOSED,
            ),
            (
                LedgerError::Inconsistent("drift".into()),
                error_code::LEDGER_FAILURE,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(JsonRpcError::from(err).code, code);
        }
    }

    #[test]
    fn test_rpc_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err: RpcError = io_err.into();
        assert!(matches!(err, RpcError::Bind(_)));
    }
}
