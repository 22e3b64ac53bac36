//! JSON-RPC handler tests against an in-memory ledger

use std::sync::Arc;

use serde_json::{json, Value};
use tally_crypto::{address_of, generate_key, PrivateKey};
use tally_ledger::{ManualClock, VotingLedger};
use tally_rpc::error::error_code;
use tally_rpc::{JsonRpcId, JsonRpcRequest, RpcContext, RpcHandler, SignedCallRaw};
use tally_types::{LedgerCall, SignedCall};

// =============================================================================
// Test Helpers
// =============================================================================

struct Harness {
    handler: RpcHandler,
    clock: Arc<ManualClock>,
    admin_key: PrivateKey,
    admin_nonce: u64,
}

impl Harness {
    fn new() -> Self {
        let admin_key = generate_key();
        let ledger = Arc::new(VotingLedger::in_memory(address_of(&admin_key)).unwrap());
        let clock = Arc::new(ManualClock::new(0));
        let ctx = Arc::new(RpcContext::new(ledger, clock.clone()));
        Self {
            handler: RpcHandler::new(ctx),
            clock,
            admin_key,
            admin_nonce: 0,
        }
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Value {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: JsonRpcId::Number(1),
            method: method.to_string(),
            params,
        };
        serde_json::to_value(self.handler.handle_request(request).await).unwrap()
    }

    async fn signed(&self, method: &str, call: LedgerCall, nonce: u64, key: &PrivateKey) -> Value {
        let signed = SignedCall::sign(call, nonce, key).unwrap();
        let envelope = serde_json::to_value(SignedCallRaw::from_signed(&signed)).unwrap();
        self.call(method, vec![envelope]).await
    }

    async fn admin(&mut self, method: &str, call: LedgerCall) -> Value {
        self.admin_nonce += 1;
        let key = self.admin_key.clone();
        self.signed(method, call, self.admin_nonce, &key).await
    }

    async fn setup_election(&mut self) {
        for name in ["Alice", "Bob"] {
            let resp = self
                .admin(
                    "tally_addCandidate",
                    LedgerCall::AddCandidate {
                        name: name.into(),
                        image_ref: format!("https://img/{}.png", name),
                    },
                )
                .await;
            assert!(resp.get("error").is_none(), "{}", resp);
        }
        let resp = self
            .admin(
                "tally_setVotingPeriod",
                LedgerCall::SetVotingPeriod {
                    start_time: 100,
                    end_time: 200,
                },
            )
            .await;
        assert!(resp.get("error").is_none(), "{}", resp);
    }
}

fn error_code_of(resp: &Value) -> i64 {
    resp["error"]["code"].as_i64().unwrap()
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_admin_and_empty_state() {
    let h = Harness::new();

    let resp = h.call("tally_admin", vec![]).await;
    assert_eq!(resp["result"], address_of(&h.admin_key).to_hex());

    assert_eq!(h.call("tally_totalCandidates", vec![]).await["result"], 0);
    assert_eq!(h.call("tally_stateVersion", vec![]).await["result"], 0);
    assert_eq!(h.call("tally_currentPhase", vec![]).await["result"], "unset");
    assert_eq!(h.call("tally_listCandidates", vec![]).await["result"], json!([]));
}

#[tokio::test]
async fn test_unknown_method_and_bad_version() {
    let h = Harness::new();
    let resp = h.call("tally_nothing", vec![]).await;
    assert_eq!(error_code_of(&resp), error_code::METHOD_NOT_FOUND);

    let request = JsonRpcRequest {
        jsonrpc: "1.0".to_string(),
        id: JsonRpcId::Number(9),
        method: "tally_admin".to_string(),
        params: vec![],
    };
    let resp = serde_json::to_value(h.handler.handle_request(request).await).unwrap();
    assert_eq!(error_code_of(&resp), error_code::INVALID_REQUEST);
    assert_eq!(resp["id"], 9);
}

#[tokio::test]
async fn test_raw_body_decoding() {
    let h = Harness::new();

    let resp = serde_json::to_value(h.handler.handle_body(b"{\"jsonrpc\": \"2.0\",").await).unwrap();
    assert_eq!(error_code_of(&resp), error_code::PARSE_ERROR);
    assert_eq!(resp["id"], Value::Null);

    let resp = serde_json::to_value(
        h.handler
            .handle_body(br#"{"jsonrpc":"2.0","id":4,"params":[]}"#)
            .await,
    )
    .unwrap();
    assert_eq!(error_code_of(&resp), error_code::INVALID_REQUEST);
    assert_eq!(resp["id"], 4);

    let resp = serde_json::to_value(
        h.handler
            .handle_body(br#"{"jsonrpc":"2.0","id":"a","method":"tally_stateVersion"}"#)
            .await,
    )
    .unwrap();
    assert_eq!(resp["result"], 0);
    assert_eq!(resp["id"], "a");
}

#[tokio::test]
async fn test_get_candidate_errors() {
    let h = Harness::new();
    let resp = h.call("tally_getCandidate", vec![]).await;
    assert_eq!(error_code_of(&resp), error_code::INVALID_PARAMS);

    let resp = h.call("tally_getCandidate", vec![json!(3)]).await;
    assert_eq!(error_code_of(&resp), error_code::NOT_FOUND);
}

#[tokio::test]
async fn test_current_phase_with_explicit_time() {
    let mut h = Harness::new();
    h.setup_election().await;

    assert_eq!(h.call("tally_currentPhase", vec![json!(50)]).await["result"], "notStarted");
    assert_eq!(h.call("tally_currentPhase", vec![json!("0x96")]).await["result"], "open");
    assert_eq!(h.call("tally_currentPhase", vec![json!(201)]).await["result"], "closed");

    h.clock.set(150);
    assert_eq!(h.call("tally_currentPhase", vec![]).await["result"], "open");
}

// =============================================================================
// Signed mutations
// =============================================================================

#[tokio::test]
async fn test_full_voting_flow() {
    let mut h = Harness::new();
    h.setup_election().await;

    let voter = generate_key();
    h.clock.set(150);
    let resp = h
        .signed("tally_vote", LedgerCall::Vote { index: 0 }, 1, &voter)
        .await;
    assert_eq!(resp["result"]["outcome"]["type"], "voteCast");
    assert_eq!(resp["result"]["version"], 4);

    let status = h
        .call("tally_voterStatus", vec![json!(address_of(&voter).to_hex())])
        .await;
    assert_eq!(status["result"]["voted"], true);
    assert_eq!(status["result"]["choiceIndex"], 0);

    // Second vote with a fresh nonce
    let resp = h
        .signed("tally_vote", LedgerCall::Vote { index: 1 }, 2, &voter)
        .await;
    assert_eq!(error_code_of(&resp), error_code::ALREADY_VOTED);

    h.clock.set(250);
    let late = generate_key();
    let resp = h.signed("tally_vote", LedgerCall::Vote { index: 1 }, 1, &late).await;
    assert_eq!(error_code_of(&resp), error_code::VOTING_CLOSED);

    let snapshot = h.call("tally_snapshot", vec![]).await;
    assert_eq!(snapshot["result"]["candidates"][0]["voteCount"], 1);
    assert_eq!(snapshot["result"]["totalVotes"], 1);
    assert_eq!(h.call("tally_totalVotes", vec![]).await["result"], 1);
}

#[tokio::test]
async fn test_non_admin_mutation_is_unauthorized() {
    let h = Harness::new();
    let outsider = generate_key();
    let resp = h
        .signed(
            "tally_addCandidate",
            LedgerCall::AddCandidate {
                name: "Mallory".into(),
                image_ref: String::new(),
            },
            1,
            &outsider,
        )
        .await;
    assert_eq!(error_code_of(&resp), error_code::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_arguments() {
    let mut h = Harness::new();
    let resp = h
        .admin(
            "tally_addCandidate",
            LedgerCall::AddCandidate {
                name: "   ".into(),
                image_ref: String::new(),
            },
        )
        .await;
    assert_eq!(error_code_of(&resp), error_code::INVALID_ARGUMENT);

    let resp = h
        .admin(
            "tally_setVotingPeriod",
            LedgerCall::SetVotingPeriod {
                start_time: 200,
                end_time: 100,
            },
        )
        .await;
    assert_eq!(error_code_of(&resp), error_code::INVALID_ARGUMENT);
}

#[tokio::test]
async fn test_deactivate_flow() {
    let mut h = Harness::new();
    h.setup_election().await;

    let resp = h
        .admin("tally_deactivateCandidate", LedgerCall::DeactivateCandidate { index: 0 })
        .await;
    assert_eq!(resp["result"]["outcome"]["type"], "candidateDeactivated");

    let resp = h
        .admin("tally_deactivateCandidate", LedgerCall::DeactivateCandidate { index: 0 })
        .await;
    assert_eq!(error_code_of(&resp), error_code::ALREADY_INACTIVE);

    let active = h.call("tally_activeCandidates", vec![]).await;
    assert_eq!(active["result"].as_array().unwrap().len(), 1);
    assert_eq!(active["result"][0]["name"], "Bob");
    assert_eq!(h.call("tally_totalCandidates", vec![]).await["result"], 2);
}

#[tokio::test]
async fn test_replayed_envelope_rejected() {
    let mut h = Harness::new();
    h.setup_election().await;
    h.clock.set(150);

    let voter = generate_key();
    let signed = SignedCall::sign(LedgerCall::Vote { index: 0 }, 7, &voter).unwrap();
    let envelope = serde_json::to_value(SignedCallRaw::from_signed(&signed)).unwrap();

    let first = h.call("tally_vote", vec![envelope.clone()]).await;
    assert!(first.get("error").is_none());
    let replay = h.call("tally_vote", vec![envelope]).await;
    assert_eq!(error_code_of(&replay), error_code::AUTHENTICATION_FAILED);

    let nonce = h
        .call("tally_nonce", vec![json!(address_of(&voter).to_hex())])
        .await;
    assert_eq!(nonce["result"], 7);
}

#[tokio::test]
async fn test_method_must_match_call_type() {
    let mut h = Harness::new();
    h.setup_election().await;

    let resp = h
        .admin("tally_vote", LedgerCall::DeactivateCandidate { index: 0 })
        .await;
    assert_eq!(error_code_of(&resp), error_code::INVALID_PARAMS);
    let candidate = h.call("tally_getCandidate", vec![json!(0)]).await;
    assert_eq!(candidate["result"]["active"], true);
}

#[tokio::test]
async fn test_tampered_envelope_does_not_act_as_signer() {
    let mut h = Harness::new();
    h.setup_election().await;

    // Signed as admin for candidate 0, rewritten to target candidate 1
    let signed = SignedCall::sign(
        LedgerCall::DeactivateCandidate { index: 0 },
        100,
        &h.admin_key,
    )
    .unwrap();
    let mut envelope = serde_json::to_value(SignedCallRaw::from_signed(&signed)).unwrap();
    envelope["call"]["index"] = json!(1);

    let resp = h.call("tally_deactivateCandidate", vec![envelope]).await;
    let code = error_code_of(&resp);
    assert!(code == error_code::UNAUTHORIZED || code == error_code::AUTHENTICATION_FAILED);
    assert_eq!(h.call("tally_activeCandidates", vec![]).await["result"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_envelope() {
    let h = Harness::new();
    let resp = h.call("tally_vote", vec![json!({"call": {"type": "vote"}})]).await;
    assert_eq!(error_code_of(&resp), error_code::INVALID_PARAMS);

    let resp = h.call("tally_vote", vec![]).await;
    assert_eq!(error_code_of(&resp), error_code::INVALID_PARAMS);
}
