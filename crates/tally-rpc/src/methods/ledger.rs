//! Ledger namespace RPC methods (tally_*)

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::handler::RpcContext;
use crate::types::{parse_address, parse_signed_call, parse_u64, required_param};

fn to_json<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

// ==================== Reads ====================

/// tally_admin - Returns the admin address
pub async fn tally_admin(ctx: Arc<RpcContext>, _params: Vec<Value>) -> Result<Value, JsonRpcError> {
    to_json(ctx.ledger.admin())
}

/// tally_totalCandidates - Returns the number of candidate indices allocated
pub async fn tally_total_candidates(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    Ok(Value::from(ctx.ledger.total_candidates()))
}

/// tally_getCandidate - Returns one candidate, active or not
pub async fn tally_get_candidate(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let index = parse_u64(required_param(&params, 0, "index")?)?;
    to_json(ctx.ledger.get_candidate(index)?)
}

/// tally_listCandidates - Returns every candidate in index order
pub async fn tally_list_candidates(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    to_json(ctx.ledger.list_candidates())
}

/// tally_activeCandidates - Returns the candidates that accept votes
pub async fn tally_active_candidates(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    to_json(ctx.ledger.active_candidates())
}

/// tally_votingPeriod - Returns the voting window
pub async fn tally_voting_period(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    to_json(ctx.ledger.voting_period())
}

/// tally_currentPhase - Returns the phase at the given time, or now
pub async fn tally_current_phase(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let now = match params.first() {
        Some(value) if !value.is_null() => parse_u64(value)?,
        _ => ctx.clock.now(),
    };
    to_json(ctx.ledger.current_phase(now))
}

/// tally_voterStatus - Returns whether an address voted, and for whom
pub async fn tally_voter_status(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let address = parse_address(required_param(&params, 0, "address")?)?;
    to_json(ctx.ledger.voter_status(&address))
}

/// tally_totalVotes - Returns the number of identities that voted
pub async fn tally_total_votes(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    Ok(Value::from(ctx.ledger.total_votes()))
}

/// tally_stateVersion - Returns the version of the last mutation
pub async fn tally_state_version(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    Ok(Value::from(ctx.ledger.version()))
}

/// tally_snapshot - Returns a consistent view of the whole ledger
pub async fn tally_snapshot(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    to_json(ctx.ledger.snapshot())
}

/// tally_nonce - Returns the last nonce accepted from an address, or null
pub async fn tally_nonce(ctx: Arc<RpcContext>, params: Vec<Value>) -> Result<Value, JsonRpcError> {
    let address = parse_address(required_param(&params, 0, "address")?)?;
    Ok(ctx.auth.last_nonce(&address).map(Value::from).unwrap_or(Value::Null))
}

// ==================== Signed mutations ====================

async fn execute_signed(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
    op: &str,
) -> Result<Value, JsonRpcError> {
    let signed = parse_signed_call(required_param(&params, 0, "signed call")?)?;
    to_json(ctx.execute(op, &signed)?)
}

/// tally_addCandidate - Registers a candidate (admin)
pub async fn tally_add_candidate(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    execute_signed(ctx, params, "addCandidate").await
}

/// tally_deactivateCandidate - Tombstones a candidate (admin)
pub async fn tally_deactivate_candidate(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    execute_signed(ctx, params, "deactivateCandidate").await
}

/// tally_setVotingPeriod - Replaces the voting window (admin)
pub async fn tally_set_voting_period(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    execute_signed(ctx, params, "setVotingPeriod").await
}

/// tally_vote - Casts the signer's vote
pub async fn tally_vote(ctx: Arc<RpcContext>, params: Vec<Value>) -> Result<Value, JsonRpcError> {
    execute_signed(ctx, params, "vote").await
}
