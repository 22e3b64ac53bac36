//! Voting ledger implementation

use crate::context::CallContext;
use crate::error::{LedgerError, LedgerResult};
use crate::receipt::{CallOutcome, CallReceipt};
use crate::snapshot::LedgerSnapshot;
use parking_lot::RwLock;
use std::sync::Arc;
use tally_primitives::{Address, CandidateIndex, StateVersion, Timestamp};
use tally_storage::{LedgerStore, MemoryStore, PersistedState, StateChanges};
use tally_types::{
    is_valid_name, Candidate, LedgerCall, Phase, VoterRecord, VoterStatus, VotingPeriod,
};
use tokio::sync::watch;
use tracing::{debug, info};

/// The voting ledger.
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct VotingLedger {
    admin: Address,
    state: RwLock<PersistedState>,
    store: Arc<dyn LedgerStore>,
    version_tx: watch::Sender<StateVersion>,
}

impl std::fmt::Debug for VotingLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VotingLedger")
            .field("admin", &self.admin)
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl VotingLedger {
    /// Open the ledger held by `store`, initializing it for `admin` if empty.
    ///
    /// A populated store must already belong to `admin`.
    pub fn open(store: Arc<dyn LedgerStore>, admin: Address) -> LedgerResult<Self> {
        if admin.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "admin must not be the zero address".to_string(),
            ));
        }

        let state = match store.load()? {
            Some(state) => {
                if state.admin != admin {
                    return Err(LedgerError::AdminMismatch {
                        stored: state.admin,
                        configured: admin,
                    });
                }
                check_tally(&state)?;
                info!(
                    %admin,
                    candidates = state.candidates.len(),
                    votes = state.voters.len(),
                    version = state.version,
                    "ledger opened"
                );
                state
            }
            None => {
                store.commit(&StateChanges::new().set_admin(admin).set_version(0))?;
                info!(%admin, "ledger initialized");
                PersistedState::genesis(admin)
            }
        };

        let (version_tx, _) = watch::channel(state.version);
        Ok(Self {
            admin,
            state: RwLock::new(state),
            store,
            version_tx,
        })
    }

    /// Fresh ledger backed by a [`MemoryStore`]
    pub fn in_memory(admin: Address) -> LedgerResult<Self> {
        Self::open(Arc::new(MemoryStore::new()), admin)
    }

    // ==================== Candidate registry ====================

    /// Register a candidate and return its index (admin only)
    pub fn add_candidate(
        &self,
        ctx: &CallContext,
        name: &str,
        image_ref: &str,
    ) -> LedgerResult<CandidateIndex> {
        self.register(ctx, name, image_ref).map(|(index, _)| index)
    }

    fn register(
        &self,
        ctx: &CallContext,
        name: &str,
        image_ref: &str,
    ) -> LedgerResult<(CandidateIndex, StateVersion)> {
        let mut state = self.state.write();
        self.require_admin(ctx, "addCandidate")?;
        if !is_valid_name(name) {
            debug!(caller = %ctx.sender(), "addCandidate rejected: empty name");
            return Err(LedgerError::InvalidArgument(
                "candidate name must not be empty".to_string(),
            ));
        }

        let index = state.candidates.len() as CandidateIndex;
        let changes = StateChanges::new().put_candidate(Candidate::new(index, name, image_ref));
        let version = self.commit(&mut state, changes)?;

        info!(index, name, version, "candidate added");
        Ok((index, version))
    }

    /// Mark a candidate inactive (admin only). Its votes stay counted.
    pub fn deactivate_candidate(&self, ctx: &CallContext, index: CandidateIndex) -> LedgerResult<()> {
        self.tombstone(ctx, index).map(drop)
    }

    fn tombstone(&self, ctx: &CallContext, index: CandidateIndex) -> LedgerResult<StateVersion> {
        let mut state = self.state.write();
        self.require_admin(ctx, "deactivateCandidate")?;

        let candidate = candidate_at(&state, index).ok_or(LedgerError::NotFound(index))?;
        if !candidate.active {
            debug!(index, "deactivateCandidate rejected: already inactive");
            return Err(LedgerError::AlreadyInactive(index));
        }

        let changes = StateChanges::new().put_candidate(candidate.deactivated());
        let version = self.commit(&mut state, changes)?;

        info!(index, version, "candidate deactivated");
        Ok(version)
    }

    /// All candidates in ascending index order, active and inactive
    pub fn list_candidates(&self) -> Vec<Candidate> {
        self.state.read().candidates.clone()
    }

    /// Candidates that can currently receive votes
    pub fn active_candidates(&self) -> Vec<Candidate> {
        self.state
            .read()
            .candidates
            .iter()
            .filter(|c| c.active)
            .cloned()
            .collect()
    }

    /// Candidate by index, including inactive ones
    pub fn get_candidate(&self, index: CandidateIndex) -> LedgerResult<Candidate> {
        candidate_at(&self.state.read(), index)
            .cloned()
            .ok_or(LedgerError::NotFound(index))
    }

    /// Number of indices ever allocated
    pub fn total_candidates(&self) -> u64 {
        self.state.read().candidates.len() as u64
    }

    // ==================== Voting period ====================

    /// Replace the voting window (admin only). Votes already cast stand.
    pub fn set_voting_period(
        &self,
        ctx: &CallContext,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> LedgerResult<()> {
        self.replace_period(ctx, start_time, end_time).map(drop)
    }

    fn replace_period(
        &self,
        ctx: &CallContext,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> LedgerResult<StateVersion> {
        let mut state = self.state.write();
        self.require_admin(ctx, "setVotingPeriod")?;

        let period = VotingPeriod::new(start_time, end_time).ok_or_else(|| {
            debug!(start_time, end_time, "setVotingPeriod rejected: empty window");
            LedgerError::InvalidArgument(format!(
                "end time {} must be after start time {}",
                end_time, start_time
            ))
        })?;

        let version = self.commit(&mut state, StateChanges::new().set_period(period))?;

        info!(start_time, end_time, version, "voting period set");
        Ok(version)
    }

    /// Current voting window; both zero when unset
    pub fn voting_period(&self) -> VotingPeriod {
        self.state.read().period
    }

    /// Phase of the voting window at `now`
    pub fn current_phase(&self, now: Timestamp) -> Phase {
        self.state.read().period.phase_at(now)
    }

    // ==================== Voting ====================

    /// Record the caller's vote for `index`.
    ///
    /// Checks, first failure wins: window open, candidate active, caller
    /// has not voted.
    pub fn vote(&self, ctx: &CallContext, index: CandidateIndex) -> LedgerResult<()> {
        self.cast(ctx, index).map(drop)
    }

    fn cast(&self, ctx: &CallContext, index: CandidateIndex) -> LedgerResult<StateVersion> {
        let mut state = self.state.write();
        let voter = *ctx.sender();

        let phase = state.period.phase_at(ctx.timestamp());
        if phase != Phase::Open {
            debug!(%voter, %phase, "vote rejected: window not open");
            return Err(LedgerError::VotingClosed { phase });
        }

        let candidate = match candidate_at(&state, index) {
            Some(c) if c.active => c,
            _ => {
                debug!(%voter, index, "vote rejected: no active candidate");
                return Err(LedgerError::NotFound(index));
            }
        };

        if state.voters.get(&voter).is_some_and(|r| r.voted) {
            debug!(%voter, "vote rejected: already voted");
            return Err(LedgerError::AlreadyVoted(voter));
        }

        let changes = StateChanges::new()
            .put_candidate(candidate.with_vote())
            .put_voter(voter, VoterRecord::cast(index));
        let version = self.commit(&mut state, changes)?;

        info!(%voter, index, version, "vote cast");
        Ok(version)
    }

    /// Voting status of any identity, including ones never seen
    pub fn voter_status(&self, address: &Address) -> VoterStatus {
        self.state
            .read()
            .voters
            .get(address)
            .copied()
            .unwrap_or_default()
            .status()
    }

    /// Number of identities that have voted
    pub fn total_votes(&self) -> u64 {
        self.state.read().voters.values().filter(|r| r.voted).count() as u64
    }

    // ==================== Genesis ====================

    /// Seed an empty ledger with candidates `(name, image_ref)` and an
    /// optional window, committed as one batch (admin only).
    ///
    /// Returns `None` without writing when the ledger already has history.
    pub fn apply_genesis(
        &self,
        ctx: &CallContext,
        candidates: &[(String, String)],
        period: Option<VotingPeriod>,
    ) -> LedgerResult<Option<StateVersion>> {
        let mut state = self.state.write();
        self.require_admin(ctx, "genesis")?;
        if state.version != 0 {
            debug!(version = state.version, "genesis skipped: ledger has history");
            return Ok(None);
        }

        let mut changes = StateChanges::new();
        for (offset, (name, image_ref)) in candidates.iter().enumerate() {
            if !is_valid_name(name) {
                return Err(LedgerError::InvalidArgument(format!(
                    "genesis candidate #{} has an empty name",
                    offset
                )));
            }
            let index = (state.candidates.len() + offset) as CandidateIndex;
            changes = changes.put_candidate(Candidate::new(index, name, image_ref));
        }
        if let Some(period) = period {
            if VotingPeriod::new(period.start_time, period.end_time).is_none() {
                return Err(LedgerError::InvalidArgument(format!(
                    "genesis window end {} must be after start {}",
                    period.end_time, period.start_time
                )));
            }
            changes = changes.set_period(period);
        }
        if candidates.is_empty() && period.is_none() {
            return Ok(Some(state.version));
        }

        let version = self.commit(&mut state, changes)?;
        info!(candidates = candidates.len(), version, "genesis applied");
        Ok(Some(version))
    }

    // ==================== Calls as data ====================

    /// Execute a [`LedgerCall`] and report what it did
    pub fn apply(&self, ctx: &CallContext, call: &LedgerCall) -> LedgerResult<CallReceipt> {
        let (outcome, version) = match call {
            LedgerCall::AddCandidate { name, image_ref } => {
                let (index, version) = self.register(ctx, name, image_ref)?;
                (CallOutcome::CandidateAdded { index }, version)
            }
            LedgerCall::DeactivateCandidate { index } => (
                CallOutcome::CandidateDeactivated { index: *index },
                self.tombstone(ctx, *index)?,
            ),
            LedgerCall::SetVotingPeriod {
                start_time,
                end_time,
            } => {
                let version = self.replace_period(ctx, *start_time, *end_time)?;
                let period = VotingPeriod {
                    start_time: *start_time,
                    end_time: *end_time,
                };
                (CallOutcome::VotingPeriodSet { period }, version)
            }
            LedgerCall::Vote { index } => (
                CallOutcome::VoteCast { index: *index },
                self.cast(ctx, *index)?,
            ),
        };

        Ok(CallReceipt { version, outcome })
    }

    // ==================== Versioning & snapshots ====================

    /// Admin identity
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Version of the last successful mutation
    pub fn version(&self) -> StateVersion {
        self.state.read().version
    }

    /// Change feed: the receiver observes every new state version
    pub fn subscribe(&self) -> watch::Receiver<StateVersion> {
        self.version_tx.subscribe()
    }

    /// Consistent view of the whole ledger
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            version: state.version,
            admin: state.admin,
            period: state.period,
            candidates: state.candidates.clone(),
            total_votes: state.voters.values().filter(|r| r.voted).count() as u64,
        }
    }

    /// Re-check the tally invariants against current state
    pub fn verify(&self) -> LedgerResult<()> {
        check_tally(&self.state.read())
    }

    // ==================== Internals ====================

    fn require_admin(&self, ctx: &CallContext, op: &str) -> LedgerResult<()> {
        if *ctx.sender() != self.admin {
            debug!(caller = %ctx.sender(), op, "rejected: caller is not admin");
            return Err(LedgerError::Unauthorized {
                caller: *ctx.sender(),
            });
        }
        Ok(())
    }

    /// Persist, then apply. Must be called with the write lock held.
    fn commit(&self, state: &mut PersistedState, changes: StateChanges) -> LedgerResult<StateVersion> {
        let version = state.version + 1;
        let changes = changes.set_version(version);
        self.store.commit(&changes)?;
        state.apply(&changes);
        self.version_tx.send_replace(version);
        Ok(version)
    }
}

fn candidate_at(state: &PersistedState, index: CandidateIndex) -> Option<&Candidate> {
    usize::try_from(index)
        .ok()
        .and_then(|i| state.candidates.get(i))
}

/// Stable indices, every vote pointing at a real candidate, and
/// `sum(vote_count) == number of voters`.
fn check_tally(state: &PersistedState) -> LedgerResult<()> {
    for (position, candidate) in state.candidates.iter().enumerate() {
        if candidate.index != position as u64 {
            return Err(LedgerError::Inconsistent(format!(
                "candidate at position {} has index {}",
                position, candidate.index
            )));
        }
    }

    let mut per_candidate = vec![0u64; state.candidates.len()];
    for (address, record) in state.voters.iter().filter(|(_, r)| r.voted) {
        let slot = per_candidate
            .get_mut(record.choice_index as usize)
            .ok_or_else(|| {
                LedgerError::Inconsistent(format!(
                    "{} voted for unknown candidate {}",
                    address, record.choice_index
                ))
            })?;
        *slot += 1;
    }

    for (candidate, counted) in state.candidates.iter().zip(per_candidate) {
        if candidate.vote_count != counted {
            return Err(LedgerError::Inconsistent(format!(
                "candidate {} records {} votes but {} voters chose it",
                candidate.index, candidate.vote_count, counted
            )));
        }
    }
    Ok(())
}
