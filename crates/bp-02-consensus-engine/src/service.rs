//! Consensus engine service - core business logic.
//!
//! All record mutation (executor reports, timeouts, cancellation) is
//! serialized under one engine lock, giving the single-writer-per-key
//! discipline the state machine relies on. No lock is ever held across an
//! await point: executor dispatch and instruction lookup happen outside it.

use crate::domain::consensus::{evaluate, ConsensusDecision};
use crate::domain::validation::{validate_project_id, validate_version};
use crate::metrics;
use crate::ports::inbound::{
    EngineInfo, VerificationApi, DEFAULT_HISTORY_LIMIT, DEFAULT_TIMEOUT_SECS,
};
use crate::ports::outbound::{
    BuildExecutor, ExecutorVerdict, InstructionSource, TimeSource, TimerFacility, TimerFired,
    TimerId,
};
use async_trait::async_trait;
use bp_01_verification_store::{StoreError, VerificationStore};
use bp_03_admin_access::{
    require_authorized_requester, require_requester_or_admin, AdminConfigStore,
};
use parking_lot::Mutex;
use shared_types::{
    FailureReason, Principal, VerificationError, VerificationKey, VerificationRecord,
    VerificationResult, VerificationStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Identifier of one executor fan-out.
///
/// A fresh id is minted per accepted request, so a straggler report from a
/// superseded dispatch of the same key is recognized and dropped rather
/// than landing in the new record's slots.
pub type DispatchId = Uuid;

/// Mutable engine bookkeeping, guarded by the engine lock.
struct EngineState {
    /// The armed timer per Pending key. An entry is removed when the timer
    /// is disarmed or its key is finalized; a fired timer whose id no
    /// longer matches is stale and ignored.
    timers: HashMap<VerificationKey, TimerId>,
    /// The live dispatch per key, replaced when the key is re-requested.
    /// Reports carrying any other dispatch id are stale and ignored.
    dispatches: HashMap<VerificationKey, DispatchId>,
}

/// The Build Verification Consensus Engine.
///
/// Generic over its ports so tests construct isolated instances with mock
/// collaborators. Cheap to clone; clones share all state.
pub struct ConsensusEngine<V, I, X, T, C> {
    store: Arc<V>,
    instructions: Arc<I>,
    executor: Arc<X>,
    timer: Arc<T>,
    clock: Arc<C>,
    config: AdminConfigStore,
    state: Arc<Mutex<EngineState>>,
}

impl<V, I, X, T, C> Clone for ConsensusEngine<V, I, X, T, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            instructions: Arc::clone(&self.instructions),
            executor: Arc::clone(&self.executor),
            timer: Arc::clone(&self.timer),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

fn map_store_error(err: StoreError) -> VerificationError {
    match err {
        StoreError::PendingExists { key } => VerificationError::InvalidInput(format!(
            "duplicate verification request for {key}"
        )),
        other => VerificationError::InternalError(other.to_string()),
    }
}

impl<V, I, X, T, C> ConsensusEngine<V, I, X, T, C>
where
    V: VerificationStore + 'static,
    I: InstructionSource + 'static,
    X: BuildExecutor + 'static,
    T: TimerFacility + 'static,
    C: TimeSource + 'static,
{
    pub fn new(
        store: V,
        instructions: I,
        executor: X,
        timer: T,
        clock: C,
        config: AdminConfigStore,
    ) -> Self {
        Self {
            store: Arc::new(store),
            instructions: Arc::new(instructions),
            executor: Arc::new(executor),
            timer: Arc::new(timer),
            clock: Arc::new(clock),
            config,
            state: Arc::new(Mutex::new(EngineState {
                timers: HashMap::new(),
                dispatches: HashMap::new(),
            })),
        }
    }

    /// Shared handle to the admin configuration.
    pub fn config(&self) -> &AdminConfigStore {
        &self.config
    }

    /// Apply one executor's report to its verification.
    ///
    /// Invoked once per executor per dispatch, in arbitrary order and
    /// timing. A report whose dispatch id is no longer the live one for the
    /// key (the key was cancelled or finished and then re-requested) is
    /// dropped, so an old run's hash can never fill a new record's slot.
    /// A live-dispatch report against a terminal record is recorded in its
    /// slot for audit but never re-triggers a transition.
    pub fn on_executor_result(
        &self,
        key: &VerificationKey,
        dispatch_id: DispatchId,
        executor_id: &Principal,
        verdict: ExecutorVerdict,
    ) -> VerificationResult<()> {
        let mut state = self.state.lock();
        match state.dispatches.get(key) {
            Some(current) if *current == dispatch_id => {}
            _ => {
                tracing::debug!(
                    key = %key,
                    executor = %executor_id,
                    "Report from superseded dispatch ignored"
                );
                return Ok(());
            }
        }

        let mut record = self
            .store
            .get(key)
            .map_err(map_store_error)?
            .ok_or(VerificationError::NotFound)?;
        let now = self.clock.now_ms();

        // Completion order within this record, used by the tie-break.
        let completion_index = record.completed_count() as u64;
        let slot = record.outcome_mut(executor_id).ok_or_else(|| {
            VerificationError::InternalError(format!(
                "executor {executor_id} was not dispatched for {key}"
            ))
        })?;
        if slot.completed {
            tracing::warn!(key = %key, executor = %executor_id, "Duplicate executor report ignored");
            return Ok(());
        }
        slot.completed = true;
        slot.completion_index = Some(completion_index);
        match verdict {
            ExecutorVerdict::Completed {
                hash,
                execution_time_ms,
            } => {
                slot.hash = Some(hash);
                slot.execution_time_ms = Some(execution_time_ms);
            }
            ExecutorVerdict::Failed {
                error,
                execution_time_ms,
            } => {
                tracing::debug!(key = %key, executor = %executor_id, error = %error, "Executor reported a build failure");
                slot.error = Some(error);
                slot.execution_time_ms = execution_time_ms;
            }
        }
        metrics::record_executor_report();

        let decision = evaluate(&record.executor_outcomes, record.consensus_threshold);
        let matching = match &decision {
            ConsensusDecision::Verified { matching, .. }
            | ConsensusDecision::NoMajority { matching }
            | ConsensusDecision::Undecided { matching } => *matching,
        };
        record.matching_results = matching;

        if record.is_terminal() {
            // Late arrival: audit only, terminal fields stay untouched.
            self.store.update(&record).map_err(map_store_error)?;
            tracing::debug!(key = %key, executor = %executor_id, "Late executor report recorded on terminal verification");
            return Ok(());
        }

        match decision {
            ConsensusDecision::Undecided { .. } => {
                self.store.update(&record).map_err(map_store_error)?;
            }
            ConsensusDecision::Verified { hash, matching } => {
                record.status = VerificationStatus::Verified;
                record.verified_hash = Some(hash.clone());
                record.completed_at_ms = Some(now);
                self.disarm_timer(&mut state, key);
                self.store.update(&record).map_err(map_store_error)?;
                tracing::info!(
                    key = %key,
                    hash = %hash,
                    matching,
                    threshold = record.consensus_threshold,
                    "Verification reached consensus"
                );
                metrics::record_verified();
            }
            ConsensusDecision::NoMajority { matching } => {
                record.status = VerificationStatus::Failed;
                record.failure = Some(FailureReason::Consensus);
                record.completed_at_ms = Some(now);
                self.disarm_timer(&mut state, key);
                self.store.update(&record).map_err(map_store_error)?;
                tracing::warn!(
                    key = %key,
                    matching,
                    threshold = record.consensus_threshold,
                    "All executors reported without reaching consensus"
                );
                metrics::record_failed("consensus_failure");
            }
        }
        Ok(())
    }

    /// Finalize a verification whose timer fired.
    ///
    /// No-op if the record already reached a terminal state (the timer and
    /// consensus completion race benignly) or if the fired timer is stale -
    /// a later verification of the same key owns a different timer id.
    pub fn on_timeout(&self, fired: &TimerFired) -> VerificationResult<()> {
        let mut state = self.state.lock();
        match state.timers.get(&fired.key) {
            Some(armed) if *armed == fired.timer_id => {
                state.timers.remove(&fired.key);
            }
            _ => {
                tracing::debug!(key = %fired.key, "Stale timer fire ignored");
                return Ok(());
            }
        }

        let Some(mut record) = self.store.get(&fired.key).map_err(map_store_error)? else {
            return Ok(());
        };
        if record.is_terminal() {
            return Ok(());
        }

        record.status = VerificationStatus::Failed;
        record.failure = Some(FailureReason::Timeout);
        record.completed_at_ms = Some(self.clock.now_ms());
        self.store.update(&record).map_err(map_store_error)?;
        tracing::warn!(
            key = %fired.key,
            reported = record.completed_count(),
            total = record.total_executors,
            "Verification timed out before consensus"
        );
        metrics::record_failed("timeout");
        Ok(())
    }

    /// Disarm the timer owned by `key`, if any.
    fn disarm_timer(&self, state: &mut EngineState, key: &VerificationKey) {
        if let Some(timer_id) = state.timers.remove(key) {
            self.timer.cancel(&timer_id);
        }
    }

    /// Fan the build out to every executor endpoint as detached tasks.
    fn dispatch(
        &self,
        key: &VerificationKey,
        dispatch_id: DispatchId,
        endpoints: &[Principal],
        instructions: shared_types::InstructionSet,
    ) {
        for endpoint in endpoints.iter().cloned() {
            let engine = self.clone();
            let instructions = instructions.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let verdict = engine.executor.execute(&endpoint, &instructions).await;
                if let Err(e) = engine.on_executor_result(&key, dispatch_id, &endpoint, verdict) {
                    tracing::error!(
                        key = %key,
                        executor = %endpoint,
                        error = %e,
                        "Failed to apply executor result"
                    );
                }
            });
        }
    }
}

#[async_trait]
impl<V, I, X, T, C> VerificationApi for ConsensusEngine<V, I, X, T, C>
where
    V: VerificationStore + 'static,
    I: InstructionSource + 'static,
    X: BuildExecutor + 'static,
    T: TimerFacility + 'static,
    C: TimeSource + 'static,
{
    async fn request_verification(
        &self,
        caller: &Principal,
        project_id: &str,
        version: &str,
        timeout_secs: Option<u64>,
    ) -> VerificationResult<VerificationRecord> {
        let config = self.config.snapshot();
        require_authorized_requester(&config, caller)?;
        validate_project_id(project_id)?;
        validate_version(version)?;
        if config.executor_endpoints.is_empty() {
            return Err(VerificationError::InternalError(
                "no executor endpoints configured".to_string(),
            ));
        }

        let instructions = self
            .instructions
            .get_instructions(project_id, version)
            .await?
            .ok_or(VerificationError::InstructionsNotFound)?;

        let key = VerificationKey::new(project_id, version);
        let record =
            VerificationRecord::new(key.clone(), &config.executor_endpoints, self.clock.now_ms());

        // The insert doubles as the atomic dedup check: of two concurrent
        // requests for the same key, exactly one passes.
        self.store
            .insert_unless_pending(&record)
            .map_err(map_store_error)?;

        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timer_id = self
            .timer
            .schedule_once(timeout_secs.saturating_mul(1_000), key.clone());
        let dispatch_id = Uuid::new_v4();
        {
            let mut state = self.state.lock();
            state.timers.insert(key.clone(), timer_id);
            state.dispatches.insert(key.clone(), dispatch_id);
        }

        tracing::info!(
            key = %key,
            executors = record.total_executors,
            threshold = record.consensus_threshold,
            timeout_secs,
            "Verification dispatched"
        );
        metrics::record_request_accepted();

        self.dispatch(&key, dispatch_id, &config.executor_endpoints, instructions);
        Ok(record)
    }

    async fn get_verification_status(
        &self,
        project_id: &str,
        version: &str,
    ) -> VerificationResult<VerificationRecord> {
        let key = VerificationKey::new(project_id, version);
        self.store
            .get(&key)
            .map_err(map_store_error)?
            .ok_or(VerificationError::NotFound)
    }

    async fn cancel_verification(
        &self,
        caller: &Principal,
        project_id: &str,
        version: &str,
    ) -> VerificationResult<()> {
        let config = self.config.snapshot();
        require_requester_or_admin(&config, caller)?;

        let key = VerificationKey::new(project_id, version);
        let mut state = self.state.lock();
        let mut record = self
            .store
            .get(&key)
            .map_err(map_store_error)?
            .ok_or(VerificationError::NotFound)?;
        if record.is_terminal() {
            return Err(VerificationError::InvalidInput(
                "only pending verifications can be cancelled".to_string(),
            ));
        }

        record.status = VerificationStatus::Failed;
        record.failure = Some(FailureReason::Cancelled);
        record.completed_at_ms = Some(self.clock.now_ms());
        self.disarm_timer(&mut state, &key);
        self.store.update(&record).map_err(map_store_error)?;
        tracing::info!(key = %key, caller = %caller, "Verification cancelled");
        metrics::record_failed("cancelled");
        Ok(())
    }

    async fn list_verification_history(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> VerificationResult<Vec<(VerificationKey, VerificationRecord)>> {
        let offset = offset.unwrap_or(0) as usize;
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT) as usize;
        self.store
            .scan_history(offset, limit)
            .map_err(map_store_error)
    }

    async fn get_active_verifications(
        &self,
    ) -> VerificationResult<Vec<(VerificationKey, VerificationRecord)>> {
        self.store.active().map_err(map_store_error)
    }

    async fn get_engine_info(&self) -> VerificationResult<EngineInfo> {
        let config = self.config.snapshot();
        let counts = self.store.counts().map_err(map_store_error)?;
        metrics::set_active_verifications(counts.active);
        Ok(EngineInfo {
            version: config.version,
            deployed_at_ms: config.deployed_at_ms,
            total_verifications: counts.total,
            active_verifications: counts.active,
            executor_endpoints: config.executor_endpoints,
            instruction_source: config.instruction_source,
        })
    }
}

/// Drain fired timers into [`ConsensusEngine::on_timeout`].
pub fn spawn_timeout_worker<V, I, X, T, C>(
    engine: ConsensusEngine<V, I, X, T, C>,
    mut rx: mpsc::UnboundedReceiver<TimerFired>,
) -> JoinHandle<()>
where
    V: VerificationStore + 'static,
    I: InstructionSource + 'static,
    X: BuildExecutor + 'static,
    T: TimerFacility + 'static,
    C: TimeSource + 'static,
{
    tokio::spawn(async move {
        while let Some(fired) = rx.recv().await {
            if let Err(e) = engine.on_timeout(&fired) {
                tracing::error!(key = %fired.key, error = %e, "Timeout handling failed");
            }
        }
    })
}
