//! # Verification Flow Integration Tests
//!
//! Full choreography through the real wiring: access guard (3), consensus
//! engine (2), verification store (1), tokio timer facility, and the
//! timeout worker. Executor endpoints are scripted stubs.
//!
//! Time-dependent flows run under `start_paused` so sleeps and timers
//! auto-advance deterministically.

#[cfg(test)]
mod tests {
    use crate::integration::{executors, principal, test_config};
    use bp_01_verification_store::{InMemoryKVStore, VerificationStoreService};
    use bp_02_consensus_engine::test_utils::{
        ScriptedBehavior, ScriptedExecutor, StaticInstructionSource,
    };
    use bp_02_consensus_engine::{
        spawn_timeout_worker, ConsensusEngine, SystemTimeSource, TokioTimerFacility,
        VerificationApi,
    };
    use shared_types::{FailureReason, VerificationError, VerificationRecord, VerificationStatus};
    use std::time::Duration;

    type FlowEngine = ConsensusEngine<
        VerificationStoreService<InMemoryKVStore>,
        StaticInstructionSource,
        ScriptedExecutor,
        TokioTimerFacility,
        SystemTimeSource,
    >;

    /// Fully wired engine with a running timeout worker.
    fn spawn_engine(executor: ScriptedExecutor) -> FlowEngine {
        let (timer, timer_rx) = TokioTimerFacility::new();
        let engine = ConsensusEngine::new(
            VerificationStoreService::new(InMemoryKVStore::new()),
            StaticInstructionSource::empty().with_instructions("proj", "1.0.0"),
            executor,
            timer,
            SystemTimeSource::default(),
            test_config(),
        );
        spawn_timeout_worker(engine.clone(), timer_rx);
        engine
    }

    /// Poll until the record leaves Pending, or panic after ~10 simulated
    /// seconds.
    async fn await_terminal(engine: &FlowEngine) -> VerificationRecord {
        for _ in 0..1_000 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let record = engine
                .get_verification_status("proj", "1.0.0")
                .await
                .unwrap();
            if record.is_terminal() {
                return record;
            }
        }
        panic!("verification never reached a terminal state");
    }

    fn complete(hash: &str, delay_ms: u64) -> ScriptedBehavior {
        ScriptedBehavior::Complete {
            hash: hash.to_string(),
            delay_ms,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_majority_flow_reaches_verified() {
        let [a, b, c] = [principal("exec-a"), principal("exec-b"), principal("exec-c")];
        let engine = spawn_engine(
            ScriptedExecutor::new()
                .script(&a, complete("abcd1234", 50))
                .script(&b, complete("ffff0000", 80))
                .script(&c, complete("abcd1234", 120)),
        );

        let pending = engine
            .request_verification(&principal("requester"), "proj", "1.0.0", None)
            .await
            .unwrap();
        assert_eq!(pending.status, VerificationStatus::Pending);
        assert_eq!(pending.consensus_threshold, 2);

        let done = await_terminal(&engine).await;
        assert_eq!(done.status, VerificationStatus::Verified);
        assert_eq!(done.verified_hash.as_deref(), Some("abcd1234"));
        assert_eq!(done.matching_results, 2);
        assert!(done.completed_at_ms.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disagreeing_executors_fail_consensus() {
        let [a, b, c] = [principal("exec-a"), principal("exec-b"), principal("exec-c")];
        let engine = spawn_engine(
            ScriptedExecutor::new()
                .script(&a, complete("aaaa", 10))
                .script(&b, complete("bbbb", 20))
                .script(&c, complete("cccc", 30)),
        );

        engine
            .request_verification(&principal("requester"), "proj", "1.0.0", None)
            .await
            .unwrap();

        let done = await_terminal(&engine).await;
        assert_eq!(done.status, VerificationStatus::Failed);
        assert_eq!(done.failure, Some(FailureReason::Consensus));
        assert_eq!(done.matching_results, 1);
        assert!(done.verified_hash.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_executor_errors_do_not_block_majority() {
        let [a, b, c] = [principal("exec-a"), principal("exec-b"), principal("exec-c")];
        let engine = spawn_engine(
            ScriptedExecutor::new()
                .script(
                    &a,
                    ScriptedBehavior::Fail {
                        error: "linker out of memory".to_string(),
                    },
                )
                .script(&b, complete("abcd", 20))
                .script(&c, complete("abcd", 40)),
        );

        engine
            .request_verification(&principal("requester"), "proj", "1.0.0", None)
            .await
            .unwrap();

        let done = await_terminal(&engine).await;
        assert_eq!(done.status, VerificationStatus::Verified);
        assert_eq!(done.verified_hash.as_deref(), Some("abcd"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_flow_with_late_straggler() {
        // One executor answers inside the window, one answers after the
        // timeout, one never answers.
        let [a, b, _] = [principal("exec-a"), principal("exec-b"), principal("exec-c")];
        let engine = spawn_engine(
            ScriptedExecutor::new()
                .script(&a, complete("abcd", 100))
                .script(&b, complete("abcd", 5_000)),
        );

        engine
            .request_verification(&principal("requester"), "proj", "1.0.0", Some(2))
            .await
            .unwrap();

        let done = await_terminal(&engine).await;
        assert_eq!(done.status, VerificationStatus::Failed);
        assert_eq!(done.failure, Some(FailureReason::Timeout));

        // Let the straggler land, then confirm the outcome did not move.
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        let after = engine
            .get_verification_status("proj", "1.0.0")
            .await
            .unwrap();
        assert_eq!(after.status, VerificationStatus::Failed);
        assert_eq!(after.failure, Some(FailureReason::Timeout));
        assert!(after.executor_outcomes.iter().any(|o| o.completed
            && o.executor_id == principal("exec-b")
            && o.hash.as_deref() == Some("abcd")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consensus_beats_the_timer() {
        let engine = spawn_engine(ScriptedExecutor::all_completing(&executors(), "abcd"));

        engine
            .request_verification(&principal("requester"), "proj", "1.0.0", Some(1))
            .await
            .unwrap();

        let done = await_terminal(&engine).await;
        assert_eq!(done.status, VerificationStatus::Verified);

        // The armed timer was cancelled; firing time passing changes nothing.
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        let after = engine
            .get_verification_status("proj", "1.0.0")
            .await
            .unwrap();
        assert_eq!(after.status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_requests_admit_exactly_one() {
        // Hanging executors keep the first request Pending while the
        // second races it.
        let engine = spawn_engine(ScriptedExecutor::new());

        let requester = principal("requester");
        let (first, second) = tokio::join!(
            engine.request_verification(&requester, "proj", "1.0.0", None),
            engine.request_verification(&requester, "proj", "1.0.0", None),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one duplicate request must win");
        let rejected = if first.is_ok() { second } else { first };
        assert!(matches!(
            rejected,
            Err(VerificationError::InvalidInput(_))
        ));

        let active = engine.get_active_verifications().await.unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_then_reverify() {
        let engine = spawn_engine(ScriptedExecutor::new());
        let requester = principal("requester");

        engine
            .request_verification(&requester, "proj", "1.0.0", None)
            .await
            .unwrap();
        engine
            .cancel_verification(&requester, "proj", "1.0.0")
            .await
            .unwrap();

        let cancelled = engine
            .get_verification_status("proj", "1.0.0")
            .await
            .unwrap();
        assert_eq!(cancelled.status, VerificationStatus::Failed);
        assert_eq!(cancelled.failure, Some(FailureReason::Cancelled));

        // Terminal record frees the key; a fresh attempt starts clean.
        let fresh = engine
            .request_verification(&requester, "proj", "1.0.0", None)
            .await
            .unwrap();
        assert_eq!(fresh.status, VerificationStatus::Pending);
        assert!(fresh.executor_outcomes.iter().all(|o| !o.completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_info_tracks_load() {
        let engine = spawn_engine(ScriptedExecutor::all_completing(&executors(), "abcd"));

        let idle = engine.get_engine_info().await.unwrap();
        assert_eq!(idle.total_verifications, 0);
        assert_eq!(idle.active_verifications, 0);
        assert_eq!(idle.executor_endpoints, executors());

        engine
            .request_verification(&principal("requester"), "proj", "1.0.0", None)
            .await
            .unwrap();
        await_terminal(&engine).await;

        let after = engine.get_engine_info().await.unwrap();
        assert_eq!(after.total_verifications, 1);
        assert_eq!(after.active_verifications, 0);

        let history = engine.list_verification_history(None, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].1.status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn test_unauthorized_and_unknown_inputs() {
        let engine = spawn_engine(ScriptedExecutor::new());

        let denied = engine
            .request_verification(&principal("mallory"), "proj", "1.0.0", None)
            .await;
        assert_eq!(denied, Err(VerificationError::Unauthorized));

        let no_instructions = engine
            .request_verification(&principal("requester"), "other-proj", "1.0.0", None)
            .await;
        assert_eq!(no_instructions, Err(VerificationError::InstructionsNotFound));

        let missing = engine.get_verification_status("proj", "1.0.0").await;
        assert_eq!(missing, Err(VerificationError::NotFound));
    }
}
