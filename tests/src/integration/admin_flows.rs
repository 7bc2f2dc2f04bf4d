//! # Admin Flow Integration Tests
//!
//! Configuration changes take effect on the next engine call, never
//! retroactively: in-flight verifications keep the executor set they were
//! dispatched with.

#[cfg(test)]
mod tests {
    use crate::integration::{principal, test_config};
    use bp_01_verification_store::{InMemoryKVStore, VerificationStoreService};
    use bp_02_consensus_engine::test_utils::{ScriptedExecutor, StaticInstructionSource};
    use bp_02_consensus_engine::{
        spawn_timeout_worker, ConsensusEngine, SystemTimeSource, TokioTimerFacility,
        VerificationApi,
    };
    use shared_types::VerificationError;

    fn engine() -> ConsensusEngine<
        VerificationStoreService<InMemoryKVStore>,
        StaticInstructionSource,
        ScriptedExecutor,
        TokioTimerFacility,
        SystemTimeSource,
    > {
        let (timer, timer_rx) = TokioTimerFacility::new();
        let engine = ConsensusEngine::new(
            VerificationStoreService::new(InMemoryKVStore::new()),
            StaticInstructionSource::empty()
                .with_instructions("proj", "1.0.0")
                .with_instructions("proj", "2.0.0"),
            ScriptedExecutor::new(),
            timer,
            SystemTimeSource::default(),
            test_config(),
        );
        spawn_timeout_worker(engine.clone(), timer_rx);
        engine
    }

    #[tokio::test]
    async fn test_requester_handover() {
        let engine = engine();

        assert!(engine
            .config()
            .update_authorized_requester(&principal("admin"), principal("new-req")));

        // The old requester is locked out, the new one admitted.
        let old = engine
            .request_verification(&principal("requester"), "proj", "1.0.0", None)
            .await;
        assert_eq!(old, Err(VerificationError::Unauthorized));

        engine
            .request_verification(&principal("new-req"), "proj", "1.0.0", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_executor_set_change_applies_to_new_verifications_only() {
        let engine = engine();

        let first = engine
            .request_verification(&principal("requester"), "proj", "1.0.0", None)
            .await
            .unwrap();
        assert_eq!(first.total_executors, 3);
        assert_eq!(first.consensus_threshold, 2);

        let five: Vec<_> = (0..5)
            .map(|i| principal(&format!("exec-{i}")))
            .collect();
        assert!(engine
            .config()
            .update_executor_endpoints(&principal("admin"), five));

        let second = engine
            .request_verification(&principal("requester"), "proj", "2.0.0", None)
            .await
            .unwrap();
        assert_eq!(second.total_executors, 5);
        assert_eq!(second.consensus_threshold, 3);

        // The in-flight record kept its dispatch-time executor set.
        let first_again = engine
            .get_verification_status("proj", "1.0.0")
            .await
            .unwrap();
        assert_eq!(first_again.total_executors, 3);
    }

    #[tokio::test]
    async fn test_non_admin_mutations_have_no_effect() {
        let engine = engine();

        assert!(!engine
            .config()
            .update_executor_endpoints(&principal("requester"), vec![principal("rogue")]));
        assert!(!engine
            .config()
            .update_instruction_source(&principal("mallory"), principal("rogue-src")));

        let info = engine.get_engine_info().await.unwrap();
        assert_eq!(info.executor_endpoints.len(), 3);
        assert_eq!(info.instruction_source, principal("instructions"));
    }
}
