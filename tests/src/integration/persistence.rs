//! # Persistence Integration Tests
//!
//! Verification outcomes written through the file-backed store must survive
//! an engine restart: terminal records stay queryable, and a Pending record
//! left behind by a crash does not block history reads.

#[cfg(test)]
mod tests {
    use crate::integration::{executors, principal, test_config};
    use bp_01_verification_store::{
        FileBackedKVStore, VerificationStore, VerificationStoreService,
    };
    use bp_02_consensus_engine::test_utils::{ScriptedExecutor, StaticInstructionSource};
    use bp_02_consensus_engine::{
        spawn_timeout_worker, ConsensusEngine, SystemTimeSource, TokioTimerFacility,
        VerificationApi,
    };
    use shared_types::{VerificationKey, VerificationStatus};
    use std::path::Path;
    use std::time::Duration;

    fn file_engine(
        path: &Path,
        executor: ScriptedExecutor,
    ) -> ConsensusEngine<
        VerificationStoreService<FileBackedKVStore>,
        StaticInstructionSource,
        ScriptedExecutor,
        TokioTimerFacility,
        SystemTimeSource,
    > {
        let store = VerificationStoreService::new(FileBackedKVStore::open(path).unwrap());
        let (timer, timer_rx) = TokioTimerFacility::new();
        let engine = ConsensusEngine::new(
            store,
            StaticInstructionSource::empty()
                .with_instructions("proj", "1.0.0")
                .with_instructions("proj", "2.0.0"),
            executor,
            timer,
            SystemTimeSource::default(),
            test_config(),
        );
        spawn_timeout_worker(engine.clone(), timer_rx);
        engine
    }

    #[tokio::test(start_paused = true)]
    async fn test_verified_outcome_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verifications.bin");

        {
            let engine = file_engine(
                &path,
                ScriptedExecutor::all_completing(&executors(), "abcd1234"),
            );
            engine
                .request_verification(&principal("requester"), "proj", "1.0.0", None)
                .await
                .unwrap();

            for _ in 0..1_000 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                let record = engine
                    .get_verification_status("proj", "1.0.0")
                    .await
                    .unwrap();
                if record.is_terminal() {
                    break;
                }
            }
        }

        // Fresh store over the same file: the outcome is still there.
        let reopened = VerificationStoreService::new(FileBackedKVStore::open(&path).unwrap());
        let record = reopened
            .get(&VerificationKey::new("proj", "1.0.0"))
            .unwrap()
            .unwrap();
        assert_eq!(record.status, VerificationStatus::Verified);
        assert_eq!(record.verified_hash.as_deref(), Some("abcd1234"));
    }

    #[tokio::test]
    async fn test_history_accumulates_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verifications.bin");

        // First lifetime: a verification left Pending, as after a crash.
        {
            let engine = file_engine(&path, ScriptedExecutor::new());
            engine
                .request_verification(&principal("requester"), "proj", "1.0.0", None)
                .await
                .unwrap();
        }

        // Second lifetime sees the stale record and can list it.
        let engine = file_engine(&path, ScriptedExecutor::new());
        let history = engine.list_verification_history(None, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].0, VerificationKey::new("proj", "1.0.0"));

        // A different version of the same project is a distinct key.
        engine
            .request_verification(&principal("requester"), "proj", "2.0.0", None)
            .await
            .unwrap();
        let history = engine.list_verification_history(None, None).await.unwrap();
        assert_eq!(history.len(), 2);
    }
}
