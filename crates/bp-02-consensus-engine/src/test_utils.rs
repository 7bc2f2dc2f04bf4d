//! Shared test fixtures for engine unit tests and the workspace test suite.
//!
//! Mock implementations of every driven port, with programmable behavior
//! per executor endpoint.

use crate::ports::outbound::{
    BuildExecutor, ExecutorVerdict, InstructionSource, TimeSource, TimerFacility, TimerId,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    InstructionSet, Principal, TimestampMs, VerificationKey, VerificationResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Instruction source backed by a static map.
#[derive(Default)]
pub struct StaticInstructionSource {
    sets: HashMap<(String, String), InstructionSet>,
}

impl StaticInstructionSource {
    /// A source with no instructions registered at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register instructions for (project, version).
    pub fn with_instructions(mut self, project_id: &str, version: &str) -> Self {
        self.sets.insert(
            (project_id.to_string(), version.to_string()),
            InstructionSet {
                project_id: project_id.to_string(),
                version: version.to_string(),
                instructions: vec![
                    "git checkout".to_string(),
                    "make release".to_string(),
                ],
            },
        );
        self
    }
}

#[async_trait]
impl InstructionSource for StaticInstructionSource {
    async fn get_instructions(
        &self,
        project_id: &str,
        version: &str,
    ) -> VerificationResult<Option<InstructionSet>> {
        Ok(self
            .sets
            .get(&(project_id.to_string(), version.to_string()))
            .cloned())
    }
}

/// What a scripted executor endpoint does when called.
#[derive(Debug, Clone)]
pub enum ScriptedBehavior {
    /// Report `hash` after an optional simulated build delay.
    Complete { hash: String, delay_ms: u64 },
    /// Report a build error.
    Fail { error: String },
    /// Never respond; only the timeout can end the verification.
    Hang,
}

/// Build executor stub with per-endpoint scripted behavior.
///
/// Endpoints without a script hang, matching an unresponsive node.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<Principal, ScriptedBehavior>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, endpoint: &Principal, behavior: ScriptedBehavior) -> Self {
        self.scripts.lock().insert(endpoint.clone(), behavior);
        self
    }

    /// Script every listed endpoint to report the same hash immediately.
    pub fn all_completing(endpoints: &[Principal], hash: &str) -> Self {
        let executor = Self::new();
        for endpoint in endpoints {
            executor.scripts.lock().insert(
                endpoint.clone(),
                ScriptedBehavior::Complete {
                    hash: hash.to_string(),
                    delay_ms: 0,
                },
            );
        }
        executor
    }
}

#[async_trait]
impl BuildExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        endpoint: &Principal,
        _instructions: &InstructionSet,
    ) -> ExecutorVerdict {
        let behavior = self.scripts.lock().get(endpoint).cloned();
        match behavior {
            Some(ScriptedBehavior::Complete { hash, delay_ms }) => {
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                ExecutorVerdict::Completed {
                    hash,
                    execution_time_ms: delay_ms.max(1),
                }
            }
            Some(ScriptedBehavior::Fail { error }) => ExecutorVerdict::Failed {
                error,
                execution_time_ms: Some(1),
            },
            Some(ScriptedBehavior::Hang) | None => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// Timer facility that records arm/disarm calls but never fires on its own.
///
/// Tests drive `on_timeout` directly with the recorded timer id.
#[derive(Default)]
pub struct ManualTimerFacility {
    scheduled: Mutex<Vec<(TimerId, u64, VerificationKey)>>,
    cancelled: Mutex<Vec<TimerId>>,
}

impl ManualTimerFacility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently armed timer, if any.
    pub fn last_scheduled(&self) -> Option<(TimerId, u64, VerificationKey)> {
        self.scheduled.lock().last().cloned()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.lock().len()
    }

    pub fn was_cancelled(&self, timer_id: &TimerId) -> bool {
        self.cancelled.lock().contains(timer_id)
    }
}

impl TimerFacility for ManualTimerFacility {
    fn schedule_once(&self, delay_ms: u64, key: VerificationKey) -> TimerId {
        let timer_id = Uuid::new_v4();
        self.scheduled.lock().push((timer_id, delay_ms, key));
        timer_id
    }

    fn cancel(&self, timer_id: &TimerId) -> bool {
        let armed = self
            .scheduled
            .lock()
            .iter()
            .any(|(id, _, _)| id == timer_id);
        if armed {
            self.cancelled.lock().push(*timer_id);
        }
        armed
    }
}

/// Manually advanced clock.
pub struct ManualTimeSource {
    now_ms: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(now_ms: TimestampMs) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: TimestampMs) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> TimestampMs {
        self.now_ms.load(Ordering::SeqCst)
    }
}
