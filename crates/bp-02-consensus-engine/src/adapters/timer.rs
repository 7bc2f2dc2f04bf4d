//! Tokio-backed one-shot timer facility.

use crate::ports::outbound::{TimerFacility, TimerFired, TimerId};
use parking_lot::Mutex;
use shared_types::VerificationKey;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// One tokio sleep task per armed timer; fired timers are delivered over an
/// unbounded channel to the engine's timeout worker
/// ([`spawn_timeout_worker`](crate::service::spawn_timeout_worker)).
///
/// `cancel` aborts the sleep task, so a disarmed timer never reaches the
/// channel. Must be used inside a tokio runtime.
pub struct TokioTimerFacility {
    tx: mpsc::UnboundedSender<TimerFired>,
    tasks: Mutex<HashMap<TimerId, JoinHandle<()>>>,
}

impl TokioTimerFacility {
    /// Create the facility and the receiving end for the timeout worker.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                tasks: Mutex::new(HashMap::new()),
            },
            rx,
        )
    }
}

impl TimerFacility for TokioTimerFacility {
    fn schedule_once(&self, delay_ms: u64, key: VerificationKey) -> TimerId {
        let timer_id = Uuid::new_v4();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // Receiver gone means the engine is shutting down.
            let _ = tx.send(TimerFired { key, timer_id });
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|_, h| !h.is_finished());
        tasks.insert(timer_id, handle);
        timer_id
    }

    fn cancel(&self, timer_id: &TimerId) -> bool {
        match self.tasks.lock().remove(timer_id) {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            Some(_) => false,
            None => false,
        }
    }
}
