//! Admin configuration store.

use crate::guard::require_admin;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{Principal, TimestampMs};
use std::sync::Arc;

/// Engine-wide configuration, mutable only by the admin principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Principal allowed to call `request_verification`.
    pub authorized_requester: Principal,
    /// Principal allowed to mutate this configuration.
    pub admin: Principal,
    /// Executor endpoints work is fanned out to. Never empty.
    pub executor_endpoints: Vec<Principal>,
    /// Reference to the external Instruction Source.
    pub instruction_source: Principal,
    /// Engine build/version tag.
    pub version: String,
    /// Immutable creation timestamp.
    pub deployed_at_ms: TimestampMs,
}

/// Shared handle to the live [`AdminConfig`].
///
/// Readers take a consistent snapshot; mutators hold the write lock for the
/// whole validate-then-apply step so no partial update is ever visible.
#[derive(Clone)]
pub struct AdminConfigStore {
    inner: Arc<RwLock<AdminConfig>>,
}

impl AdminConfigStore {
    pub fn new(config: AdminConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Consistent point-in-time copy of the configuration.
    pub fn snapshot(&self) -> AdminConfig {
        self.inner.read().clone()
    }

    /// Replace the authorized requester. Admin only.
    pub fn update_authorized_requester(&self, caller: &Principal, requester: Principal) -> bool {
        let mut config = self.inner.write();
        if require_admin(&config, caller).is_err() {
            tracing::warn!(caller = %caller, "Rejected requester update from non-admin");
            return false;
        }
        tracing::info!(requester = %requester, "Authorized requester updated");
        config.authorized_requester = requester;
        true
    }

    /// Replace the executor endpoint set. Admin only; an empty set is
    /// rejected without mutating state.
    pub fn update_executor_endpoints(&self, caller: &Principal, endpoints: Vec<Principal>) -> bool {
        let mut config = self.inner.write();
        if require_admin(&config, caller).is_err() {
            tracing::warn!(caller = %caller, "Rejected executor update from non-admin");
            return false;
        }
        if endpoints.is_empty() {
            tracing::warn!("Rejected empty executor endpoint set");
            return false;
        }
        tracing::info!(count = endpoints.len(), "Executor endpoints updated");
        config.executor_endpoints = endpoints;
        true
    }

    /// Replace the instruction source reference. Admin only.
    pub fn update_instruction_source(&self, caller: &Principal, source: Principal) -> bool {
        let mut config = self.inner.write();
        if require_admin(&config, caller).is_err() {
            tracing::warn!(caller = %caller, "Rejected instruction source update from non-admin");
            return false;
        }
        tracing::info!(source = %source, "Instruction source updated");
        config.instruction_source = source;
        true
    }
}
