//! Cross-subsystem integration tests.

pub mod admin_flows;
pub mod persistence;
pub mod verification_flows;

use bp_03_admin_access::{AdminConfig, AdminConfigStore};
use shared_types::Principal;

pub fn principal(s: &str) -> Principal {
    s.parse().unwrap()
}

pub fn executors() -> Vec<Principal> {
    vec![
        principal("exec-a"),
        principal("exec-b"),
        principal("exec-c"),
    ]
}

/// Standard three-executor deployment used across the flows.
pub fn test_config() -> AdminConfigStore {
    AdminConfigStore::new(AdminConfig {
        authorized_requester: principal("requester"),
        admin: principal("admin"),
        executor_endpoints: executors(),
        instruction_source: principal("instructions"),
        version: "0.1.0".to_string(),
        deployed_at_ms: 1_000,
    })
}
