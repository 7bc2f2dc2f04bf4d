//! # Consensus Engine Metrics
//!
//! Prometheus metrics for monitoring verification throughput and health.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! bp-02-consensus-engine = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `verification_requests_total` - Counter of accepted verification requests
//! - `verification_verified_total` - Counter of Verified outcomes
//! - `verification_failed_total` - Counter of Failed outcomes (by reason)
//! - `verification_executor_reports_total` - Counter of executor reports processed
//! - `verification_active` - Gauge of currently Pending verifications

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total verification requests accepted
    pub static ref REQUESTS_TOTAL: IntCounter = register_int_counter!(
        "verification_requests_total",
        "Total number of accepted verification requests"
    )
    .expect("Failed to create REQUESTS_TOTAL metric");

    /// Total Verified outcomes
    pub static ref VERIFIED_TOTAL: IntCounter = register_int_counter!(
        "verification_verified_total",
        "Total number of verifications that reached consensus"
    )
    .expect("Failed to create VERIFIED_TOTAL metric");

    /// Total Failed outcomes, labeled by reason
    pub static ref FAILED_TOTAL: CounterVec = register_counter_vec!(
        "verification_failed_total",
        "Total number of failed verifications",
        &["reason"]
    )
    .expect("Failed to create FAILED_TOTAL metric");

    /// Total executor reports processed
    pub static ref EXECUTOR_REPORTS: IntCounter = register_int_counter!(
        "verification_executor_reports_total",
        "Total number of executor reports processed"
    )
    .expect("Failed to create EXECUTOR_REPORTS metric");

    /// Currently pending verifications
    pub static ref ACTIVE_VERIFICATIONS: Gauge = register_gauge!(
        "verification_active",
        "Number of currently pending verifications"
    )
    .expect("Failed to create ACTIVE_VERIFICATIONS metric");
}

/// Record an accepted verification request
#[cfg(feature = "metrics")]
pub fn record_request_accepted() {
    REQUESTS_TOTAL.inc();
}

/// Record a Verified outcome
#[cfg(feature = "metrics")]
pub fn record_verified() {
    VERIFIED_TOTAL.inc();
}

/// Record a Failed outcome with its reason tag
#[cfg(feature = "metrics")]
pub fn record_failed(reason: &str) {
    FAILED_TOTAL.with_label_values(&[reason]).inc();
}

/// Record one processed executor report
#[cfg(feature = "metrics")]
pub fn record_executor_report() {
    EXECUTOR_REPORTS.inc();
}

/// Update the active verifications gauge
#[cfg(feature = "metrics")]
pub fn set_active_verifications(active: usize) {
    ACTIVE_VERIFICATIONS.set(active as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_request_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_verified() {}

#[cfg(not(feature = "metrics"))]
pub fn record_failed(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_executor_report() {}

#[cfg(not(feature = "metrics"))]
pub fn set_active_verifications(_active: usize) {}
