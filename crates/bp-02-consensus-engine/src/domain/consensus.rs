//! Majority agreement evaluation.
//!
//! Pure functions over executor outcome slots; the service applies the
//! resulting decision to the record state machine.

use shared_types::{ArtifactHash, ExecutorOutcome};
use std::collections::HashMap;

pub use shared_types::consensus_threshold;

/// Outcome of evaluating the current set of executor reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusDecision {
    /// A hash group reached the threshold.
    Verified {
        hash: ArtifactHash,
        /// Size of the agreeing group.
        matching: usize,
    },
    /// Every executor has reported and no group reached the threshold.
    NoMajority {
        /// Size of the largest group (may be 0 if all executors errored).
        matching: usize,
    },
    /// Still waiting on executors; no transition yet.
    Undecided {
        /// Size of the current largest group.
        matching: usize,
    },
}

/// Group completed outcomes by hash and decide whether the verification can
/// transition.
///
/// The leading group is the largest; between equal-sized groups the one
/// whose first member completed earliest wins. With the ≥51% threshold two
/// groups can never both qualify, so the tie-break only ever selects which
/// group is *reported* as leading, never which one is verified - but it
/// keeps every path deterministic.
pub fn evaluate(outcomes: &[ExecutorOutcome], threshold: usize) -> ConsensusDecision {
    // hash -> (group size, earliest completion index in the group)
    let mut groups: HashMap<&str, (usize, u64)> = HashMap::new();
    for outcome in outcomes.iter().filter(|o| o.completed) {
        if let Some(hash) = outcome.hash.as_deref() {
            let order = outcome.completion_index.unwrap_or(u64::MAX);
            let entry = groups.entry(hash).or_insert((0, order));
            entry.0 += 1;
            entry.1 = entry.1.min(order);
        }
    }

    let leader = groups
        .iter()
        .max_by(|(_, (size_a, first_a)), (_, (size_b, first_b))| {
            // Larger group wins; equal sizes fall back to earliest
            // completion (smaller index ranks higher).
            size_a.cmp(size_b).then(first_b.cmp(first_a))
        })
        .map(|(hash, (size, _))| (hash.to_string(), *size));

    let matching = leader.as_ref().map(|(_, size)| *size).unwrap_or(0);

    if let Some((hash, size)) = leader {
        if size >= threshold {
            return ConsensusDecision::Verified {
                hash,
                matching: size,
            };
        }
    }

    if outcomes.iter().all(|o| o.completed) {
        ConsensusDecision::NoMajority { matching }
    } else {
        ConsensusDecision::Undecided { matching }
    }
}
