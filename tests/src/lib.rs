//! # BuildProof Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-subsystem choreography
//!     ├── verification_flows.rs   # request → executors → consensus/timeout
//!     ├── persistence.rs          # file-backed store survival
//!     └── admin_flows.rs          # config mutation under access control
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bp-tests
//!
//! # By category
//! cargo test -p bp-tests integration::
//!
//! # Benchmarks
//! cargo bench -p bp-tests
//! ```

#![allow(dead_code)]

pub mod integration;
