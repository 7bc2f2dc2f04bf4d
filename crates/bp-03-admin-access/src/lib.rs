//! # bp-03-admin-access
//!
//! Admin configuration and access control for the verification engine.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **AdminConfig**: the executor endpoint set, instruction source
//!   reference, authorized requester, and admin identity
//! - **Snapshot reads**: every engine call sees a consistent config, never
//!   a partially applied update
//! - **Guarded mutation**: config changes require the admin principal and
//!   validate their input before applying
//!
//! ## Security Model
//!
//! | Operation | Authorized caller |
//! |-----------|-------------------|
//! | `request_verification` | authorized requester |
//! | `cancel_verification` | authorized requester or admin |
//! | config mutation | admin |

pub mod config;
pub mod guard;

pub use config::{AdminConfig, AdminConfigStore};
pub use guard::{require_admin, require_authorized_requester, require_requester_or_admin};
