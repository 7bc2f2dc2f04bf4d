//! Domain module for the verification store.

pub mod errors;

pub use errors::StoreError;
