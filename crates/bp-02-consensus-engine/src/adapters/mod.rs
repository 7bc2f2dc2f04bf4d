//! Adapter implementations of the engine's driven ports.

pub mod time;
pub mod timer;

pub use time::SystemTimeSource;
pub use timer::TokioTimerFacility;
