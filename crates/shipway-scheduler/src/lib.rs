//! Trigger gating and matrix expansion for Shipway.

pub mod matrix;
pub mod triggers;

pub use matrix::MatrixExpander;
pub use triggers::TriggerFilter;
