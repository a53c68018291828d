//! Pipeline sequencing, failure policy and result aggregation for Shipway.

pub mod controller;

pub use controller::PipelineController;
