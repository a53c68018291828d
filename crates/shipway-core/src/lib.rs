//! Shipway Core
//!
//! Core domain types, traits, and error handling for Shipway.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used across all other crates.

pub mod artifact;
pub mod config;
pub mod credential;
pub mod error;
pub mod ids;
pub mod ports;
pub mod report;
pub mod trigger;
pub mod variant;

pub use error::{Error, Result};
pub use ids::*;
