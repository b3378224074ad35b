//! # TrafficLens Protocols
//!
//! Shared data model and interface definitions for the TrafficLens workspace.
//! Contains no I/O; every other crate builds on these types.
//!
//! ## Contents
//!
//! - [`TrafficEvent`] / [`TabSession`] - per-tab observed traffic
//! - [`TrackingInfo`] / [`TrackingLogEntry`] - tracking-parameter evidence
//! - [`AnalysisProvider`] - trait for language-model backends
//! - [`AnalysisOutcome`] - structured or free-text analysis reply

pub mod error;
pub mod provider;
pub mod types;

pub use error::{CommandError, ProviderError, StoreError};
pub use provider::{AnalysisProvider, AnalysisReply, AnalysisRequest};
pub use types::*;
