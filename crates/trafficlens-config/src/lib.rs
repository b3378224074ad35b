//! # TrafficLens Config
//!
//! Configuration management for TrafficLens.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, Finding, ValidationResult};
