//! Error types shared across the TrafficLens crates.

mod command;
mod provider;
mod store;

pub use command::*;
pub use provider::*;
pub use store::*;
