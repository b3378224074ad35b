//! Core data types.

mod analysis;
mod event;
mod session;
mod tracking;

pub use analysis::*;
pub use event::*;
pub use session::*;
pub use tracking::*;
