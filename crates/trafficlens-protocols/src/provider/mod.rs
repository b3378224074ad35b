//! Language-model provider protocol used by the analysis bridge.

mod request;
mod traits;

pub use request::*;
pub use traits::*;
