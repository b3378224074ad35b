//! HTTP surface over the command service.

pub mod handlers;
pub mod monitoring;
pub mod routes;

pub use monitoring::{ComponentHealth, HealthResponse, HealthStatus};
pub use routes::{HttpState, create_router};
