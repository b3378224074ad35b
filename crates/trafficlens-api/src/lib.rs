//! # TrafficLens API
//!
//! The command surface between UIs, host hooks and the traffic store.
//!
//! ```text
//!  popup / options UI        host hooks (network, tabs, page)
//!          │                              │
//!          └──────────┬───────────────────┘
//!                     ▼
//!            Command (tagged JSON)
//!                     │
//!        ┌────────────┴────────────┐
//!        │ POST /api/command       │  (http)
//!        │ CommandHandle::execute  │  (in-process)
//!        └────────────┬────────────┘
//!                     ▼
//!       CommandService (single writer loop)
//!                     │
//!          CommandResponse (ok | error)
//! ```
//!
//! Every command answers with a tagged [`CommandResponse`]; no error
//! crosses the command boundary.

pub mod command;
pub mod http;
pub mod server;
pub mod service;
pub mod state;

pub use command::{Command, CommandContext, CommandResponse};
pub use http::{HttpState, create_router};
pub use server::ApiServer;
pub use service::{CommandHandle, CommandService};
pub use state::AppState;
