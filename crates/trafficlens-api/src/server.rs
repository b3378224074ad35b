//! API server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use trafficlens_config::ServerConfig;

use crate::http::{HttpState, create_router};
use crate::service::{CommandHandle, CommandService};
use crate::state::AppState;

/// HTTP front end plus the command loop it feeds.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<HttpState>,
}

impl ApiServer {
    /// Start the command loop and build the server around it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ServerConfig, app: Arc<AppState>) -> Self {
        let commands = CommandService::spawn(app.clone());
        Self::with_handle(config, app, commands)
    }

    /// Build the server around an already running command loop.
    pub fn with_handle(config: ServerConfig, app: Arc<AppState>, commands: CommandHandle) -> Self {
        Self {
            config,
            state: Arc::new(HttpState::new(app, commands)),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub fn commands(&self) -> &CommandHandle {
        &self.state.commands
    }

    /// Start the server.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("API server listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
