//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::info;

use trafficlens_config::Config;
use trafficlens_core::{
    BridgeSettings, CaptureHooks, CredentialStore, FileTrackingStore, ProviderFactory,
    Summarizer, TrackingLog, TrafficStore,
};
use trafficlens_protocols::{StoreError, TabId};

/// Everything the command service and HTTP handlers operate on.
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<TrafficStore>,
    pub tracking: Arc<TrackingLog>,
    pub hooks: Arc<CaptureHooks>,
    pub credentials: Arc<CredentialStore>,
    pub summarizer: Summarizer,
    pub bridge_settings: BridgeSettings,
    provider_factory: ProviderFactory,
    active_tab: RwLock<Option<TabId>>,
    start_time: Instant,
}

impl AppState {
    /// Assemble state from already opened stores.
    pub fn new(
        config: Config,
        tracking: Arc<TrackingLog>,
        credentials: Arc<CredentialStore>,
        provider_factory: ProviderFactory,
    ) -> Self {
        let store = Arc::new(TrafficStore::from_config(&config.capture));
        let hooks = Arc::new(CaptureHooks::new(
            store.clone(),
            tracking.clone(),
            &config.capture,
        ));
        Self {
            summarizer: Summarizer::new(config.summary.clone()),
            bridge_settings: BridgeSettings::from_config(&config.analysis),
            config: Arc::new(config),
            store,
            tracking,
            hooks,
            credentials,
            provider_factory,
            active_tab: RwLock::new(None),
            start_time: Instant::now(),
        }
    }

    /// Open the persisted stores under `storage.data_dir`.
    pub async fn open(config: Config, provider_factory: ProviderFactory) -> Result<Self, StoreError> {
        let data_dir = config.storage.data_dir.clone();
        let tracking_store = Arc::new(FileTrackingStore::new(&data_dir).await?);
        let tracking = Arc::new(TrackingLog::open(tracking_store, &config.tracking).await?);
        let credentials = Arc::new(CredentialStore::open(&data_dir).await?);
        info!(data_dir = ?data_dir, "Application state opened");
        Ok(Self::new(config, tracking, credentials, provider_factory))
    }

    /// State with nothing persisted.
    pub fn in_memory(config: Config, provider_factory: ProviderFactory) -> Self {
        let tracking = Arc::new(TrackingLog::in_memory(&config.tracking));
        Self::new(
            config,
            tracking,
            Arc::new(CredentialStore::in_memory()),
            provider_factory,
        )
    }

    pub fn provider_factory(&self) -> &ProviderFactory {
        &self.provider_factory
    }

    /// Name of the configured AI provider.
    pub fn provider_name(&self) -> &'static str {
        match self.config.analysis.provider {
            trafficlens_config::ProviderKind::OpenAI => "openai",
            trafficlens_config::ProviderKind::Gemini => "gemini",
        }
    }

    pub fn active_tab(&self) -> Option<TabId> {
        *self.active_tab.read()
    }

    pub fn set_active_tab(&self, tab_id: Option<TabId>) {
        *self.active_tab.write() = tab_id;
    }

    /// Forget the active tab if it is `tab_id`.
    pub fn clear_active_tab(&self, tab_id: TabId) {
        let mut active = self.active_tab.write();
        if *active == Some(tab_id) {
            *active = None;
        }
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
