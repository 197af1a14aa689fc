use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use shareclip_core::metadata::MetadataProbe;
use shareclip_core::{
    Config, ConversionEngine, EstimateCache, FormatMap, GifEngine, MetadataAnalyzer,
    PresetCatalog, RecommendationEngine, SanitizedConfig, SessionHandle, SessionOrchestrator,
    Transcoder, WebmEngine,
};

/// Shared application state
pub struct AppState {
    config: Config,
    analyzer: MetadataAnalyzer,
    recommender: RecommendationEngine,
    presets: PresetCatalog,
    orchestrator: Arc<SessionOrchestrator>,
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Wire both engines to one transcoder and share one estimate cache
    /// between the recommender and the orchestrator.
    pub fn new(
        config: Config,
        transcoder: Arc<dyn Transcoder>,
        probe: Arc<dyn MetadataProbe>,
    ) -> Self {
        let cache = Arc::new(EstimateCache::new());
        let engines: FormatMap<Arc<dyn ConversionEngine>> = FormatMap::new(
            Arc::new(GifEngine::new(Arc::clone(&transcoder))),
            Arc::new(WebmEngine::new(transcoder)),
        );
        let orchestrator =
            SessionOrchestrator::new(engines, config.session.clone(), Arc::clone(&cache));

        Self::with_orchestrator(config, orchestrator, probe)
    }

    /// Use a prebuilt orchestrator. Its cache also backs recommendations.
    pub fn with_orchestrator(
        config: Config,
        orchestrator: SessionOrchestrator,
        probe: Arc<dyn MetadataProbe>,
    ) -> Self {
        Self {
            analyzer: MetadataAnalyzer::new(probe, &config),
            recommender: RecommendationEngine::new(Arc::clone(orchestrator.cache())),
            presets: PresetCatalog::from_config(&config.presets),
            orchestrator: Arc::new(orchestrator),
            sessions: RwLock::new(HashMap::new()),
            shutdown_tx: broadcast::channel(1).0,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn analyzer(&self) -> &MetadataAnalyzer {
        &self.analyzer
    }

    pub fn recommender(&self) -> &RecommendationEngine {
        &self.recommender
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    pub fn orchestrator(&self) -> &Arc<SessionOrchestrator> {
        &self.orchestrator
    }

    pub async fn insert_session(&self, handle: Arc<SessionHandle>) {
        self.sessions
            .write()
            .await
            .insert(handle.id().to_string(), handle);
    }

    pub async fn session(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions that ended more than `session.retention_secs` ago,
    /// releasing their output bytes. Returns how many were removed.
    pub async fn evict_expired_sessions(&self) -> usize {
        let retention = chrono::Duration::seconds(
            i64::try_from(self.config.session.retention_secs).unwrap_or(i64::MAX),
        );
        let now = chrono::Utc::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| !handle.is_expired(now, retention));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted expired sessions");
        }
        evicted
    }

    /// Spawn the periodic session sweep. Runs until [`AppState::shutdown`].
    pub fn spawn_session_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::clone(self);
        let interval = Duration::from_secs(self.config.session.sweep_interval_secs);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Session sweeper started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(interval) => {
                        state.evict_expired_sessions().await;
                    }
                }
            }
            info!("Session sweeper stopped");
        })
    }

    /// Stop background tasks.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
