//! État partagé du serveur HTTP
//!
//! Toutes les dépendances sont injectées à la construction ; aucun
//! composant n'est résolu globalement. Les poignées sont des `Arc`,
//! l'état se clone librement entre les handlers.

use std::sync::Arc;
use std::time::Duration;

use muzcache::TtlStore;
use muzpipe::PipelineSpawner;
use muzresolver::Resolver;

use crate::analytics::AnalyticsSink;

/// Dépendances et instantané de configuration du serveur
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TtlStore>,
    pub resolver: Arc<Resolver>,
    pub spawner: Arc<dyn PipelineSpawner>,
    pub analytics: Arc<dyn AnalyticsSink>,
    /// Binaire du transcodeur (compatible ffmpeg)
    pub transcode_binary: String,
    /// Capacité du cache, exposée par `/cache/status`
    pub max_entries: usize,
    pub metadata_ttl: Duration,
    pub stream_ttl: Duration,
}
