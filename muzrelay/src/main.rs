use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use muzcache::{SqliteStore, TtlStore};
use muzpipe::FfmpegSpawner;
use muzresolver::Resolver;
use muzserver::{AnalyticsSink, AppState, HttpSink, NullSink};
use muztool::{probe_tool, ProcessRunner};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ========== PHASE 1 : Configuration ==========

    let config = muzconfig::get_config();

    let cache_dir = config
        .get_cache_dir()
        .context("Failed to resolve cache directory")?;
    let max_entries = config.get_cache_max_entries();
    let metadata_ttl = Duration::from_secs(config.get_metadata_ttl_seconds());
    let stream_ttl = Duration::from_secs(config.get_stream_ttl_seconds());
    let search_tool = config.get_search_tool();
    let transcode_tool = config.get_transcode_tool();

    // ========== PHASE 2 : Dépendances ==========

    info!("💾 Opening cache store in {}...", cache_dir);
    let store: Arc<dyn TtlStore> = Arc::new(
        SqliteStore::open(Path::new(&cache_dir), max_entries)
            .context("Failed to open cache store")?,
    );

    let runner = Arc::new(ProcessRunner::new(config.get_tool_timeout()));

    // Les outils manquants n'empêchent pas le démarrage, les requêtes
    // concernées échoueront individuellement
    info!("🔎 Probing external tools...");
    for tool in [&search_tool, &transcode_tool] {
        if probe_tool(runner.as_ref(), tool).await {
            info!("  - {} available", tool);
        } else {
            warn!("⚠️ Tool '{}' not found or not responding", tool);
        }
    }

    let resolver = Arc::new(Resolver::new(
        store.clone(),
        runner,
        search_tool,
        metadata_ttl,
        stream_ttl,
    ));

    let analytics: Arc<dyn AnalyticsSink> = match config.get_analytics_endpoint() {
        Some(endpoint) => {
            info!("📈 Analytics events will be sent to {}", endpoint);
            Arc::new(HttpSink::new(endpoint))
        }
        None => Arc::new(NullSink),
    };

    let state = AppState {
        store,
        resolver,
        spawner: Arc::new(FfmpegSpawner),
        analytics,
        transcode_binary: transcode_tool,
        max_entries,
        metadata_ttl,
        stream_ttl,
    };

    // ========== PHASE 3 : Serveur HTTP ==========

    let port = config.get_http_port();
    info!("🌐 Starting HTTP server on port {}...", port);
    info!("✅ MuzRelay is ready, press Ctrl+C to stop");

    muzserver::serve(state, port).await
}
