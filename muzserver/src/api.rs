//! Routes HTTP du serveur
//!
//! Quatre familles de routes : métadonnées, flux audio, administration
//! du cache. Les handlers ne possèdent aucune logique de résolution ni
//! de transcodage, ils orchestrent les dépendances injectées via
//! `AppState`.
//!
//! Pour `/stream`, les en-têtes sont posés à la construction de la
//! réponse, strictement avant le premier octet du corps ; une panne du
//! transcodeur après coup se traduit par une fin de corps prématurée,
//! jamais par un changement de statut.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use muzpipe::transcode_command;
use muzresolver::SongMetadata;

use crate::error::AppError;
use crate::state::AppState;

/// Construit le routeur de l'API
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/metadata", get(get_metadata))
        .route("/stream", get(get_stream))
        .route("/cache/status", get(cache_status))
        .route("/cache/prewarm", post(cache_prewarm))
        .route("/cache/clear", delete(cache_clear))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    q: Option<String>,
}

impl QueryParams {
    /// Extrait la requête, refuse l'absence ou la chaîne vide
    fn require(self) -> Result<String, AppError> {
        match self.q.map(|q| q.trim().to_string()) {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err(AppError::Validation(
                "missing or empty query parameter 'q'".to_string(),
            )),
        }
    }
}

/// GET /metadata?q= — métadonnées du premier résultat
async fn get_metadata(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<SongMetadata>, AppError> {
    let query = params.require()?;
    state.analytics.record(&query, "metadata_requested");

    let meta = state
        .resolver
        .resolve_metadata(&query)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(meta))
}

/// GET /stream?q= — flux WAV transcodé à la volée
///
/// Métadonnées et localisateur sont résolus en parallèle. Seul l'échec
/// du localisateur est fatal ; sans métadonnées la réponse part sans
/// les en-têtes `X-Song-*`.
async fn get_stream(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, AppError> {
    let query = params.require()?;
    state.analytics.record(&query, "stream_requested");

    let (meta, locator) = tokio::join!(
        state.resolver.resolve_metadata(&query),
        state.resolver.resolve_stream_locator(&query),
    );

    let descriptor = locator.map_err(|e| AppError::Internal(e.to_string()))?;

    let command = transcode_command(&state.transcode_binary, &descriptor.source_url);
    let stream = state
        .spawner
        .open(&command)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav");

    match meta {
        Ok(meta) => {
            if let Ok(value) = HeaderValue::from_str(&meta.title) {
                builder = builder.header("X-Song-Title", value);
            }
            builder = builder.header("X-Song-Duration", meta.duration_seconds.to_string());
            if let Ok(value) = HeaderValue::from_str(&meta.artist) {
                builder = builder.header("X-Song-Artist", value);
            }
        }
        Err(e) => {
            tracing::warn!("Streaming '{}' without metadata headers: {}", query, e);
        }
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// GET /cache/status — instantané du magasin et de sa configuration
async fn cache_status(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let status = state
        .store
        .status()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "dbSize": status.db_size,
        "memoryUsage": status.memory_usage,
        "cacheStats": {
            "songEntries": status.song_entries,
            "streamEntries": status.stream_entries,
        },
        "maxEntries": state.max_entries,
        "ttl": state.metadata_ttl.as_secs(),
        "streamTtl": state.stream_ttl.as_secs(),
    })))
}

#[derive(Debug, Serialize)]
struct PrewarmOutcome {
    query: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// POST /cache/prewarm — résout et met en cache une liste de requêtes
///
/// Les requêtes sont traitées indépendamment ; un échec n'interrompt pas
/// les autres et les résultats sortent dans l'ordre d'entrée.
async fn cache_prewarm(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let queries: Vec<String> = body
        .get("queries")
        .and_then(Value::as_array)
        .and_then(|entries| {
            entries
                .iter()
                .map(|entry| entry.as_str().map(str::to_string))
                .collect::<Option<Vec<String>>>()
        })
        .ok_or_else(|| {
            AppError::Validation("body must be {\"queries\": [string]}".to_string())
        })?;

    tracing::info!("Prewarming cache with {} queries", queries.len());
    let outcomes = join_all(queries.into_iter().map(|query| prewarm_one(&state, query))).await;

    Ok(Json(json!({
        "message": "Prewarm completed",
        "results": outcomes,
    })))
}

async fn prewarm_one(state: &AppState, query: String) -> PrewarmOutcome {
    let (meta, locator) = tokio::join!(
        state.resolver.resolve_metadata(&query),
        state.resolver.resolve_stream_locator(&query),
    );

    match (meta, locator) {
        (Ok(_), Ok(_)) => PrewarmOutcome {
            query,
            success: true,
            error: None,
        },
        (Err(e), _) | (_, Err(e)) => PrewarmOutcome {
            query,
            success: false,
            error: Some(e.to_string()),
        },
    }
}

/// DELETE /cache/clear — vide entièrement le cache
async fn cache_clear(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state
        .store
        .flush_all()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("Cache cleared");
    Ok(Json(json!({ "message": "Cache cleared" })))
}
