//! Résolution de requêtes en métadonnées et localisateurs de flux
//!
//! Le résolveur consulte d'abord le cache, puis invoque l'outil de
//! recherche externe en cas de miss. Le cache est purement consultatif :
//! une erreur du magasin est journalisée et traitée comme un miss, la
//! résolution continue sans lui. L'écriture après résolution est
//! également best-effort.
//!
//! Deux résolutions identiques concurrentes invoquent chacune l'outil ;
//! aucun regroupement en vol n'est effectué.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use muzcache::{normalize, Namespace, TtlStore};
use muztool::{ToolCommand, ToolRunner};

use crate::command::{locator_command, metadata_command};
use crate::error::{Error, Result};
use crate::models::{RawTrackInfo, SongMetadata, StreamDescriptor};

/// Résolveur de requêtes texte libre
pub struct Resolver {
    store: Arc<dyn TtlStore>,
    runner: Arc<dyn ToolRunner>,
    /// Binaire de l'outil de recherche (compatible yt-dlp)
    binary: String,
    metadata_ttl: Duration,
    stream_ttl: Duration,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn TtlStore>,
        runner: Arc<dyn ToolRunner>,
        binary: String,
        metadata_ttl: Duration,
        stream_ttl: Duration,
    ) -> Self {
        Self {
            store,
            runner,
            binary,
            metadata_ttl,
            stream_ttl,
        }
    }

    /// Résout les métadonnées d'un morceau (cache-aside, namespace `song:`)
    pub async fn resolve_metadata(&self, query: &str) -> Result<SongMetadata> {
        let key = normalize(Namespace::Song, query);

        if let Some(meta) = self.cache_get::<SongMetadata>(&key).await {
            tracing::debug!("Metadata cache hit for '{}'", query);
            return Ok(meta);
        }

        tracing::info!("Resolving metadata for '{}'", query);
        let output = self
            .run_tool(metadata_command(&self.binary, query))
            .await?;

        if !output.success {
            return Err(Error::Resolution(first_error_line(&output.stderr)));
        }

        let info: RawTrackInfo = serde_json::from_str(output.stdout.trim())
            .map_err(|e| Error::Resolution(format!("unparseable tool output: {}", e)))?;
        let meta = SongMetadata::from(info);

        self.cache_set(&key, &meta, self.metadata_ttl).await;
        Ok(meta)
    }

    /// Résout le localisateur de flux d'un morceau (namespace `stream:`)
    pub async fn resolve_stream_locator(&self, query: &str) -> Result<StreamDescriptor> {
        let key = normalize(Namespace::Stream, query);

        if let Some(desc) = self.cache_get::<StreamDescriptor>(&key).await {
            tracing::debug!("Stream locator cache hit for '{}'", query);
            return Ok(desc);
        }

        tracing::info!("Resolving stream locator for '{}'", query);
        let output = self
            .run_tool(locator_command(&self.binary, query))
            .await?;

        if !output.success {
            return Err(Error::Locator(first_error_line(&output.stderr)));
        }

        // L'outil peut émettre plusieurs lignes ; la première non vide
        // est le localisateur
        let url = output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| Error::Locator("tool produced no locator".to_string()))?;

        let desc = StreamDescriptor {
            source_url: url.to_string(),
        };

        self.cache_set(&key, &desc, self.stream_ttl).await;
        Ok(desc)
    }

    async fn run_tool(&self, command: ToolCommand) -> Result<muztool::ToolOutput> {
        Ok(self.runner.run(&command).await?)
    }

    /// Lecture du cache, toute erreur dégradée en miss
    async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!("Discarding malformed cache entry '{}': {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for '{}', resolving without it: {}", key, e);
                None
            }
        }
    }

    /// Écriture best-effort, jamais propagée
    async fn cache_set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize cache entry '{}': {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(key, json, ttl).await {
            tracing::warn!("Cache write failed for '{}': {}", key, e);
        }
    }
}

/// Dernière ligne non vide de stderr, pour un message d'erreur concis
fn first_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .unwrap_or("tool exited with failure")
        .to_string()
}
