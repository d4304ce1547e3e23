//! Trait du magasin TTL et implémentation SQLite
//!
//! Le trait `TtlStore` est le point d'injection du cache : chaque
//! composant qui en a besoin le reçoit en dépendance explicite, ce qui
//! permet de le substituer dans les tests. L'implémentation de
//! production est `SqliteStore`.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::db::StoreDb;
use crate::error::Result;
use crate::key::Namespace;

/// Instantané agrégé du contenu du magasin
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStatus {
    /// Nombre d'entrées vivantes
    pub db_size: usize,
    /// Taille mémoire occupée par le stockage (octets)
    pub memory_usage: u64,
    /// Nombre d'entrées de métadonnées (`song:`)
    pub song_entries: usize,
    /// Nombre d'entrées de localisateurs (`stream:`)
    pub stream_entries: usize,
}

/// Magasin clé/valeur partagé avec TTL par entrée
///
/// Toutes les opérations peuvent échouer si le stockage sous-jacent est
/// indisponible ; les appelants en lecture-aside traitent cet échec
/// comme un miss et continuent sans cache.
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Récupère une valeur, `None` si absente ou expirée
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Écrit une valeur avec sa durée de vie
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Nombre d'entrées vivantes
    async fn size(&self) -> Result<usize>;

    /// Clés vivantes commençant par un préfixe
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Vide entièrement le magasin
    async fn flush_all(&self) -> Result<()>;

    /// Taille mémoire occupée par le stockage (octets)
    async fn memory_usage(&self) -> Result<u64>;

    /// Instantané agrégé pour l'administration du cache
    async fn status(&self) -> Result<StoreStatus> {
        let db_size = self.size().await?;
        let memory_usage = self.memory_usage().await?;
        let song_entries = self
            .keys_with_prefix(Namespace::Song.prefix())
            .await?
            .len();
        let stream_entries = self
            .keys_with_prefix(Namespace::Stream.prefix())
            .await?
            .len();

        Ok(StoreStatus {
            db_size,
            memory_usage,
            song_entries,
            stream_entries,
        })
    }
}

/// Implémentation SQLite du magasin TTL
///
/// La synchronisation est gérée par le Mutex interne de la connexion
/// SQLite ; ce type est conçu pour être utilisé derrière un `Arc`.
pub struct SqliteStore {
    db: StoreDb,
    /// Capacité au-delà de laquelle les entrées expirant le plus tôt
    /// sont évincées après chaque écriture
    max_entries: usize,
}

impl SqliteStore {
    /// Ouvre (ou crée) un magasin dans le répertoire donné
    ///
    /// # Arguments
    ///
    /// * `dir` - Répertoire de stockage
    /// * `max_entries` - Capacité du cache (nombre d'entrées)
    pub fn open(dir: &Path, max_entries: usize) -> Result<Self> {
        let db = StoreDb::init(&dir.join("muzcache.db"))?;
        Ok(Self { db, max_entries })
    }

    /// Magasin en mémoire, utilisé par les tests
    pub fn in_memory(max_entries: usize) -> Result<Self> {
        Ok(Self {
            db: StoreDb::init_in_memory()?,
            max_entries,
        })
    }

    /// Applique la politique d'éviction après une écriture
    ///
    /// 1. Purge les entrées expirées
    /// 2. Si le nombre d'entrées vivantes dépasse la capacité, supprime
    ///    les entrées qui expirent le plus tôt
    fn evict(&self, now: i64) -> Result<()> {
        let purged = self.db.purge_expired(now)?;
        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }

        let count = self.db.count(now)?;
        if count > self.max_entries {
            let removed = self.db.delete_oldest(count - self.max_entries)?;
            tracing::info!(
                "Cache eviction: removed {} entries (size: {} -> {})",
                removed,
                count,
                count - removed
            );
        }

        Ok(())
    }
}

#[async_trait]
impl TtlStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = Utc::now().timestamp();
        match self.db.get(key, now)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let now = Utc::now().timestamp();
        let expires_at = now + ttl.as_secs() as i64;
        self.db.set(key, &value.to_string(), expires_at)?;
        self.evict(now)
    }

    async fn size(&self) -> Result<usize> {
        self.db.count(Utc::now().timestamp())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.db.keys_with_prefix(prefix, Utc::now().timestamp())
    }

    async fn flush_all(&self) -> Result<()> {
        self.db.flush()
    }

    async fn memory_usage(&self) -> Result<u64> {
        self.db.memory_usage()
    }
}
