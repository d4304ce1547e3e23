//! Module de gestion de la base de données SQLite pour le cache TTL
//!
//! Ce module fournit la persistance des entrées clé/valeur avec leur
//! date d'expiration. Les valeurs sont stockées en JSON texte et ne sont
//! jamais inspectées ici : l'expiration appartient exclusivement au
//! magasin, aucun appelant ne la consulte directement.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;

/// Base de données SQLite pour le cache TTL
///
/// Gère les entrées du cache :
/// - Clé canonique (préfixée par namespace) et valeur JSON
/// - Date d'expiration en timestamp Unix (secondes)
/// - Opérations de purge et d'introspection de taille
#[derive(Debug)]
pub struct StoreDb {
    conn: Mutex<Connection>,
}

impl StoreDb {
    /// Initialise une nouvelle base de données de cache
    ///
    /// # Arguments
    ///
    /// * `path` - Chemin vers le fichier de base de données SQLite
    pub fn init(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;

        // Index pour la purge des entrées expirées et l'éviction
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_expires_at ON entries (expires_at ASC)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Base en mémoire, utilisée par les tests
    pub fn init_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Récupère la valeur d'une clé si elle n'est pas expirée
    ///
    /// Les entrées expirées rencontrées en lecture sont supprimées
    /// paresseusement.
    ///
    /// # Arguments
    ///
    /// * `key` - Clé canonique de l'entrée
    /// * `now` - Timestamp Unix courant (secondes)
    pub fn get(&self, key: &str, now: i64) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM entries WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((_, expires_at)) if expires_at <= now => {
                conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    /// Ajoute ou remplace une entrée avec sa date d'expiration
    ///
    /// # Arguments
    ///
    /// * `key` - Clé canonique de l'entrée
    /// * `value` - Valeur JSON sérialisée
    /// * `expires_at` - Timestamp Unix d'expiration (secondes)
    pub fn set(&self, key: &str, value: &str, expires_at: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO entries (key, value, expires_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 expires_at = excluded.expires_at",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    /// Compte les entrées vivantes (non expirées)
    pub fn count(&self, now: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE expires_at > ?1",
            [now],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Liste les clés vivantes commençant par un préfixe
    ///
    /// # Arguments
    ///
    /// * `prefix` - Préfixe de namespace (ex: `"song:"`)
    /// * `now` - Timestamp Unix courant (secondes)
    pub fn keys_with_prefix(&self, prefix: &str, now: i64) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        // LIKE avec échappement des métacaractères du préfixe
        let pattern = format!(
            "{}%",
            prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );

        let mut stmt = conn.prepare(
            "SELECT key FROM entries WHERE key LIKE ?1 ESCAPE '\\' AND expires_at > ?2",
        )?;

        let keys = stmt
            .query_map(params![pattern, now], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(keys)
    }

    /// Purge toutes les entrées de la base de données
    pub fn flush(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM entries", [])?;
        Ok(())
    }

    /// Supprime les entrées expirées
    ///
    /// # Returns
    ///
    /// Le nombre d'entrées supprimées
    pub fn purge_expired(&self, now: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM entries WHERE expires_at <= ?1", [now])?;
        Ok(removed)
    }

    /// Supprime les N entrées qui expirent le plus tôt
    ///
    /// Utilisé par la politique d'éviction quand le cache dépasse sa
    /// capacité configurée.
    ///
    /// # Returns
    ///
    /// Le nombre d'entrées supprimées
    pub fn delete_oldest(&self, limit: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM entries WHERE key IN (
                 SELECT key FROM entries ORDER BY expires_at ASC LIMIT ?1
             )",
            [limit],
        )?;
        Ok(removed)
    }

    /// Taille mémoire occupée par la base (pages * taille de page)
    pub fn memory_usage(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok((page_count * page_size) as u64)
    }
}
