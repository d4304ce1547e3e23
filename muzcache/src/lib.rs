//! Module de gestion du cache à durée de vie (TTL)
//!
//! Ce module fournit un magasin clé/valeur partagé avec expiration par
//! entrée, utilisé en lecture-aside par le résolveur et le serveur HTTP.
//! Le cache est purement consultatif : toute erreur du magasin est
//! traitée comme un miss par les appelants, jamais comme une panne.
//!
//! # Architecture
//!
//! - `key` : dérivation des clés canoniques (normalisation + namespace)
//! - `db` : persistance SQLite des entrées avec `expires_at`
//! - `store` : trait `TtlStore` + implémentation `SqliteStore`

pub mod db;
pub mod error;
pub mod key;
pub mod store;

pub use db::StoreDb;
pub use error::{Error, Result};
pub use key::{normalize, CacheKey, Namespace};
pub use store::{SqliteStore, StoreStatus, TtlStore};
