//! Serveur HTTP de diffusion et d'administration du cache
//!
//! Expose la résolution de métadonnées, la diffusion WAV transcodée à la
//! volée et l'administration du cache TTL. Toutes les dépendances
//! (magasin, résolveur, transcodeur, analytique) sont injectées via
//! `AppState`.
//!
//! # Architecture
//!
//! - `api` : routeur axum et handlers
//! - `state` : dépendances injectées
//! - `error` : projection des erreurs en réponses HTTP
//! - `analytics` : port d'évènements d'usage, fire-and-forget
//! - `server` : listener et arrêt propre

pub mod analytics;
pub mod api;
pub mod error;
pub mod server;
pub mod state;

pub use analytics::{AnalyticsSink, HttpSink, NullSink};
pub use api::create_router;
pub use error::AppError;
pub use server::serve;
pub use state::AppState;
