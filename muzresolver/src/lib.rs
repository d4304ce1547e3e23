//! Module de résolution des requêtes texte libre
//!
//! Transforme une requête de type « titre artiste » en métadonnées de
//! morceau et en localisateur de flux audio, via un outil d'extraction
//! externe (compatible yt-dlp) invoqué par descripteurs typés, avec un
//! cache TTL consultatif en amont.
//!
//! # Architecture
//!
//! - `command` : constructeurs de descripteurs pour l'outil de recherche
//! - `models` : formes canoniques (`SongMetadata`, `StreamDescriptor`)
//! - `resolver` : opérations cache-aside de résolution

pub mod command;
pub mod error;
pub mod models;
pub mod resolver;

pub use command::{locator_command, metadata_command};
pub use error::{Error, Result};
pub use models::{RawTrackInfo, SongMetadata, StreamDescriptor};
pub use resolver::Resolver;
