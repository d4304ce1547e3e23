//! Module du pipeline de transcodage audio
//!
//! Démarre un outil externe de décodage/encodage (compatible ffmpeg) qui
//! lit un localisateur de flux et produit du WAV PCM 16 bits, 44,1 kHz,
//! stéréo sur stdout. Le flux résultant est couplé au cycle de vie du
//! consommateur : son abandon tue le transcodeur.
//!
//! # Architecture
//!
//! - `command` : descripteur typé de la commande de transcodage
//! - `spawner` : trait `PipelineSpawner` + implémentation `FfmpegSpawner`
//! - `stream` : `TranscodeStream`, flux d'octets à cycle de vie couplé

pub mod command;
pub mod error;
pub mod spawner;
pub mod stream;

pub use command::transcode_command;
pub use error::{Error, Result};
pub use spawner::{AudioStream, FfmpegSpawner, PipelineSpawner};
pub use stream::TranscodeStream;
