//! Démarrage du pipeline de transcodage
//!
//! `PipelineSpawner` est le point d'injection du transcodeur : le
//! serveur HTTP le reçoit en dépendance et les tests le remplacent par
//! un faux qui compte les démarrages.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::process::Command;

use muztool::ToolCommand;

use crate::error::{Error, Result};
use crate::stream::TranscodeStream;

/// Flux d'octets audio, abstrait du processus sous-jacent
pub type AudioStream = BoxStream<'static, io::Result<Bytes>>;

/// Démarre un pipeline de transcodage décrit par un `ToolCommand`
#[async_trait]
pub trait PipelineSpawner: Send + Sync {
    async fn open(&self, command: &ToolCommand) -> Result<AudioStream>;
}

/// Implémentation de production (compatible ffmpeg)
///
/// Le processus est démarré avec `kill_on_drop` : même si le flux est
/// oublié sans être abandonné proprement, l'enfant ne survit pas au
/// runtime.
pub struct FfmpegSpawner;

impl FfmpegSpawner {
    /// Démarre le transcodeur et enveloppe son stdout
    pub fn spawn_stream(&self, command: &ToolCommand) -> Result<TranscodeStream> {
        tracing::info!(
            "Starting transcoder: {} {}",
            command.program,
            command.args.join(" ")
        );

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            // La sortie de diagnostic du transcodeur n'est pas relayée
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: command.program.clone(),
                source,
            })?;

        TranscodeStream::new(child)
    }
}

#[async_trait]
impl PipelineSpawner for FfmpegSpawner {
    async fn open(&self, command: &ToolCommand) -> Result<AudioStream> {
        Ok(self.spawn_stream(command)?.boxed())
    }
}
