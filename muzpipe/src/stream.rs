//! Flux audio adossé à un processus de transcodage
//!
//! `TranscodeStream` expose le stdout du transcodeur comme un flux
//! d'octets. L'abandon du flux (déconnexion du client) tue le processus
//! enfant : aucun transcodage orphelin ne survit à son consommateur.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::process::{Child, ChildStdout};
use tokio_util::io::ReaderStream;

use crate::error::{Error, Result};

/// Taille de lecture du pipe stdout du transcodeur
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Flux d'octets produit par un transcodeur en cours d'exécution
pub struct TranscodeStream {
    child: Child,
    reader: ReaderStream<ChildStdout>,
}

impl TranscodeStream {
    /// Enveloppe un processus enfant dont stdout est un pipe
    pub(crate) fn new(mut child: Child) -> Result<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Transcode("child has no stdout pipe".to_string()))?;
        Ok(Self {
            child,
            reader: ReaderStream::with_capacity(stdout, READ_CHUNK_SIZE),
        })
    }

    /// PID du transcodeur, `None` s'il s'est déjà terminé
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

impl Stream for TranscodeStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.reader).poll_next(cx)
    }
}

impl Drop for TranscodeStream {
    fn drop(&mut self) {
        // Déjà terminé : start_kill échoue, rien à faire
        if self.child.start_kill().is_ok() {
            tracing::debug!("Killed transcoder (stream dropped before completion)");
        }
    }
}
