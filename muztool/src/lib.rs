//! Invocation d'outils externes en ligne de commande
//!
//! Ce module fournit le descripteur typé `ToolCommand` et le trait
//! `ToolRunner` qui exécute un descripteur et capture sa sortie. Les
//! appelants construisent des descripteurs, jamais des chaînes de
//! commande ad hoc. L'implémentation de production est `ProcessRunner` ;
//! les tests substituent le trait par un exécuteur factice.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// Result type alias for tool invocations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when running an external tool
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tool binary could not be started
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool did not finish within the configured deadline
    #[error("'{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Descripteur typé d'une invocation d'outil externe
///
/// Porte le binaire et ses arguments sous forme structurée ; aucune
/// interprétation par un shell n'a lieu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Sortie capturée d'une invocation terminée
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// L'outil s'est terminé avec un code de sortie nul
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Exécuteur d'outils externes
///
/// Point d'injection : le résolveur reçoit un `Arc<dyn ToolRunner>` et
/// ne connaît jamais le processus sous-jacent.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Exécute le descripteur et attend la fin de l'outil
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// Exécuteur de production, fondé sur `tokio::process`
///
/// Chaque invocation est bornée par une échéance ; à l'expiration le
/// processus enfant est tué (via `kill_on_drop`) et l'appel échoue avec
/// `Error::Timeout`.
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        tracing::debug!(
            "Running tool: {} {}",
            command.program,
            command.args.join(" ")
        );

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: command.program.clone(),
                source,
            })?;

        // L'abandon du futur à l'échéance tue l'enfant (kill_on_drop)
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout {
                program: command.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| Error::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.status.success() {
            tracing::warn!(
                "Tool '{}' exited with {}",
                command.program,
                output.status
            );
        }

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Vérifie qu'un outil répond à `--version`
///
/// Utilisé au démarrage pour signaler les binaires manquants sans
/// empêcher le serveur de démarrer.
pub async fn probe_tool(runner: &dyn ToolRunner, program: &str) -> bool {
    let command = ToolCommand::new(program).arg("--version");
    matches!(runner.run(&command).await, Ok(out) if out.success)
}
