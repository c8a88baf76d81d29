//! User-facing surfaces: transient notifications, confirmation dialogs, reload.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

/// Transient notification surface.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// The user dismissed a confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dialog dismissed")]
pub struct Dismissed;

/// Visual severity of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogKind {
    Info,
    #[default]
    Warning,
    Error,
}

/// Button labels and severity of a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub confirm_label: String,
    pub cancel_label: String,
    pub kind: DialogKind,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            confirm_label: "OK".to_string(),
            cancel_label: "Cancel".to_string(),
            kind: DialogKind::Warning,
        }
    }
}

/// Modal confirmation surface.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Resolves when the user confirms.
    ///
    /// # Errors
    ///
    /// Returns [`Dismissed`] when the user cancels or closes the dialog.
    async fn confirm(
        &self,
        message: &str,
        title: &str,
        options: &ConfirmOptions,
    ) -> Result<(), Dismissed>;
}

/// Restarts the application after credentials were reset.
pub trait Reloader: Send + Sync {
    fn reload(&self);
}

/// Notifier that writes to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "notify", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "notify", "{message}");
    }
}

/// Confirmer that asks on stderr and reads a y/n answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(
        &self,
        message: &str,
        title: &str,
        options: &ConfirmOptions,
    ) -> Result<(), Dismissed> {
        let prompt = format!(
            "[{title}] {message} ({} = y / {} = n): ",
            options.confirm_label, options.cancel_label
        );
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stderr = io::stderr().lock();
            stderr.write_all(prompt.as_bytes())?;
            stderr.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) if is_affirmative(&line) => Ok(()),
            Ok(Ok(_)) => Err(Dismissed),
            Ok(Err(error)) => {
                warn!(%error, "could not read confirmation; treating as dismissed");
                Err(Dismissed)
            }
            Err(error) => {
                warn!(%error, "confirmation prompt task failed; treating as dismissed");
                Err(Dismissed)
            }
        }
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "ok"
    )
}

/// Reloader for hosts that cannot restart themselves: logs that a restart is due.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReloader;

impl Reloader for LoggingReloader {
    fn reload(&self) {
        info!("credentials reset; sign in again and re-run the command");
    }
}
