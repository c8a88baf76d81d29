//! Destinations for downloaded payloads.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::filename::resolve_unique_path;

/// Attempts at claiming a free name before a save gives up.
const MAX_CLAIM_ATTEMPTS: usize = 64;

/// Where downloaded bytes end up.
///
/// Sinks receive the response `Content-Type` with every payload and own what
/// happens to it: a browser-style sink tags the saved blob with it, while
/// [`DirectorySink`] writes raw bytes and only records it in the log.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Saves `bytes` under `filename`, returning where they were written.
    ///
    /// `content_type` is the response's `Content-Type` header, if any.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the payload cannot be written.
    async fn save(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: Option<&str>,
    ) -> io::Result<PathBuf>;
}

/// Writes downloads into one directory, never overwriting existing files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates a file under a free variant of `filename`.
    ///
    /// Concurrent saves may pick the same candidate; the loser of
    /// `create_new` picks again.
    async fn claim(&self, filename: &str) -> io::Result<(PathBuf, File)> {
        let mut last_error = None;
        for _ in 0..MAX_CLAIM_ATTEMPTS {
            let path = resolve_unique_path(&self.dir, filename);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "name taken concurrently, retrying");
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }
        Err(last_error.unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists)))
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: Option<&str>,
    ) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let (path, mut file) = self.claim(filename).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            content_type = content_type.unwrap_or("unknown"),
            "download saved"
        );
        Ok(path)
    }
}
