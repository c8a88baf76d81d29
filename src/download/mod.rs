//! Binary downloads (exports, attachments) saved to disk.
//!
//! # Features
//!
//! - One-off HTTP client per call with its own timeout and cookie policy
//! - Bearer token and workspace scope attached like gateway calls
//! - Filename from Content-Disposition, the caller, or a default
//! - Duplicate filename handling (adds numeric suffix)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use request_gateway::{
//!     ApiRequest, DirectorySink, DownloadOptions, GatewayConfig, LocalSession,
//!     MemoryTokenStore, StreamDownloader,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::default();
//! let tokens = Arc::new(MemoryTokenStore::new());
//! let session = Arc::new(LocalSession::new(tokens.clone(), &config.token_key));
//! let downloader = StreamDownloader::new(
//!     &config,
//!     session,
//!     tokens,
//!     Arc::new(DirectorySink::new("./downloads")),
//! );
//! let saved = downloader
//!     .fetch_and_save(ApiRequest::get("/api/bill/export"), &DownloadOptions::default())
//!     .await?;
//! println!("Downloaded: {}", saved.path.display());
//! # Ok(())
//! # }
//! ```

mod downloader;
mod error;
mod filename;
mod sink;

pub use downloader::{DEFAULT_DOWNLOAD_TIMEOUT, DownloadOptions, DownloadResponse, StreamDownloader};
pub use error::DownloadError;
pub use filename::DEFAULT_FILENAME;
pub use sink::{DirectorySink, FileSink};
