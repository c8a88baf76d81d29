//! Request Gateway Library
//!
//! This library provides the request layer of the admin console client:
//! a JSON API gateway with request de-duplication, auth-token injection,
//! tenant/space scoping, unified envelope normalization, and a stream
//! downloader for binary exports.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`gateway`] - De-duplicating JSON gateway and session-expiry recovery
//! - [`download`] - One-off binary downloads saved through a file sink
//! - [`scope`] - Shared scope-injection policy used by both clients
//! - [`transport`] - Abortable HTTP transport seam and its reqwest implementation
//! - [`session`] - Token storage, session store and UI collaborator seams
//! - [`envelope`] - The `{code, data, msg}` response envelope
//! - [`request`] - Outbound request model
//! - [`config`] - TOML-backed configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod download;
pub mod envelope;
pub mod gateway;
pub mod request;
pub mod scope;
pub mod session;
#[cfg(test)]
pub mod test_support;
#[cfg(test)]
extern crate self as request_gateway;
pub mod transport;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use auth::{REQUEST_IDENTITY_HEADER, mask_secret};
pub use config::{ConfigError, GatewayConfig, resolve_default_config_path};
pub use download::{
    DirectorySink, DownloadError, DownloadOptions, DownloadResponse, FileSink, StreamDownloader,
};
pub use envelope::{EnvelopeOutcome, ResponseEnvelope, ResultCodes};
pub use gateway::{
    Collaborators, Fingerprint, GatewayError, GatewayResponse, PendingRegistry, RequestGateway,
};
pub use request::{ApiRequest, RequestBody, ResponseType, ScopeId};
pub use scope::ScopePolicy;
pub use session::{
    ConfirmOptions, Confirmer, Dismissed, FileTokenStore, LocalSession, LoggingReloader,
    MemoryTokenStore, Notifier, Reloader, SessionError, SessionStore, TerminalConfirmer,
    TokenStore, TokenStoreError, TracingNotifier,
};
pub use transport::{PreparedRequest, RawResponse, ReqwestTransport, Transport, TransportError};
