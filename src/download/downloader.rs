//! One-off binary downloads saved through a [`FileSink`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};

use super::error::DownloadError;
use super::filename::choose_filename;
use super::sink::FileSink;
use crate::auth::{authorization_value, mask_secret};
use crate::config::GatewayConfig;
use crate::request::ApiRequest;
use crate::scope::ScopePolicy;
use crate::session::{SessionStore, TokenStore};
use crate::transport::{
    JSON_CONTENT_TYPE, PreparedRequest, RawResponse, ReqwestTransport, Transport, TransportError,
};

/// Default download timeout.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-call download settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub timeout: Duration,
    /// Keep cookies set by the server for the duration of the call.
    pub with_credentials: bool,
    /// Name to save under when the server sends no Content-Disposition.
    pub filename: Option<String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            with_credentials: true,
            filename: None,
        }
    }
}

impl DownloadOptions {
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            timeout: config.download_timeout(),
            with_credentials: config.with_credentials,
            filename: None,
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// A saved download.
#[derive(Debug, Clone)]
pub struct DownloadResponse {
    /// Status, headers and body as received.
    pub response: RawResponse,
    /// Name the payload was saved under, before de-duplication.
    pub filename: String,
    /// Where the sink wrote it.
    pub path: PathBuf,
}

/// Fetches binary payloads and hands them to a [`FileSink`].
///
/// Each call builds its own HTTP client with the per-call timeout. Downloads
/// are never de-duplicated.
pub struct StreamDownloader {
    base_url: String,
    scope: ScopePolicy,
    token_key: String,
    session: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenStore>,
    sink: Arc<dyn FileSink>,
}

impl fmt::Debug for StreamDownloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamDownloader")
            .field("base_url", &self.base_url)
            .field("scope", &self.scope)
            .field("token_key", &self.token_key)
            .finish_non_exhaustive()
    }
}

impl StreamDownloader {
    pub fn new(
        config: &GatewayConfig,
        session: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenStore>,
        sink: Arc<dyn FileSink>,
    ) -> Self {
        Self {
            base_url: config.base_url.clone(),
            scope: config.scope_policy(),
            token_key: config.token_key.clone(),
            session,
            tokens,
            sink,
        }
    }

    /// Downloads `request` and saves the payload.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on network failure, non-2xx status, an empty
    /// body, or a sink failure.
    #[instrument(skip(self, request, options), fields(method = %request.method, url = %request.url))]
    pub async fn fetch_and_save(
        &self,
        request: ApiRequest,
        options: &DownloadOptions,
    ) -> Result<DownloadResponse, DownloadError> {
        let transport = ReqwestTransport::for_download(
            &self.base_url,
            options.timeout,
            options.with_credentials,
        )?;
        let url = request.url.clone();
        let prepared = self.prepare(request)?;

        debug!("starting download");
        let response = transport.send(prepared).await?;

        if !response.is_success() {
            warn!(status = response.status.as_u16(), "download failed with error status");
            return Err(DownloadError::http_status(url, response));
        }
        if response.body.is_empty() {
            warn!(status = response.status.as_u16(), "download returned no payload");
            return Err(DownloadError::empty_payload(url, response));
        }

        let filename = choose_filename(
            response.header(&CONTENT_DISPOSITION),
            options.filename.as_deref(),
        );
        let path = self
            .sink
            .save(&response.body, &filename, response.content_type())
            .await
            .map_err(|source| DownloadError::io(filename.clone(), source))?;

        info!(
            filename = %filename,
            path = %path.display(),
            bytes = response.body.len(),
            "download complete"
        );
        Ok(DownloadResponse {
            response,
            filename,
            path,
        })
    }

    fn prepare(&self, request: ApiRequest) -> Result<PreparedRequest, DownloadError> {
        let mut headers = HeaderMap::new();
        let token = self
            .tokens
            .get(&self.token_key)
            .filter(|token| !token.trim().is_empty());
        if let Some(token) = token {
            let value = authorization_value(&token)
                .map_err(|_| TransportError::invalid_header(AUTHORIZATION.as_str()))?;
            headers.insert(AUTHORIZATION, value);
            debug!(token = %mask_secret(&token), "credentials attached");
        }

        let request = self
            .scope
            .apply(request, self.session.current_scope_id());
        if request.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        Ok(PreparedRequest::from_api(request, headers)?)
    }
}
