//! The [`RequestGateway`] and its response handling.

use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::dialog_lock::ErrorDialogLock;
use super::error::GatewayError;
use super::fingerprint::Fingerprint;
use super::identity::RequestIdentity;
use super::registry::PendingRegistry;
use crate::auth::{REQUEST_IDENTITY_HEADER, authorization_value, mask_secret};
use crate::config::GatewayConfig;
use crate::envelope::{EnvelopeOutcome, ErrorBody, ResponseEnvelope, ResultCodes};
use crate::request::{ApiRequest, ResponseType};
use crate::scope::ScopePolicy;
use crate::session::{
    ConfirmOptions, Confirmer, LoggingReloader, Notifier, Reloader, SessionStore,
    TerminalConfirmer, TokenStore, TracingNotifier,
};
use crate::transport::{PreparedRequest, RawResponse, ReqwestTransport, Transport, TransportError};

/// Services the gateway consults while handling a call.
#[derive(Clone)]
pub struct Collaborators {
    pub session: Arc<dyn SessionStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
    pub reloader: Arc<dyn Reloader>,
}

impl Collaborators {
    /// Collaborators for a terminal session: log notifications, prompt on
    /// stderr, log reloads.
    pub fn terminal(session: Arc<dyn SessionStore>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            session,
            tokens,
            notifier: Arc::new(TracingNotifier),
            confirmer: Arc::new(TerminalConfirmer),
            reloader: Arc::new(LoggingReloader),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Successful result of a gateway call.
#[derive(Debug, Clone)]
pub enum GatewayResponse {
    /// Unwrapped envelope `data`.
    Data(Value),
    /// Untouched response for binary response types.
    Raw(RawResponse),
}

impl GatewayResponse {
    #[must_use]
    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Data(data) => Some(data),
            Self::Raw(_) => None,
        }
    }

    #[must_use]
    pub fn into_raw(self) -> Option<RawResponse> {
        match self {
            Self::Raw(response) => Some(response),
            Self::Data(_) => None,
        }
    }
}

/// Single entry point for JSON API calls.
///
/// Share one instance per backend; the pending registry, the dialog gate and
/// the identity clock all live on it.
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    collaborators: Collaborators,
    scope: ScopePolicy,
    codes: ResultCodes,
    token_key: String,
    generic_error_message: String,
    session_expired_title: String,
    session_expired_message: String,
    confirm_options: ConfirmOptions,
    pending: PendingRegistry,
    dialog_lock: ErrorDialogLock,
    identity: RequestIdentity,
}

impl fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestGateway")
            .field("scope", &self.scope)
            .field("codes", &self.codes)
            .field("token_key", &self.token_key)
            .field("pending", &self.pending.len())
            .field("dialog_open", &self.dialog_lock.is_held())
            .finish_non_exhaustive()
    }
}

impl RequestGateway {
    /// Creates a gateway over an existing transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        collaborators: Collaborators,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            transport,
            collaborators,
            scope: config.scope_policy(),
            codes: config.result_codes(),
            token_key: config.token_key.clone(),
            generic_error_message: config.generic_error_message.clone(),
            session_expired_title: config.session_expired_title.clone(),
            session_expired_message: config.session_expired_message.clone(),
            confirm_options: config.confirm_options(),
            pending: PendingRegistry::new(),
            dialog_lock: ErrorDialogLock::new(),
            identity: RequestIdentity::new(),
        }
    }

    /// Creates a gateway with a [`ReqwestTransport`] for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the HTTP client cannot be built.
    pub fn from_config(
        config: &GatewayConfig,
        collaborators: Collaborators,
    ) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(&config.base_url, config.timeout())?;
        Ok(Self::new(Arc::new(transport), collaborators, config))
    }

    /// Requests currently in flight.
    #[must_use]
    pub fn pending(&self) -> &PendingRegistry {
        &self.pending
    }

    /// Whether the session-expired dialog is currently shown.
    #[must_use]
    pub fn is_session_dialog_open(&self) -> bool {
        self.dialog_lock.is_held()
    }

    /// Sends `request` and normalizes the response.
    ///
    /// An identical request already in flight is cancelled and resolves to
    /// [`GatewayError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the call is superseded, the server
    /// reports a failure, or no response arrives.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: ApiRequest) -> Result<GatewayResponse, GatewayError> {
        let fingerprint = Fingerprint::of(&request);
        let response_type = request.response_type;
        let prepared = self.prepare(request)?;
        let pending = self.pending.register(fingerprint);

        let outcome = tokio::select! {
            biased;
            () = pending.cancelled() => {
                debug!("request superseded by an identical one");
                return Err(GatewayError::Cancelled);
            }
            result = self.transport.send(prepared) => result,
        };
        pending.release();

        match outcome {
            Ok(response) if response.is_success() => self.normalize(response, response_type),
            Ok(response) => Err(self.reject_status(response).await),
            Err(error) => Err(Self::reject_unanswered(&error)),
        }
    }

    /// Sends `request` and deserializes the unwrapped `data` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] as [`send`](Self::send) does, or
    /// [`GatewayError::Decode`] when `data` does not match `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, GatewayError> {
        let data = self.send(request).await?.into_data().unwrap_or_default();
        Ok(serde_json::from_value(data)?)
    }

    /// `GET url?query`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn get(&self, url: &str, query: Option<Value>) -> Result<Value, GatewayError> {
        let mut request = ApiRequest::get(url);
        request.query = query;
        self.send_value(request).await
    }

    /// `POST url` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn post(&self, url: &str, body: Value) -> Result<Value, GatewayError> {
        self.send_value(ApiRequest::post(url).with_json(body)).await
    }

    /// `PUT url` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn put(&self, url: &str, body: Value) -> Result<Value, GatewayError> {
        self.send_value(ApiRequest::put(url).with_json(body)).await
    }

    /// `DELETE url?query`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn delete(&self, url: &str, query: Option<Value>) -> Result<Value, GatewayError> {
        let mut request = ApiRequest::delete(url);
        request.query = query;
        self.send_value(request).await
    }

    async fn send_value(&self, request: ApiRequest) -> Result<Value, GatewayError> {
        Ok(self.send(request).await?.into_data().unwrap_or_default())
    }

    /// Attaches credentials and the workspace scope.
    fn prepare(&self, request: ApiRequest) -> Result<PreparedRequest, GatewayError> {
        let mut headers = HeaderMap::new();
        let token = self
            .collaborators
            .tokens
            .get(&self.token_key)
            .filter(|token| !token.trim().is_empty());
        if let Some(token) = token {
            let value = authorization_value(&token).map_err(|_| {
                GatewayError::invalid_request("stored access token is not a valid header value")
            })?;
            let identity = self.identity.next();
            headers.insert(AUTHORIZATION, value);
            headers.insert(
                HeaderName::from_static(REQUEST_IDENTITY_HEADER),
                HeaderValue::from(identity),
            );
            debug!(token = %mask_secret(&token), identity, "credentials attached");
        }

        let scope_id = self.collaborators.session.current_scope_id();
        let request = self.scope.apply(request, scope_id);
        PreparedRequest::from_api(request, headers)
            .map_err(|error| GatewayError::invalid_request(error.to_string()))
    }

    /// Handles a 2xx response.
    ///
    /// Every envelope code other than success is a business failure; session
    /// recovery only runs for error statuses.
    fn normalize(
        &self,
        response: RawResponse,
        response_type: ResponseType,
    ) -> Result<GatewayResponse, GatewayError> {
        if response_type.is_binary() {
            return Ok(GatewayResponse::Raw(response));
        }

        let Some(envelope) = ResponseEnvelope::from_slice(&response.body) else {
            debug!(status = %response.status, "response body is not an envelope");
            return Err(self.business_failure(None, None));
        };

        match self.codes.classify(envelope) {
            EnvelopeOutcome::Success(data) => Ok(GatewayResponse::Data(data)),
            EnvelopeOutcome::Failure { code, msg } => Err(self.business_failure(Some(code), msg)),
        }
    }

    fn business_failure(&self, code: Option<i64>, msg: Option<String>) -> GatewayError {
        let message = msg.unwrap_or_else(|| self.generic_error_message.clone());
        self.collaborators.notifier.error(&message);
        GatewayError::business(code, message)
    }

    /// Handles a non-2xx response.
    async fn reject_status(&self, response: RawResponse) -> GatewayError {
        let status = response.status;
        let message = status_message(&response);
        warn!(status = status.as_u16(), "request failed with error status");

        if response.body.is_empty() {
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                let text = if response.status_text().is_empty() {
                    self.generic_error_message.as_str()
                } else {
                    response.status_text()
                };
                self.collaborators.notifier.error(text);
            }
            return GatewayError::transport(Some(status.as_u16()), message);
        }

        let body = ErrorBody::from_slice(&response.body);
        if body.code == Some(self.codes.token_invalid) {
            self.recover_session().await;
            return GatewayError::session_expired(message);
        }

        let notice = body
            .msg
            .unwrap_or_else(|| self.generic_error_message.clone());
        self.collaborators.notifier.error(&notice);
        GatewayError::transport(Some(status.as_u16()), message)
    }

    fn reject_unanswered(error: &TransportError) -> GatewayError {
        warn!(%error, "request failed without a response");
        GatewayError::transport(None, error.to_string())
    }

    /// Shows the session-expired dialog unless one is already open.
    ///
    /// Confirming resets the stored credentials and reloads; dismissing does
    /// nothing else. The gate reopens when the flow finishes either way.
    async fn recover_session(&self) {
        let Some(_gate) = self.dialog_lock.try_acquire() else {
            debug!("session-expired dialog already open");
            return;
        };

        let answer = self
            .collaborators
            .confirmer
            .confirm(
                &self.session_expired_message,
                &self.session_expired_title,
                &self.confirm_options,
            )
            .await;
        if answer.is_err() {
            info!("session-expired dialog dismissed");
            return;
        }

        match self.collaborators.session.reset_token().await {
            Ok(()) => {
                info!("credentials reset; reloading");
                self.collaborators.reloader.reload();
            }
            Err(error) => warn!(%error, "failed to reset credentials after session expiry"),
        }
    }
}

fn status_message(response: &RawResponse) -> String {
    let text = response.status_text();
    if text.is_empty() {
        format!("Request failed with status code {}", response.status.as_u16())
    } else {
        text.to_string()
    }
}
