//! Recording doubles for the gateway's collaborators.
//!
//! Shared by unit tests and, through `tests/support`, integration tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tokio::sync::Barrier;

use request_gateway::{
    ConfirmOptions, Confirmer, Dismissed, Notifier, PreparedRequest, RawResponse, Reloader,
    Transport, TransportError,
};

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub errors: Mutex<Vec<String>>,
    pub successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        if let Ok(mut successes) = self.successes.lock() {
            successes.push(message.to_string());
        }
    }

    fn error(&self, message: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(message.to_string());
        }
    }
}

/// Confirmer that answers after `delay`, counting how often it was asked.
#[derive(Debug)]
pub struct ScriptedConfirmer {
    pub accept: bool,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedConfirmer {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn dismissing() -> Self {
        Self {
            accept: false,
            ..Self::accepting()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(
        &self,
        _message: &str,
        _title: &str,
        _options: &ConfirmOptions,
    ) -> Result<(), Dismissed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.accept { Ok(()) } else { Err(Dismissed) }
    }
}

#[derive(Debug, Default)]
pub struct CountingReloader {
    pub reloads: AtomicUsize,
}

impl CountingReloader {
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Reloader for CountingReloader {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport answering every request with the same response.
///
/// An optional barrier holds responses until that many requests arrived, so
/// concurrent calls settle together.
#[derive(Debug)]
pub struct ScriptedTransport {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub delay: Duration,
    pub barrier: Option<Barrier>,
    pub timeout: bool,
    pub seen: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
            barrier: None,
            timeout: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            timeout: true,
            ..Self::responding(200, "")
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Barrier::new(parties));
        self
    }

    pub fn seen(&self) -> Vec<PreparedRequest> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let url = request.url.clone();
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request);
        }
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        tokio::time::sleep(self.delay).await;
        if self.timeout {
            return Err(TransportError::Timeout { url });
        }
        Ok(RawResponse {
            status: self.status,
            headers: HeaderMap::new(),
            body: self.body.clone(),
        })
    }
}
