//! Shared helpers for integration tests.

#![allow(dead_code)]

#[path = "../../src/test_support/collaborators.rs"]
mod collaborators;
#[path = "../../src/test_support/socket_guard.rs"]
mod socket_guard;

use std::sync::Arc;

use request_gateway::{Collaborators, GatewayConfig, LocalSession, MemoryTokenStore, RequestGateway};

pub use collaborators::{CountingReloader, RecordingNotifier, ScriptedConfirmer};
pub use socket_guard::start_mock_server_or_skip;

pub const TOKEN_KEY: &str = "Admin-Token";
pub const TOKEN: &str = "eyJhbGciOi.test.token";

/// A gateway against `base_url` plus handles on every collaborator.
pub struct TestGateway {
    pub gateway: RequestGateway,
    pub tokens: Arc<MemoryTokenStore>,
    pub session: Arc<LocalSession>,
    pub notifier: Arc<RecordingNotifier>,
    pub confirmer: Arc<ScriptedConfirmer>,
    pub reloader: Arc<CountingReloader>,
}

pub fn gateway(base_url: &str, token: Option<&str>, confirmer: ScriptedConfirmer) -> TestGateway {
    let config = GatewayConfig {
        base_url: base_url.to_string(),
        ..GatewayConfig::default()
    };
    let tokens = Arc::new(match token {
        Some(token) => MemoryTokenStore::with_token(TOKEN_KEY, token),
        None => MemoryTokenStore::new(),
    });
    let session = Arc::new(LocalSession::new(tokens.clone(), TOKEN_KEY));
    let notifier = Arc::new(RecordingNotifier::default());
    let confirmer = Arc::new(confirmer);
    let reloader = Arc::new(CountingReloader::default());
    let collaborators = Collaborators {
        session: session.clone(),
        tokens: tokens.clone(),
        notifier: notifier.clone(),
        confirmer: confirmer.clone(),
        reloader: reloader.clone(),
    };
    let gateway = RequestGateway::from_config(&config, collaborators).unwrap();
    TestGateway {
        gateway,
        tokens,
        session,
        notifier,
        confirmer,
        reloader,
    }
}
