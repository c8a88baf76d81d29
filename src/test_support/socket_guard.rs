//! Mock-server startup for tests that need a localhost socket.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_SOCKETS_ENV: &str = "REQUEST_GATEWAY_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_SOCKETS_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock server, or returns `None` when localhost sockets are
/// unavailable and the environment does not require them.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }
    assert!(
        !sockets_required(),
        "cannot bind a localhost socket and {REQUIRE_SOCKETS_ENV} is set"
    );
    eprintln!("[socket-bound-test] cannot bind localhost socket; skipping");
    None
}
