//! Integration tests for the request gateway against a mock HTTP server.

mod support;

use std::time::Duration;

use request_gateway::{ApiRequest, GatewayError, ResponseType, TokenStore};
use serde_json::json;
use support::{ScriptedConfirmer, TOKEN, TOKEN_KEY, gateway, start_mock_server_or_skip};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_get_attaches_credentials_and_scope() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .and(query_param("spac_id", "1401"))
        .and(query_param("page", "2"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header_exists("x-request-identity"))
        .and(header("content-type", "application/json;charset=utf-8"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": {"items": [1, 2]}, "msg": "ok"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::accepting());
    let data = t
        .gateway
        .get("/api/models", Some(json!({"page": 2})))
        .await
        .unwrap();

    assert_eq!(data, json!({"items": [1, 2]}));
    assert!(t.gateway.pending().is_empty());
}

#[tokio::test]
async fn test_post_merges_scope_into_body() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/api/keys"))
        .and(body_json(json!({"spac_id": 77, "name": "ci", "quota": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::accepting());
    t.session.set_scope_id(Some(77));
    let data = t
        .gateway
        .post("/api/keys", json!({"name": "ci", "quota": 5}))
        .await
        .unwrap();
    assert_eq!(data, json!(true));
}

#[tokio::test]
async fn test_caller_scope_field_wins_over_injected() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("PUT"))
        .and(path("/api/keys/1"))
        .and(body_json(json!({"spac_id": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": null})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), None, ScriptedConfirmer::accepting());
    t.gateway
        .put("/api/keys/1", json!({"spac_id": 5}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_captcha_path_is_exempt_from_scope() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/maas/auths/captcha"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": "img"})),
        )
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), None, ScriptedConfirmer::accepting());
    t.gateway
        .get("/api/maas/auths/captcha", None)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0].url.query().is_none(),
        "Expected no query in: {}",
        requests[0].url
    );
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_business_failure_surfaces_server_message() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/api/keys"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 5001, "msg": "bad input"})),
        )
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::accepting());
    let error = t.gateway.post("/api/keys", json!({})).await.unwrap_err();

    assert_eq!(error.message(), "bad input");
    assert_eq!(t.notifier.errors(), vec!["bad input".to_string()]);
}

#[tokio::test]
async fn test_token_invalid_code_on_success_status_is_business_failure() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 401, "msg": "token bad"})),
        )
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::accepting());
    let error = t.gateway.get("/api/models", None).await.unwrap_err();

    assert!(matches!(
        error,
        GatewayError::Business { code: Some(401), .. }
    ));
    assert_eq!(t.notifier.errors(), vec!["token bad".to_string()]);
    assert_eq!(t.confirmer.calls(), 0);
    assert_eq!(t.tokens.get(TOKEN_KEY).as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_binary_response_skips_envelope() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/bill/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]))
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::accepting());
    let response = t
        .gateway
        .send(ApiRequest::get("/api/bill/export").with_response_type(ResponseType::ArrayBuffer))
        .await
        .unwrap()
        .into_raw()
        .unwrap();
    assert_eq!(response.body, vec![0x50, 0x4b, 0x03, 0x04]);
    assert!(t.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_identical_requests_last_one_wins() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": "fresh"}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::accepting());
    let first = t.gateway.get("/api/slow", None);
    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        t.gateway.get("/api/slow", None).await
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first, Err(GatewayError::Cancelled)));
    assert_eq!(second.unwrap(), json!("fresh"));
    assert!(t.gateway.pending().is_empty());
}

#[tokio::test]
async fn test_server_error_without_body_notifies_status_text() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::accepting());
    let error = t.gateway.get("/api/models", None).await.unwrap_err();

    assert_eq!(error.status(), Some(500));
    assert_eq!(error.to_string(), "Internal Server Error");
    assert_eq!(t.notifier.errors(), vec!["Internal Server Error".to_string()]);
    assert!(t.gateway.pending().is_empty());
}

#[tokio::test]
async fn test_concurrent_token_invalid_shows_single_dialog() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"code": 401, "msg": "token expired"}))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&mock_server)
        .await;

    let t = gateway(
        &mock_server.uri(),
        Some(TOKEN),
        ScriptedConfirmer::accepting().with_delay(Duration::from_millis(300)),
    );
    let (a, b, c) = tokio::join!(
        t.gateway.get("/api/a", None),
        t.gateway.get("/api/b", None),
        t.gateway.get("/api/c", None),
    );

    for result in [a, b, c] {
        assert!(matches!(result, Err(GatewayError::SessionExpired { .. })));
    }
    assert_eq!(t.confirmer.calls(), 1);
    assert_eq!(t.reloader.reloads(), 1);
    assert!(t.tokens.get(TOKEN_KEY).is_none());
    assert!(!t.gateway.is_session_dialog_open());
    assert!(t.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_dismissed_dialog_keeps_token_and_reopens_gate() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": 401})))
        .mount(&mock_server)
        .await;

    let t = gateway(&mock_server.uri(), Some(TOKEN), ScriptedConfirmer::dismissing());
    let _ = t.gateway.get("/api/a", None).await;
    let _ = t.gateway.get("/api/b", None).await;

    assert_eq!(t.confirmer.calls(), 2);
    assert_eq!(t.reloader.reloads(), 0);
    assert_eq!(t.tokens.get(TOKEN_KEY).as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_connection_refused_is_not_notified() {
    let t = gateway("http://127.0.0.1:9", Some(TOKEN), ScriptedConfirmer::accepting());
    let error = t.gateway.get("/api/models", None).await.unwrap_err();

    assert_eq!(error.status(), None);
    assert!(!error.message().is_empty());
    assert!(t.notifier.errors().is_empty());
    assert!(t.gateway.pending().is_empty());
}
