#![allow(clippy::unwrap_used)]
// Integration tests for `MarzbanClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use marzban_api::models::{
    DataLimitResetStrategy, NodeCreate, NodeStatus, ProxySettings, UserCreate, UserModify,
    UserStatus,
};
use marzban_api::{Error, MarzbanClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const MAPPED_STATUSES: [u16; 5] = [400, 403, 404, 409, 422];

async fn setup() -> (MockServer, MarzbanClient) {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_timeout(Duration::from_secs(5));
    let client = MarzbanClient::new(&server.uri(), &transport).unwrap();
    (server, client)
}

async fn setup_authenticated() -> (MockServer, MarzbanClient) {
    let (server, client) = setup().await;
    let client = client.with_token(SecretString::from("test-token".to_owned()));
    (server, client)
}

/// Matches requests that carry no `Authorization` header.
struct NoAuthHeader;

impl Match for NoAuthHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn user_json(username: &str) -> Value {
    json!({
        "username": username,
        "proxies": { "vless": { "id": "35e4e39c-7d5c-4f4b-8b71-558e4f37ff53", "flow": "" } },
        "expire": null,
        "data_limit": null,
        "data_limit_reset_strategy": "no_reset",
        "inbounds": { "vless": ["VLESS TCP REALITY"] },
        "note": null,
        "status": "active",
        "used_traffic": 0,
        "lifetime_used_traffic": 0,
        "created_at": "2024-05-01T12:00:00",
        "links": ["vless://35e4e39c@example.com:443?security=reality#alice"],
        "subscription_url": "/sub/eyJhbGciOi/",
        "excluded_inbounds": { "vless": [] },
        "admin": { "username": "root", "is_sudo": true, "telegram_id": null, "discord_webhook": null }
    })
}

fn node_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "name": format!("edge-{id}"),
        "address": format!("10.0.0.{id}"),
        "port": 62050,
        "api_port": 62051,
        "usage_coefficient": 1.0,
        "xray_version": "1.8.4",
        "status": status,
        "message": null
    })
}

fn vless_proxies() -> ProxySettings {
    let mut proxies = ProxySettings::new();
    proxies.insert("vless".into(), serde_json::Map::new());
    proxies
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_stores_bearer_token() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=root"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "abc.def", "token_type": "bearer" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/admin"))
        .and(header("authorization", "Bearer abc.def"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "username": "root", "is_sudo": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_authenticated());

    let password = SecretString::from("s3cret".to_owned());
    let token = client.authenticate("root", &password).await.unwrap();

    assert_eq!(token.access_token.expose_secret(), "abc.def");
    assert!(client.is_authenticated());

    let admin = client.get_current_admin().await.unwrap();
    assert_eq!(admin.username, "root");
    assert!(admin.is_sudo);
}

#[tokio::test]
async fn test_authenticate_missing_access_token_is_token_error() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "bearer" })))
        .expect(1)
        .mount(&server)
        .await;

    let password = SecretString::from("p".to_owned());
    let result = client.authenticate("u", &password).await;

    assert!(
        matches!(result, Err(Error::Token { .. })),
        "expected Token error, got: {result:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_non_json_body_is_token_error() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let password = SecretString::from("p".to_owned());
    let result = client.authenticate("u", &password).await;

    assert!(
        matches!(result, Err(Error::Token { .. })),
        "expected Token error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_failed_reauthentication_keeps_previous_token() {
    let (server, mut client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "detail": "bad creds" })))
        .expect(3)
        .mount(&server)
        .await;

    let password = SecretString::from("wrong".to_owned());
    let result = client.authenticate("root", &password).await;

    assert!(matches!(result, Err(Error::Validation { .. })));
    assert_eq!(client.token().unwrap().expose_secret(), "test-token");
}

// ── Retry & status mapping ──────────────────────────────────────────

#[tokio::test]
async fn test_mapped_status_then_success_is_retried() {
    for status in MAPPED_STATUSES {
        let (server, client) = setup_authenticated().await;

        Mock::given(method("GET"))
            .and(path("/api/node/1"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "detail": "transient" })),
            )
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/node/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(node_json(1, "connected")))
            .expect(1)
            .mount(&server)
            .await;

        let node = client.get_node(1).await.unwrap();
        assert_eq!(node.id, 1, "status {status}");
        assert_eq!(node.status, NodeStatus::Connected);

        server.verify().await;
    }
}

#[tokio::test]
async fn test_mapped_status_three_times_gives_mapped_error() {
    for status in MAPPED_STATUSES {
        let (server, client) = setup_authenticated().await;

        Mock::given(method("GET"))
            .and(path("/api/node/1"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "detail": "still failing" })),
            )
            .expect(3)
            .mount(&server)
            .await;

        let err = client.get_node(1).await.unwrap_err();

        assert!(err.is_retryable(), "status {status}: {err:?}");
        assert_eq!(err.status(), Some(status));
        let matched = match status {
            400 => matches!(err, Error::BadRequest { .. }),
            403 => matches!(err, Error::Unauthorized),
            404 => matches!(err, Error::NotFound),
            409 => matches!(err, Error::Conflict { .. }),
            422 => matches!(err, Error::Validation { .. }),
            _ => false,
        };
        assert!(matched, "status {status} mapped to {err:?}");

        server.verify().await;
    }
}

#[tokio::test]
async fn test_bad_request_and_conflict_carry_detail() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("DELETE"))
        .and(path("/api/user/alice"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "User is on hold" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/user"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "detail": "User already exists" })),
        )
        .mount(&server)
        .await;

    let err = client.remove_user("alice").await.unwrap_err();
    assert_eq!(err.to_string(), "Bad request: User is on hold");

    let err = client
        .add_user(&UserCreate::new("alice", vless_proxies()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Conflict: User already exists");
}

#[tokio::test]
async fn test_validation_error_keeps_structured_detail() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{
                "loc": ["body", "proxies"],
                "msg": "Each user needs at least one proxy",
                "type": "value_error"
            }]
        })))
        .mount(&server)
        .await;

    let err = client
        .add_user(&UserCreate::new("alice", vless_proxies()))
        .await
        .unwrap_err();

    match err {
        Error::Validation { ref message, ref detail } => {
            assert_eq!(detail.len(), 1);
            assert_eq!(detail[0].msg, "Each user needs at least one proxy");
            assert!(message.starts_with("Validation Error: body.proxies"), "got: {message}");
        }
        other => panic!("expected Validation error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_transport_error_without_retry() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/system"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_system_stats().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert_eq!(err.status(), Some(500));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_refused_connection_is_transport_error_without_retry() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let transport = TransportConfig::default()
        .with_timeout(Duration::from_secs(5))
        .with_connect_timeout(Duration::from_secs(1));
    let client = MarzbanClient::new(&uri, &transport)
        .unwrap()
        .with_token(SecretString::from("test-token".to_owned()));

    let started = std::time::Instant::now();
    let err = client.get_system_stats().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(!err.is_retryable());
    assert_eq!(err.status(), None);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_unauthenticated_401_is_not_mapped() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/admin"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_current_admin().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_malformed_success_body_is_not_retried() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/system"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ truncated"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_system_stats().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_schema_failure_is_not_retried() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/node/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node_json(3, "corrupted")))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_node(3).await.unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_max_attempts_is_configurable() {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_max_attempts(1);
    let client = MarzbanClient::new(&server.uri(), &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/core"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_core_stats().await.unwrap_err();
    assert!(err.is_not_found());
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_user_round_trip_with_server_defaults() {
    let (server, client) = setup_authenticated().await;

    let request = UserCreate::new("alice", vless_proxies());

    Mock::given(method("POST"))
        .and(path("/api/user"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string_contains(r#""data_limit_reset_strategy":"no_reset""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("alice")))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.add_user(&request).await.unwrap();

    assert_eq!(user.username, request.username);
    assert!(user.proxies.contains_key("vless"));
    assert_eq!(user.status, UserStatus::Active);
    assert_eq!(user.data_limit_reset_strategy, DataLimitResetStrategy::NoReset);
    assert_eq!(user.used_traffic, 0);
    assert_eq!(user.expire, None);
    assert_eq!(user.links.len(), 1);
    assert_eq!(user.admin.as_ref().map(|a| a.username.as_str()), Some("root"));
    assert_eq!(user.created_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
}

#[tokio::test]
async fn test_add_user_rejects_short_username_before_sending() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .add_user(&UserCreate::new("al", vless_proxies()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_modify_user_sends_only_set_fields() {
    let (server, client) = setup_authenticated().await;

    let mut disabled = user_json("alice");
    disabled["status"] = json!("disabled");

    Mock::given(method("PUT"))
        .and(path("/api/user/alice"))
        .and(body_json(json!({ "status": "disabled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&disabled))
        .expect(1)
        .mount(&server)
        .await;

    let changes = UserModify {
        status: Some(UserStatus::Disabled),
        ..UserModify::default()
    };
    let user = client.modify_user("alice", &changes).await.unwrap();
    assert_eq!(user.status, UserStatus::Disabled);
}

#[tokio::test]
async fn test_get_users_passes_offset_and_limit() {
    let (server, client) = setup_authenticated().await;

    let users: Vec<Value> = ["alice", "bob", "carol"].into_iter().map(user_json).collect();

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("offset", "10"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "users": users, "total": 13 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let users = client.get_users(10, 5).await.unwrap();

    assert!(users.len() <= 5);
    assert_eq!(users.len(), 3);
    assert_eq!(users[2].username, "carol");
}

#[tokio::test]
async fn test_get_users_rejects_one_bad_element() {
    let (server, client) = setup_authenticated().await;

    let mut broken = user_json("bob");
    broken["status"] = json!("suspended");

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user_json("alice"), broken],
            "total": 2
        })))
        .mount(&server)
        .await;

    match client.get_users(0, 10).await {
        Err(Error::Schema(e)) => assert_eq!(e.location, "[1]"),
        other => panic!("expected schema error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_remove_user_accepts_empty_body() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("DELETE"))
        .and(path("/api/user/alice"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.remove_user("alice").await.unwrap();
}

// ── Admins ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_admins_pagination() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/admins"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "username": "root", "is_sudo": true },
            { "username": "reseller", "is_sudo": false, "telegram_id": 12345 }
        ])))
        .mount(&server)
        .await;

    let admins = client.get_admins(0, 10).await.unwrap();

    assert_eq!(admins.len(), 2);
    assert_eq!(admins[1].telegram_id, Some(12345));
    assert_eq!(admins[1].discord_webhook, None);
}

// ── Nodes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_node_sends_defaults() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path("/api/node"))
        .and(body_json(json!({
            "name": "edge-4",
            "address": "10.0.0.4",
            "port": 62050,
            "api_port": 62051,
            "usage_coefficient": 1.0,
            "add_as_new_host": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(node_json(4, "connecting")))
        .expect(1)
        .mount(&server)
        .await;

    let node = client
        .add_node(&NodeCreate::new("edge-4", "10.0.0.4"))
        .await
        .unwrap();
    assert_eq!(node.status, NodeStatus::Connecting);
}

#[tokio::test]
async fn test_get_nodes_usage_with_range() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/nodes/usage"))
        .and(query_param("start", "2024-05-01T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usages": [
                { "node_id": null, "node_name": "Master", "uplink": 10, "downlink": 20 },
                { "node_id": 1, "node_name": "edge-1", "uplink": 1, "downlink": 2 }
            ]
        })))
        .mount(&server)
        .await;

    let start = chrono::DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let usage = client.get_nodes_usage(Some(start), None).await.unwrap();

    assert_eq!(usage.usages.len(), 2);
    assert_eq!(usage.usages[0].node_id, None);
    assert_eq!(usage.usages[1].downlink, 2);
}

// ── Core, system & hosts ────────────────────────────────────────────

#[tokio::test]
async fn test_core_config_round_trip() {
    let (server, client) = setup_authenticated().await;

    let config = json!({ "log": { "loglevel": "warning" }, "inbounds": [], "outbounds": [] });

    Mock::given(method("PUT"))
        .and(path("/api/core/config"))
        .and(body_json(&config))
        .respond_with(ResponseTemplate::new(200).set_body_json(&config))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/core/restart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let Value::Object(map) = config else { unreachable!() };
    let updated = client.modify_core_config(&map).await.unwrap();
    assert_eq!(updated["log"]["loglevel"], "warning");

    client.restart_core().await.unwrap();
}

#[tokio::test]
async fn test_get_hosts_grouped_by_tag() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "VLESS TCP REALITY": [{
                "remark": "🚀 {USERNAME}",
                "address": "{SERVER_IP}",
                "port": null,
                "security": "inbound_default",
                "alpn": "",
                "fingerprint": "",
                "is_disabled": false,
                "mux_enable": false,
                "random_user_agent": false
            }]
        })))
        .mount(&server)
        .await;

    let hosts = client.get_hosts().await.unwrap();

    let host = &hosts["VLESS TCP REALITY"][0];
    assert_eq!(host.address, "{SERVER_IP}");
    assert_eq!(host.port, None);
}

#[tokio::test]
async fn test_get_inbounds_accepts_numeric_and_range_ports() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/inbounds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vless": [
                { "tag": "VLESS TCP", "protocol": "vless", "network": "tcp", "tls": "reality", "port": 443 },
                { "tag": "VLESS WS", "protocol": "vless", "network": "ws", "tls": "none", "port": "2000-2010" }
            ]
        })))
        .mount(&server)
        .await;

    let inbounds = client.get_inbounds().await.unwrap();

    assert_eq!(inbounds["vless"].len(), 2);
    assert_eq!(
        inbounds["vless"][1].port,
        marzban_api::models::InboundPort::Spec("2000-2010".into())
    );
}

// ── Subscription ────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscription_is_fetched_without_auth_header() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/sub/eyJhbGciOi/"))
        .and(NoAuthHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("alice")))
        .expect(1)
        .mount(&server)
        .await;

    let sub = client.get_user_subscription("eyJhbGciOi").await.unwrap();
    assert_eq!(sub.username, "alice");
    assert_eq!(sub.status, UserStatus::Active);
}

#[tokio::test]
async fn test_revoke_subscription() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path("/api/user/alice/revoke_sub"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("alice")))
        .expect(1)
        .mount(&server)
        .await;

    client.revoke_user_subscription("alice").await.unwrap();
}
