//! Handshake → bootstrap → ping over several candidate hosts

mod common;

use common::{bootstrap_body, client_for, handshake_ok, mount_launch, ok, DEAD_HOST};
use mystic_core::api::bootstrap::HandshakeToken;
use mystic_core::api::UpdatePrompt;
use mystic_core::{BootstrapState, LaunchSequence};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_handshake_wins_on_second_host() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    let third = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/app-api/handshake"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("POST"))
        .and(path("/app-api/handshake"))
        .respond_with(handshake_ok("tok-second"))
        .expect(1)
        .mount(&second)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/bootstrap"))
        .and(header("X-App-Handshake", "tok-second"))
        .respond_with(ok(bootstrap_body(false)))
        .expect(1)
        .mount(&second)
        .await;
    Mock::given(method("POST"))
        .respond_with(handshake_ok("never"))
        .expect(0)
        .mount(&third)
        .await;

    let client = client_for(&[first.uri(), second.uri(), third.uri()]);
    let mut sequence = LaunchSequence::new(client.clone());
    let report = sequence.run().await;

    assert!(report.is_ready());
    assert_eq!(report.state, BootstrapState::Ready);
    assert_eq!(report.base.as_deref(), Some(second.uri().as_str()));
    assert_eq!(report.attempted, vec![first.uri(), second.uri()]);
    assert!(!report.config.handshake_token.is_empty());
    assert_eq!(client.base_url(), second.uri());
    assert!(report.ping.is_none());

    let config = &report.config;
    assert_eq!(config.app.name, "MysticMovies");
    assert_eq!(config.telegram_bot_username, "mystic_bot");
    assert_eq!(config.notification_messages(), vec!["New releases every Friday"]);
    assert_eq!(config.update.prompt("1.4.0", 14), UpdatePrompt::Recommended);
    assert_eq!(config.handshake_expires_in, 3600);
}

#[tokio::test]
async fn test_dead_host_is_skipped() {
    let live = MockServer::start().await;
    mount_launch(&live, "tok-live", false).await;

    let client = client_for(&[DEAD_HOST.to_string(), live.uri()]);
    let report = LaunchSequence::new(client.clone()).run().await;

    assert!(report.is_ready());
    assert_eq!(report.attempted.len(), 2);
    assert_eq!(client.base_url(), live.uri());
}

#[tokio::test]
async fn test_bootstrap_failure_moves_to_next_host() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/app-api/handshake"))
        .respond_with(handshake_ok("tok-first"))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/bootstrap"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&first)
        .await;
    mount_launch(&second, "tok-second", false).await;

    let client = client_for(&[first.uri(), second.uri()]);
    let mut sequence = LaunchSequence::new(client.clone());
    let report = sequence.run().await;

    assert!(report.is_ready());
    assert_eq!(report.config.handshake_token, "tok-second");
    assert_eq!(
        sequence.history(),
        &[
            BootstrapState::Idle,
            BootstrapState::Handshaking,
            BootstrapState::Bootstrapping,
            BootstrapState::Handshaking,
            BootstrapState::Bootstrapping,
            BootstrapState::Ready,
        ]
    );
}

#[tokio::test]
async fn test_all_hosts_fail_leaves_runtime_untouched() {
    let first = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/app-api/handshake"))
        .respond_with(ok(serde_json::json!({ "handshake_token": "" })))
        .mount(&first)
        .await;

    let client = client_for(&[first.uri(), DEAD_HOST.to_string()]);
    let before = client.runtime().snapshot();
    let report = LaunchSequence::new(client.clone()).run().await;

    assert_eq!(report.state, BootstrapState::Failed);
    assert!(report.base.is_none());
    let error = report.error.expect("error");
    assert!(error.user_message().starts_with("Unable to load content."));
    assert_eq!(*client.runtime().snapshot(), *before);
    assert!(!client.runtime().snapshot().has_handshake());
}

#[tokio::test]
async fn test_ping_failure_is_swallowed() {
    let server = MockServer::start().await;
    mount_launch(&server, "tok-ping", true).await;
    Mock::given(method("POST"))
        .and(path("/app-api/ping"))
        .and(header("X-App-Handshake", "tok-ping"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let report = LaunchSequence::new(client).run().await;

    assert!(report.is_ready());
    let ping = report.ping.expect("ping task");
    assert!(ping.await.is_ok());
}

#[tokio::test]
async fn test_no_ping_without_keepalive() {
    let server = MockServer::start().await;
    mount_launch(&server, "tok", false).await;
    Mock::given(method("POST"))
        .and(path("/app-api/ping"))
        .respond_with(ok(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let report = LaunchSequence::new(client_for(&[server.uri()])).run().await;
    assert!(report.is_ready());
    assert!(report.ping.is_none());
}

#[test]
fn test_handshake_token_claims() {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let payload = URL_SAFE_NO_PAD.encode(br#"{"did":"test-device","plt":"android","ver":"1.4.0","b":14,"iat":100,"exp":200}"#);
    let token = format!("{}.signature", payload);

    let claims = HandshakeToken::claims(&token).unwrap();
    assert_eq!(claims.did, "test-device");
    assert_eq!(claims.b, 14);
    assert!(!HandshakeToken::is_expired(&token, 150));
    assert!(HandshakeToken::is_expired(&token, 201));
}
