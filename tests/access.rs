//! Access gating on a detail screen against a mock backend

mod common;

use common::{client_for, movie_detail, ok};
use mystic_core::access::AccessEffect;
use mystic_core::{AccessController, AccessState, LinkGate, ScreenScope};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer};

async fn mount_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .and(header("cookie", "user_phone=abc"))
        .respond_with(ok(json!({ "logged_in": true, "user": { "name": "Ana" } })))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .respond_with(ok(json!({ "logged_in": false })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_round_trip_authenticates_once_without_refetch() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/app-api/content/dune-2021"))
        .respond_with(ok(movie_detail("dune-2021")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let mut screen = AccessController::new(client.clone(), "dune-2021", ScreenScope::new());

    screen.enter().await;
    assert_eq!(screen.state(), AccessState::Anonymous);
    assert_eq!(screen.gate(), LinkGate::LoginPrompt);
    assert_eq!(screen.content().map(|d| d.item.title.as_str()), Some("Dune"));

    assert_eq!(screen.request_login().await, vec![AccessEffect::OpenLogin]);
    let login_url = client.login_url("/content/dune-2021");
    assert!(login_url.starts_with(&format!("{}/login?next=", server.uri())));

    client.complete_login("mysticmovies://auth?token=abc").unwrap();
    let ui = screen.login_callback().await;
    assert_eq!(ui, vec![AccessEffect::Render(LinkGate::Actions)]);

    // The app resumes after the browser closes; the re-check already happened
    assert!(screen.resume().await.is_empty());

    let authenticated = screen
        .machine()
        .history()
        .iter()
        .filter(|s| **s == AccessState::Authenticated)
        .count();
    assert_eq!(authenticated, 1);
}

#[tokio::test]
async fn test_resume_rechecks_when_callback_never_arrives() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/app-api/content/dune-2021"))
        .respond_with(ok(movie_detail("dune-2021")))
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let mut screen = AccessController::new(client.clone(), "dune-2021", ScreenScope::new());
    screen.enter().await;
    screen.request_login().await;

    // Login finished in the web shell, which installed the cookie itself
    client.set_session_token(Some("abc".to_string()));
    screen.resume().await;
    assert_eq!(screen.state(), AccessState::Authenticated);

    client.logout();
    assert!(screen.resume().await.is_empty());
    assert_eq!(screen.state(), AccessState::Authenticated);
}

#[tokio::test]
async fn test_content_failure_still_resolves_session() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/app-api/content/gone"))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let mut screen = AccessController::new(client, "gone", ScreenScope::new());
    screen.enter().await;

    assert!(screen.content().is_none());
    assert_eq!(screen.state(), AccessState::Anonymous);
    assert_eq!(
        screen.error_message().as_deref(),
        Some("Unable to load content. server error")
    );
}
