//! Candidate-host iteration for regular API calls

mod common;

use common::{client_for, movie_detail, ok, DEAD_HOST};
use mystic_core::MysticError;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_not_found_short_circuits() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app-api/content/dune-2021"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(movie_detail("dune-2021")))
        .expect(0)
        .mount(&second)
        .await;

    let client = client_for(&[first.uri(), second.uri()]);
    let error = client.fetch_content_detail("dune-2021").await.unwrap_err();

    assert!(matches!(error, MysticError::NotDeployed { .. }));
    assert!(error.to_string().contains("not deployed"));
    assert!(error.user_message().contains("not deployed"));
    assert_eq!(client.base_url(), first.uri());
}

#[tokio::test]
async fn test_catalog_not_found_contacts_one_host() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    let third = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app-api/catalog"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&first)
        .await;
    for server in [&second, &third] {
        Mock::given(method("GET"))
            .respond_with(ok(json!({ "items": [] })))
            .expect(0)
            .mount(server)
            .await;
    }

    let client = client_for(&[first.uri(), second.uri(), third.uri()]);
    let error = client
        .fetch_catalog(&mystic_core::CatalogQuery::default())
        .await
        .unwrap_err();
    assert!(error.user_message().contains("not deployed"));
}

#[tokio::test]
async fn test_unauthorized_tries_next_host_and_sticks() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .respond_with(ok(json!({ "logged_in": false, "login_url": "/login" })))
        .expect(2)
        .mount(&second)
        .await;

    let client = client_for(&[first.uri(), second.uri()]);
    assert!(!client.is_logged_in().await.unwrap());
    assert_eq!(client.base_url(), second.uri());

    // The winner is now tried first
    assert!(!client.is_logged_in().await.unwrap());
}

#[tokio::test]
async fn test_logical_failure_tries_next_host() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app-api/content/dune-2021"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "warming up" })))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/content/dune-2021"))
        .respond_with(ok(movie_detail("dune-2021")))
        .expect(1)
        .mount(&second)
        .await;

    let client = client_for(&[first.uri(), second.uri()]);
    let detail = client.fetch_content_detail("dune-2021").await.unwrap();

    assert_eq!(detail.item.title, "Dune");
    assert_eq!(detail.movie_links().len(), 1);
    assert_eq!(detail.movie_links()[0].display_label(), "1080p • 1.5 GB");
}

#[tokio::test]
async fn test_non_json_body_tries_next_host() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .respond_with(ok(json!({ "logged_in": true, "user": { "name": "Ana", "phone": "+15550100" } })))
        .mount(&second)
        .await;

    let client = client_for(&[first.uri(), second.uri()]);
    let session = client.fetch_session().await.unwrap();
    assert!(session.logged_in);
    assert_eq!(session.user_name, "Ana");
}

#[tokio::test]
async fn test_every_host_failing_reports_last_error() {
    let first = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&first)
        .await;

    let client = client_for(&[first.uri(), DEAD_HOST.to_string()]);
    let error = client.fetch_session().await.unwrap_err();

    assert!(matches!(error, MysticError::Transport { .. }));
    assert_eq!(error.user_message(), "Unable to load content. network error");
    assert_eq!(client.base_url(), first.uri());
}

#[tokio::test]
async fn test_session_cookie_after_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .and(header("cookie", "user_phone=+15550100"))
        .respond_with(ok(json!({ "logged_in": true, "user": { "name": "Ana" } })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .respond_with(ok(json!({ "logged_in": false })))
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    assert!(!client.is_logged_in().await.unwrap());
    assert!(!client.is_logged_in().await.unwrap());

    client
        .complete_login("mysticmovies://auth?token=%2B15550100")
        .unwrap();
    assert!(client.is_logged_in().await.unwrap());
    assert!(client.is_logged_in().await.unwrap());

    client.logout();
    assert!(!client.is_logged_in().await.unwrap());
}

#[tokio::test]
async fn test_server_cookies_survive_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app-api/session"))
        .respond_with(ok(json!({ "logged_in": false })).append_header("set-cookie", "srv=keep; Path=/"))
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    client.is_logged_in().await.unwrap();
    client.complete_login("mysticmovies://auth?token=abc").unwrap();
    client.is_logged_in().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let cookie = requests[1]
        .headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.contains("srv=keep"), "cookie header was {:?}", cookie);
    assert!(cookie.contains("user_phone=abc"), "cookie header was {:?}", cookie);
}

#[tokio::test]
async fn test_catalog_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app-api/catalog"))
        .and(wiremock::matchers::query_param("filter", "series"))
        .and(wiremock::matchers::query_param("per_page", "60"))
        .respond_with(ok(json!({
            "items": [
                { "id": "s1", "slug": "dark", "title": "Dark", "type": "series", "season_text": "3 Seasons" },
                { "title": "no identity" }
            ],
            "pagination": { "page": 1, "per_page": 60, "total_items": 1, "total_pages": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let query = mystic_core::CatalogQuery {
        filter: mystic_core::api::CatalogFilter::Series,
        per_page: 500,
        ..Default::default()
    };
    let page = client.fetch_catalog(&query).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].badge_text(), "3 Seasons");
}
