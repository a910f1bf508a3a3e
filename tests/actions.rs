//! Action resolution and the Telegram start exchange

mod common;

use common::{client_for, ok};
use mystic_core::api::QualityLink;
use mystic_core::{ActionKind, MysticError, ResolvedAction};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn telegram_link() -> QualityLink {
    QualityLink {
        label: "720p".to_string(),
        telegram_url: "https://mysticmovies.site/t/share-720".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_telegram_exchange_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app-api/telegram-start/share-720"))
        .respond_with(ok(json!({ "deep_link": "tg://resolve?domain=mystic_bot&start=share-720" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let action = client
        .resolve_action(&telegram_link(), ActionKind::Telegram, "Dune")
        .unwrap();
    assert_eq!(
        action,
        ResolvedAction::TelegramExchange {
            start_url: format!("{}/app-api/telegram-start/share-720", server.uri()),
        }
    );

    let deep_link = client.telegram_deep_link(&telegram_link()).await.unwrap();
    assert_eq!(deep_link, "tg://resolve?domain=mystic_bot&start=share-720");
}

#[tokio::test]
async fn test_telegram_exchange_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app-api/telegram-start/share-720"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let error = client.telegram_deep_link(&telegram_link()).await.unwrap_err();

    assert!(matches!(error, MysticError::ExchangeFailed { .. }));
    assert!(error.is_user_facing());
    assert_eq!(error.user_message(), "Could not open Telegram. Please try again.");
}

#[tokio::test]
async fn test_telegram_exchange_without_deep_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app-api/telegram-start/share-720"))
        .respond_with(ok(json!({ "deep_link": "  " })))
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let error = client.telegram_deep_link(&telegram_link()).await.unwrap_err();
    assert!(matches!(error, MysticError::ExchangeFailed { .. }));
}

#[tokio::test]
async fn test_direct_deep_link_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&[server.uri()]);
    let link = QualityLink {
        telegram_deep_link: "tg://resolve?domain=mystic_bot&start=x".to_string(),
        telegram_url: "https://mysticmovies.site/t/ignored".to_string(),
        ..Default::default()
    };
    let deep_link = client.telegram_deep_link(&link).await.unwrap();
    assert_eq!(deep_link, "tg://resolve?domain=mystic_bot&start=x");
}

#[tokio::test]
async fn test_relative_urls_resolve_against_host() {
    let server = MockServer::start().await;
    let client = client_for(&[server.uri()]);
    let link = QualityLink {
        label: "1080p".to_string(),
        stream_url: "/stream/m1/1080".to_string(),
        download_url: "/download/m1/1080".to_string(),
        ..Default::default()
    };

    let watch = client.resolve_action(&link, ActionKind::Watch, "Dune").unwrap();
    assert_eq!(
        watch,
        ResolvedAction::Watch {
            url: format!("{}/stream/m1/1080", server.uri()),
        }
    );

    match client.resolve_action(&link, ActionKind::Download, "Dune: Part Two").unwrap() {
        ResolvedAction::Download { url, filename } => {
            assert_eq!(url, format!("{}/download/m1/1080", server.uri()));
            assert!(filename.starts_with("Dune_Part_Two_1080p_"));
            assert!(filename.ends_with(".mp4"));
        }
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(
        client.resolve_action(&link, ActionKind::WatchTogether, "Dune").unwrap(),
        ResolvedAction::NoOp
    );
    assert!(matches!(
        client.resolve_action(&link, ActionKind::Telegram, "Dune"),
        Err(MysticError::NotAvailable { .. })
    ));
}
