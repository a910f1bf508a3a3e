//! Shared fixtures for the mock-server integration tests

#![allow(dead_code)]

use mystic_core::{AppConfig, MysticClient};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens here; connects fail immediately
pub const DEAD_HOST: &str = "http://127.0.0.1:1";

/// Client whose first host is `hosts[0]` and fallbacks the rest
pub fn client_for(hosts: &[String]) -> MysticClient {
    let (first, rest) = hosts.split_first().expect("at least one host");
    let config = AppConfig::builder()
        .default_base_url(first.clone())
        .fallback_base_urls(rest.to_vec())
        .timeout(Duration::from_secs(5))
        .connect_timeout(Duration::from_secs(2))
        .device_id("test-device")
        .app_version("1.4.0")
        .build_number(14)
        .build();
    MysticClient::new(config).expect("client")
}

pub fn ok(body: Value) -> ResponseTemplate {
    let mut body = body;
    body["ok"] = Value::Bool(true);
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn handshake_ok(token: &str) -> ResponseTemplate {
    ok(json!({ "handshake_token": token, "expires_in": 3600 }))
}

pub fn bootstrap_body(keepalive: bool) -> Value {
    json!({
        "app": {
            "name": "MysticMovies",
            "maintenance_mode": false,
            "keepalive_on_launch": keepalive,
            "splash_image_url": "/static/splash.png",
        },
        "update": { "latest_version": "1.5.0", "latest_build": 15, "recommend": true },
        "notifications": [
            { "id": "n1", "title": "Welcome", "message": "New releases every Friday" }
        ],
        "telegram": { "bot_username": "@mystic_bot" }
    })
}

/// Handshake and bootstrap both succeed on `server`
pub async fn mount_launch(server: &MockServer, token: &str, keepalive: bool) {
    Mock::given(method("POST"))
        .and(path("/app-api/handshake"))
        .respond_with(handshake_ok(token))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app-api/bootstrap"))
        .respond_with(ok(bootstrap_body(keepalive)))
        .mount(server)
        .await;
}

pub fn movie_detail(slug: &str) -> Value {
    json!({
        "item": { "id": "m1", "slug": slug, "title": "Dune", "type": "movie", "year": "2021" },
        "movie_links": [
            {
                "label": "1080p",
                "size": 1610612736u64,
                "stream_url": "/stream/m1/1080",
                "download_url": "/download/m1/1080",
                "telegram_url": "https://mysticmovies.site/t/share-1080"
            }
        ]
    })
}
