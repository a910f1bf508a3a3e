//! Screen access through the C ABI, as the iOS app drives it

mod common;

use common::{movie_detail, ok};
use mystic_core::api::models::QualityLink;
use mystic_core::ffi::{
    mystic_access_close, mystic_access_login_callback, mystic_access_open,
    mystic_access_request_login, mystic_free_string, mystic_init, mystic_resolve_action,
};
use serde_json::{json, Value};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer};

fn call(f: extern "C" fn(*const c_char) -> *mut c_char, params: Value) -> Value {
    let params = CString::new(params.to_string()).unwrap();
    let ptr = f(params.as_ptr());
    assert!(!ptr.is_null());
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    unsafe { mystic_free_string(ptr) };
    serde_json::from_str(&text).unwrap()
}

fn watch_link() -> Value {
    serde_json::to_value(QualityLink {
        label: "1080p".to_string(),
        stream_url: "/stream/m1/1080".to_string(),
        ..Default::default()
    })
    .unwrap()
}

// The bridge blocks on its own runtime, so this test must not run inside one
#[test]
fn test_screen_gates_actions_until_login() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app-api/session"))
            .and(header("cookie", "user_phone=abc"))
            .respond_with(ok(json!({ "logged_in": true })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app-api/session"))
            .respond_with(ok(json!({ "logged_in": false })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app-api/content/dune-2021"))
            .respond_with(ok(movie_detail("dune-2021")))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let init = call(
        mystic_init,
        json!({ "config": { "default_base_url": server.uri(), "fallback_base_urls": [] } }),
    );
    assert_eq!(init["success"], true, "{}", init);

    let opened = call(mystic_access_open, json!({ "screen_id": "detail-1", "key": "dune-2021" }));
    assert_eq!(opened["success"], true, "{}", opened);
    assert_eq!(opened["data"]["state"], "anonymous");
    assert_eq!(opened["data"]["gate"], "login_prompt");
    assert_eq!(opened["data"]["content"]["item"]["title"], "Dune");

    let refused = call(
        mystic_resolve_action,
        json!({ "screen_id": "detail-1", "link": watch_link(), "action": "watch" }),
    );
    assert_eq!(refused["success"], false);
    assert_eq!(refused["error"], "Login required");
    assert_eq!(refused["user_message"], "Log in to use this link.");

    let login = call(mystic_access_request_login, json!({ "screen_id": "detail-1" }));
    assert_eq!(login["data"]["effects"], json!(["open_login"]));
    assert!(login["data"]["login_url"]
        .as_str()
        .unwrap()
        .starts_with(&format!("{}/login?next=", server.uri())));

    let back = call(
        mystic_access_login_callback,
        json!({ "screen_id": "detail-1", "callback_url": "mysticmovies://auth?token=abc" }),
    );
    assert_eq!(back["data"]["state"], "authenticated");
    assert_eq!(back["data"]["gate"], "actions");

    let resolved = call(
        mystic_resolve_action,
        json!({ "screen_id": "detail-1", "link": watch_link(), "action": "watch" }),
    );
    assert_eq!(resolved["success"], true, "{}", resolved);

    let closed = call(mystic_access_close, json!({ "screen_id": "detail-1" }));
    assert_eq!(closed["data"]["closed"], true);
    let gone = call(
        mystic_resolve_action,
        json!({ "screen_id": "detail-1", "link": watch_link(), "action": "watch" }),
    );
    assert_eq!(gone["success"], false);

    rt.block_on(server.verify());
}
