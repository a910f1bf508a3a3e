// MysticMovies Mobile Core
// Copyright (C) 2025 MysticMovies contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! C FFI bridge - exposes the core to the iOS app (and, through
//! `jni_bridge`, to Android)
//!
//! # Architecture
//! Swift → C FFI → Rust. Kotlin → JNI → the same `handle_*` functions.
//!
//! # Design
//! 1. **JSON in, JSON out**: every function takes one JSON parameter object
//! 2. **No panics**: panics are caught and turned into error responses
//! 3. **Blocking**: async operations run to completion on a shared Tokio runtime
//! 4. **One client**: `mystic_init` builds the process-wide [`MysticClient`];
//!    every other call uses it
//! 5. **Screens**: each open detail/season/episode screen owns an
//!    [`AccessController`] opened with `mystic_access_open` and released with
//!    `mystic_access_close`; link actions resolve through that screen's gate
//!
//! # Response Format
//! ```json
//! { "success": true, "data": { ... } }
//! ```
//! Or on error:
//! ```json
//! { "success": false, "error": "HTTP 503", "user_message": "Unable to load content. HTTP 503" }
//! ```
//!
//! # Memory Management
//! Every returned pointer MUST be released with `mystic_free_string()`.
//!
//! ```swift
//! let ptr = mystic_fetch_content("{\"key\":\"dune-2021\"}")
//! defer { mystic_free_string(ptr) }
//! let json = String(cString: ptr)
//! ```

use crate::access::{AccessController, AccessEffect, ScreenScope};
use crate::actions::{ActionKind, ResolvedAction};
use crate::api::models::QualityLink;
use crate::api::{CatalogQuery, LaunchSequence, MysticClient, RequestType, RuntimeConfigHandle};
use crate::config::AppConfig;
use crate::error::{MysticError, Result};
use crate::storage::{queries, Database, PlaybackProgress};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

lazy_static::lazy_static! {
    static ref RUNTIME: tokio::runtime::Runtime =
        tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    static ref CORE: RwLock<Option<Core>> = RwLock::new(None);

    static ref SCREENS: Mutex<HashMap<String, Screen>> = Mutex::new(HashMap::new());
}

/// Process-wide state behind the bridges
#[derive(Clone)]
struct Core {
    client: MysticClient,
    database: Option<Database>,
}

fn core() -> Result<Core> {
    let guard = CORE
        .read()
        .map_err(|_| MysticError::internal("Core state lock poisoned"))?;
    guard
        .clone()
        .ok_or_else(|| MysticError::InvalidState("Core not initialised; call init first".to_string()))
}

/// One open content screen on the app side
///
/// The scope is kept outside the controller lock so closing a screen cancels
/// a fetch that is still holding it.
#[derive(Clone)]
struct Screen {
    controller: Arc<tokio::sync::Mutex<AccessController<MysticClient>>>,
    scope: ScreenScope,
}

fn screens() -> Result<std::sync::MutexGuard<'static, HashMap<String, Screen>>> {
    SCREENS
        .lock()
        .map_err(|_| MysticError::internal("Screen registry lock poisoned"))
}

fn screen(screen_id: &str) -> Result<Screen> {
    screens()?
        .get(screen_id)
        .cloned()
        .ok_or_else(|| MysticError::InvalidState(format!("Unknown screen: {}", screen_id)))
}

fn screen_json(
    screen_id: &str,
    controller: &AccessController<MysticClient>,
    effects: &[AccessEffect],
) -> serde_json::Value {
    json!({
        "screen_id": screen_id,
        "key": controller.key(),
        "state": controller.state(),
        "gate": controller.gate(),
        "effects": effects,
        "content": controller.content(),
        "user_message": controller.error_message(),
    })
}

fn database(core: &Core) -> Result<&Database> {
    core.database
        .as_ref()
        .ok_or_else(|| MysticError::InvalidState("No database configured".to_string()))
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn parse_params<T: DeserializeOwned>(params_json: &str) -> Result<T> {
    let raw = if params_json.trim().is_empty() { "{}" } else { params_json };
    serde_json::from_str(raw).map_err(|e| MysticError::invalid_input(format!("Invalid JSON: {}", e)))
}

/// Convert Rust result to JSON response string
pub(crate) fn result_to_json<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(data) => json!({
            "success": true,
            "data": data
        })
        .to_string(),
        Err(e) => json!({
            "success": false,
            "error": e.to_string(),
            "user_message": e.user_message(),
        })
        .to_string(),
    }
}

/// Run an operation and wrap its result in the response envelope
fn respond<T, F>(f: F) -> String
where
    T: Serialize,
    F: FnOnce() -> Result<T>,
{
    result_to_json(f())
}

/// Create error response JSON
pub(crate) fn error_response(error: &str) -> String {
    json!({
        "success": false,
        "error": error
    })
    .to_string()
}

/// Run `f`, turning a panic into an error response
pub(crate) fn catch_panic<F>(f: F) -> String
where
    F: FnOnce() -> String,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic_err) => {
            let panic_msg = if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic occurred".to_string()
            };
            error_response(&format!("Rust panic: {}", panic_msg))
        }
    }
}

/// Read a C string argument
fn c_str_to_string(ptr: *const c_char) -> Result<String> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    // SAFETY: caller passes a valid null-terminated string or null
    unsafe {
        CStr::from_ptr(ptr)
            .to_str()
            .map(|s| s.to_string())
            .map_err(|e| MysticError::invalid_input(format!("Invalid UTF-8: {}", e)))
    }
}

/// Hand a string to the caller; release with `mystic_free_string()`
fn string_to_c_str(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => CString::new(error_response("String contains null bytes"))
            .map(CString::into_raw)
            .unwrap_or(std::ptr::null_mut()),
    }
}

fn call_c(params: *const c_char, handler: fn(&str) -> String) -> *mut c_char {
    let response = catch_panic(|| match c_str_to_string(params) {
        Ok(params) => handler(&params),
        Err(e) => result_to_json::<()>(Err(e)),
    });
    string_to_c_str(response)
}

// ============================================================================
// OPERATIONS (shared with the JNI bridge)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InitParams {
    /// Same shape as the config file; omitted fields keep their defaults
    config: Option<serde_json::Value>,
    db_path: Option<String>,
    session_token: Option<String>,
    verbose: bool,
}

/// Build the process-wide client; re-initialising replaces it
pub(crate) fn handle_init(params_json: &str) -> String {
    respond(|| {
        let params: InitParams = parse_params(params_json)?;
        crate::logging::init(params.verbose);

        let config = match &params.config {
            Some(value) => AppConfig::from_json_str(&value.to_string())?,
            None => AppConfig::default(),
        };

        let (client, database) = RUNTIME.block_on(async {
            let database = match params.db_path.as_deref() {
                Some(path) if !path.trim().is_empty() => Some(Database::new(path).await?),
                _ => None,
            };

            // Last known branding paints the first screen before launch finishes
            let client = match &database {
                Some(db) => match queries::load_runtime_config(db.pool()).await? {
                    Some(saved) => MysticClient::with_runtime(config, RuntimeConfigHandle::new(saved))?,
                    None => MysticClient::new(config)?,
                },
                None => MysticClient::new(config)?,
            };
            Ok::<_, MysticError>((client, database))
        })?;

        if let Some(token) = params.session_token {
            client.set_session_token(Some(token));
        }

        let data = json!({
            "device_id": client.device_id(),
            "base_url": client.base_url(),
            "logged_in_locally": client.has_session_token(),
        });

        let mut guard = CORE
            .write()
            .map_err(|_| MysticError::internal("Core state lock poisoned"))?;
        *guard = Some(Core { client, database });
        info!("Core initialised");
        Ok(data)
    })
}

/// Handshake, bootstrap and keepalive ping; persists the new runtime record
pub(crate) fn handle_launch(_params_json: &str) -> String {
    respond(|| {
        let core = core()?;
        RUNTIME.block_on(async {
            let mut sequence = LaunchSequence::new(core.client.clone());
            let report = sequence.run().await;

            if report.is_ready() {
                if let Some(db) = &core.database {
                    if let Err(e) = queries::save_runtime_config(db.pool(), &report.config).await {
                        warn!(error = %e, "Failed to persist runtime config");
                    }
                }
            }

            Ok::<_, MysticError>(json!({
                "state": report.state,
                "base": report.base,
                "attempted": report.attempted,
                "error": report.error.as_ref().map(|e| e.to_string()),
                "user_message": report.error.as_ref().map(MysticError::user_message),
                "config": report.config.without_credentials(),
                "notifications": report.config.notification_messages(),
                "update_prompt": report.config.update.prompt(&core.client.config().app_version, core.client.config().build_number),
            }))
        })
    })
}

pub(crate) fn handle_fetch_catalog(params_json: &str) -> String {
    respond(|| {
        let query: CatalogQuery = parse_params(params_json)?;
        let core = core()?;
        RUNTIME.block_on(core.client.fetch_catalog(&query))
    })
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default)]
    limit: u32,
}

pub(crate) fn handle_search(params_json: &str) -> String {
    respond(|| {
        let params: SearchParams = parse_params(params_json)?;
        let core = core()?;
        RUNTIME.block_on(core.client.search_suggestions(&params.query, params.limit))
    })
}

#[derive(Debug, Deserialize)]
struct KeyParams {
    key: String,
}

pub(crate) fn handle_fetch_content(params_json: &str) -> String {
    respond(|| {
        let params: KeyParams = parse_params(params_json)?;
        let core = core()?;
        RUNTIME.block_on(core.client.fetch_content_detail(&params.key))
    })
}

pub(crate) fn handle_fetch_session(_params_json: &str) -> String {
    respond(|| {
        let core = core()?;
        RUNTIME.block_on(core.client.fetch_session())
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginUrlParams {
    return_path: String,
}

pub(crate) fn handle_login_url(params_json: &str) -> String {
    respond(|| {
        let params: LoginUrlParams = parse_params(params_json)?;
        let core = core()?;
        Ok(json!({ "url": core.client.login_url(&params.return_path) }))
    })
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    callback_url: String,
}

/// Install the callback credential and report the fresh session state
pub(crate) fn handle_complete_login(params_json: &str) -> String {
    respond(|| {
        let params: CallbackParams = parse_params(params_json)?;
        let core = core()?;
        core.client.complete_login(&params.callback_url)?;
        RUNTIME.block_on(core.client.fetch_session())
    })
}

pub(crate) fn handle_logout(_params_json: &str) -> String {
    respond(|| {
        let core = core()?;
        core.client.logout();
        Ok(json!({ "logged_out": true }))
    })
}

pub(crate) fn handle_fetch_profile(_params_json: &str) -> String {
    respond(|| {
        let core = core()?;
        RUNTIME.block_on(core.client.fetch_profile())
    })
}

#[derive(Debug, Deserialize)]
struct RequestContentParams {
    title: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    request_type: String,
}

pub(crate) fn handle_request_content(params_json: &str) -> String {
    respond(|| {
        let params: RequestContentParams = parse_params(params_json)?;
        let core = core()?;
        RUNTIME.block_on(core.client.request_content(
            &params.title,
            &params.note,
            RequestType::parse(&params.request_type),
        ))
    })
}

#[derive(Debug, Deserialize)]
struct ResolveParams {
    /// Screen the link row belongs to; its access gate must be open
    screen_id: String,
    link: QualityLink,
    action: String,
    #[serde(default)]
    title: String,
    /// Run the Telegram start exchange instead of returning it
    #[serde(default)]
    exchange: bool,
}

pub(crate) fn handle_resolve_action(params_json: &str) -> String {
    respond(|| {
        let params: ResolveParams = parse_params(params_json)?;
        let kind = ActionKind::parse(&params.action)
            .ok_or_else(|| MysticError::invalid_input(format!("Unknown action: {}", params.action)))?;
        let screen = screen(&params.screen_id)?;
        RUNTIME.block_on(async { screen.controller.lock().await.authorize() })?;
        let core = core()?;

        match core.client.resolve_action(&params.link, kind, &params.title)? {
            ResolvedAction::TelegramExchange { start_url } if params.exchange => {
                let deep_link = RUNTIME.block_on(core.client.exchange_telegram(&start_url))?;
                Ok(ResolvedAction::OpenTelegram { deep_link })
            }
            action => Ok(action),
        }
    })
}

#[derive(Debug, Deserialize)]
struct OpenScreenParams {
    /// Reuse an id chosen by the app; generated when absent
    #[serde(default)]
    screen_id: Option<String>,
    key: String,
}

/// Open a content screen: fetch the detail and resolve the session
pub(crate) fn handle_access_open(params_json: &str) -> String {
    respond(|| {
        let params: OpenScreenParams = parse_params(params_json)?;
        let key = params.key.trim().to_string();
        if key.is_empty() {
            return Err(MysticError::invalid_input("key is required"));
        }
        let core = core()?;

        let screen_id = params
            .screen_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let scope = ScreenScope::new();
        let screen = Screen {
            controller: Arc::new(tokio::sync::Mutex::new(AccessController::new(
                core.client.clone(),
                key,
                scope.clone(),
            ))),
            scope,
        };
        if let Some(previous) = screens()?.insert(screen_id.clone(), screen.clone()) {
            previous.scope.close();
        }
        debug!(%screen_id, "Screen opened");

        RUNTIME.block_on(async {
            let mut controller = screen.controller.lock().await;
            let effects = controller.enter().await;
            Ok::<_, MysticError>(screen_json(&screen_id, &controller, &effects))
        })
    })
}

#[derive(Debug, Deserialize)]
struct ScreenParams {
    screen_id: String,
}

/// User tapped the login prompt; carries the login URL when it should open
pub(crate) fn handle_access_request_login(params_json: &str) -> String {
    respond(|| {
        let params: ScreenParams = parse_params(params_json)?;
        let screen = screen(&params.screen_id)?;
        let core = core()?;

        RUNTIME.block_on(async {
            let mut controller = screen.controller.lock().await;
            let effects = controller.request_login().await;
            let mut data = screen_json(&params.screen_id, &controller, &effects);
            if effects.contains(&AccessEffect::OpenLogin) {
                let return_path = controller
                    .content()
                    .map(|detail| detail.detail_path.as_str())
                    .filter(|path| path.starts_with('/'))
                    .unwrap_or("/");
                data["login_url"] = json!(core.client.login_url(return_path));
            }
            Ok::<_, MysticError>(data)
        })
    })
}

#[derive(Debug, Deserialize)]
struct ScreenCallbackParams {
    screen_id: String,
    callback_url: String,
}

/// Login deep link arrived while this screen was waiting for it
pub(crate) fn handle_access_login_callback(params_json: &str) -> String {
    respond(|| {
        let params: ScreenCallbackParams = parse_params(params_json)?;
        let screen = screen(&params.screen_id)?;
        let core = core()?;
        core.client.complete_login(&params.callback_url)?;

        RUNTIME.block_on(async {
            let mut controller = screen.controller.lock().await;
            let effects = controller.login_callback().await;
            Ok::<_, MysticError>(screen_json(&params.screen_id, &controller, &effects))
        })
    })
}

/// Screen came back to the foreground
pub(crate) fn handle_access_resume(params_json: &str) -> String {
    respond(|| {
        let params: ScreenParams = parse_params(params_json)?;
        let screen = screen(&params.screen_id)?;

        RUNTIME.block_on(async {
            let mut controller = screen.controller.lock().await;
            let effects = controller.resume().await;
            Ok::<_, MysticError>(screen_json(&params.screen_id, &controller, &effects))
        })
    })
}

/// Screen torn down; in-flight work for it is cancelled
pub(crate) fn handle_access_close(params_json: &str) -> String {
    respond(|| {
        let params: ScreenParams = parse_params(params_json)?;
        let removed = screens()?.remove(&params.screen_id);
        if let Some(screen) = &removed {
            screen.scope.close();
            debug!(screen_id = %params.screen_id, "Screen closed");
        }
        Ok(json!({ "closed": removed.is_some() }))
    })
}

#[derive(Debug, Deserialize)]
struct ProgressParams {
    item_id: String,
    #[serde(default)]
    title: String,
    position: f64,
    duration: f64,
}

pub(crate) fn handle_save_progress(params_json: &str) -> String {
    respond(|| {
        let params: ProgressParams = parse_params(params_json)?;
        if params.item_id.trim().is_empty() {
            return Err(MysticError::invalid_input("item_id is required"));
        }
        let core = core()?;
        let db = database(&core)?;
        let progress = PlaybackProgress::new(params.item_id.trim(), params.title, params.position, params.duration);
        RUNTIME.block_on(queries::save_progress(db.pool(), &progress))?;
        Ok(progress)
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    limit: Option<u32>,
}

pub(crate) fn handle_continue_watching(params_json: &str) -> String {
    respond(|| {
        let params: ListParams = parse_params(params_json)?;
        let core = core()?;
        let db = database(&core)?;
        RUNTIME.block_on(queries::list_continue_watching(db.pool(), params.limit.unwrap_or(20)))
    })
}

// ============================================================================
// C ABI
// ============================================================================

/// `{ "config": {...}?, "db_path": "..."?, "session_token": "..."?, "verbose": bool }`
#[no_mangle]
pub extern "C" fn mystic_init(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_init)
}

/// `{}` → `{ state, base, attempted, error, user_message, config, notifications, update_prompt }`
#[no_mangle]
pub extern "C" fn mystic_launch(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_launch)
}

/// `{ filter, sort, page, per_page, query }` → `CatalogPage`
#[no_mangle]
pub extern "C" fn mystic_fetch_catalog(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_fetch_catalog)
}

/// `{ query, limit }` → `SearchSuggestions`
#[no_mangle]
pub extern "C" fn mystic_search_suggestions(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_search)
}

/// `{ key }` → `ContentDetail`
#[no_mangle]
pub extern "C" fn mystic_fetch_content(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_fetch_content)
}

/// `{}` → `SessionInfo`
#[no_mangle]
pub extern "C" fn mystic_fetch_session(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_fetch_session)
}

/// `{ return_path }` → `{ url }`
#[no_mangle]
pub extern "C" fn mystic_login_url(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_login_url)
}

/// `{ callback_url }` → `SessionInfo`
#[no_mangle]
pub extern "C" fn mystic_complete_login(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_complete_login)
}

#[no_mangle]
pub extern "C" fn mystic_logout(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_logout)
}

/// `{}` → `Profile`
#[no_mangle]
pub extern "C" fn mystic_fetch_profile(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_fetch_profile)
}

/// `{ title, note, request_type }` → `RequestReceipt`
#[no_mangle]
pub extern "C" fn mystic_request_content(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_request_content)
}

/// `{ screen_id?, key }` → `{ screen_id, key, state, gate, effects, content, user_message }`
#[no_mangle]
pub extern "C" fn mystic_access_open(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_access_open)
}

/// `{ screen_id }` → screen state, plus `login_url` when login should open
#[no_mangle]
pub extern "C" fn mystic_access_request_login(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_access_request_login)
}

/// `{ screen_id, callback_url }` → screen state
#[no_mangle]
pub extern "C" fn mystic_access_login_callback(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_access_login_callback)
}

/// `{ screen_id }` → screen state
#[no_mangle]
pub extern "C" fn mystic_access_resume(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_access_resume)
}

/// `{ screen_id }` → `{ closed }`
#[no_mangle]
pub extern "C" fn mystic_access_close(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_access_close)
}

/// `{ screen_id, link, action, title, exchange }` → `ResolvedAction`
#[no_mangle]
pub extern "C" fn mystic_resolve_action(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_resolve_action)
}

/// `{ item_id, title, position, duration }` → `PlaybackProgress`
#[no_mangle]
pub extern "C" fn mystic_save_progress(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_save_progress)
}

/// `{ limit }` → `[PlaybackProgress]`
#[no_mangle]
pub extern "C" fn mystic_continue_watching(params_json: *const c_char) -> *mut c_char {
    call_c(params_json, handle_continue_watching)
}

/// Release a string returned by any `mystic_*` function
///
/// # Safety
/// `ptr` must come from this library and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn mystic_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
