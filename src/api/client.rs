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


//! HTTP client for the MysticMovies app API
//!
//! `MysticClient` wraps `reqwest::Client` and owns the two pieces of state
//! every request needs: the static [`AppConfig`] and the shared
//! [`RuntimeConfigHandle`]. It provides:
//! - the host-failover request path used by every read ([`MysticClient::get_json`])
//! - single-host requests for the launch handshake ([`MysticClient::request_at`])
//! - absolute-URL requests for secondary exchanges ([`MysticClient::get_absolute`])
//! - the session credential, sent as a cookie next to the ones the server set
//!
//! # Request path
//!
//! ```text
//! candidates() ─► run_candidates ─► attempt(base) ─► classify_status ─► check_envelope
//!                       │                                                     │
//!                       └──────────── winner becomes the sticky host ◄────────┘
//! ```
//!
//! The client never retries a host; resilience comes from trying the next
//! candidate. Timeouts are the transport's own connect/read timeouts.

use crate::api::candidates::candidates;
use crate::api::failover::{check_envelope, classify_status, run_candidates, Outcome};
use crate::api::runtime::{RuntimeConfig, RuntimeConfigHandle};
use crate::api::url::absolute_url;
use crate::config::AppConfig;
use crate::error::{MysticError, Result};
use crate::logging::mask_token;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info};

/// Header carrying the per-launch handshake token
pub const HANDSHAKE_HEADER: &str = "X-App-Handshake";

/// Header carrying the install's device id
pub const DEVICE_ID_HEADER: &str = "X-App-Device-Id";

/// Client for the app API
///
/// Cheap to clone; clones share the connection pool, the runtime record and
/// the session credential.
#[derive(Debug, Clone)]
pub struct MysticClient {
    http: Client,
    config: Arc<AppConfig>,
    runtime: RuntimeConfigHandle,
    device_id: String,
    session_token: Arc<RwLock<Option<String>>>,
    cookies: Option<Arc<Jar>>,
}

impl MysticClient {
    /// Create a client with a fresh runtime record around the default host
    pub fn new(config: AppConfig) -> Result<Self> {
        let runtime = RuntimeConfigHandle::new(RuntimeConfig::new(&config.default_base_url));
        Self::with_runtime(config, runtime)
    }

    /// Create a client around an existing runtime record
    ///
    /// Used when the record was seeded from storage or is shared with other
    /// components.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built or a configured
    /// header value is invalid.
    pub fn with_runtime(config: AppConfig, runtime: RuntimeConfigHandle) -> Result<Self> {
        let device_id = config.device_id_or_generate();

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| MysticError::invalid_input(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_bytes(DEVICE_ID_HEADER.as_bytes())
                .map_err(|e| MysticError::internal(format!("Invalid header name: {}", e)))?,
            HeaderValue::from_str(&device_id)
                .map_err(|e| MysticError::invalid_input(format!("Invalid device id: {}", e)))?,
        );

        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90));

        let cookies = config.enable_cookies.then(|| Arc::new(Jar::default()));
        if let Some(jar) = &cookies {
            client_builder = client_builder.cookie_provider(Arc::clone(jar));
        }

        let http = client_builder.build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
            runtime,
            device_id,
            session_token: Arc::new(RwLock::new(None)),
            cookies,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared runtime record
    pub fn runtime(&self) -> &RuntimeConfigHandle {
        &self.runtime
    }

    /// Device id sent with the handshake and every request
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Current sticky API host
    pub fn base_url(&self) -> String {
        self.runtime.api_base_url()
    }

    /// Resolve a server path against the current host
    pub fn absolute_url(&self, path_or_url: &str) -> String {
        absolute_url(&self.base_url(), path_or_url)
    }

    /// Ordered hosts for the next request
    pub fn candidates(&self) -> Vec<String> {
        candidates(&self.runtime.snapshot(), &self.config)
    }

    // ------------------------------------------------------------------------
    // Session credential
    // ------------------------------------------------------------------------

    /// Install (or clear with `None`) the credential from the login callback
    pub fn set_session_token(&self, token: Option<String>) {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        match &token {
            Some(t) => info!(token = %mask_token(t), "Session credential installed"),
            None => info!("Session credential cleared"),
        }
        let mut guard = self.session_token.write().unwrap_or_else(|p| p.into_inner());
        *guard = token;
    }

    pub fn session_token(&self) -> Option<String> {
        self.session_token
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn has_session_token(&self) -> bool {
        self.session_token().is_some()
    }

    fn session_cookie(&self) -> Option<String> {
        self.session_token()
            .map(|token| format!("{}={}", self.config.session_cookie_name, token))
    }

    /// Cookie header for `url` while a session credential is installed
    ///
    /// reqwest leaves the jar out of any request that already carries a
    /// `Cookie` header, so the jar's pairs for `url` are merged in here. A
    /// server-set cookie with the credential's name is replaced.
    fn cookie_header(&self, url: &str) -> Option<String> {
        let session = self.session_cookie()?;
        let prefix = format!("{}=", self.config.session_cookie_name);

        let stored = match (&self.cookies, Url::parse(url)) {
            (Some(jar), Ok(url)) => jar
                .cookies(&url)
                .and_then(|value| value.to_str().ok().map(str::to_string))
                .unwrap_or_default(),
            _ => String::new(),
        };

        let mut pairs: Vec<&str> = stored
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty() && !pair.starts_with(&prefix))
            .collect();
        pairs.push(&session);
        Some(pairs.join("; "))
    }

    // ------------------------------------------------------------------------
    // Failover requests
    // ------------------------------------------------------------------------

    /// GET `endpoint` across the candidate hosts
    ///
    /// Returns the validated envelope of the first host answering `ok=true`;
    /// that host becomes the sticky host.
    pub async fn get_json(&self, endpoint: &str) -> Result<Value> {
        self.failover(Method::GET, endpoint, None).await
    }

    /// POST a JSON body to `endpoint` across the candidate hosts
    pub async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.failover(Method::POST, endpoint, Some(body)).await
    }

    async fn failover(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let hosts = self.candidates();
        let report = run_candidates(&hosts, |base| {
            let url = format!("{}{}", base, endpoint);
            self.send(method.clone(), url, endpoint, base, body, None)
        })
        .await;

        if let Some(winner) = &report.winner {
            self.runtime.set_api_base_url(winner);
        }
        report.result
    }

    // ------------------------------------------------------------------------
    // Single-host requests
    // ------------------------------------------------------------------------

    /// One request against one host, classified the same way as failover
    ///
    /// The launch sequence drives its own loop over hosts and calls this for
    /// each step.
    pub async fn request_at(
        &self,
        method: Method,
        base: &str,
        endpoint: &str,
        body: Option<&Value>,
        handshake: Option<&str>,
    ) -> Result<Value> {
        let url = format!("{}{}", base, endpoint);
        match self
            .send(method, url, endpoint, base.to_string(), body, handshake)
            .await
        {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(e) => Err(e),
        }
    }

    /// GET an absolute URL (or a path on the current host), no failover
    pub async fn get_absolute(&self, url: &str) -> Result<Value> {
        let target = self.absolute_url(url);
        if target.is_empty() {
            return Err(MysticError::invalid_input("URL is blank"));
        }
        let parsed = url::Url::parse(&target)?;
        let host = parsed.origin().ascii_serialization();
        let endpoint = parsed.path().to_string();
        match self.send(Method::GET, target, &endpoint, host, None, None).await {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(e) => Err(e),
        }
    }

    /// Send one request and reduce everything that can happen to an [`Outcome`]
    async fn send(
        &self,
        method: Method,
        url: String,
        endpoint: &str,
        host: String,
        body: Option<&Value>,
        handshake: Option<&str>,
    ) -> Outcome<Value> {
        debug!(%method, %host, endpoint, "API request");

        let mut request = self.http.request(method, &url);
        if let Some(cookie) = self.cookie_header(&url) {
            request = request.header(COOKIE, cookie);
        }
        if let Some(token) = handshake.filter(|t| !t.trim().is_empty()) {
            request = request.header(HANDSHAKE_HEADER, token.trim());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Outcome::Failure(MysticError::transport(e.to_string(), Some(host))),
        };

        let status = response.status().as_u16();
        if let Some(error) = classify_status(status, endpoint, &host) {
            debug!(%host, endpoint, status, "API status rejected");
            return Outcome::Failure(error);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Outcome::Failure(MysticError::transport(e.to_string(), Some(host))),
        };

        match check_envelope(&text) {
            Ok(value) => Outcome::Success(value),
            Err(e) => Outcome::Failure(e),
        }
    }
}
