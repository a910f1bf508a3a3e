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


//! Launch sequence: handshake → bootstrap → keepalive ping
//!
//! # Flow
//!
//! ```text
//! Idle ─► Handshaking ─► Bootstrapping ─► Ready
//!   │         │  ▲             │
//!   │         ▼  └── next host ┘
//!   └──────► Failed (hosts exhausted)
//! ```
//!
//! For each candidate host, in order:
//! 1. `POST /app-api/handshake` with device/platform/version. Any failure or a
//!    blank `handshake_token` moves to the next host.
//! 2. `GET /app-api/bootstrap` on the same host with `X-App-Handshake`. A
//!    failure here abandons the whole host; the handshake is not repeated.
//! 3. The bootstrap body becomes a new [`RuntimeConfig`] (winning host +
//!    token included) and replaces the shared record in one swap.
//! 4. If `keepalive_on_launch` is set, `POST /app-api/ping` is spawned in the
//!    background. Its result is discarded.
//!
//! On `Failed` the runtime record is left exactly as it was before launch.

use crate::api::client::MysticClient;
use crate::api::decode::{self, str_field, u64_field};
use crate::api::runtime::RuntimeConfig;
use crate::error::{MysticError, Result};
use crate::logging::mask_token;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const HANDSHAKE_PATH: &str = "/app-api/handshake";
pub const BOOTSTRAP_PATH: &str = "/app-api/bootstrap";

/// Launch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    Idle,
    Handshaking,
    Bootstrapping,
    Ready,
    Failed,
}

/// Token issued by a successful handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeGrant {
    pub token: String,
    pub expires_in: u64,
}

/// Claims embedded in a handshake token
///
/// Tokens are `base64url(json).signature`. The signature is the server's
/// business; the claims are read without verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HandshakeClaims {
    #[serde(default)]
    pub did: String,
    #[serde(default)]
    pub plt: String,
    #[serde(default)]
    pub ver: String,
    #[serde(default)]
    pub b: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
}

pub struct HandshakeToken;

impl HandshakeToken {
    /// Decode the claims part of a token
    pub fn claims(token: &str) -> Result<HandshakeClaims> {
        let body = token
            .trim()
            .split_once('.')
            .map(|(body, _)| body)
            .ok_or_else(|| MysticError::invalid_input("Handshake token has no signature part"))?;

        let raw = URL_SAFE_NO_PAD
            .decode(body.trim_end_matches('='))
            .map_err(|e| MysticError::invalid_input(format!("Handshake token is not base64url: {}", e)))?;

        Ok(serde_json::from_slice(&raw)?)
    }

    /// Whether the token expired at `now` (unix seconds)
    ///
    /// Undecodable tokens count as expired; tokens without `exp` never expire.
    pub fn is_expired(token: &str, now: i64) -> bool {
        match Self::claims(token) {
            Ok(claims) => claims.exp > 0 && now > claims.exp,
            Err(_) => true,
        }
    }
}

/// Result of a launch attempt
#[derive(Debug)]
pub struct LaunchReport {
    pub state: BootstrapState,
    /// Host that completed handshake and bootstrap
    pub base: Option<String>,
    /// Hosts tried, in order
    pub attempted: Vec<String>,
    /// Last failure, when `state` is `Failed`
    pub error: Option<MysticError>,
    /// Runtime record after the attempt
    pub config: Arc<RuntimeConfig>,
    /// Background keepalive, when one was started
    pub ping: Option<JoinHandle<()>>,
}

impl LaunchReport {
    pub fn is_ready(&self) -> bool {
        self.state == BootstrapState::Ready
    }
}

/// Drives the launch state machine for one app launch
pub struct LaunchSequence {
    client: MysticClient,
    state: BootstrapState,
    history: Vec<BootstrapState>,
}

impl LaunchSequence {
    pub fn new(client: MysticClient) -> Self {
        Self {
            client,
            state: BootstrapState::Idle,
            history: vec![BootstrapState::Idle],
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Every state entered so far, in order
    pub fn history(&self) -> &[BootstrapState] {
        &self.history
    }

    fn enter(&mut self, next: BootstrapState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "Launch state");
            self.state = next;
            self.history.push(next);
        }
    }

    /// Run handshake and bootstrap over the candidate hosts
    pub async fn run(&mut self) -> LaunchReport {
        let hosts = self.client.candidates();
        let mut attempted = Vec::with_capacity(hosts.len());
        let mut last_error: Option<MysticError> = None;

        for base in &hosts {
            attempted.push(base.clone());

            self.enter(BootstrapState::Handshaking);
            let grant = match handshake(&self.client, base).await {
                Ok(grant) => grant,
                Err(e) => {
                    debug!(host = %base, error = %e, "Handshake failed, trying next host");
                    last_error = Some(e);
                    continue;
                }
            };

            self.enter(BootstrapState::Bootstrapping);
            let body = match bootstrap(&self.client, base, &grant.token).await {
                Ok(body) => body,
                Err(e) => {
                    debug!(host = %base, error = %e, "Bootstrap failed, abandoning host");
                    last_error = Some(e);
                    continue;
                }
            };

            let config = decode::runtime_config(&body, base, &grant.token, grant.expires_in);
            let keepalive = config.keepalive_on_launch;
            self.client.runtime().replace(config);
            self.enter(BootstrapState::Ready);
            info!(
                host = %base,
                token = %mask_token(&grant.token),
                attempts = attempted.len(),
                "Launch sequence ready"
            );

            let ping = if keepalive { Some(spawn_ping(&self.client)) } else { None };

            return LaunchReport {
                state: self.state,
                base: Some(base.clone()),
                attempted,
                error: None,
                config: self.client.runtime().snapshot(),
                ping,
            };
        }

        self.enter(BootstrapState::Failed);
        let error = last_error.unwrap_or_else(|| MysticError::transport("network error", None));
        warn!(error = %error, attempts = attempted.len(), "Launch sequence failed");

        LaunchReport {
            state: self.state,
            base: None,
            attempted,
            error: Some(error),
            config: self.client.runtime().snapshot(),
            ping: None,
        }
    }
}

/// `POST {base}/app-api/handshake`
pub async fn handshake(client: &MysticClient, base: &str) -> Result<HandshakeGrant> {
    let config = client.config();
    let mut body = json!({
        "device_id": client.device_id(),
        "platform": config.platform,
        "app_version": config.app_version,
        "build_number": config.build_number,
    });
    if let Some(phone) = client.session_token() {
        body["user_phone"] = Value::String(phone);
    }

    let response = client
        .request_at(Method::POST, base, HANDSHAKE_PATH, Some(&body), None)
        .await?;

    let token = str_field(&response, &["handshake_token"]);
    if token.is_empty() {
        return Err(MysticError::protocol("Handshake returned an empty token"));
    }
    Ok(HandshakeGrant {
        token,
        expires_in: u64_field(&response, &["expires_in"]),
    })
}

/// `GET {base}/app-api/bootstrap` with the handshake header
pub async fn bootstrap(client: &MysticClient, base: &str, token: &str) -> Result<Value> {
    client
        .request_at(Method::GET, base, BOOTSTRAP_PATH, None, Some(token))
        .await
}

/// Fire-and-forget keepalive against the sticky host
///
/// Must be called from within a tokio runtime. Failures are logged at debug
/// level and dropped.
pub fn spawn_ping(client: &MysticClient) -> JoinHandle<()> {
    let client = client.clone();
    tokio::spawn(async move {
        let snapshot = client.runtime().snapshot();
        if !snapshot.has_handshake() {
            return;
        }
        let result = client
            .request_at(
                Method::POST,
                &snapshot.api_base_url,
                &snapshot.endpoints.ping,
                None,
                Some(&snapshot.handshake_token),
            )
            .await;
        match result {
            Ok(_) => debug!(host = %snapshot.api_base_url, "Keepalive ping delivered"),
            Err(e) => debug!(host = %snapshot.api_base_url, error = %e, "Keepalive ping dropped"),
        }
    })
}
