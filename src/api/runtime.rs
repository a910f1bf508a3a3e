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


//! Server-driven runtime configuration
//!
//! [`RuntimeConfig`] is the single record every component reads: the sticky
//! API host, the per-launch handshake token, and whatever the bootstrap
//! endpoint said about branding, updates and maintenance.
//!
//! The record is never edited in place. [`RuntimeConfigHandle`] hands out
//! `Arc` snapshots and swaps in a whole new record on every change, so a
//! reader sees either the old or the new configuration, never a mix.

use crate::api::url::normalize_base;
use crate::config::DEFAULT_API_BASE_URL;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Path used for the keepalive ping when bootstrap does not override it
pub const DEFAULT_PING_PATH: &str = "/app-api/ping";

/// Path template for the Telegram start exchange
pub const DEFAULT_TELEGRAM_START_PATH: &str = "/app-api/telegram-start/{share_token}";

/// Header/menu link from the bootstrap `ui` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLink {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

/// Site branding and navigation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    pub site_name: String,
    pub footer_text: String,
    pub topbar_text: String,
    pub logo_url: String,
    pub header_menu: Vec<MenuLink>,
    pub footer_explore_links: Vec<MenuLink>,
    pub footer_support_links: Vec<MenuLink>,
    pub footer_about_text: String,
}

/// App-level switches from the bootstrap `app` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBranding {
    pub name: String,
    pub package_name: String,
    pub splash_image_url: String,
    pub loading_icon_url: String,
    pub onboarding_message: String,
    pub ads_message: String,
    pub push_enabled: bool,
    pub request_login_required: bool,
}

impl Default for AppBranding {
    fn default() -> Self {
        Self {
            name: "MysticMovies".to_string(),
            package_name: "com.mysticmovies.app".to_string(),
            splash_image_url: String::new(),
            loading_icon_url: String::new(),
            onboarding_message: String::new(),
            ads_message: String::new(),
            push_enabled: true,
            request_login_required: true,
        }
    }
}

/// Server-side update mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    #[default]
    None,
    Recommended,
    Forced,
}

impl UpdateMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "forced" | "force" => UpdateMode::Forced,
            "recommended" | "recommend" => UpdateMode::Recommended,
            _ => UpdateMode::None,
        }
    }
}

/// What the UI should do about updates on this launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePrompt {
    None,
    Recommended,
    Forced,
}

/// Update policy from the bootstrap `update` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePolicy {
    pub mode: UpdateMode,
    pub force_required: bool,
    pub recommend: bool,
    pub latest_version: String,
    pub latest_build: u32,
    pub release_notes: String,
    pub popup_title: String,
    pub popup_body: String,
    pub apk_download_url: String,
}

impl UpdatePolicy {
    /// Decide the prompt for the running build
    ///
    /// The server flags win. Without them, a forced/recommended mode prompts
    /// when the app is older than the latest release: by build number when
    /// both sides have one, else by `latest_version`.
    pub fn prompt(&self, current_version: &str, current_build: u32) -> UpdatePrompt {
        if self.force_required {
            return UpdatePrompt::Forced;
        }
        if self.recommend {
            return UpdatePrompt::Recommended;
        }
        let outdated = if self.latest_build > 0 && current_build > 0 {
            current_build < self.latest_build
        } else {
            !self.latest_version.trim().is_empty() && version_lt(current_version, &self.latest_version)
        };
        match (self.mode, outdated) {
            (UpdateMode::Forced, true) => UpdatePrompt::Forced,
            (UpdateMode::Recommended, true) => UpdatePrompt::Recommended,
            _ => UpdatePrompt::None,
        }
    }
}

/// Broadcast notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub link_url: String,
    pub image_url: String,
    pub audience: String,
    pub created_at: String,
}

/// Endpoint paths the server may relocate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub ping: String,
    pub telegram_link: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ping: DEFAULT_PING_PATH.to_string(),
            telegram_link: DEFAULT_TELEGRAM_START_PATH.to_string(),
        }
    }
}

/// The process-wide configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Sticky API host; never blank
    pub api_base_url: String,
    /// Empty until a handshake succeeds on this launch
    pub handshake_token: String,
    pub handshake_expires_in: u64,
    pub app: AppBranding,
    pub ui: UiConfig,
    pub update: UpdatePolicy,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub notifications: Vec<Notification>,
    pub telegram_bot_username: String,
    pub keepalive_on_launch: bool,
    pub endpoints: Endpoints,
}

impl RuntimeConfig {
    /// Launch defaults around the compiled-in host
    ///
    /// A blank host becomes [`DEFAULT_API_BASE_URL`]; the base is never empty.
    pub fn new(default_base_url: &str) -> Self {
        Self {
            api_base_url: base_or_default(default_base_url),
            handshake_token: String::new(),
            handshake_expires_in: 0,
            app: AppBranding::default(),
            ui: UiConfig::default(),
            update: UpdatePolicy::default(),
            maintenance_mode: false,
            maintenance_message: String::new(),
            notifications: Vec::new(),
            telegram_bot_username: String::new(),
            keepalive_on_launch: true,
            endpoints: Endpoints::default(),
        }
    }

    /// Whether the launch handshake succeeded
    pub fn has_handshake(&self) -> bool {
        !self.handshake_token.trim().is_empty()
    }

    /// Notification bodies in server order
    pub fn notification_messages(&self) -> Vec<String> {
        self.notifications
            .iter()
            .map(|n| if n.message.is_empty() { n.title.clone() } else { n.message.clone() })
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// Copy without per-launch credentials, for persistence
    pub fn without_credentials(&self) -> Self {
        Self {
            handshake_token: String::new(),
            handshake_expires_in: 0,
            ..self.clone()
        }
    }
}

/// Shared, swappable holder for [`RuntimeConfig`]
#[derive(Debug, Clone)]
pub struct RuntimeConfigHandle {
    inner: Arc<RwLock<Arc<RuntimeConfig>>>,
}

fn base_or_default(base: &str) -> String {
    match normalize_base(base) {
        b if b.is_empty() => DEFAULT_API_BASE_URL.to_string(),
        b => b,
    }
}

impl RuntimeConfigHandle {
    pub fn new(mut config: RuntimeConfig) -> Self {
        config.api_base_url = base_or_default(&config.api_base_url);
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current record
    pub fn snapshot(&self) -> Arc<RuntimeConfig> {
        let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in a new record wholesale. A blank base URL keeps the old host.
    pub fn replace(&self, mut config: RuntimeConfig) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        config.api_base_url = normalize_base(&config.api_base_url);
        if config.api_base_url.is_empty() {
            config.api_base_url = guard.api_base_url.clone();
        }
        *guard = Arc::new(config);
    }

    /// Make `base` the sticky host (copy, modify, replace)
    pub fn set_api_base_url(&self, base: &str) {
        let base = normalize_base(base);
        if base.is_empty() {
            return;
        }
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        if guard.api_base_url == base {
            return;
        }
        let mut next = (**guard).clone();
        next.api_base_url = base;
        *guard = Arc::new(next);
    }

    pub fn api_base_url(&self) -> String {
        self.snapshot().api_base_url.clone()
    }

    pub fn handshake_token(&self) -> String {
        self.snapshot().handshake_token.clone()
    }
}

/// Dotted numeric version comparison: `1.2` < `1.10`, missing parts are 0
pub fn version_lt(left: &str, right: &str) -> bool {
    fn parts(value: &str) -> Vec<u64> {
        let mut out: Vec<u64> = value
            .split(|c: char| !c.is_ascii_digit())
            .filter(|p| !p.is_empty())
            .filter_map(|p| p.parse().ok())
            .take(4)
            .collect();
        if out.is_empty() {
            out.push(0);
        }
        out
    }

    let mut a = parts(left);
    let mut b = parts(right);
    let len = a.len().max(b.len());
    a.resize(len, 0);
    b.resize(len, 0);
    a < b
}
