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


//! Static client configuration
//!
//! Everything here is fixed for the lifetime of a [`MysticClient`](crate::api::MysticClient).
//! The mutable, server-driven part of the configuration lives in
//! [`RuntimeConfig`](crate::api::RuntimeConfig).

use crate::error::{MysticError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Compiled-in API host, always the second candidate
pub const DEFAULT_API_BASE_URL: &str = "https://mysticmovies.onrender.com";

/// Known fixed fallback hosts, tried after the default
pub const FALLBACK_API_BASE_URLS: &[&str] = &["https://mysticmovies.site"];

/// Read timeout for a single request
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Connect timeout for a single request
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Cookie the web login sets for an authenticated user
pub const DEFAULT_SESSION_COOKIE: &str = "user_phone";

/// Deep link the web login flow redirects back to
pub const DEFAULT_CALLBACK_URL: &str = "mysticmovies://auth";

/// Configuration for MysticClient
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_base_url: String,
    pub fallback_base_urls: Vec<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Stable per-install identifier sent with the handshake
    pub device_id: String,
    pub platform: String,
    pub app_version: String,
    pub build_number: u32,
    pub enable_cookies: bool,
    pub session_cookie_name: String,
    pub callback_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_base_url: DEFAULT_API_BASE_URL.to_string(),
            fallback_base_urls: FALLBACK_API_BASE_URLS.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: format!("MysticMovies-Android/{} (mystic-core)", env!("CARGO_PKG_VERSION")),
            device_id: String::new(),
            platform: "android".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            build_number: 1,
            enable_cookies: true,
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
        }
    }
}

/// On-disk shape of the config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    default_base_url: Option<String>,
    fallback_base_urls: Option<Vec<String>>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    device_id: Option<String>,
    platform: Option<String>,
    app_version: Option<String>,
    build_number: Option<u32>,
    enable_cookies: Option<bool>,
    session_cookie_name: Option<String>,
    callback_url: Option<String>,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MysticError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse a JSON config document; missing fields keep their defaults
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(raw)
            .map_err(|e| MysticError::Configuration(format!("Invalid config JSON: {}", e)))?;

        let mut builder = AppConfig::builder();
        if let Some(v) = file.default_base_url {
            builder = builder.default_base_url(v);
        }
        if let Some(v) = file.fallback_base_urls {
            builder = builder.fallback_base_urls(v);
        }
        if let Some(v) = file.timeout_secs {
            builder = builder.timeout(Duration::from_secs(v));
        }
        if let Some(v) = file.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(v));
        }
        if let Some(v) = file.user_agent {
            builder = builder.user_agent(v);
        }
        if let Some(v) = file.device_id {
            builder = builder.device_id(v);
        }
        if let Some(v) = file.platform {
            builder = builder.platform(v);
        }
        if let Some(v) = file.app_version {
            builder = builder.app_version(v);
        }
        if let Some(v) = file.build_number {
            builder = builder.build_number(v);
        }
        if let Some(v) = file.enable_cookies {
            builder = builder.enable_cookies(v);
        }
        if let Some(v) = file.session_cookie_name {
            builder = builder.session_cookie_name(v);
        }
        if let Some(v) = file.callback_url {
            builder = builder.callback_url(v);
        }
        builder.try_build()
    }

    /// Device id, generating a random one if none was configured
    pub fn device_id_or_generate(&self) -> String {
        if self.device_id.trim().is_empty() {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            self.device_id.trim().to_string()
        }
    }
}

/// Builder for AppConfig
#[derive(Debug)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn default_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.default_base_url = url.into();
        self
    }

    pub fn fallback_base_urls(mut self, urls: Vec<String>) -> Self {
        self.config.fallback_base_urls = urls;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn device_id<S: Into<String>>(mut self, device_id: S) -> Self {
        self.config.device_id = device_id.into();
        self
    }

    pub fn platform<S: Into<String>>(mut self, platform: S) -> Self {
        self.config.platform = platform.into();
        self
    }

    pub fn app_version<S: Into<String>>(mut self, version: S) -> Self {
        self.config.app_version = version.into();
        self
    }

    pub fn build_number(mut self, build: u32) -> Self {
        self.config.build_number = build;
        self
    }

    pub fn enable_cookies(mut self, enable: bool) -> Self {
        self.config.enable_cookies = enable;
        self
    }

    pub fn session_cookie_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.session_cookie_name = name.into();
        self
    }

    pub fn callback_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.callback_url = url.into();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }

    /// Build and validate. The default base URL must be non-blank since it
    /// is what `RuntimeConfig.api_base_url` falls back to.
    pub fn try_build(self) -> Result<AppConfig> {
        if self.config.default_base_url.trim().is_empty() {
            return Err(MysticError::Configuration(
                "default_base_url must not be blank".to_string(),
            ));
        }
        Ok(self.config)
    }
}
