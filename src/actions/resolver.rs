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


//! External action resolver
//!
//! Turns one [`QualityLink`] plus the action the user tapped into a concrete
//! target. Resolution is pure; the only network step is the Telegram
//! exchange, which is a separate call.
//!
//! # Rules
//!
//! | Action | Source fields, in order | Blank |
//! |---|---|---|
//! | Watch | `stream_url`, `view_url` | `NotAvailable` |
//! | Download | `download_url` | `NotAvailable` |
//! | Telegram | `telegram_deep_link`, `telegram_start_url`, token after `/t/` in `telegram_url` | `NotAvailable` |
//! | Watch together | `watch_together_url` | no-op |
//!
//! Relative paths resolve against the current API host; absolute URLs are
//! used as-is.

use crate::actions::naming::download_filename_now;
use crate::api::client::MysticClient;
use crate::api::decode::str_field;
use crate::api::models::QualityLink;
use crate::api::runtime::DEFAULT_TELEGRAM_START_PATH;
use crate::api::url::{absolute_url, encode_segment, extract_after_marker};
use crate::error::{MysticError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Path segment that precedes the share token in a Telegram share URL
pub const TELEGRAM_MARKER: &str = "/t/";

/// Placeholder in the Telegram start path template
const SHARE_TOKEN_PLACEHOLDER: &str = "{share_token}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Watch,
    Download,
    Telegram,
    WatchTogether,
}

impl ActionKind {
    /// Name used in user-facing copy
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Watch => "watch",
            ActionKind::Download => "download",
            ActionKind::Telegram => "telegram",
            ActionKind::WatchTogether => "watch together",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "watch" | "play" | "stream" => Some(ActionKind::Watch),
            "download" => Some(ActionKind::Download),
            "telegram" => Some(ActionKind::Telegram),
            "watch_together" | "together" => Some(ActionKind::WatchTogether),
            _ => None,
        }
    }
}

/// Where a tapped action leads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResolvedAction {
    /// Open the player on this URL
    Watch { url: String },
    /// Hand the URL to the downloader with this file name
    Download { url: String, filename: String },
    /// Launch Telegram directly
    OpenTelegram { deep_link: String },
    /// Exchange this start URL for a deep link first
    TelegramExchange { start_url: String },
    /// Open in the in-app web shell
    OpenWebShell { url: String },
    /// Nothing to do
    NoOp,
}

/// What the resolver needs besides the link
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// Current API host
    pub base_url: String,
    /// Content title, used for download names
    pub title: String,
    /// Start path template containing `{share_token}`
    pub telegram_start_path: String,
}

impl ResolveContext {
    pub fn new<B: Into<String>, T: Into<String>>(base_url: B, title: T) -> Self {
        Self {
            base_url: base_url.into(),
            title: title.into(),
            telegram_start_path: DEFAULT_TELEGRAM_START_PATH.to_string(),
        }
    }

    /// Absolute start URL for a share token
    pub fn telegram_start_url(&self, token: &str) -> String {
        let template = if self.telegram_start_path.contains(SHARE_TOKEN_PLACEHOLDER) {
            self.telegram_start_path.as_str()
        } else {
            DEFAULT_TELEGRAM_START_PATH
        };
        let path = template.replace(SHARE_TOKEN_PLACEHOLDER, &encode_segment(token));
        absolute_url(&self.base_url, &path)
    }
}

fn first_present<'a>(fields: &[&'a str]) -> Option<&'a str> {
    fields.iter().map(|f| f.trim()).find(|f| !f.is_empty())
}

/// Resolve one action for one quality link
pub fn resolve(link: &QualityLink, kind: ActionKind, ctx: &ResolveContext) -> Result<ResolvedAction> {
    let base = ctx.base_url.as_str();
    match kind {
        ActionKind::Watch => first_present(&[link.stream_url.as_str(), link.view_url.as_str()])
            .map(|url| ResolvedAction::Watch {
                url: absolute_url(base, url),
            })
            .ok_or_else(|| MysticError::not_available(kind.label())),

        ActionKind::Download => first_present(&[link.download_url.as_str()])
            .map(|url| ResolvedAction::Download {
                url: absolute_url(base, url),
                filename: download_filename_now(&ctx.title, &link.label),
            })
            .ok_or_else(|| MysticError::not_available(kind.label())),

        ActionKind::Telegram => resolve_telegram(link, ctx),

        ActionKind::WatchTogether => Ok(match first_present(&[link.watch_together_url.as_str()]) {
            Some(url) => ResolvedAction::OpenWebShell {
                url: absolute_url(base, url),
            },
            None => ResolvedAction::NoOp,
        }),
    }
}

fn resolve_telegram(link: &QualityLink, ctx: &ResolveContext) -> Result<ResolvedAction> {
    if let Some(deep_link) = first_present(&[link.telegram_deep_link.as_str()]) {
        return Ok(ResolvedAction::OpenTelegram {
            deep_link: deep_link.to_string(),
        });
    }
    if let Some(start) = first_present(&[link.telegram_start_url.as_str()]) {
        return Ok(ResolvedAction::TelegramExchange {
            start_url: absolute_url(&ctx.base_url, start),
        });
    }
    extract_after_marker(&link.telegram_url, TELEGRAM_MARKER)
        .map(|token| ResolvedAction::TelegramExchange {
            start_url: ctx.telegram_start_url(&token),
        })
        .ok_or_else(|| MysticError::not_available(ActionKind::Telegram.label()))
}

impl MysticClient {
    /// Resolver context for the current runtime record
    pub fn resolve_context(&self, title: &str) -> ResolveContext {
        let snapshot = self.runtime().snapshot();
        ResolveContext {
            base_url: snapshot.api_base_url.clone(),
            title: title.to_string(),
            telegram_start_path: snapshot.endpoints.telegram_link.clone(),
        }
    }

    /// Resolve an action against the current host
    pub fn resolve_action(&self, link: &QualityLink, kind: ActionKind, title: &str) -> Result<ResolvedAction> {
        resolve(link, kind, &self.resolve_context(title))
    }

    /// Exchange a Telegram start URL for a deep link
    ///
    /// # Errors
    /// Every failure is `ExchangeFailed`, never `NotAvailable`.
    pub async fn exchange_telegram(&self, start_url: &str) -> Result<String> {
        let body = self.get_absolute(start_url).await.map_err(|e| {
            warn!(error = %e, "Telegram exchange failed");
            MysticError::exchange_failed("Telegram", e.reason())
        })?;

        let deep_link = str_field(&body, &["deep_link"]);
        if deep_link.is_empty() {
            return Err(MysticError::exchange_failed("Telegram", "no deep link in response"));
        }
        debug!("Telegram deep link obtained");
        Ok(deep_link)
    }

    /// Resolve and, when needed, exchange: the deep link to launch
    pub async fn telegram_deep_link(&self, link: &QualityLink) -> Result<String> {
        match self.resolve_action(link, ActionKind::Telegram, "")? {
            ResolvedAction::OpenTelegram { deep_link } => Ok(deep_link),
            ResolvedAction::TelegramExchange { start_url } => self.exchange_telegram(&start_url).await,
            other => Err(MysticError::internal(format!("Unexpected Telegram resolution: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.example";

    fn ctx() -> ResolveContext {
        ResolveContext::new(BASE, "Dune: Part Two")
    }

    #[test]
    fn test_watch_falls_back_to_view_url() {
        let link = QualityLink {
            label: "720p".to_string(),
            view_url: "/s/tok".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve(&link, ActionKind::Watch, &ctx()).unwrap(),
            ResolvedAction::Watch {
                url: "https://api.example/s/tok".to_string()
            }
        );
    }

    #[test]
    fn test_watch_prefers_stream_url() {
        let link = QualityLink {
            stream_url: "https://cdn.example/s/stream/tok".to_string(),
            view_url: "/s/tok".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve(&link, ActionKind::Watch, &ctx()).unwrap(),
            ResolvedAction::Watch {
                url: "https://cdn.example/s/stream/tok".to_string()
            }
        );
    }

    #[test]
    fn test_blank_actions_are_not_available() {
        let link = QualityLink {
            label: "480p".to_string(),
            ..Default::default()
        };
        for kind in [ActionKind::Watch, ActionKind::Download, ActionKind::Telegram] {
            let err = resolve(&link, kind, &ctx()).unwrap_err();
            assert!(matches!(err, MysticError::NotAvailable { .. }), "{:?}", kind);
        }
        assert_eq!(
            resolve(&link, ActionKind::WatchTogether, &ctx()).unwrap(),
            ResolvedAction::NoOp
        );
    }

    #[test]
    fn test_download_name() {
        let link = QualityLink {
            label: "1080p".to_string(),
            download_url: "/d/tok".to_string(),
            ..Default::default()
        };
        match resolve(&link, ActionKind::Download, &ctx()).unwrap() {
            ResolvedAction::Download { url, filename } => {
                assert_eq!(url, "https://api.example/d/tok");
                assert!(filename.starts_with("Dune_Part_Two_1080p_"));
                assert!(filename.ends_with(".mp4"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_telegram_token_from_share_url() {
        let link = QualityLink {
            telegram_url: "https://host/t/abc123/x".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve(&link, ActionKind::Telegram, &ctx()).unwrap(),
            ResolvedAction::TelegramExchange {
                start_url: "https://api.example/app-api/telegram-start/abc123".to_string()
            }
        );
    }

    #[test]
    fn test_telegram_priority() {
        let mut link = QualityLink {
            telegram_url: "/t/abc123".to_string(),
            telegram_start_url: "/app-api/telegram-start/abc123?t=lt".to_string(),
            telegram_deep_link: "https://t.me/mystic_bot?start=share_abc123".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve(&link, ActionKind::Telegram, &ctx()).unwrap(),
            ResolvedAction::OpenTelegram {
                deep_link: "https://t.me/mystic_bot?start=share_abc123".to_string()
            }
        );

        link.telegram_deep_link.clear();
        assert_eq!(
            resolve(&link, ActionKind::Telegram, &ctx()).unwrap(),
            ResolvedAction::TelegramExchange {
                start_url: "https://api.example/app-api/telegram-start/abc123?t=lt".to_string()
            }
        );
    }

    #[test]
    fn test_telegram_without_token() {
        let link = QualityLink {
            telegram_url: "https://host/s/abc123".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&link, ActionKind::Telegram, &ctx()),
            Err(MysticError::NotAvailable { .. })
        ));
    }

    #[test]
    fn test_watch_together() {
        let link = QualityLink {
            watch_together_url: "/w/tok".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve(&link, ActionKind::WatchTogether, &ctx()).unwrap(),
            ResolvedAction::OpenWebShell {
                url: "https://api.example/w/tok".to_string()
            }
        );
    }

    #[test]
    fn test_custom_start_template() {
        let mut ctx = ctx();
        ctx.telegram_start_path = "/tg/{share_token}/start".to_string();
        assert_eq!(ctx.telegram_start_url("a b"), "https://api.example/tg/a%20b/start");

        ctx.telegram_start_path = "/broken".to_string();
        assert_eq!(
            ctx.telegram_start_url("x"),
            "https://api.example/app-api/telegram-start/x"
        );
    }

    #[test]
    fn test_action_kind_parse() {
        assert_eq!(ActionKind::parse("Watch-Together"), Some(ActionKind::WatchTogether));
        assert_eq!(ActionKind::parse("download"), Some(ActionKind::Download));
        assert_eq!(ActionKind::parse("share"), None);
    }
}
