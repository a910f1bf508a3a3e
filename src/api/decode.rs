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


//! Tolerant decoding of API payloads
//!
//! The server's JSON is loosely typed: fields go missing, numbers arrive as
//! strings, images come in a proxied and an "original" flavour. Every entity
//! is therefore decoded by hand from a [`serde_json::Value`]:
//!
//! - strings default to `""`, numbers to `0`, arrays to empty
//! - each field has an ordered list of source keys; the first non-blank wins
//! - a malformed row inside a list is skipped on its own
//!
//! The per-field key lists are the constants at the top of this file.

use crate::api::models::*;
use crate::api::runtime::{
    AppBranding, Endpoints, MenuLink, Notification, RuntimeConfig, UiConfig, UpdateMode,
    UpdatePolicy, DEFAULT_PING_PATH, DEFAULT_TELEGRAM_START_PATH,
};
use serde_json::Value;
use tracing::warn;

// ============================================================================
// FIELD FALLBACK ORDER
// ============================================================================

/// Poster: proxied first, then the original, then the backdrop pair
pub const POSTER_FIELDS: &[&str] = &["poster", "poster_original", "backdrop", "backdrop_original"];

/// Backdrop: same idea, falling back to the poster pair
pub const BACKDROP_FIELDS: &[&str] = &["backdrop", "backdrop_original", "poster", "poster_original"];

pub const SLIDER_IMAGE_FIELDS: &[&str] = &["image", "image_original", "backdrop", "poster"];

pub const CAST_FIELDS: &[&str] = &["cast_profiles", "cast"];

pub const SEASON_FIELDS: &[&str] = &["series_links", "seasons"];

const SPLASH_FIELDS: &[&str] = &["splash_image_url", "splash_image_original"];
const LOADING_ICON_FIELDS: &[&str] = &["loading_icon_url", "loading_icon_original"];
const LOGO_FIELDS: &[&str] = &["logo_url", "logo_original"];
const NOTIFICATION_LINK_FIELDS: &[&str] = &["link_url_absolute", "link_url"];
const APK_URL_FIELDS: &[&str] = &["apk_download_url_absolute", "apk_download_url"];
const POPUP_TITLE_FIELDS: &[&str] = &["update_popup_title", "popup_title"];
const POPUP_BODY_FIELDS: &[&str] = &["update_popup_body", "popup_body"];
const USER_NAME_FIELDS: &[&str] = &["name", "user_name"];
const USER_PHONE_FIELDS: &[&str] = &["phone", "user_phone"];

// ============================================================================
// PRIMITIVES
// ============================================================================

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First non-blank string among `keys`; numbers are stringified
pub fn str_field(obj: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(scalar_to_string)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// First parseable integer among `keys`, else 0
pub fn int_field(obj: &Value, keys: &[&str]) -> i64 {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(value_to_i64)
        .unwrap_or(0)
}

/// Non-negative integer that fits a u32, else 0
pub fn u32_field(obj: &Value, keys: &[&str]) -> u32 {
    u32::try_from(int_field(obj, keys)).unwrap_or(0)
}

/// Reads the full u64 range before falling back to the signed parse
pub fn u64_field(obj: &Value, keys: &[&str]) -> u64 {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
        .unwrap_or_else(|| u64::try_from(int_field(obj, keys)).unwrap_or(0))
}

pub fn f64_field(obj: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}

/// Booleans also accept `1`/`0` and `"true"`/`"false"`
pub fn bool_field(obj: &Value, keys: &[&str], default: bool) -> bool {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| match v {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|i| i != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        })
        .unwrap_or(default)
}

/// Array of scalars as strings, blanks dropped
pub fn str_list(obj: &Value, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(scalar_to_string)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Nested object at `key`, if it is an object
pub fn object<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| v.is_object())
}

/// Decode every row of the first array found under `keys`
///
/// Rows that are not objects, or that `decode` rejects, are skipped with a
/// warning.
pub fn list_field<T, F>(obj: &Value, keys: &[&str], decode: F) -> Vec<T>
where
    F: Fn(&Value) -> Option<T>,
{
    let Some(rows) = keys.iter().find_map(|key| obj.get(*key).and_then(Value::as_array)) else {
        return Vec::new();
    };

    let field = keys.first().copied().unwrap_or_default();
    let mut out = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if !row.is_object() {
            warn!(field, index, "Skipping non-object row");
            continue;
        }
        match decode(row) {
            Some(item) => out.push(item),
            None => warn!(field, index, "Skipping malformed row"),
        }
    }
    out
}

// ============================================================================
// CATALOG
// ============================================================================

/// A card needs an id or a slug to be addressable
pub fn catalog_card(obj: &Value) -> Option<CatalogCard> {
    let id = str_field(obj, &["id", "_id"]);
    let slug = str_field(obj, &["slug"]);
    if id.is_empty() && slug.is_empty() {
        return None;
    }

    Some(CatalogCard {
        id,
        slug,
        title: str_field(obj, &["title", "name"]),
        year: str_field(obj, &["year"]),
        content_type: ContentType::parse(&str_field(obj, &["type", "content_type"])),
        poster: str_field(obj, POSTER_FIELDS),
        backdrop: str_field(obj, BACKDROP_FIELDS),
        description: str_field(obj, &["description", "overview"]),
        release_date: str_field(obj, &["release_date"]),
        quality_row: str_list(obj, "quality_row"),
        season_text: str_field(obj, &["season_text"]),
        detail_path: str_field(obj, &["detail_path"]),
        detail_url: str_field(obj, &["detail_url"]),
        keywords: str_list(obj, "keywords"),
    })
}

pub fn slider_item(obj: &Value) -> Option<SliderItem> {
    Some(SliderItem {
        title: str_field(obj, &["title"]),
        subtitle: str_field(obj, &["subtitle"]),
        image: str_field(obj, SLIDER_IMAGE_FIELDS),
        detail_path: str_field(obj, &["detail_path"]),
        detail_url: str_field(obj, &["detail_url"]),
    })
}

/// Cast rows without a name carry nothing worth showing
pub fn cast_profile(obj: &Value) -> Option<CastProfile> {
    let name = str_field(obj, &["name"]);
    if name.is_empty() {
        return None;
    }
    Some(CastProfile {
        name,
        role: str_field(obj, &["role", "character"]),
        image: str_field(obj, &["image", "image_original", "profile_path"]),
        tmdb_id: int_field(obj, &["tmdb_id", "id"]),
        cast_path: str_field(obj, &["cast_path"]),
    })
}

pub fn home_section(obj: &Value) -> Option<HomeSection> {
    let layout = SectionLayout::parse(&str_field(obj, &["layout"]));
    let (items, cast) = match layout {
        SectionLayout::PosterRow => (list_field(obj, &["items"], catalog_card), Vec::new()),
        SectionLayout::CastRow => (Vec::new(), list_field(obj, &["items"], cast_profile)),
    };
    Some(HomeSection {
        key: str_field(obj, &["key"]),
        title: str_field(obj, &["title"]),
        layout,
        items,
        cast,
    })
}

pub fn pagination(obj: &Value) -> Pagination {
    let page = u32_field(obj, &["page"]).max(1);
    let total_pages = u32_field(obj, &["total_pages"]).max(1);
    Pagination {
        page,
        per_page: u32_field(obj, &["per_page"]),
        total_items: u32_field(obj, &["total_items"]),
        total_pages,
        has_next: bool_field(obj, &["has_next"], page < total_pages),
        has_prev: bool_field(obj, &["has_prev"], page > 1),
    }
}

pub fn catalog_page(body: &Value) -> CatalogPage {
    CatalogPage {
        filter: str_field(body, &["filter"]),
        sort: str_field(body, &["sort"]),
        query: str_field(body, &["query"]),
        items: list_field(body, &["items"], catalog_card),
        slider: list_field(body, &["slider"], slider_item),
        home_sections: list_field(body, &["home_sections"], home_section),
        genre_cloud: str_list(body, "genre_cloud"),
        pagination: object(body, "pagination").map(pagination).unwrap_or_default(),
    }
}

pub fn search_suggestions(body: &Value) -> SearchSuggestions {
    SearchSuggestions {
        query: str_field(body, &["query"]),
        items: list_field(body, &["items"], catalog_card),
        trending: str_list(body, "trending"),
    }
}

// ============================================================================
// CONTENT DETAIL TREE
// ============================================================================

/// Quality rows keep their label even when every URL is blank
pub fn quality_link(obj: &Value) -> Option<QualityLink> {
    Some(QualityLink {
        label: str_field(obj, &["label", "quality"]),
        size: u64_field(obj, &["size"]),
        stream_url: str_field(obj, &["stream_url"]),
        view_url: str_field(obj, &["view_url"]),
        download_url: str_field(obj, &["download_url"]),
        telegram_url: str_field(obj, &["telegram_url"]),
        telegram_start_url: str_field(obj, &["telegram_start_url"]),
        telegram_deep_link: str_field(obj, &["telegram_deep_link"]),
        watch_together_url: str_field(obj, &["watch_together_url"]),
    })
}

pub fn episode_row(obj: &Value) -> Option<EpisodeRow> {
    Some(EpisodeRow {
        episode: u32_field(obj, &["episode", "episode_number"]),
        title: str_field(obj, &["title"]),
        qualities: list_field(obj, &["qualities"], quality_link),
    })
}

pub fn season_link(obj: &Value) -> Option<SeasonLink> {
    let episodes = list_field(obj, &["episodes"], episode_row);
    let episode_count = match u32_field(obj, &["episode_count"]) {
        0 => u32::try_from(episodes.len()).unwrap_or(u32::MAX),
        n => n,
    };
    Some(SeasonLink {
        season: u32_field(obj, &["season", "season_number"]),
        episode_count,
        qualities: str_list(obj, "qualities"),
        preview_view_url: str_field(obj, &["preview_view_url"]),
        preview_stream_url: str_field(obj, &["preview_stream_url"]),
        preview_telegram_start_url: str_field(obj, &["preview_telegram_start_url"]),
        episodes,
    })
}

pub fn content_item(obj: &Value) -> ContentItem {
    ContentItem {
        id: str_field(obj, &["id", "_id"]),
        slug: str_field(obj, &["slug"]),
        title: str_field(obj, &["title", "name"]),
        year: str_field(obj, &["year"]),
        content_type: ContentType::parse(&str_field(obj, &["type", "content_type"])),
        poster: str_field(obj, POSTER_FIELDS),
        backdrop: str_field(obj, BACKDROP_FIELDS),
        description: str_field(obj, &["description", "overview"]),
        release_date: str_field(obj, &["release_date"]),
        genres: str_list(obj, "genres"),
        actors: str_list(obj, "actors"),
        cast: list_field(obj, CAST_FIELDS, cast_profile),
        director: str_field(obj, &["director"]),
        trailer_url: str_field(obj, &["trailer_url"]),
        trailer_key: str_field(obj, &["trailer_key"]),
        trailer_embed_url: str_field(obj, &["trailer_embed_url"]),
    }
}

/// The item type picks which link list is read; the other is ignored
pub fn content_detail(body: &Value) -> ContentDetail {
    let item = object(body, "item").map(content_item).unwrap_or_default();
    let links = match item.content_type {
        ContentType::Movie => LinkSet::Movie(list_field(body, &["movie_links"], quality_link)),
        ContentType::Series => LinkSet::Series(list_field(body, SEASON_FIELDS, season_link)),
    };
    ContentDetail {
        item,
        links,
        related_items: list_field(body, &["related_items"], catalog_card),
        detail_path: str_field(body, &["detail_path"]),
        detail_url: str_field(body, &["detail_url"]),
        viewer_name: str_field(body, &["viewer_name"]),
    }
}

// ============================================================================
// SESSION / PROFILE
// ============================================================================

pub fn session_info(body: &Value) -> SessionInfo {
    let user = object(body, "user");
    SessionInfo {
        logged_in: bool_field(body, &["logged_in"], false),
        user_name: user.map(|u| str_field(u, USER_NAME_FIELDS)).unwrap_or_default(),
        user_phone: user.map(|u| str_field(u, USER_PHONE_FIELDS)).unwrap_or_default(),
        login_url: str_field(body, &["login_url"]),
    }
}

/// History rows embed a full card next to the progress fields
pub fn progress_entry(obj: &Value) -> Option<ProgressEntry> {
    let item_id = str_field(obj, &["item_id"]);
    if item_id.is_empty() {
        return None;
    }
    Some(ProgressEntry {
        card: catalog_card(obj).unwrap_or_default(),
        display_title: str_field(obj, &["display_title", "title"]),
        item_id,
        position: f64_field(obj, &["position"]),
        duration: f64_field(obj, &["duration"]),
        watch_url: str_field(obj, &["watch_url"]),
        stream_url: str_field(obj, &["stream_url"]),
        updated_at: str_field(obj, &["updated_at"]),
    })
}

pub fn profile(body: &Value) -> Profile {
    let user = object(body, "user");
    Profile {
        user_name: user.map(|u| str_field(u, USER_NAME_FIELDS)).unwrap_or_default(),
        user_phone: user.map(|u| str_field(u, USER_PHONE_FIELDS)).unwrap_or_default(),
        watchlist: list_field(body, &["watchlist"], catalog_card),
        continue_watching: list_field(body, &["continue_watching"], progress_entry),
        watch_history: list_field(body, &["watch_history"], progress_entry),
    }
}

// ============================================================================
// BOOTSTRAP
// ============================================================================

fn menu_link(obj: &Value) -> Option<MenuLink> {
    let label = str_field(obj, &["label"]);
    let url = str_field(obj, &["url"]);
    if label.is_empty() || url.is_empty() {
        return None;
    }
    Some(MenuLink {
        label,
        url,
        icon: str_field(obj, &["icon"]),
    })
}

fn notification(obj: &Value) -> Option<Notification> {
    Some(Notification {
        id: str_field(obj, &["id"]),
        title: str_field(obj, &["title"]),
        message: str_field(obj, &["message"]),
        kind: str_field(obj, &["type", "kind"]),
        link_url: str_field(obj, NOTIFICATION_LINK_FIELDS),
        image_url: str_field(obj, &["image_url"]),
        audience: str_field(obj, &["audience"]),
        created_at: str_field(obj, &["created_at"]),
    })
}

fn app_branding(obj: &Value) -> AppBranding {
    let defaults = AppBranding::default();
    let name = str_field(obj, &["name"]);
    let package_name = str_field(obj, &["package_name"]);
    AppBranding {
        name: if name.is_empty() { defaults.name } else { name },
        package_name: if package_name.is_empty() { defaults.package_name } else { package_name },
        splash_image_url: str_field(obj, SPLASH_FIELDS),
        loading_icon_url: str_field(obj, LOADING_ICON_FIELDS),
        onboarding_message: str_field(obj, &["onboarding_message"]),
        ads_message: str_field(obj, &["ads_message"]),
        push_enabled: bool_field(obj, &["push_enabled"], defaults.push_enabled),
        request_login_required: bool_field(
            obj,
            &["request_login_required"],
            defaults.request_login_required,
        ),
    }
}

fn ui_config(obj: &Value) -> UiConfig {
    UiConfig {
        site_name: str_field(obj, &["site_name"]),
        footer_text: str_field(obj, &["footer_text"]),
        topbar_text: str_field(obj, &["topbar_text"]),
        logo_url: str_field(obj, LOGO_FIELDS),
        header_menu: list_field(obj, &["header_menu"], menu_link),
        footer_explore_links: list_field(obj, &["footer_explore_links"], menu_link),
        footer_support_links: list_field(obj, &["footer_support_links"], menu_link),
        footer_about_text: str_field(obj, &["footer_about_text"]),
    }
}

fn update_policy(obj: &Value) -> UpdatePolicy {
    UpdatePolicy {
        mode: UpdateMode::parse(&str_field(obj, &["mode"])),
        force_required: bool_field(obj, &["force_required"], false),
        recommend: bool_field(obj, &["recommend"], false),
        latest_version: str_field(obj, &["latest_version"]),
        latest_build: u32_field(obj, &["latest_build"]),
        release_notes: str_field(obj, &["release_notes"]),
        popup_title: str_field(obj, POPUP_TITLE_FIELDS),
        popup_body: str_field(obj, POPUP_BODY_FIELDS),
        apk_download_url: str_field(obj, APK_URL_FIELDS),
    }
}

fn endpoints(obj: &Value) -> Endpoints {
    let ping = str_field(obj, &["ping"]);
    let telegram_link = str_field(obj, &["telegram_link"]);
    Endpoints {
        ping: if ping.is_empty() { DEFAULT_PING_PATH.to_string() } else { ping },
        telegram_link: if telegram_link.is_empty() {
            DEFAULT_TELEGRAM_START_PATH.to_string()
        } else {
            telegram_link
        },
    }
}

/// Build a complete runtime record from a bootstrap body
///
/// `base` and `token` belong to the handshake that unlocked this bootstrap;
/// they are written into the same record so the swap is a single replace.
pub fn runtime_config(body: &Value, base: &str, token: &str, expires_in: u64) -> RuntimeConfig {
    let null = Value::Null;
    let app = object(body, "app").unwrap_or(&null);
    let telegram = object(body, "telegram").unwrap_or(&null);

    let mut config = RuntimeConfig::new(base);
    config.handshake_token = token.trim().to_string();
    config.handshake_expires_in = expires_in;
    config.app = app_branding(app);
    config.ui = object(body, "ui").map(ui_config).unwrap_or_default();
    config.update = object(body, "update").map(update_policy).unwrap_or_default();
    config.maintenance_mode = bool_field(app, &["maintenance_mode"], false);
    config.maintenance_message = str_field(app, &["maintenance_message"]);
    config.keepalive_on_launch = bool_field(app, &["keepalive_on_launch"], true);
    config.notifications = list_field(body, &["notifications"], notification);
    config.telegram_bot_username = str_field(telegram, &["bot_username"])
        .trim_start_matches('@')
        .to_string();
    config.endpoints = object(body, "endpoints").map(endpoints).unwrap_or_default();
    config
}
