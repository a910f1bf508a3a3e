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


//! Catalog domain types
//!
//! These are plain values rebuilt on every fetch. Decoding from the wire
//! lives in [`decode`](crate::api::decode); the serde derives here use the
//! same snake_case field names as the API so the types can cross the FFI
//! boundary and the inter-screen hand-off unchanged.
//!
//! The detail tree is strictly owned: `ContentDetail` → `SeasonLink` →
//! `EpisodeRow` → `QualityLink`.

use serde::{Deserialize, Serialize};

// ============================================================================
// CONTENT TYPE
// ============================================================================

/// Movie or series, resolved once at decode time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Movie,
    Series,
}

impl ContentType {
    /// Case-insensitive; anything that is not "series" is a movie
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("series") {
            ContentType::Series
        } else {
            ContentType::Movie
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// One poster card in a list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCard {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub poster: String,
    pub backdrop: String,
    pub description: String,
    pub release_date: String,
    /// Quality badges (movies)
    pub quality_row: Vec<String>,
    /// "2 Seasons" style label (series)
    pub season_text: String,
    pub detail_path: String,
    pub detail_url: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CatalogCard {
    /// Key for `GET /app-api/content/{key}`: slug first, then id
    pub fn content_key(&self) -> &str {
        if self.slug.trim().is_empty() {
            self.id.trim()
        } else {
            self.slug.trim()
        }
    }

    /// Badge line shown under the poster
    pub fn badge_text(&self) -> String {
        match self.content_type {
            ContentType::Movie => self.quality_row.join(" • "),
            ContentType::Series => self.season_text.clone(),
        }
    }
}

/// Hero slider entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderItem {
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub detail_path: String,
    pub detail_url: String,
}

/// Actor card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastProfile {
    pub name: String,
    pub role: String,
    pub image: String,
    pub tmdb_id: i64,
    pub cast_path: String,
}

/// Row layout of a home section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLayout {
    #[default]
    PosterRow,
    CastRow,
}

impl SectionLayout {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("cast_row") {
            SectionLayout::CastRow
        } else {
            SectionLayout::PosterRow
        }
    }
}

/// Home screen row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSection {
    pub key: String,
    pub title: String,
    pub layout: SectionLayout,
    /// Filled for poster rows
    pub items: Vec<CatalogCard>,
    /// Filled for cast rows
    pub cast: Vec<CastProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 0,
            total_items: 0,
            total_pages: 1,
            has_next: false,
            has_prev: false,
        }
    }
}

/// Result of `GET /app-api/catalog`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub filter: String,
    pub sort: String,
    pub query: String,
    pub items: Vec<CatalogCard>,
    pub slider: Vec<SliderItem>,
    pub home_sections: Vec<HomeSection>,
    pub genre_cloud: Vec<String>,
    pub pagination: Pagination,
}

/// Result of `GET /app-api/search/suggestions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestions {
    pub query: String,
    pub items: Vec<CatalogCard>,
    pub trending: Vec<String>,
}

// ============================================================================
// CONTENT DETAIL TREE
// ============================================================================

/// Action URLs for one quality of one movie or episode
///
/// Any URL may be blank; the label alone is still renderable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityLink {
    pub label: String,
    #[serde(default)]
    pub size: u64,
    pub stream_url: String,
    pub view_url: String,
    pub download_url: String,
    pub telegram_url: String,
    pub telegram_start_url: String,
    pub telegram_deep_link: String,
    pub watch_together_url: String,
}

/// Movies carry their quality links directly
pub type MovieLink = QualityLink;

impl QualityLink {
    /// Whether at least one action URL is present
    pub fn has_any_action(&self) -> bool {
        [
            &self.stream_url,
            &self.view_url,
            &self.download_url,
            &self.telegram_url,
            &self.telegram_start_url,
            &self.telegram_deep_link,
            &self.watch_together_url,
        ]
        .iter()
        .any(|u| !u.trim().is_empty())
    }

    /// Label with a human-readable size, e.g. "1080p • 1.4 GB"
    pub fn display_label(&self) -> String {
        if self.size == 0 {
            return self.label.clone();
        }
        format!("{} • {}", self.label, format_size(self.size))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRow {
    pub episode: u32,
    pub title: String,
    pub qualities: Vec<QualityLink>,
}

impl EpisodeRow {
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            format!("Episode {}", self.episode)
        } else {
            format!("E{:02} • {}", self.episode, self.title.trim())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLink {
    pub season: u32,
    pub episode_count: u32,
    /// Distinct quality labels across the season
    pub qualities: Vec<String>,
    pub preview_view_url: String,
    pub preview_stream_url: String,
    pub preview_telegram_start_url: String,
    pub episodes: Vec<EpisodeRow>,
}

/// Descriptive part of a detail page; always shown regardless of login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub poster: String,
    pub backdrop: String,
    pub description: String,
    pub release_date: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub cast: Vec<CastProfile>,
    pub director: String,
    pub trailer_url: String,
    pub trailer_key: String,
    pub trailer_embed_url: String,
}

impl ContentItem {
    /// Best trailer reference: embed URL, then one built from the key, then the raw URL
    pub fn trailer(&self) -> String {
        if !self.trailer_embed_url.trim().is_empty() {
            return self.trailer_embed_url.trim().to_string();
        }
        if !self.trailer_key.trim().is_empty() {
            return format!(
                "https://www.youtube.com/embed/{}?autoplay=1&playsinline=1&rel=0",
                self.trailer_key.trim()
            );
        }
        self.trailer_url.trim().to_string()
    }
}

/// Link tree, chosen by content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "links", rename_all = "lowercase")]
pub enum LinkSet {
    Movie(Vec<MovieLink>),
    Series(Vec<SeasonLink>),
}

impl Default for LinkSet {
    fn default() -> Self {
        LinkSet::Movie(Vec::new())
    }
}

/// Result of `GET /app-api/content/{key}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDetail {
    pub item: ContentItem,
    pub links: LinkSet,
    pub related_items: Vec<CatalogCard>,
    pub detail_path: String,
    pub detail_url: String,
    pub viewer_name: String,
}

impl ContentDetail {
    pub fn movie_links(&self) -> &[MovieLink] {
        match &self.links {
            LinkSet::Movie(links) => links,
            LinkSet::Series(_) => &[],
        }
    }

    pub fn season_links(&self) -> &[SeasonLink] {
        match &self.links {
            LinkSet::Series(seasons) => seasons,
            LinkSet::Movie(_) => &[],
        }
    }

    pub fn season(&self, number: u32) -> Option<&SeasonLink> {
        self.season_links().iter().find(|s| s.season == number)
    }

    /// Total number of quality rows in the tree
    pub fn link_count(&self) -> usize {
        match &self.links {
            LinkSet::Movie(links) => links.len(),
            LinkSet::Series(seasons) => seasons
                .iter()
                .flat_map(|s| s.episodes.iter())
                .map(|e| e.qualities.len())
                .sum(),
        }
    }
}

// ============================================================================
// SESSION / PROFILE
// ============================================================================

/// Result of `GET /app-api/session`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub logged_in: bool,
    pub user_name: String,
    pub user_phone: String,
    pub login_url: String,
}

/// History / continue-watching row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub card: CatalogCard,
    pub display_title: String,
    pub item_id: String,
    pub position: f64,
    pub duration: f64,
    pub watch_url: String,
    pub stream_url: String,
    pub updated_at: String,
}

/// Result of `GET /app-api/profile`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_name: String,
    pub user_phone: String,
    pub watchlist: Vec<CatalogCard>,
    pub continue_watching: Vec<ProgressEntry>,
    pub watch_history: Vec<ProgressEntry>,
}

fn format_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = MB * 1024.0;
    let value = bytes as f64;
    if value >= GB {
        format!("{:.1} GB", value / GB)
    } else {
        format!("{:.0} MB", (value / MB).max(1.0))
    }
}
