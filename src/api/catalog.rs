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


//! Catalog listing and search suggestions
//!
//! # Endpoints
//!
//! **GET** `/app-api/catalog?filter=&sort=&page=&per_page=&q=`
//! - `items[]`, `slider[]`, `home_sections[]`, `genre_cloud[]`, `pagination`
//!
//! **GET** `/app-api/search/suggestions?q=&limit=`
//! - `items[]`, `trending[]`
//!
//! Both go through host failover.

use crate::api::client::MysticClient;
use crate::api::decode;
use crate::api::models::{CatalogPage, SearchSuggestions};
use crate::api::url::with_query;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CATALOG_PATH: &str = "/app-api/catalog";
pub const SEARCH_SUGGESTIONS_PATH: &str = "/app-api/search/suggestions";

/// Smallest and largest page size the server accepts
pub const PER_PAGE_RANGE: (u32, u32) = (6, 60);
pub const DEFAULT_PER_PAGE: u32 = 24;

/// Shorter queries are answered locally with nothing
pub const MIN_SEARCH_CHARS: usize = 2;
pub const SEARCH_LIMIT_RANGE: (u32, u32) = (5, 20);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFilter {
    #[default]
    All,
    Movies,
    Series,
}

impl CatalogFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogFilter::All => "all",
            CatalogFilter::Movies => "movies",
            CatalogFilter::Series => "series",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "movies" | "movie" => CatalogFilter::Movies,
            "series" => CatalogFilter::Series,
            _ => CatalogFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    #[default]
    ReleaseNew,
    ReleaseOld,
    TitleAsc,
    TitleDesc,
}

impl CatalogSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogSort::ReleaseNew => "release_new",
            CatalogSort::ReleaseOld => "release_old",
            CatalogSort::TitleAsc => "title_asc",
            CatalogSort::TitleDesc => "title_desc",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "release_old" => CatalogSort::ReleaseOld,
            "title_asc" => CatalogSort::TitleAsc,
            "title_desc" => CatalogSort::TitleDesc,
            _ => CatalogSort::ReleaseNew,
        }
    }
}

/// Catalog request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub sort: CatalogSort,
    pub page: u32,
    pub per_page: u32,
    pub query: String,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            filter: CatalogFilter::All,
            sort: CatalogSort::ReleaseNew,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            query: String::new(),
        }
    }
}

impl CatalogQuery {
    /// Endpoint path with the clamped query string
    pub fn to_path(&self) -> String {
        let mut params = vec![
            ("filter", self.filter.as_str().to_string()),
            ("sort", self.sort.as_str().to_string()),
            ("page", self.page.max(1).to_string()),
            (
                "per_page",
                self.per_page
                    .clamp(PER_PAGE_RANGE.0, PER_PAGE_RANGE.1)
                    .to_string(),
            ),
        ];
        let query = self.query.trim();
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        }
        with_query(CATALOG_PATH, &params)
    }
}

impl MysticClient {
    /// Fetch one catalog page
    pub async fn fetch_catalog(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        let body = self.get_json(&query.to_path()).await?;
        let page = decode::catalog_page(&body);
        debug!(
            items = page.items.len(),
            sections = page.home_sections.len(),
            page = page.pagination.page,
            "Catalog page decoded"
        );
        Ok(page)
    }

    /// Fetch search suggestions
    ///
    /// Queries shorter than two characters return an empty result without
    /// touching the network.
    pub async fn search_suggestions(&self, query: &str, limit: u32) -> Result<SearchSuggestions> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(SearchSuggestions {
                query: query.to_string(),
                ..Default::default()
            });
        }

        let path = with_query(
            SEARCH_SUGGESTIONS_PATH,
            &[
                ("q", query.to_string()),
                (
                    "limit",
                    limit
                        .clamp(SEARCH_LIMIT_RANGE.0, SEARCH_LIMIT_RANGE.1)
                        .to_string(),
                ),
            ],
        );
        let body = self.get_json(&path).await?;
        Ok(decode::search_suggestions(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_path_clamps() {
        let query = CatalogQuery {
            filter: CatalogFilter::Series,
            sort: CatalogSort::TitleAsc,
            page: 0,
            per_page: 500,
            query: "  dark ".to_string(),
        };
        assert_eq!(
            query.to_path(),
            "/app-api/catalog?filter=series&sort=title_asc&page=1&per_page=60&q=dark"
        );

        let query = CatalogQuery {
            per_page: 1,
            ..Default::default()
        };
        assert_eq!(
            query.to_path(),
            "/app-api/catalog?filter=all&sort=release_new&page=1&per_page=6"
        );
    }

    #[test]
    fn test_parse_filter_and_sort() {
        assert_eq!(CatalogFilter::parse("MOVIES"), CatalogFilter::Movies);
        assert_eq!(CatalogFilter::parse("anything"), CatalogFilter::All);
        assert_eq!(CatalogSort::parse("title_desc"), CatalogSort::TitleDesc);
        assert_eq!(CatalogSort::parse(""), CatalogSort::ReleaseNew);
    }

    #[tokio::test]
    async fn test_short_search_is_local() {
        // Unroutable hosts: any network attempt would fail the call
        let config = crate::config::AppConfig::builder()
            .default_base_url("http://127.0.0.1:9")
            .fallback_base_urls(vec![])
            .build();
        let client = MysticClient::new(config).unwrap();
        let result = client.search_suggestions(" a ", 10).await.unwrap();
        assert_eq!(result.query, "a");
        assert!(result.items.is_empty());
    }
}
