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


//! Content detail and the season hand-off
//!
//! **GET** `/app-api/content/{key}` returns the item plus either
//! `movie_links[]` or `series_links[]`, chosen by the item's type.
//!
//! The season screen is opened with a single [`SeasonLink`] passed from the
//! detail screen. The hand-off payload is the season encoded as JSON with the
//! API's own field names. It decodes back field for field; payloads that do
//! not match the current shape fall back to the tolerant network decoder.

use crate::api::client::MysticClient;
use crate::api::decode;
use crate::api::models::{ContentDetail, SeasonLink};
use crate::api::url::encode_segment;
use crate::error::{MysticError, Result};
use serde_json::Value;
use tracing::debug;

pub const CONTENT_PATH: &str = "/app-api/content";

/// `/app-api/content/{key}` with the key percent-encoded
pub fn content_path(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(MysticError::invalid_input("Content key is blank"));
    }
    Ok(format!("{}/{}", CONTENT_PATH, encode_segment(key)))
}

impl MysticClient {
    /// Fetch the detail tree for a slug or id
    ///
    /// The fetch does not depend on login state; gating of the link actions
    /// happens in [`crate::access`].
    pub async fn fetch_content_detail(&self, key: &str) -> Result<ContentDetail> {
        let path = content_path(key)?;
        let body = self.get_json(&path).await?;
        let detail = decode::content_detail(&body);
        debug!(
            key,
            kind = detail.item.content_type.as_str(),
            links = detail.link_count(),
            "Content detail decoded"
        );
        Ok(detail)
    }
}

/// Encode a season for the season screen
pub fn encode_season(season: &SeasonLink) -> Result<String> {
    Ok(serde_json::to_string(season)?)
}

/// Decode a season hand-off payload
///
/// A payload produced by [`encode_season`] comes back unchanged. One built by
/// an older app version with missing fields goes through the tolerant
/// decoder instead, so it still opens.
pub fn decode_season(payload: &str) -> Result<SeasonLink> {
    let value: Value = serde_json::from_str(payload)?;
    if !value.is_object() {
        return Err(MysticError::invalid_input("Season payload is not an object"));
    }
    match serde_json::from_value::<SeasonLink>(value.clone()) {
        Ok(season) => Ok(season),
        Err(e) => {
            debug!(error = %e, "Season payload is not current, decoding tolerantly");
            decode::season_link(&value)
                .ok_or_else(|| MysticError::invalid_input("Season payload is malformed"))
        }
    }
}
