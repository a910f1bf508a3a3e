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


//! Row types for the local database
//!
//! DateTime columns are stored as ISO 8601 TEXT.

use crate::api::runtime::RuntimeConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Seconds watched before an item counts as started
pub const RESUME_MIN_POSITION_SECS: f64 = 20.0;
/// Seconds from the end after which an item counts as finished
pub const RESUME_TAIL_SECS: f64 = 30.0;

/// Resume position for one item
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PlaybackProgress {
    pub item_id: String,
    pub title: String,
    pub position: f64,
    pub duration: f64,
    pub updated_at: DateTime<Utc>,
}

impl PlaybackProgress {
    pub fn new<I: Into<String>, T: Into<String>>(
        item_id: I,
        title: T,
        position: f64,
        duration: f64,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            title: title.into(),
            position: position.max(0.0),
            duration: duration.max(0.0),
            updated_at: Utc::now(),
        }
    }

    /// Started but not finished
    pub fn is_resumable(&self) -> bool {
        self.position > RESUME_MIN_POSITION_SECS
            && self.position < self.duration - RESUME_TAIL_SECS
    }

    /// Watched fraction in 0..=1, 0 when the duration is unknown
    pub fn fraction(&self) -> f64 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.position / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// The single `runtime_config` row
#[derive(Debug, Clone, FromRow)]
pub struct StoredRuntimeConfig {
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

impl StoredRuntimeConfig {
    /// Serialize a record without its handshake token
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            payload: serde_json::to_string(&config.without_credentials())?,
            updated_at: Utc::now(),
        })
    }

    pub fn to_config(&self) -> Result<RuntimeConfig> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resumable_window() {
        assert!(!PlaybackProgress::new("a", "A", 10.0, 600.0).is_resumable());
        assert!(PlaybackProgress::new("a", "A", 21.0, 600.0).is_resumable());
        assert!(!PlaybackProgress::new("a", "A", 575.0, 600.0).is_resumable());
        assert!(!PlaybackProgress::new("a", "A", 100.0, 0.0).is_resumable());
    }

    #[test]
    fn test_negative_values_clamped() {
        let p = PlaybackProgress::new("a", "A", -5.0, -1.0);
        assert_eq!(p.position, 0.0);
        assert_eq!(p.duration, 0.0);
        assert_eq!(p.fraction(), 0.0);
    }

    #[test]
    fn test_stored_config_drops_token() {
        let mut config = RuntimeConfig::new("https://a.example");
        config.handshake_token = "secret".to_string();
        config.maintenance_mode = true;

        let stored = StoredRuntimeConfig::from_config(&config).unwrap();
        assert!(!stored.payload.contains("secret"));

        let restored = stored.to_config().unwrap();
        assert!(restored.handshake_token.is_empty());
        assert!(restored.maintenance_mode);
        assert_eq!(restored.api_base_url, "https://a.example");
    }
}
