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


//! Profile and content requests (login required)

use crate::api::client::MysticClient;
use crate::api::decode::{self, str_field};
use crate::api::models::Profile;
use crate::error::{MysticError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const PROFILE_PATH: &str = "/app-api/profile";
pub const REQUEST_CONTENT_PATH: &str = "/app-api/request-content";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    #[default]
    Movie,
    Series,
    Other,
}

impl RequestType {
    /// Unknown values are coerced to `Movie`, like the server does
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "series" => RequestType::Series,
            "other" => RequestType::Other,
            _ => RequestType::Movie,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Movie => "movie",
            RequestType::Series => "series",
            RequestType::Other => "other",
        }
    }
}

/// Server acknowledgement of a content request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReceipt {
    pub request_id: String,
    pub status: String,
    pub message: String,
}

impl MysticClient {
    /// `GET /app-api/profile`
    ///
    /// Logged-out callers get `Unauthorized` from every host.
    pub async fn fetch_profile(&self) -> Result<Profile> {
        let body = self.get_json(PROFILE_PATH).await?;
        Ok(decode::profile(&body))
    }

    /// `POST /app-api/request-content`
    pub async fn request_content(
        &self,
        title: &str,
        note: &str,
        request_type: RequestType,
    ) -> Result<RequestReceipt> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MysticError::invalid_input("Title is required"));
        }

        let body = json!({
            "title": title,
            "note": note.trim(),
            "request_type": request_type.as_str(),
        });
        let response = self.post_json(REQUEST_CONTENT_PATH, &body).await?;

        Ok(RequestReceipt {
            request_id: str_field(&response, &["request_id", "id"]),
            status: str_field(&response, &["status"]),
            message: str_field(&response, &["message"]),
        })
    }
}
