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


//! Session check and the web login round trip
//!
//! Login itself happens in the web shell. The core builds the URL that
//! starts it, and reads the credential out of the deep-link callback that
//! ends it. `GET /app-api/session` only answers "am I logged in" and is
//! safe to call as often as needed.

use crate::api::client::MysticClient;
use crate::api::decode;
use crate::api::models::SessionInfo;
use crate::api::url::append_query;
use crate::error::{MysticError, Result};
use tracing::debug;
use url::Url;

pub const SESSION_PATH: &str = "/app-api/session";
pub const LOGIN_PATH: &str = "/login";

/// Query keys the callback may carry the credential under, in order
const CALLBACK_TOKEN_KEYS: &[&str] = &["token", "session"];

impl MysticClient {
    /// `GET /app-api/session`; `logged_in` defaults to false
    pub async fn fetch_session(&self) -> Result<SessionInfo> {
        let body = self.get_json(SESSION_PATH).await?;
        let info = decode::session_info(&body);
        debug!(logged_in = info.logged_in, "Session checked");
        Ok(info)
    }

    /// Shorthand for `fetch_session().logged_in`
    pub async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.fetch_session().await?.logged_in)
    }

    /// Web login URL that returns to `return_path` and then to the app
    pub fn login_url(&self, return_path: &str) -> String {
        let base = self.absolute_url(LOGIN_PATH);
        let next = match return_path.trim() {
            "" => "/",
            path => path,
        };
        let url = append_query(&base, "next", next);
        let url = append_query(&url, "app", "1");
        append_query(&url, "callback", &self.config().callback_url)
    }

    /// Install the credential carried by a login callback
    ///
    /// # Errors
    /// `InvalidInput` when the callback carries no credential.
    pub fn complete_login(&self, callback: &str) -> Result<()> {
        let token = parse_login_callback(callback)
            .ok_or_else(|| MysticError::invalid_input("Login callback carries no token"))?;
        self.set_session_token(Some(token));
        Ok(())
    }

    /// Forget the credential
    pub fn logout(&self) {
        self.set_session_token(None);
    }
}

/// Credential from a login callback URL, if any
pub fn parse_login_callback(callback: &str) -> Option<String> {
    let url = Url::parse(callback.trim()).ok()?;
    CALLBACK_TOKEN_KEYS.iter().find_map(|key| {
        url.query_pairs()
            .find(|(k, v)| &**k == *key && !v.trim().is_empty())
            .map(|(_, v)| v.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn client() -> MysticClient {
        MysticClient::new(
            AppConfig::builder()
                .default_base_url("https://mm.example/")
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_login_url() {
        let url = client().login_url("/content/dune-2021");
        assert_eq!(
            url,
            "https://mm.example/login?next=%2Fcontent%2Fdune-2021&app=1&callback=mysticmovies%3A%2F%2Fauth"
        );
    }

    #[test]
    fn test_parse_login_callback() {
        assert_eq!(
            parse_login_callback("mysticmovies://auth?token=%2B15550100"),
            Some("+15550100".to_string())
        );
        assert_eq!(
            parse_login_callback("mysticmovies://auth?session=abc&token="),
            Some("abc".to_string())
        );
        assert_eq!(parse_login_callback("mysticmovies://auth?status=cancelled"), None);
        assert_eq!(parse_login_callback("not a url"), None);
    }

    #[test]
    fn test_complete_login() {
        let client = client();
        assert!(client.complete_login("mysticmovies://auth").is_err());
        assert!(!client.has_session_token());

        client.complete_login("mysticmovies://auth?token=abc").unwrap();
        assert_eq!(client.session_token().as_deref(), Some("abc"));

        client.logout();
        assert!(!client.has_session_token());
    }
}
