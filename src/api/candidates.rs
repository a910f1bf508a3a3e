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


//! Candidate API hosts
//!
//! Order: the sticky host from the runtime record, the compiled-in default,
//! then the fixed fallbacks. Trailing slashes are trimmed, blanks dropped and
//! duplicates removed keeping the first occurrence. No network access.

use crate::api::runtime::RuntimeConfig;
use crate::api::url::normalize_base;
use crate::config::AppConfig;

/// Ordered, de-duplicated list of hosts to try
pub fn candidates(runtime: &RuntimeConfig, config: &AppConfig) -> Vec<String> {
    let cached = std::iter::once(runtime.api_base_url.as_str());
    let default = std::iter::once(config.default_base_url.as_str());
    let fallbacks = config.fallback_base_urls.iter().map(String::as_str);

    dedup_bases(cached.chain(default).chain(fallbacks))
}

/// Normalize and de-duplicate a sequence of base URLs, keeping order
pub fn dedup_bases<'a, I>(bases: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = Vec::new();
    for base in bases {
        let base = normalize_base(base);
        if base.is_empty() || out.iter().any(|b| b.eq_ignore_ascii_case(&base)) {
            continue;
        }
        out.push(base);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::builder()
            .default_base_url("https://default.example/")
            .fallback_base_urls(vec![
                "https://fallback.example".to_string(),
                " ".to_string(),
                "https://default.example".to_string(),
            ])
            .build()
    }

    #[test]
    fn test_order_cached_default_fallback() {
        let runtime = RuntimeConfig::new("https://cached.example/");
        let list = candidates(&runtime, &config());
        assert_eq!(
            list,
            vec![
                "https://cached.example",
                "https://default.example",
                "https://fallback.example",
            ]
        );
    }

    #[test]
    fn test_cached_equal_to_default_is_deduplicated() {
        let runtime = RuntimeConfig::new("https://default.example");
        let list = candidates(&runtime, &config());
        assert_eq!(list, vec!["https://default.example", "https://fallback.example"]);
    }

    #[test]
    fn test_deterministic() {
        let runtime = RuntimeConfig::new("https://cached.example");
        assert_eq!(candidates(&runtime, &config()), candidates(&runtime, &config()));
    }

    #[test]
    fn test_never_blank() {
        let runtime = RuntimeConfig::new("");
        let list = candidates(&runtime, &config());
        assert!(list.iter().all(|b| !b.is_empty() && !b.ends_with('/')));
    }
}
