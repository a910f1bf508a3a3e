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


//! URL helpers
//!
//! The server hands out a mix of absolute URLs and site-relative paths
//! (`/s/{token}`, `/app-api/image?src=...`). Everything that leaves the core
//! goes through [`absolute_url`] so a path is resolved against the current
//! API base exactly once.

use url::Url;

/// Trim whitespace and trailing slashes from a base URL
pub fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// True for `http://` and `https://` URLs (scheme is case-insensitive)
pub fn is_absolute(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolve a path against `base`; absolute URLs are returned untouched
///
/// Blank input yields an empty string so callers can keep treating "blank"
/// as "not available".
pub fn absolute_url(base: &str, path_or_url: &str) -> String {
    let raw = path_or_url.trim();
    if raw.is_empty() {
        return String::new();
    }
    if is_absolute(raw) {
        return raw.to_string();
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{}", rest);
    }

    let base = normalize_base(base);
    if raw.starts_with('/') {
        format!("{}{}", base, raw)
    } else {
        format!("{}/{}", base, raw)
    }
}

/// Take the path component that follows `marker`
///
/// `extract_after_marker("https://host/t/abc123/x", "/t/")` is `Some("abc123")`.
/// Works on absolute URLs and bare paths. Query and fragment are ignored.
pub fn extract_after_marker(value: &str, marker: &str) -> Option<String> {
    let raw = value.trim();
    if raw.is_empty() || marker.is_empty() {
        return None;
    }

    let path = match Url::parse(raw) {
        Ok(url) if is_absolute(raw) => url.path().to_string(),
        _ => raw
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let start = path.find(marker)? + marker.len();
    let token = path[start..]
        .split('/')
        .next()
        .unwrap_or_default()
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(urlencoding::decode(token).map(|t| t.into_owned()).unwrap_or_else(|_| token.to_string()))
    }
}

/// Append `key=value` to a URL, keeping any fragment at the end
pub fn append_query(url: &str, key: &str, value: &str) -> String {
    let raw = url.trim();
    if is_absolute(raw) {
        if let Ok(mut parsed) = Url::parse(raw) {
            parsed.query_pairs_mut().append_pair(key, value);
            return parsed.to_string();
        }
    }

    let (head, fragment) = match raw.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (raw, None),
    };
    let separator = if head.contains('?') {
        if head.ends_with('?') || head.ends_with('&') {
            ""
        } else {
            "&"
        }
    } else {
        "?"
    };
    let mut out = format!(
        "{}{}{}={}",
        head,
        separator,
        urlencoding::encode(key),
        urlencoding::encode(value)
    );
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Build `path?k=v&...` with every value percent-encoded
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

/// Percent-encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment.trim()).into_owned()
}
