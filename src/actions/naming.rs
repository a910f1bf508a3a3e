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


//! Download file naming
//!
//! `{title}_{quality}_{yyyyMMdd_HHmmss}.mp4`, restricted to `[A-Za-z0-9._-]`.

use chrono::{DateTime, Local, TimeZone};

pub const DOWNLOAD_EXTENSION: &str = "mp4";
pub const MAX_TITLE_CHARS: usize = 60;
pub const MAX_QUALITY_CHARS: usize = 12;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Replace disallowed characters with `_`, collapse runs, cap the length
///
/// Returns `fallback` when nothing usable is left.
pub fn sanitize_component(text: &str, max_chars: usize, fallback: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.trim().chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' && result.ends_with('_') {
            continue;
        }
        result.push(c);
    }

    let trimmed: String = result
        .trim_matches(|c| c == '_' || c == '.')
        .chars()
        .take(max_chars)
        .collect();
    let trimmed = trimmed.trim_end_matches(|c| c == '_' || c == '.');

    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name for a download started at `at`
pub fn download_filename<Tz: TimeZone>(title: &str, quality: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}.{}",
        sanitize_component(title, MAX_TITLE_CHARS, "video"),
        sanitize_component(quality, MAX_QUALITY_CHARS, "file"),
        at.format(TIMESTAMP_FORMAT),
        DOWNLOAD_EXTENSION
    )
}

/// File name for a download started now, in local time
pub fn download_filename_now(title: &str, quality: &str) -> String {
    download_filename(title, quality, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename("Dune: Part Two", "1080p HDR", &at()),
            "Dune_Part_Two_1080p_HDR_20240309_070501.mp4"
        );
    }

    #[test]
    fn test_blank_parts_fall_back() {
        assert_eq!(download_filename("  ", "", &at()), "video_file_20240309_070501.mp4");
        assert_eq!(download_filename("???", "!!", &at()), "video_file_20240309_070501.mp4");
    }

    #[test]
    fn test_only_allowed_characters() {
        let name = download_filename("Amélie / 東京 (2001)", "4K•Dolby", &at());
        assert!(name.chars().all(is_allowed));
        assert!(!name.contains("__"));
    }

    #[test]
    fn test_truncation() {
        let title = "a".repeat(100);
        let name = sanitize_component(&title, MAX_TITLE_CHARS, "video");
        assert_eq!(name.len(), 60);

        assert_eq!(sanitize_component("1080p-WEB-DL-HEVC", MAX_QUALITY_CHARS, "file"), "1080p-WEB-DL");
        assert_eq!(sanitize_component("12345678901 x", MAX_QUALITY_CHARS, "file"), "12345678901");
    }
}
