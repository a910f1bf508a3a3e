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


//! Tracing setup
//!
//! `RUST_LOG` wins when set. Otherwise `info`, or `debug` when verbose.

use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops because both bridges and the CLI call this on startup.
pub fn init(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose))
        .try_init();
}

/// Show only the first few characters of a credential
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if token.chars().count() <= 6 {
        "*".repeat(token.chars().count())
    } else {
        format!("{}***", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefghijk"), "abcdef***");
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
