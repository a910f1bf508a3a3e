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


//! Error types for the mobile core
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are grouped by where they come from:
//!
//! ### Host iteration (one per candidate attempt)
//! - `Transport` - connect/read/write failure or timeout, next candidate is tried
//! - `NotDeployed` - HTTP 404, stops the whole candidate loop
//! - `Unauthorized` - HTTP 401, next candidate is tried
//! - `ServerError` - HTTP 5xx, next candidate is tried
//! - `HttpStatus` - any other non-2xx, next candidate is tried
//! - `Protocol` - `ok=false` or an undecodable body, next candidate is tried
//!
//! ### Action resolution (shown to the user with their own copy)
//! - `NotAvailable` - the URL field behind an action is blank, no network attempted
//! - `ExchangeFailed` - a secondary round trip (Telegram deep link) failed
//!
//! ### Local
//! - configuration, persistence, cancellation and internal errors
//!
//! Nothing here is fatal to the process. Every public fetch returns a
//! `Result` and the UI degrades to an empty state on `Err`.

use thiserror::Error;

/// Result type alias using our MysticError type
pub type Result<T> = std::result::Result<T, MysticError>;

/// Generic copy shown for every host-iteration failure
pub const GENERIC_LOAD_FAILURE: &str = "Unable to load content.";

/// Main error type for the mobile core
#[derive(Error, Debug)]
pub enum MysticError {
    // ===== Host iteration errors =====

    /// Network-level failure (DNS, connect, timeout, reset)
    #[error("Network error: {message}")]
    Transport {
        message: String,
        /// Base URL that was being contacted
        host: Option<String>,
    },

    /// HTTP 404 - the API is not present on this deployment
    #[error("API endpoint not deployed: {endpoint}")]
    NotDeployed {
        endpoint: String,
        host: String,
    },

    /// HTTP 401
    #[error("Unauthorized: {endpoint}")]
    Unauthorized {
        endpoint: String,
        host: String,
    },

    /// HTTP 5xx
    #[error("Server error ({status_code})")]
    ServerError {
        status_code: u16,
        host: String,
    },

    /// Any other non-success status
    #[error("HTTP {status_code}")]
    HttpStatus {
        status_code: u16,
        host: String,
    },

    /// Logical failure: `ok=false`, missing `ok`, or a body that is not JSON
    #[error("{message}")]
    Protocol {
        message: String,
        /// Response body snippet for debugging
        response_body: Option<String>,
    },

    // ===== Action resolution errors =====

    /// The requested action has no usable URL
    #[error("{action} is not available for this item")]
    NotAvailable {
        action: String,
    },

    /// A secondary exchange failed after the primary data was available
    #[error("Could not open {target}: {reason}")]
    ExchangeFailed {
        target: String,
        reason: String,
    },

    /// A link action was used while the screen's session is not authenticated
    #[error("Login required")]
    LoginRequired,

    // ===== Local errors =====

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration file or value is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// The owning screen was torn down before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal error that should not normally occur
    #[error("Internal error: {0}")]
    Internal(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest (client construction, header encoding)
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

// Helper methods for creating common errors
impl MysticError {
    /// Create a Transport error
    pub fn transport<S: Into<String>>(message: S, host: Option<String>) -> Self {
        MysticError::Transport {
            message: message.into(),
            host,
        }
    }

    /// Create a Protocol error without a body snippet
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        MysticError::Protocol {
            message: message.into(),
            response_body: None,
        }
    }

    /// Create a NotAvailable error for an action name
    pub fn not_available<S: Into<String>>(action: S) -> Self {
        MysticError::NotAvailable {
            action: action.into(),
        }
    }

    /// Create an ExchangeFailed error
    pub fn exchange_failed<S: Into<String>, R: Into<String>>(target: S, reason: R) -> Self {
        MysticError::ExchangeFailed {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        MysticError::InvalidInput(message.into())
    }

    /// Create an Internal error with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        MysticError::Internal(message.into())
    }

    /// Whether this error stops the candidate loop outright
    ///
    /// Only a 404 does: a host that answered with 404 proves the network is
    /// fine and the API itself is missing.
    pub fn short_circuits(&self) -> bool {
        matches!(self, MysticError::NotDeployed { .. })
    }

    /// Whether the next candidate host should be tried after this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MysticError::Transport { .. }
                | MysticError::Unauthorized { .. }
                | MysticError::ServerError { .. }
                | MysticError::HttpStatus { .. }
                | MysticError::Protocol { .. }
        )
    }

    /// Whether the error came out of host iteration
    pub fn is_host_error(&self) -> bool {
        self.is_retryable() || self.short_circuits()
    }

    /// Whether the error carries its own user-facing copy
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            MysticError::NotAvailable { .. }
                | MysticError::ExchangeFailed { .. }
                | MysticError::LoginRequired
        )
    }

    /// Short reason appended to the generic failure copy
    pub fn reason(&self) -> String {
        match self {
            MysticError::Transport { .. } => "network error".to_string(),
            MysticError::NotDeployed { .. } => "App API not deployed on server".to_string(),
            MysticError::Unauthorized { .. } => "unauthorized".to_string(),
            MysticError::ServerError { .. } => "server error".to_string(),
            MysticError::HttpStatus { status_code, .. } => format!("HTTP {}", status_code),
            MysticError::Protocol { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Get user-friendly error message suitable for display
    ///
    /// All host-iteration errors collapse into one generic message with the
    /// concrete reason appended.
    pub fn user_message(&self) -> String {
        match self {
            MysticError::NotAvailable { action } => {
                format!("{} is not available for this item.", capitalize(action))
            }
            MysticError::ExchangeFailed { target, .. } => {
                format!("Could not open {}. Please try again.", target)
            }
            MysticError::LoginRequired => "Log in to use this link.".to_string(),
            MysticError::Cancelled => String::new(),
            e if e.is_host_error() => format!("{} {}", GENERIC_LOAD_FAILURE, e.reason()),
            _ => GENERIC_LOAD_FAILURE.to_string(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_not_deployed_short_circuits() {
        let not_deployed = MysticError::NotDeployed {
            endpoint: "/app-api/catalog".to_string(),
            host: "https://a".to_string(),
        };
        assert!(not_deployed.short_circuits());
        assert!(!not_deployed.is_retryable());

        let unauthorized = MysticError::Unauthorized {
            endpoint: "/app-api/catalog".to_string(),
            host: "https://a".to_string(),
        };
        assert!(!unauthorized.short_circuits());
        assert!(unauthorized.is_retryable());
    }

    #[test]
    fn test_user_message_collapses_host_errors() {
        let err = MysticError::ServerError {
            status_code: 502,
            host: "https://a".to_string(),
        };
        assert_eq!(err.user_message(), "Unable to load content. server error");

        let err = MysticError::protocol("Content not found");
        assert_eq!(err.user_message(), "Unable to load content. Content not found");
    }

    #[test]
    fn test_user_message_for_actions() {
        let err = MysticError::not_available("download");
        assert!(err.is_user_facing());
        assert_eq!(err.user_message(), "Download is not available for this item.");

        let err = MysticError::exchange_failed("Telegram", "HTTP 400");
        assert!(err.is_user_facing());
        assert!(err.user_message().contains("Telegram"));

        let err = MysticError::LoginRequired;
        assert!(err.is_user_facing());
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Log in to use this link.");
    }

    #[test]
    fn test_not_deployed_reason() {
        let err = MysticError::NotDeployed {
            endpoint: "/app-api/catalog".to_string(),
            host: "https://a".to_string(),
        };
        assert!(err.reason().contains("not deployed"));
        assert!(err.to_string().contains("not deployed"));
    }
}
