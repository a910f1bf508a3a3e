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


//! Host failover
//!
//! Every read goes through [`run_candidates`]: hosts are tried strictly in
//! order, one at a time, and each attempt produces an [`Outcome`]. The pure
//! reducer [`decide`] turns an outcome into a [`Step`]:
//!
//! | Outcome | Step |
//! |---|---|
//! | 2xx with `ok=true` | `Return` |
//! | HTTP 404 | `Stop` (no further hosts) |
//! | transport error, 401, 5xx, other status, `ok=false` | `Continue` |
//!
//! When the list runs out the last recorded error is returned.

use crate::error::MysticError;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, info, warn};

/// Message recorded when a 2xx body does not carry `ok=true` and no reason
pub const INVALID_API_RESPONSE: &str = "Invalid API response";

/// Result of one attempt against one host
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Failure(MysticError),
}

/// What the loop does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Success, hand the value back
    Return,
    /// Record the error and try the next host
    Continue,
    /// Record the error and give up on the remaining hosts
    Stop,
}

/// Pure reducer from an attempt's outcome to the next step
pub fn decide<T>(outcome: &Outcome<T>) -> Step {
    match outcome {
        Outcome::Success(_) => Step::Return,
        Outcome::Failure(e) if e.short_circuits() => Step::Stop,
        Outcome::Failure(_) => Step::Continue,
    }
}

/// Everything the loop learned
#[derive(Debug)]
pub struct FailoverReport<T> {
    pub result: Result<T, MysticError>,
    /// Host that produced the success
    pub winner: Option<String>,
    /// Hosts contacted, in order
    pub attempted: Vec<String>,
}

/// Try `attempt` on each host in order until one succeeds or a 404 stops it
pub async fn run_candidates<T, F, Fut>(candidates: &[String], mut attempt: F) -> FailoverReport<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    let mut last_error: Option<MysticError> = None;
    let mut attempted = Vec::with_capacity(candidates.len());

    for base in candidates {
        attempted.push(base.clone());
        let outcome = attempt(base.clone()).await;

        match decide(&outcome) {
            Step::Return => {
                if let Outcome::Success(value) = outcome {
                    info!(host = %base, attempts = attempted.len(), "API host answered");
                    return FailoverReport {
                        result: Ok(value),
                        winner: Some(base.clone()),
                        attempted,
                    };
                }
            }
            Step::Stop => {
                if let Outcome::Failure(e) = outcome {
                    warn!(host = %base, error = %e, "API not deployed, not trying other hosts");
                    last_error = Some(e);
                }
                break;
            }
            Step::Continue => {
                if let Outcome::Failure(e) = outcome {
                    debug!(host = %base, error = %e, "API host failed, trying next");
                    last_error = Some(e);
                }
            }
        }
    }

    FailoverReport {
        result: Err(last_error.unwrap_or_else(|| MysticError::transport("network error", None))),
        winner: None,
        attempted,
    }
}

/// Map a non-success HTTP status to the error it records
///
/// Returns `None` for 2xx.
pub fn classify_status(status: u16, endpoint: &str, host: &str) -> Option<MysticError> {
    match status {
        200..=299 => None,
        404 => Some(MysticError::NotDeployed {
            endpoint: endpoint.to_string(),
            host: host.to_string(),
        }),
        401 => Some(MysticError::Unauthorized {
            endpoint: endpoint.to_string(),
            host: host.to_string(),
        }),
        500..=599 => Some(MysticError::ServerError {
            status_code: status,
            host: host.to_string(),
        }),
        other => Some(MysticError::HttpStatus {
            status_code: other,
            host: host.to_string(),
        }),
    }
}

/// Validate the `{ "ok": true, ... }` envelope of a 2xx body
pub fn check_envelope(body: &str) -> Result<Value, MysticError> {
    let value: Value = serde_json::from_str(body).map_err(|_| MysticError::Protocol {
        message: INVALID_API_RESPONSE.to_string(),
        response_body: Some(snippet(body)),
    })?;

    if value.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(value);
    }

    let message = ["error", "message", "detail"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or(INVALID_API_RESPONSE)
        .to_string();

    Err(MysticError::Protocol {
        message,
        response_body: Some(snippet(body)),
    })
}

fn snippet(body: &str) -> String {
    body.chars().take(400).collect()
}
