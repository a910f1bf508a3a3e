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


//! Access resolution for detail, season and episode screens
//!
//! Content is always fetched and shown; only the link actions are gated.
//!
//! ```text
//!              ScreenEntered
//!                    │
//!               Unresolved ──SessionChecked(false)──► Anonymous
//!                    │                                    │ LoginRequested → OpenLogin
//!          SessionChecked(true)                           │ LoginCallback / Resumed → CheckSession
//!                    ▼                                    ▼
//!              Authenticated ◄────SessionChecked(true)────┘
//! ```
//!
//! [`AccessMachine`] is pure: events in, effects out. [`AccessController`]
//! runs the effects against an [`AccessBackend`] inside a [`ScreenScope`], so
//! a torn-down screen drops whatever was still in flight.

use crate::api::client::MysticClient;
use crate::api::models::ContentDetail;
use crate::error::{MysticError, Result};
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    Unresolved,
    Anonymous,
    Authenticated,
}

/// How the link rows render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkGate {
    /// Session not known yet; links hidden
    Pending,
    /// One login prompt instead of the link rows
    LoginPrompt,
    /// Resolved actions
    Actions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEvent {
    ScreenEntered,
    ContentLoaded,
    ContentFailed,
    SessionChecked { logged_in: bool },
    SessionCheckFailed,
    LoginRequested,
    /// The web login returned a credential
    LoginCallback,
    /// The screen came back to the foreground
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessEffect {
    FetchContent,
    CheckSession,
    OpenLogin,
    Render(LinkGate),
}

/// Pure access state machine for one screen
#[derive(Debug, Clone)]
pub struct AccessMachine {
    state: AccessState,
    content_loaded: bool,
    login_requested: bool,
    recheck_after_login: bool,
    history: Vec<AccessState>,
}

impl Default for AccessMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessMachine {
    pub fn new() -> Self {
        Self {
            state: AccessState::Unresolved,
            content_loaded: false,
            login_requested: false,
            recheck_after_login: false,
            history: vec![AccessState::Unresolved],
        }
    }

    pub fn state(&self) -> AccessState {
        self.state
    }

    pub fn content_loaded(&self) -> bool {
        self.content_loaded
    }

    pub fn login_requested(&self) -> bool {
        self.login_requested
    }

    /// States entered so far, in order
    pub fn history(&self) -> &[AccessState] {
        &self.history
    }

    pub fn gate(&self) -> LinkGate {
        match self.state {
            AccessState::Unresolved => LinkGate::Pending,
            AccessState::Anonymous => LinkGate::LoginPrompt,
            AccessState::Authenticated => LinkGate::Actions,
        }
    }

    fn transition(&mut self, next: AccessState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, "Access state");
            self.state = next;
            self.history.push(next);
        }
    }

    /// Apply an event and return what has to happen next
    pub fn handle(&mut self, event: AccessEvent) -> Vec<AccessEffect> {
        debug!(?event, state = ?self.state, "Access event");
        match event {
            AccessEvent::ScreenEntered => {
                let mut effects = Vec::with_capacity(2);
                if !self.content_loaded {
                    effects.push(AccessEffect::FetchContent);
                }
                effects.push(AccessEffect::CheckSession);
                effects
            }

            AccessEvent::ContentLoaded => {
                self.content_loaded = true;
                vec![AccessEffect::Render(self.gate())]
            }

            AccessEvent::ContentFailed => vec![AccessEffect::Render(self.gate())],

            AccessEvent::SessionChecked { logged_in } => {
                let next = if logged_in {
                    AccessState::Authenticated
                } else {
                    AccessState::Anonymous
                };
                self.transition(next);

                let after_login = std::mem::take(&mut self.recheck_after_login);
                if after_login && logged_in && !self.content_loaded {
                    vec![AccessEffect::FetchContent]
                } else {
                    vec![AccessEffect::Render(self.gate())]
                }
            }

            AccessEvent::SessionCheckFailed => {
                self.recheck_after_login = false;
                self.transition(AccessState::Anonymous);
                vec![AccessEffect::Render(self.gate())]
            }

            AccessEvent::LoginRequested => {
                if self.state == AccessState::Authenticated {
                    return Vec::new();
                }
                self.login_requested = true;
                vec![AccessEffect::OpenLogin]
            }

            AccessEvent::LoginCallback => {
                self.login_requested = false;
                self.recheck_after_login = true;
                vec![AccessEffect::CheckSession]
            }

            AccessEvent::Resumed => {
                if !self.login_requested {
                    return Vec::new();
                }
                self.login_requested = false;
                self.recheck_after_login = true;
                vec![AccessEffect::CheckSession]
            }
        }
    }
}

// ============================================================================
// CANCELLATION
// ============================================================================

/// Lifetime of one screen
///
/// Closing the scope makes every pending [`ScreenScope::run`] resolve to
/// `Err(Cancelled)` immediately.
#[derive(Debug, Clone, Default)]
pub struct ScreenScope {
    token: CancellationToken,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope that closes with this one but can also close on its own
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `fut` unless the scope closes first
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_closed() {
            return Err(MysticError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(MysticError::Cancelled),
            result = fut => result,
        }
    }
}

// ============================================================================
// DRIVER
// ============================================================================

/// Network operations the access flow needs
pub trait AccessBackend {
    fn check_session(&self) -> impl Future<Output = Result<bool>>;
    fn load_content(&self, key: &str) -> impl Future<Output = Result<ContentDetail>>;
}

impl AccessBackend for MysticClient {
    fn check_session(&self) -> impl Future<Output = Result<bool>> {
        self.is_logged_in()
    }

    fn load_content(&self, key: &str) -> impl Future<Output = Result<ContentDetail>> {
        let key = key.to_string();
        async move { self.fetch_content_detail(&key).await }
    }
}

/// Runs an [`AccessMachine`] for one content screen
pub struct AccessController<B: AccessBackend> {
    backend: B,
    key: String,
    scope: ScreenScope,
    machine: AccessMachine,
    content: Option<ContentDetail>,
    last_error: Option<MysticError>,
}

impl<B: AccessBackend> AccessController<B> {
    pub fn new<K: Into<String>>(backend: B, key: K, scope: ScreenScope) -> Self {
        Self {
            backend,
            key: key.into(),
            scope,
            machine: AccessMachine::new(),
            content: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> AccessState {
        self.machine.state()
    }

    pub fn gate(&self) -> LinkGate {
        self.machine.gate()
    }

    pub fn machine(&self) -> &AccessMachine {
        &self.machine
    }

    pub fn content(&self) -> Option<&ContentDetail> {
        self.content.as_ref()
    }

    /// Content key this screen shows
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gate for the link actions
    ///
    /// # Errors
    /// `LoginRequired` unless the screen resolved to `Authenticated`.
    pub fn authorize(&self) -> Result<()> {
        match self.gate() {
            LinkGate::Actions => Ok(()),
            gate => {
                debug!(key = %self.key, ?gate, "Link action refused");
                Err(MysticError::LoginRequired)
            }
        }
    }

    /// User-facing copy for the last failed fetch
    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(MysticError::user_message)
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Screen opened
    pub async fn enter(&mut self) -> Vec<AccessEffect> {
        self.dispatch(AccessEvent::ScreenEntered).await
    }

    /// User tapped the login prompt
    pub async fn request_login(&mut self) -> Vec<AccessEffect> {
        self.dispatch(AccessEvent::LoginRequested).await
    }

    /// The login deep link arrived (credential already installed)
    pub async fn login_callback(&mut self) -> Vec<AccessEffect> {
        self.dispatch(AccessEvent::LoginCallback).await
    }

    /// Screen resumed from background
    pub async fn resume(&mut self) -> Vec<AccessEffect> {
        self.dispatch(AccessEvent::Resumed).await
    }

    /// Feed one event and run the resulting network effects to completion
    ///
    /// Returns the effects meant for the UI (`OpenLogin`, `Render`). If the
    /// scope closes mid-way, results are discarded and nothing is returned.
    pub async fn dispatch(&mut self, event: AccessEvent) -> Vec<AccessEffect> {
        let mut queue: VecDeque<AccessEffect> = self.machine.handle(event).into();
        let mut ui = Vec::new();

        while let Some(effect) = queue.pop_front() {
            let next = match effect {
                AccessEffect::FetchContent => {
                    let result = self.scope.run(self.backend.load_content(&self.key)).await;
                    match result {
                        Ok(detail) => {
                            self.content = Some(detail);
                            self.last_error = None;
                            AccessEvent::ContentLoaded
                        }
                        Err(MysticError::Cancelled) => return Vec::new(),
                        Err(e) => {
                            self.last_error = Some(e);
                            AccessEvent::ContentFailed
                        }
                    }
                }
                AccessEffect::CheckSession => {
                    let result = self.scope.run(self.backend.check_session()).await;
                    match result {
                        Ok(logged_in) => AccessEvent::SessionChecked { logged_in },
                        Err(MysticError::Cancelled) => return Vec::new(),
                        Err(e) => {
                            debug!(error = %e, "Session check failed, treating as anonymous");
                            AccessEvent::SessionCheckFailed
                        }
                    }
                }
                external => {
                    ui.push(external);
                    continue;
                }
            };
            queue.extend(self.machine.handle(next));
        }

        if self.scope.is_closed() {
            return Vec::new();
        }
        ui
    }
}
