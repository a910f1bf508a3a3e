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


//! MysticMovies mobile core
//!
//! Client-side launch protocol, host failover, content decoding, access
//! gating and action resolution for the MysticMovies apps. The UI layers
//! reach it through [`ffi`] (iOS) and `jni_bridge` (Android).
//!
//! ```no_run
//! use mystic_core::{AppConfig, LaunchSequence, MysticClient};
//!
//! # async fn example() -> mystic_core::Result<()> {
//! let client = MysticClient::new(AppConfig::default())?;
//! let report = LaunchSequence::new(client.clone()).run().await;
//! if report.is_ready() {
//!     let detail = client.fetch_content_detail("dune-2021").await?;
//!     println!("{} links", detail.link_count());
//! }
//! # Ok(())
//! # }
//! ```

uniffi::setup_scaffolding!();

pub mod access;
pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod storage;

// JNI bridge for Android
#[cfg(target_os = "android")]
mod jni_bridge;

pub use access::{AccessController, AccessMachine, AccessState, LinkGate, ScreenScope};
pub use actions::{resolve, ActionKind, ResolveContext, ResolvedAction};
pub use api::{
    BootstrapState, CatalogQuery, ContentDetail, LaunchReport, LaunchSequence, MysticClient,
    RuntimeConfig, RuntimeConfigHandle,
};
pub use config::AppConfig;
pub use error::{MysticError, Result};

/// Crate version, for the app's about screen and bug reports
#[uniffi::export]
pub fn core_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
