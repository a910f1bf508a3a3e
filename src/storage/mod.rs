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


//! Local persistence
//!
//! SQLite through sqlx. Two concerns live here:
//! - the last good `RuntimeConfig` (branding, update policy, notifications)
//!   so the next launch can paint before the network answers
//! - playback resume positions for "continue watching"
//!
//! # Usage Example
//! ```no_run
//! use mystic_core::storage::{queries, Database, PlaybackProgress};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./mystic.db").await?;
//!
//! let progress = PlaybackProgress::new("dune-2021", "Dune", 1260.0, 9300.0);
//! queries::save_progress(db.pool(), &progress).await?;
//!
//! let resume = queries::list_continue_watching(db.pool(), 10).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{PlaybackProgress, StoredRuntimeConfig};
