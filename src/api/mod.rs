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


//! App API client: host failover, launch protocol and content endpoints

pub mod url;
pub mod runtime;
pub mod candidates;
pub mod failover;
pub mod client;
pub mod decode;
pub mod models;
pub mod bootstrap;
pub mod catalog;
pub mod content;
pub mod session;
pub mod profile;

pub use bootstrap::{BootstrapState, HandshakeToken, LaunchReport, LaunchSequence};
pub use catalog::{CatalogFilter, CatalogQuery, CatalogSort};
pub use client::MysticClient;
pub use content::{decode_season, encode_season};
pub use failover::{decide, Outcome, Step};
pub use models::*;
pub use profile::{RequestReceipt, RequestType};
pub use runtime::{RuntimeConfig, RuntimeConfigHandle, UpdatePolicy, UpdatePrompt};
pub use session::parse_login_callback;
