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


use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mystic_core::api::{CatalogFilter, CatalogSort, QualityLink};
use mystic_core::{logging, ActionKind, AppConfig, CatalogQuery, LaunchSequence, MysticClient, ResolvedAction};

#[derive(Parser)]
#[command(name = "mystic-cli")]
#[command(about = "MysticMovies core - desktop testing tool", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Override the default API host
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session credential (as delivered by the login callback)
    #[arg(long, global = true)]
    token: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run handshake, bootstrap and ping
    Launch,
    /// List one catalog page
    Catalog {
        #[arg(long, default_value = "all")]
        filter: String,
        #[arg(long, default_value = "release_new")]
        sort: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 24)]
        per_page: u32,
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Search suggestions
    Search {
        query: String,
        #[arg(long, default_value_t = 8)]
        limit: u32,
    },
    /// Show a movie or series and its links
    Detail {
        /// Slug or id
        key: String,
    },
    /// Check whether the credential is logged in
    Session,
    /// Resolve a quality link to an action
    Resolve {
        key: String,
        /// watch, download, telegram or watch_together
        #[arg(short, long, default_value = "watch")]
        action: String,
        /// Quality label, e.g. 1080p; first link when omitted
        #[arg(short, long)]
        quality: Option<String>,
        #[arg(long)]
        season: Option<u32>,
        #[arg(long)]
        episode: Option<u32>,
        /// Perform the Telegram exchange
        #[arg(long)]
        exchange: bool,
    },
}

fn build_client(cli: &Cli) -> Result<MysticClient> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(base) = &cli.base_url {
        config.default_base_url = base.clone();
        config.fallback_base_urls.clear();
    }

    let client = MysticClient::new(config)?;
    if let Some(token) = &cli.token {
        client.set_session_token(Some(token.clone()));
    }
    Ok(client)
}

fn pick_link(links: &[QualityLink], quality: Option<&str>) -> Result<QualityLink> {
    let link = match quality {
        Some(q) => links.iter().find(|l| l.label.eq_ignore_ascii_case(q)),
        None => links.first(),
    };
    link.cloned().ok_or_else(|| anyhow!("no matching quality link"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let client = build_client(&cli)?;

    match &cli.command {
        Commands::Launch => {
            let report = LaunchSequence::new(client.clone()).run().await;
            println!("State: {:?}", report.state);
            println!("Attempted: {}", report.attempted.join(", "));
            match &report.error {
                Some(e) => println!("Error: {}", e.user_message()),
                None => {
                    let config = &report.config;
                    println!("Host: {}", config.api_base_url);
                    println!("App: {}", config.app.name);
                    println!("Maintenance: {}", config.maintenance_mode);
                    println!("Update: {:?}", config.update.prompt(&client.config().app_version, client.config().build_number));
                    for message in config.notification_messages() {
                        println!("  • {}", message);
                    }
                }
            }
            if let Some(ping) = report.ping {
                let _ = ping.await;
            }
        }
        Commands::Catalog { filter, sort, page, per_page, query } => {
            let request = CatalogQuery {
                filter: CatalogFilter::parse(filter),
                sort: CatalogSort::parse(sort),
                page: *page,
                per_page: *per_page,
                query: query.clone(),
            };
            let result = client.fetch_catalog(&request).await?;
            println!(
                "Page {}/{} ({} items)",
                result.pagination.page,
                result.pagination.total_pages,
                result.pagination.total_items
            );
            for card in &result.items {
                println!("  [{}] {} {}", card.content_type.as_str(), card.title, card.badge_text());
            }
        }
        Commands::Search { query, limit } => {
            let result = client.search_suggestions(query, *limit).await?;
            for card in &result.items {
                println!("  {} ({})", card.title, card.content_key());
            }
            if !result.trending.is_empty() {
                println!("Trending: {}", result.trending.join(", "));
            }
        }
        Commands::Detail { key } => {
            let detail = client.fetch_content_detail(key).await?;
            println!("{} ({})", detail.item.title, detail.item.year);
            for link in detail.movie_links() {
                println!("  {}", link.display_label());
            }
            for season in detail.season_links() {
                println!("  Season {} ({} episodes)", season.season, season.episode_count);
                for row in &season.episodes {
                    println!("    {}", row.display_title());
                }
            }
        }
        Commands::Session => {
            let info = client.fetch_session().await?;
            if info.logged_in {
                println!("Logged in as {}", info.user_name);
            } else {
                println!("Not logged in. Login: {}", client.login_url("/"));
            }
        }
        Commands::Resolve { key, action, quality, season, episode, exchange } => {
            let kind = ActionKind::parse(action).ok_or_else(|| anyhow!("unknown action {}", action))?;
            let detail = client.fetch_content_detail(key).await?;

            let links: Vec<QualityLink> = match (season, episode) {
                (Some(s), Some(e)) => detail
                    .season(*s)
                    .and_then(|season| season.episodes.iter().find(|row| row.episode == *e))
                    .map(|row| row.qualities.clone())
                    .context("episode not found")?,
                _ => detail.movie_links().to_vec(),
            };
            let link = pick_link(&links, quality.as_deref())?;

            let resolved = match client.resolve_action(&link, kind, &detail.item.title)? {
                ResolvedAction::TelegramExchange { start_url } if *exchange => ResolvedAction::OpenTelegram {
                    deep_link: client.exchange_telegram(&start_url).await?,
                },
                other => other,
            };
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
    }

    Ok(())
}
