use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channelx::{
    config::Config,
    models::ChannelStatus,
    repositories::ChannelRepository,
    services::{HomeService, HomeUiState},
    sources::CdnLiveClient,
};

#[derive(Parser)]
#[command(name = "channelx")]
#[command(version = "0.1.0")]
#[command(about = "Live TV channel browser core")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Only list channels from this country code
    #[arg(long, value_name = "CODE")]
    country: Option<String>,

    /// Only list channels with this status (all, online, offline)
    #[arg(long, default_value = "all")]
    status: String,

    /// Narrow the listing to names containing this text
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

fn parse_status(value: &str) -> Result<ChannelStatus> {
    match value.to_lowercase().as_str() {
        "all" => Ok(ChannelStatus::All),
        "online" => Ok(ChannelStatus::Online),
        "offline" => Ok(ChannelStatus::Offline),
        other => anyhow::bail!("Unknown status filter: {}", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("channelx={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ChannelX v{}", env!("CARGO_PKG_VERSION"));

    let status = parse_status(&cli.status)?;

    std::env::set_var("CONFIG_FILE", &cli.config);
    let config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    let source = Arc::new(CdnLiveClient::new(&config.api));
    let repository = ChannelRepository::new(source, config.api.user.clone(), config.api.plan.clone());
    let home = HomeService::new(repository.clone());

    home.set_status(status);
    home.set_country(cli.country);
    if let Some(search) = cli.search {
        home.set_search_query(search);
    }

    home.load_initial().await;
    if let Some(refreshed_at) = repository.last_refreshed_at() {
        info!("Channel list refreshed at {}", refreshed_at);
    }

    let mut ui = home.ui_state();
    loop {
        match ui.current() {
            HomeUiState::Loading => ui.changed().await?,
            HomeUiState::Success {
                channels,
                available_countries,
                is_empty,
            } => {
                info!(
                    "{} channels across {} countries",
                    channels.len(),
                    available_countries.len()
                );
                if is_empty {
                    info!("No channels match the current filters");
                }
                for channel in &channels {
                    info!(
                        "{} [{}] {} - {} viewers",
                        channel.name,
                        channel.country_name(),
                        channel.status_text(),
                        channel.viewers
                    );
                }
                break;
            }
            HomeUiState::Error { message } => {
                anyhow::bail!("Failed to load channels: {}", message);
            }
        }
    }

    Ok(())
}
