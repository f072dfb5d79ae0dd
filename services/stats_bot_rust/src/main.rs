use anyhow::{Context, Result};
use courtside_rust_core::reference::{load_players, save_players};
use courtside_rust_core::{NbaStatsClient, Player, ReferenceData, StatsProvider};
use dotenv::dotenv;
use stats_bot_rust::{Config, Dispatcher, IncomingMessage, SignalClient};
use std::fs::File;
use std::sync::{Arc, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_file {
        Some(path) => {
            // fresh log every run
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Player table from the local cache, fetched and cached on first run
async fn load_player_table(config: &Config, provider: &dyn StatsProvider) -> Result<Vec<Player>> {
    let path = &config.players_cache_file;

    match load_players(path) {
        Ok(Some(players)) => {
            info!("Loaded {} players from {}", players.len(), path.display());
            return Ok(players);
        }
        Ok(None) => info!("No player cache at {}, fetching", path.display()),
        Err(e) => warn!("Ignoring unreadable player cache: {:#}", e),
    }

    let players = provider
        .all_players(&config.season)
        .await
        .context("Failed to fetch player table")?;

    if let Err(e) = save_players(path, &players) {
        warn!("Could not write player cache: {:#}", e);
    }
    Ok(players)
}

async fn handle_message(
    dispatcher: Dispatcher,
    signal: SignalClient,
    message: IncomingMessage,
    max_reply_chars: usize,
) {
    let Some(reply) = dispatcher.handle(&message.text).await else {
        return;
    };

    if let Err(e) = signal
        .send(&message.reply_to, &reply, max_reply_chars)
        .await
    {
        error!("Failed to reply to {}: {:#}", message.sender, e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;
    init_logging(&config)?;

    info!("Starting stats bot (season {} {})", config.season, config.season_type);

    let provider = Arc::new(
        NbaStatsClient::new(config.stats_client_config())
            .context("Failed to initialize stats client")?,
    );

    let players = load_player_table(&config, provider.as_ref()).await?;
    let reference = Arc::new(ReferenceData::with_players(players));
    info!(
        "Reference data ready: {} active players, {} teams",
        reference.active_player_count(),
        reference.teams().len()
    );

    let signal = SignalClient::new(
        config.signal_api_base_url.clone(),
        config.signal_number.clone(),
    )?;
    let dispatcher = Dispatcher::new(provider, reference, &config);

    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Polling {} every {:?} as {}",
        config.signal_api_base_url, config.poll_interval, config.signal_number
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                let messages = match signal.receive().await {
                    Ok(messages) => messages,
                    Err(e) => {
                        warn!("Signal receive failed: {:#}", e);
                        continue;
                    }
                };

                for message in messages {
                    if !config.is_sender_allowed(&message.sender) {
                        info!("Ignoring message from non-allowed sender {}", message.sender);
                        continue;
                    }
                    tokio::spawn(handle_message(
                        dispatcher.clone(),
                        signal.clone(),
                        message,
                        config.max_reply_chars,
                    ));
                }
            }
        }
    }

    Ok(())
}
