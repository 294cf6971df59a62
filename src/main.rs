//! Gamehub Webhook Receiver Binary

use clap::Parser;
use gamehub_webhooks::{
    api::{handlers::AppState, ApiServer},
    config::ConfigLoader,
    wallet::InMemoryWallet,
    webhooks::WebhookHandler,
    GamehubResult,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gamehub-webhooks")]
#[command(about = "Receives signed game-aggregator webhooks", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Override listen host
    #[arg(long)]
    host: Option<String>,

    /// Override listen port
    #[arg(long)]
    port: Option<u16>,

    /// Seed the in-memory wallet: player_id:CURRENCY:balance_minor (repeatable)
    #[arg(long = "player", value_parser = parse_player)]
    players: Vec<(String, String, i64)>,
}

fn parse_player(spec: &str) -> Result<(String, String, i64), String> {
    let mut parts = spec.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(currency), Some(balance)) if !id.is_empty() && !currency.is_empty() => {
            let balance = balance
                .parse::<i64>()
                .map_err(|_| format!("invalid balance '{}'", balance))?;
            Ok((id.to_string(), currency.to_string(), balance))
        }
        _ => Err(format!("expected player_id:CURRENCY:balance_minor, got '{}'", spec)),
    }
}

#[tokio::main]
async fn main() -> GamehubResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamehub_webhooks=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(ref path) = args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    loader.validate(&config)?;

    let wallet = InMemoryWallet::new();
    for (player_id, currency, balance) in &args.players {
        wallet.open_account(player_id, currency, *balance);
        info!("Seeded {} with {} {} (minor units)", player_id, balance, currency);
    }

    let webhooks = WebhookHandler::new(config.webhook.secret.clone())?;
    let state = AppState::new(webhooks, Arc::new(wallet), &config.webhook.signature_header);

    ApiServer::new(config.server, state).run().await
}
