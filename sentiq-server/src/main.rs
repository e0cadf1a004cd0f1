use std::sync::Arc;

use clap::Parser;
use sentiq_core::{LanguageClient, RecordStore, SentiqConfig};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use sentiq_server::http::{self, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "sentiq.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match SentiqConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging (RUST_LOG wins over the configured level)
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    // External clients are built once and reused for the process lifetime.
    let store = match RecordStore::new(&config.store) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to create store client: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match store.stats().await {
            Ok(stats) => {
                println!(
                    "✅ Store reachable: collection '{}' holds {} records",
                    stats.name, stats.count
                );
            }
            Err(e) => {
                println!("❌ Store check failed: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let language = match LanguageClient::new(&config.language) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create language client: {}", e);
            std::process::exit(1);
        }
    };

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(AppState { language, store });
    http::start_http_server(&config, state, tx.subscribe()).await?;

    Ok(())
}
