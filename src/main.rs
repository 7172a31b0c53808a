use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;

use token_scout::cli::{Cli, Command};
use token_scout::config::Config;
use token_scout::logging;
use token_scout::services::Assistant;

fn emit<T: Serialize>(value: &T, text: bool, render: impl FnOnce(&T) -> String) -> Result<()> {
    if text {
        print!("{}", render(value));
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => {
            let default_path = PathBuf::from("config/config.toml");
            if default_path.exists() {
                Config::load(&default_path)
                    .with_context(|| format!("Failed to load configuration from {:?}", default_path))?
            } else {
                Config::default()
            }
        }
    };
    let config = config.apply_env();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug, cli.log_file.as_deref())?;

    let config = load_config(cli.config)?;
    info!("Configuration loaded, RPC endpoint {}", config.rpc.url);
    let assistant = Assistant::from_config(&config)?;

    let outcome = match cli.command {
        Command::Price { query } => assistant
            .price_lookup(&query)
            .await
            .map_err(anyhow::Error::from)
            .and_then(|q| emit(&q, cli.text, |q| q.render())),
        Command::Wallet { address, range } => assistant
            .wallet_activity(&address, range)
            .await
            .map_err(anyhow::Error::from)
            .and_then(|a| emit(&a, cli.text, |a| a.render())),
        Command::News { category, count, format } => assistant
            .news_digest(category, count, format)
            .await
            .map_err(anyhow::Error::from)
            .and_then(|d| emit(&d, cli.text, |d| d.render())),
        Command::Risk { mint } => assistant
            .token_risk_report(&mint)
            .await
            .map_err(anyhow::Error::from)
            .and_then(|r| emit(&r, cli.text, |r| r.render())),
    };

    if let Err(e) = &outcome {
        error!("Request failed: {:#}", e);
    }
    outcome
}
