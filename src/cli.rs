use crate::models::{DigestFormat, NewsCategory, TimeRange};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print a human-readable report instead of JSON
    #[arg(long)]
    pub text: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up a token price by id, symbol or name
    Price {
        query: String,
    },
    /// Summarize a wallet's recent activity
    Wallet {
        address: String,
        /// 24h, 7d or 30d
        #[arg(short, long, default_value = "24h")]
        range: TimeRange,
    },
    /// Latest crypto news, merged from all sources
    News {
        /// general, bitcoin, ethereum, solana, defi, nft or regulation
        #[arg(long, default_value = "general")]
        category: NewsCategory,
        /// Number of articles, 1 to 20
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        /// mobile or detailed
        #[arg(short, long, default_value = "mobile")]
        format: DigestFormat,
    },
    /// Score a token mint for concentration, activity and liquidity risk
    Risk {
        mint: String,
    },
}
