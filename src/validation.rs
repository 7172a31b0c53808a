use crate::error::{Error, Result};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

pub const MIN_NEWS_COUNT: usize = 1;
pub const MAX_NEWS_COUNT: usize = 20;

/// Checks that `address` is a base58-encoded 32-byte Solana public key.
pub fn validate_address(address: &str) -> Result<Pubkey> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(Error::ValidationError("Address cannot be empty".to_string()));
    }
    Pubkey::from_str(trimmed)
        .map_err(|e| Error::ValidationError(format!("Invalid Solana address '{}': {}", trimmed, e)))
}

pub fn validate_news_count(count: usize) -> Result<()> {
    if !(MIN_NEWS_COUNT..=MAX_NEWS_COUNT).contains(&count) {
        return Err(Error::ValidationError(format!(
            "News count must be between {} and {}, got {}",
            MIN_NEWS_COUNT, MAX_NEWS_COUNT, count
        )));
    }
    Ok(())
}

pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::ValidationError("Token query cannot be empty".to_string()));
    }
    if query.len() > 100 {
        return Err(Error::ValidationError("Token query is too long".to_string()));
    }
    Ok(())
}
