// Solana chain data access: balances, transaction history, mint state and
// holder distribution, normalized for the tools and the risk engine.
pub mod rpc;

use crate::error::{Error, Result};
use crate::models::{
    ChainSnapshot, Lookup, TokenHolder, TokenSupplyInfo, TransactionKind, TransactionRecord,
    TransactionStatus, LAMPORTS_PER_SOL,
};
use crate::utils::{retry_with_backoff, RetryPolicy};
use crate::validation::validate_address;
use chrono::{DateTime, TimeZone, Utc};
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub use rpc::{HttpRpcClient, SolanaRpc};

#[derive(Clone)]
pub struct ChainDataAccessor {
    rpc: Arc<dyn SolanaRpc>,
    retry: RetryPolicy,
}

impl fmt::Debug for ChainDataAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainDataAccessor")
            .field("rpc", &format_args!("<SolanaRpc>"))
            .field("retry", &self.retry)
            .finish()
    }
}

fn from_unix(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| Utc.timestamp_opt(s, 0).single())
}

impl ChainDataAccessor {
    pub fn new(rpc: Arc<dyn SolanaRpc>, retry: RetryPolicy) -> Self {
        Self { rpc, retry }
    }

    /// Native balance in SOL. RPC failures degrade to zero with the reason
    /// attached; only a malformed address is a hard error.
    pub async fn get_balance(&self, address: &str) -> Result<Lookup<f64>> {
        let address = validate_address(address)?.to_string();
        let rpc = &self.rpc;
        let fetched = retry_with_backoff(&self.retry, "getBalance", || rpc.get_balance(&address)).await;

        match fetched {
            Ok(lamports) => Ok(Lookup::Value {
                value: lamports as f64 / LAMPORTS_PER_SOL,
            }),
            Err(e) => {
                warn!("Balance lookup for {} degraded to 0: {}", address, e);
                Ok(Lookup::Degraded {
                    fallback: 0.0,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Up to `limit` most recent transactions, newest first. Transactions
    /// whose details cannot be fetched are kept as failed `Unknown` records.
    pub async fn get_recent_transactions(&self, address: &str, limit: usize) -> Result<Vec<TransactionRecord>> {
        let address = validate_address(address)?.to_string();
        let rpc = &self.rpc;

        let signatures = retry_with_backoff(&self.retry, "getSignaturesForAddress", || {
            rpc.get_signatures_for_address(&address, limit)
        })
        .await
        .map_err(|e| Error::SolanaRpcError(format!("signature history for {}: {}", address, e)))?;

        let mut records = Vec::with_capacity(signatures.len().min(limit));
        for info in signatures.into_iter().take(limit) {
            let sig = info.signature.as_str();
            let detail = retry_with_backoff(&self.retry, "getTransaction", || rpc.get_transaction(sig)).await;

            let record = match detail {
                Ok(Some(tx)) => normalize_transaction(&address, &info, tx),
                Ok(None) => {
                    warn!("Transaction {} not found, recording as unavailable", sig);
                    TransactionRecord::unavailable(sig, from_unix(info.block_time))
                }
                Err(e) => {
                    warn!("Transaction {} could not be fetched: {}", sig, e);
                    TransactionRecord::unavailable(sig, from_unix(info.block_time))
                }
            };
            records.push(record);
        }

        info!("Fetched {} transactions for {}", records.len(), address);
        Ok(records)
    }

    pub async fn get_token_supply_info(&self, mint: &str) -> Result<TokenSupplyInfo> {
        let mint = validate_address(mint)?.to_string();
        let rpc = &self.rpc;

        let account = retry_with_backoff(&self.retry, "getAccountInfo", || rpc.get_account_info(&mint))
            .await
            .map_err(|e| Error::SolanaRpcError(format!("account info for {}: {}", mint, e)))?
            .ok_or_else(|| Error::NotFound(format!("Mint account {} does not exist", mint)))?;

        parse_mint_account(&mint, &account)
    }

    /// Largest token accounts in RPC order. Percentages are relative to the
    /// sum of the returned balances, not the circulating supply.
    pub async fn get_holder_distribution(&self, mint: &str) -> Result<Vec<TokenHolder>> {
        let mint = validate_address(mint)?.to_string();
        let rpc = &self.rpc;

        let accounts = retry_with_backoff(&self.retry, "getTokenLargestAccounts", || {
            rpc.get_token_largest_accounts(&mint)
        })
        .await
        .map_err(|e| Error::SolanaRpcError(format!("largest accounts for {}: {}", mint, e)))?;

        let mut holders = Vec::with_capacity(accounts.len());
        for account in accounts {
            let balance = account.amount.parse::<u64>().map_err(|_| {
                Error::ApiInvalidData(format!(
                    "Invalid token amount '{}' for account {}",
                    account.amount, account.address
                ))
            })?;
            let ui_balance = account
                .ui_amount
                .unwrap_or_else(|| balance as f64 / 10f64.powi(account.decimals as i32));
            holders.push(TokenHolder {
                address: account.address,
                balance,
                ui_balance,
                percentage: 0.0,
            });
        }

        let total: f64 = holders.iter().map(|h| h.balance as f64).sum();
        if total > 0.0 {
            for holder in holders.iter_mut() {
                holder.percentage = holder.balance as f64 / total * 100.0;
            }
        }
        Ok(holders)
    }

    /// Fetches the three reads the risk scorers need, concurrently.
    pub async fn snapshot(&self, mint: &str, sample_size: usize) -> Result<ChainSnapshot> {
        let mint = validate_address(mint)?.to_string();

        let (holders, transactions, supply) = tokio::join!(
            self.get_holder_distribution(&mint),
            self.get_recent_transactions(&mint, sample_size),
            self.get_token_supply_info(&mint),
        );

        let holders = holders.unwrap_or_else(|e| {
            warn!("Holder distribution for {} unavailable: {}", mint, e);
            Vec::new()
        });

        Ok(ChainSnapshot {
            mint,
            holders,
            transactions: transactions.map_err(|e| e.to_string()),
            supply: supply.map_err(|e| e.to_string()),
        })
    }
}

fn normalize_transaction(address: &str, info: &rpc::SignatureInfo, tx: rpc::RpcTransaction) -> TransactionRecord {
    let timestamp = from_unix(tx.block_time.or(info.block_time));
    let message = &tx.transaction.message;

    let program_ids: Vec<String> = message
        .instructions
        .iter()
        .filter_map(|ix| ix.program_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let (kind, amount, status) = match &tx.meta {
        Some(meta) => {
            let kind = TransactionKind::from_logs(meta.log_messages.as_deref().unwrap_or(&[]));
            let amount = message
                .account_keys
                .iter()
                .position(|k| k.pubkey() == address)
                .and_then(|i| Some((*meta.pre_balances.get(i)?, *meta.post_balances.get(i)?)))
                .map(|(pre, post)| (post as f64 - pre as f64) / LAMPORTS_PER_SOL)
                .unwrap_or(0.0);
            let status = if meta.err.is_some() || info.err.is_some() {
                TransactionStatus::Failed
            } else {
                TransactionStatus::Success
            };
            (kind, amount, status)
        }
        None => (TransactionKind::Unknown, 0.0, TransactionStatus::Failed),
    };

    TransactionRecord {
        signature: info.signature.clone(),
        timestamp,
        kind,
        amount,
        program_ids,
        status,
    }
}

fn parse_mint_account(mint: &str, account: &Value) -> Result<TokenSupplyInfo> {
    let parsed = account
        .pointer("/data/parsed")
        .ok_or_else(|| Error::ApiInvalidData(format!("Account {} has no parsed data", mint)))?;

    if parsed.get("type").and_then(Value::as_str) != Some("mint") {
        return Err(Error::ApiInvalidData(format!("Account {} is not a token mint", mint)));
    }

    let info = parsed
        .get("info")
        .ok_or_else(|| Error::ApiInvalidData(format!("Mint {} is missing info", mint)))?;

    let supply = info
        .get("supply")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| Error::ApiInvalidData(format!("Mint {} has an invalid supply", mint)))?;

    let decimals = info
        .get("decimals")
        .and_then(Value::as_u64)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| Error::ApiInvalidData(format!("Mint {} has invalid decimals", mint)))?;

    let authority = |key: &str| info.get(key).and_then(Value::as_str).map(str::to_string);

    Ok(TokenSupplyInfo {
        supply,
        ui_supply: supply as f64 / 10f64.powi(decimals as i32),
        decimals,
        mint_authority: authority("mintAuthority"),
        freeze_authority: authority("freezeAuthority"),
    })
}
