#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use token_scout::api::{MarketDataProvider, PriceIndex};
use token_scout::config::WalletConfig;
use token_scout::error::{Error, Result};
use token_scout::models::{NewsArticle, NewsCategory, PriceQuote, ReferenceToken, Sentiment};
use token_scout::news::{NewsAggregator, NewsSource};
use token_scout::services::Assistant;
use token_scout::solana::rpc::{
    LargestAccount, RpcAccountKey, RpcInstruction, RpcMessage, RpcTransaction, RpcTransactionBody,
    RpcTransactionMeta, SignatureInfo,
};
use token_scout::solana::{ChainDataAccessor, SolanaRpc};
use token_scout::utils::{ManualClock, RetryPolicy};

pub const WRAPPED_SOL: &str = "So11111111111111111111111111111111111111112";
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(start_time()))
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(2, std::time::Duration::from_millis(1))
}

// Chain fixtures

#[derive(Debug, Default)]
pub struct FakeRpc {
    /// `None` makes `getBalance` fail.
    pub balance: Option<u64>,
    pub signatures: Vec<SignatureInfo>,
    pub fail_signatures: bool,
    pub transactions: HashMap<String, RpcTransaction>,
    pub mint_account: Option<Value>,
    /// `None` makes `getTokenLargestAccounts` fail.
    pub largest_accounts: Option<Vec<LargestAccount>>,
    pub calls: AtomicUsize,
}

impl FakeRpc {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn push_transaction(&mut self, signature: &str, tx: RpcTransaction) {
        self.signatures.push(SignatureInfo {
            signature: signature.to_string(),
            block_time: tx.block_time,
            err: tx.meta.as_ref().and_then(|m| m.err.clone()),
        });
        self.transactions.insert(signature.to_string(), tx);
    }
}

#[async_trait]
impl SolanaRpc for FakeRpc {
    async fn get_balance(&self, _address: &str) -> Result<u64> {
        self.hit();
        self.balance
            .ok_or_else(|| Error::NetworkError("connection reset".to_string()))
    }

    async fn get_signatures_for_address(&self, _address: &str, limit: usize) -> Result<Vec<SignatureInfo>> {
        self.hit();
        if self.fail_signatures {
            return Err(Error::SolanaRpcError("node is behind".to_string()));
        }
        Ok(self.signatures.iter().take(limit).cloned().collect())
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<RpcTransaction>> {
        self.hit();
        Ok(self.transactions.get(signature).cloned())
    }

    async fn get_account_info(&self, _address: &str) -> Result<Option<Value>> {
        self.hit();
        Ok(self.mint_account.clone())
    }

    async fn get_token_largest_accounts(&self, _mint: &str) -> Result<Vec<LargestAccount>> {
        self.hit();
        self.largest_accounts
            .clone()
            .ok_or_else(|| Error::SolanaRpcError("largest accounts unavailable".to_string()))
    }
}

/// A transaction touching `owner` whose SOL balance moves by `delta_sol`.
pub fn transaction(
    owner: &str,
    block_time: DateTime<Utc>,
    delta_sol: f64,
    log: &str,
    program: &str,
    failed: bool,
) -> RpcTransaction {
    let pre = 10_000_000_000u64;
    let post = (pre as f64 + delta_sol * 1_000_000_000.0) as u64;
    RpcTransaction {
        block_time: Some(block_time.timestamp()),
        meta: Some(RpcTransactionMeta {
            err: if failed { Some(json!({"InstructionError": [0, "Custom"]})) } else { None },
            log_messages: Some(vec![format!("Program log: Instruction: {}", log)]),
            pre_balances: vec![pre],
            post_balances: vec![post],
        }),
        transaction: RpcTransactionBody {
            message: RpcMessage {
                account_keys: vec![RpcAccountKey::Parsed {
                    pubkey: owner.to_string(),
                }],
                instructions: vec![RpcInstruction {
                    program_id: Some(program.to_string()),
                }],
            },
        },
    }
}

pub fn mint_account(mint_authority: Option<&str>, freeze_authority: Option<&str>) -> Value {
    json!({
        "lamports": 1461600,
        "owner": TOKEN_PROGRAM,
        "data": {
            "program": "spl-token",
            "parsed": {
                "type": "mint",
                "info": {
                    "decimals": 6,
                    "supply": "1000000000000",
                    "isInitialized": true,
                    "mintAuthority": mint_authority,
                    "freezeAuthority": freeze_authority
                }
            }
        }
    })
}

/// `count` holders with the given raw balances, in RPC order.
pub fn holders(balances: &[u64]) -> Vec<LargestAccount> {
    balances
        .iter()
        .enumerate()
        .map(|(i, amount)| LargestAccount {
            address: format!("holder{}", i),
            amount: amount.to_string(),
            decimals: 6,
            ui_amount: Some(*amount as f64 / 1_000_000.0),
        })
        .collect()
}

// Market fixtures

#[derive(Debug, Default)]
pub struct FakeMarket {
    pub catalog: Vec<ReferenceToken>,
    pub quotes: HashMap<String, PriceQuote>,
    pub fail_list: AtomicBool,
    pub list_calls: AtomicUsize,
}

impl FakeMarket {
    pub fn with_tokens(tokens: &[(&str, &str, &str, f64)]) -> Self {
        let mut market = FakeMarket::default();
        for (id, symbol, name, price) in tokens {
            market.catalog.push(ReferenceToken::new(id, symbol, name));
            market.quotes.insert(
                id.to_string(),
                PriceQuote {
                    id: id.to_string(),
                    symbol: symbol.to_uppercase(),
                    name: name.to_string(),
                    price_usd: *price,
                    change_24h: Some(2.5),
                    change_7d: None,
                    volume_24h: 1_000_000.0,
                    last_updated: start_time(),
                },
            );
        }
        market
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarket {
    async fn list_tokens(&self) -> Result<Vec<ReferenceToken>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::ApiMaintenance("catalog offline".to_string()));
        }
        Ok(self.catalog.clone())
    }

    async fn get_quote(&self, id: &str) -> Result<Option<PriceQuote>> {
        Ok(self.quotes.get(id).cloned())
    }
}

// News fixtures

#[derive(Debug)]
pub struct FakeNewsSource {
    pub name: &'static str,
    pub articles: Vec<NewsArticle>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeNewsSource {
    pub fn ok(name: &'static str, articles: Vec<NewsArticle>) -> Self {
        Self {
            name,
            articles,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            articles: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSource for FakeNewsSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self) -> Result<Vec<NewsArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::NetworkError(format!("{} timed out", self.name)));
        }
        Ok(self.articles.clone())
    }
}

pub fn article(title: &str, summary: &str, url: &str, minutes_ago: i64, categories: Vec<NewsCategory>) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        summary: summary.to_string(),
        source: "Fixture Wire".to_string(),
        url: url.to_string(),
        published_at: start_time() - Duration::minutes(minutes_ago),
        categories,
        sentiment: Sentiment::Neutral,
    }
}

// Wiring

pub struct Harness {
    pub assistant: Assistant,
    pub rpc: Arc<FakeRpc>,
    pub market: Arc<FakeMarket>,
    pub primary_news: Arc<FakeNewsSource>,
    pub secondary_news: Arc<FakeNewsSource>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(
    rpc: FakeRpc,
    market: FakeMarket,
    primary_news: FakeNewsSource,
    secondary_news: FakeNewsSource,
) -> Harness {
    let clock = test_clock();
    let rpc = Arc::new(rpc);
    let market = Arc::new(market);
    let primary_news = Arc::new(primary_news);
    let secondary_news = Arc::new(secondary_news);

    let assistant = Assistant::with_components(
        PriceIndex::new(market.clone(), fast_retry(), clock.clone()),
        ChainDataAccessor::new(rpc.clone(), fast_retry()),
        NewsAggregator::new(primary_news.clone(), secondary_news.clone(), clock.clone()).unwrap(),
        WalletConfig::default(),
        clock.clone(),
    );

    Harness {
        assistant,
        rpc,
        market,
        primary_news,
        secondary_news,
        clock,
    }
}

pub fn chain_harness(rpc: FakeRpc) -> Harness {
    harness(
        rpc,
        FakeMarket::default(),
        FakeNewsSource::ok("primary", vec![]),
        FakeNewsSource::ok("secondary", vec![]),
    )
}

pub fn news_harness(primary: FakeNewsSource, secondary: FakeNewsSource) -> Harness {
    harness(FakeRpc::default(), FakeMarket::default(), primary, secondary)
}
