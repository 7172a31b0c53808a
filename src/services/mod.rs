//! The four assistant tools, wired from configuration.

use crate::api::{CoinGeckoClient, MarketDataProvider, PriceIndex};
use crate::config::{Config, WalletConfig};
use crate::error::Result;
use crate::models::{DigestFormat, NewsCategory, NewsDigest, PriceQuote, TimeRange, WalletActivity};
use crate::news::{CryptoPanicSource, NewsAggregator, NewsApiSource, NewsSource};
use crate::risk::{self, RiskAssessment};
use crate::solana::{ChainDataAccessor, HttpRpcClient, SolanaRpc};
use crate::utils::{Clock, SystemClock};
use crate::validation::validate_address;
use log::info;
use std::sync::Arc;

#[derive(Debug)]
pub struct Assistant {
    prices: PriceIndex,
    chain: ChainDataAccessor,
    news: NewsAggregator,
    wallet: WalletConfig,
    clock: Arc<dyn Clock>,
}

impl Assistant {
    pub fn from_config(config: &Config) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let retry = config.retry.policy();

        let market: Arc<dyn MarketDataProvider> = Arc::new(CoinGeckoClient::new(&config.market)?);
        let rpc: Arc<dyn SolanaRpc> = Arc::new(HttpRpcClient::new(&config.rpc)?);
        let newsapi: Arc<dyn NewsSource> = Arc::new(NewsApiSource::new(&config.news)?);
        let cryptopanic: Arc<dyn NewsSource> = Arc::new(CryptoPanicSource::new(&config.news)?);

        Ok(Self::with_components(
            PriceIndex::new(market, retry, clock.clone()),
            ChainDataAccessor::new(rpc, retry),
            NewsAggregator::new(newsapi, cryptopanic, clock.clone())?,
            config.wallet.clone(),
            clock,
        ))
    }

    pub fn with_components(
        prices: PriceIndex,
        chain: ChainDataAccessor,
        news: NewsAggregator,
        wallet: WalletConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            prices,
            chain,
            news,
            wallet,
            clock,
        }
    }

    pub async fn price_lookup(&self, query: &str) -> Result<PriceQuote> {
        self.prices.quote(query).await
    }

    pub async fn wallet_activity(&self, address: &str, range: TimeRange) -> Result<WalletActivity> {
        let address = validate_address(address)?.to_string();
        info!("Wallet activity for {} over {}", address, range);

        let (balance, transactions) = tokio::join!(
            self.chain.get_balance(&address),
            self.chain
                .get_recent_transactions(&address, self.wallet.activity_sample_size),
        );
        Ok(WalletActivity::summarize(
            &address,
            range,
            balance?,
            transactions?,
            self.clock.now(),
        ))
    }

    pub async fn news_digest(&self, category: NewsCategory, count: usize, format: DigestFormat) -> Result<NewsDigest> {
        self.news.digest(category, count, format).await
    }

    pub async fn token_risk_report(&self, mint: &str) -> Result<RiskAssessment> {
        let snapshot = self.chain.snapshot(mint, risk::transactions::SAMPLE_SIZE).await?;
        let assessment = risk::assess(&snapshot);
        info!(
            "Risk report for {}: {} ({})",
            assessment.mint, assessment.overall_score, assessment.tier
        );
        Ok(assessment)
    }
}
