//! Minimal Solana JSON-RPC transport.
//!
//! Only the five read methods the chain accessor needs are exposed, each
//! returning the endpoint's payload with as little reshaping as possible.

use crate::config::RpcConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub err: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<RpcTransactionMeta>,
    pub transaction: RpcTransactionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcTransactionBody {
    pub message: RpcMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcMessage {
    #[serde(default)]
    pub account_keys: Vec<RpcAccountKey>,
    #[serde(default)]
    pub instructions: Vec<RpcInstruction>,
}

/// `jsonParsed` returns key objects, plain `json` returns bare strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcAccountKey {
    Parsed { pubkey: String },
    Plain(String),
}

impl RpcAccountKey {
    pub fn pubkey(&self) -> &str {
        match self {
            RpcAccountKey::Parsed { pubkey } => pubkey,
            RpcAccountKey::Plain(pubkey) => pubkey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcInstruction {
    #[serde(default)]
    pub program_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestAccount {
    pub address: String,
    pub amount: String,
    pub decimals: u8,
    #[serde(default)]
    pub ui_amount: Option<f64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Native balance in lamports.
    async fn get_balance(&self, address: &str) -> Result<u64>;
    /// Newest-first signature history.
    async fn get_signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<SignatureInfo>>;
    async fn get_transaction(&self, signature: &str) -> Result<Option<RpcTransaction>>;
    /// `jsonParsed` account payload, `None` when the account does not exist.
    async fn get_account_info(&self, address: &str) -> Result<Option<Value>>;
    async fn get_token_largest_accounts(&self, mint: &str) -> Result<Vec<LargestAccount>>;
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Clone)]
pub struct HttpRpcClient {
    client: Client,
    url: String,
}

impl HttpRpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        debug!("RPC {} {}", method, params);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("{} request failed: {}", method, e)))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(Error::RateLimitExceeded(format!("RPC rate limit hit on {}", method)));
            }
            status => {
                return Err(Error::SolanaRpcError(format!("{} returned HTTP {}", method, status)));
            }
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| Error::ApiInvalidFormat(format!("{} response: {}", method, e)))?;

        if let Some(err) = envelope.error {
            return Err(Error::SolanaRpcError(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }

        let result = envelope.result.unwrap_or(Value::Null);
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl SolanaRpc for HttpRpcClient {
    async fn get_balance(&self, address: &str) -> Result<u64> {
        let res: WithContext<u64> = self.call("getBalance", json!([address])).await?;
        Ok(res.value)
    }

    async fn get_signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<SignatureInfo>> {
        self.call("getSignaturesForAddress", json!([address, { "limit": limit }]))
            .await
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<RpcTransaction>> {
        self.call(
            "getTransaction",
            json!([signature, { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }]),
        )
        .await
    }

    async fn get_account_info(&self, address: &str) -> Result<Option<Value>> {
        let res: WithContext<Option<Value>> = self
            .call("getAccountInfo", json!([address, { "encoding": "jsonParsed" }]))
            .await?;
        Ok(res.value)
    }

    async fn get_token_largest_accounts(&self, mint: &str) -> Result<Vec<LargestAccount>> {
        let res: WithContext<Vec<LargestAccount>> =
            self.call("getTokenLargestAccounts", json!([mint])).await?;
        Ok(res.value)
    }
}
