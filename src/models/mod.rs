pub mod chain;
pub mod market;
pub mod news;
pub mod wallet;

pub use chain::{
    ChainSnapshot, Lookup, TokenHolder, TokenSupplyInfo, TransactionKind, TransactionRecord,
    TransactionStatus, LAMPORTS_PER_SOL,
};
pub use market::{PriceQuote, ReferenceToken};
pub use news::{
    DigestFormat, DigestItem, NewsArticle, NewsCategory, NewsDigest, NewsResponse, Sentiment,
};
pub use wallet::{TimeRange, WalletActivity};
