use crate::models::ReferenceToken;

/// Common tickers whose symbol is ambiguous in the catalog.
const ALIASES: [(&str, &str); 20] = [
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("sol", "solana"),
    ("usdt", "tether"),
    ("usdc", "usd-coin"),
    ("bnb", "binancecoin"),
    ("xrp", "ripple"),
    ("ada", "cardano"),
    ("doge", "dogecoin"),
    ("dot", "polkadot"),
    ("matic", "matic-network"),
    ("avax", "avalanche-2"),
    ("link", "chainlink"),
    ("ltc", "litecoin"),
    ("atom", "cosmos"),
    ("uni", "uniswap"),
    ("shib", "shiba-inu"),
    ("trx", "tron"),
    ("bonk", "bonk"),
    ("jup", "jupiter-exchange-solana"),
];

pub fn alias_for(query: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(ticker, _)| *ticker == query)
        .map(|(_, id)| *id)
}

/// Resolves a free-text query against the catalog.
///
/// Exact matches always win over substring matches: alias, then id, symbol
/// and name equality, and only then a substring score where id hits weigh 3,
/// symbol hits 2 and name hits 1. Equal scores keep the earliest entry.
pub fn find_token<'a>(catalog: &'a [ReferenceToken], query: &str) -> Option<&'a ReferenceToken> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }

    if let Some(id) = alias_for(&q) {
        if let Some(token) = catalog.iter().find(|t| t.id == id) {
            return Some(token);
        }
    }

    if let Some(token) = catalog.iter().find(|t| t.id == q) {
        return Some(token);
    }
    if let Some(token) = catalog.iter().find(|t| t.symbol.to_lowercase() == q) {
        return Some(token);
    }
    if let Some(token) = catalog.iter().find(|t| t.name.to_lowercase() == q) {
        return Some(token);
    }

    let mut best: Option<(&ReferenceToken, u32)> = None;
    for token in catalog {
        let score = fuzzy_score(token, &q);
        if score == 0 {
            continue;
        }
        match best {
            Some((_, top)) if top >= score => {}
            _ => best = Some((token, score)),
        }
    }
    best.map(|(token, _)| token)
}

fn fuzzy_score(token: &ReferenceToken, q: &str) -> u32 {
    let mut score = 0;
    if token.id.contains(q) {
        score += 3;
    }
    if token.symbol.to_lowercase().contains(q) {
        score += 2;
    }
    if token.name.to_lowercase().contains(q) {
        score += 1;
    }
    score
}
