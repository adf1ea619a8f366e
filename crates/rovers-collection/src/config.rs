//! Configuration for the collection providers.
//!
//! Loaded from `COLLECTION_*` environment variables. Everything except the
//! API key has a default pointing at the Rovers collection on Ethereum.

use std::time::Duration;

use crate::error::ProviderError;

/// Default marketplace API base URL.
pub const DEFAULT_API_URL: &str = "https://api.opensea.io/api/v2";
/// Default collection slug.
pub const DEFAULT_COLLECTION_SLUG: &str = "rovers-by-mycobiotics-ltd";
/// Default contract address of the collection.
pub const DEFAULT_CONTRACT: &str = "0xe0e7f149959c6cac0ddc2cb4ab27942bffda1eb4";
/// Default chain name.
pub const DEFAULT_CHAIN: &str = "ethereum";
/// Default number of rovers in the collection.
pub const DEFAULT_TOTAL_SUPPLY: u32 = 5000;
/// Default lifetime of a cached rarity snapshot.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Default attempts for a rate-limited metadata request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection settings for the collection API.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Base API URL, without trailing slash.
    pub api_url: String,
    /// API key sent as `X-API-KEY`.
    pub api_key: String,
    /// Collection slug for trait counts.
    pub collection_slug: String,
    /// Contract address for per-token metadata.
    pub contract: String,
    /// Chain the contract lives on.
    pub chain: String,
    /// Number of rovers in the collection.
    pub total_supply: u32,
    /// How long a rarity snapshot stays fresh.
    pub cache_ttl: Duration,
    /// Attempts for a rate-limited metadata request.
    pub max_retries: u32,
}

impl CollectionConfig {
    /// Default settings with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            api_key: api_key.into(),
            collection_slug: DEFAULT_COLLECTION_SLUG.to_owned(),
            contract: DEFAULT_CONTRACT.to_owned(),
            chain: DEFAULT_CHAIN.to_owned(),
            total_supply: DEFAULT_TOTAL_SUPPLY,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `COLLECTION_API_KEY` -- marketplace API key
    ///
    /// Optional variables:
    /// - `COLLECTION_API_URL` -- API base URL (default `https://api.opensea.io/api/v2`)
    /// - `COLLECTION_SLUG` -- collection slug
    /// - `COLLECTION_CONTRACT` -- contract address
    /// - `COLLECTION_CHAIN` -- chain name (default `ethereum`)
    /// - `COLLECTION_TOTAL_SUPPLY` -- rovers in the collection (default 5000)
    /// - `COLLECTION_CACHE_TTL_SECS` -- rarity cache lifetime (default 3600)
    /// - `COLLECTION_MAX_RETRIES` -- attempts when rate limited (default 3)
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ProviderError> {
        let api_key = var("COLLECTION_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::Config("missing required env var COLLECTION_API_KEY".to_owned()))?;

        let mut config = Self::with_api_key(api_key);
        if let Some(url) = var("COLLECTION_API_URL") {
            config.api_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(slug) = var("COLLECTION_SLUG") {
            config.collection_slug = slug;
        }
        if let Some(contract) = var("COLLECTION_CONTRACT") {
            config.contract = contract;
        }
        if let Some(chain) = var("COLLECTION_CHAIN") {
            config.chain = chain;
        }
        if let Some(raw) = var("COLLECTION_TOTAL_SUPPLY") {
            config.total_supply = parse_var("COLLECTION_TOTAL_SUPPLY", &raw)?;
            if config.total_supply == 0 {
                return Err(ProviderError::Config("COLLECTION_TOTAL_SUPPLY must be positive".to_owned()));
            }
        }
        if let Some(raw) = var("COLLECTION_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(parse_var("COLLECTION_CACHE_TTL_SECS", &raw)?);
        }
        if let Some(raw) = var("COLLECTION_MAX_RETRIES") {
            config.max_retries = parse_var::<u32>("COLLECTION_MAX_RETRIES", &raw)?.max(1);
        }
        Ok(config)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ProviderError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ProviderError::Config(format!("invalid {name}: {e}")))
}
