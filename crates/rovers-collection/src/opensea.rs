//! HTTP client for an OpenSea-compatible marketplace API.
//!
//! Two endpoints are used:
//! - `GET {api}/collections/{slug}` for collection-wide trait counts
//! - `GET {api}/chain/{chain}/contract/{contract}/nfts/{token}` for one rover
//!
//! When the collection response carries no trait table, counts are
//! rebuilt from a sample of listed NFTs instead.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use rovers_types::{RarityLookup, Rover, RoverTrait, TokenId};

use crate::config::CollectionConfig;
use crate::error::ProviderError;
use crate::provider::{MetadataProvider, RaritySnapshot, RarityProvider};

/// NFTs requested per page when sampling traits.
const SAMPLE_PAGE_SIZE: u32 = 100;
/// Pages fetched when sampling traits.
const SAMPLE_PAGES: u32 = 2;
/// Pause between sample pages.
const SAMPLE_PAGE_DELAY: Duration = Duration::from_millis(200);
/// Base backoff after a rate-limited request; grows linearly per attempt.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(1);

/// Client for the collection's marketplace API.
#[derive(Debug, Clone)]
pub struct OpenSeaClient {
    client: reqwest::Client,
    config: CollectionConfig,
}

impl OpenSeaClient {
    /// Create a client for the configured collection.
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The settings this client was built with.
    pub const fn config(&self) -> &CollectionConfig {
        &self.config
    }

    async fn get_json(&self, url: &str) -> Result<reqwest::Response, ProviderError> {
        self.client
            .get(url)
            .header("X-API-KEY", &self.config.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::Http(format!("GET {url}: {e}")))
    }

    /// Fetch trait counts from the collection endpoint, sampling NFTs when
    /// the endpoint has none.
    pub async fn fetch_trait_counts(&self) -> Result<RarityLookup, ProviderError> {
        let url = format!("{}/collections/{}", self.config.api_url, self.config.collection_slug);
        debug!(url = %url, "fetching collection traits");

        let response = self.get_json(&url).await?;
        let json = read_json(response).await?;

        match parse_collection_traits(&json) {
            Some(lookup) => Ok(lookup),
            None => {
                info!(slug = %self.config.collection_slug, "no trait table in collection, sampling NFTs");
                self.sample_trait_counts().await
            }
        }
    }

    async fn sample_trait_counts(&self) -> Result<RarityLookup, ProviderError> {
        let mut lookup = RarityLookup::new();
        let mut cursor: Option<String> = None;
        let mut sampled: usize = 0;

        for page in 0..SAMPLE_PAGES {
            let mut url = format!(
                "{}/collection/{}/nfts?limit={SAMPLE_PAGE_SIZE}",
                self.config.api_url, self.config.collection_slug
            );
            if let Some(next) = &cursor {
                url.push_str("&next=");
                url.push_str(next);
            }

            let response = self.get_json(&url).await?;
            if !response.status().is_success() {
                warn!(page, status = response.status().as_u16(), "trait sample page failed");
                break;
            }
            let json: serde_json::Value = response
                .json()
                .await
                .map_err(|e| ProviderError::Parse(format!("NFT page: {e}")))?;

            sampled = sampled.saturating_add(count_page_traits(&json, &mut lookup));
            cursor = json
                .get("next")
                .and_then(serde_json::Value::as_str)
                .filter(|next| !next.is_empty())
                .map(ToOwned::to_owned);
            if cursor.is_none() {
                break;
            }
            tokio::time::sleep(SAMPLE_PAGE_DELAY).await;
        }

        info!(trait_instances = sampled, trait_types = lookup.trait_type_count(), "sampled trait counts");
        Ok(lookup)
    }

    /// Fetch one rover, retrying while rate limited.
    pub async fn fetch_nft(&self, token: &TokenId) -> Result<Rover, ProviderError> {
        let url = format!(
            "{}/chain/{}/contract/{}/nfts/{}",
            self.config.api_url, self.config.chain, self.config.contract, token
        );
        let attempts = self.config.max_retries.max(1);

        for attempt in 1..=attempts {
            debug!(url = %url, attempt, "fetching rover metadata");
            let response = self.get_json(&url).await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!(token = %token, attempt, attempts, "rate limited");
                if attempt < attempts {
                    tokio::time::sleep(RATE_LIMIT_BACKOFF.saturating_mul(attempt)).await;
                }
                continue;
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ProviderError::NotFound {
                    token: token.to_string(),
                });
            }

            let json = read_json(response).await?;
            return parse_nft(&json);
        }

        Err(ProviderError::RateLimited { attempts })
    }
}

impl RarityProvider for OpenSeaClient {
    async fn fetch_rarity(&self) -> Result<RaritySnapshot, ProviderError> {
        let lookup = self.fetch_trait_counts().await?;
        Ok(RaritySnapshot {
            lookup,
            total_supply: self.config.total_supply,
            cached: false,
            fetched_at: Utc::now(),
        })
    }
}

impl MetadataProvider for OpenSeaClient {
    async fn fetch_rover(&self, token: &TokenId) -> Result<Rover, ProviderError> {
        self.fetch_nft(token).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| ProviderError::Parse(format!("response body: {e}")))
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Read the `traits` table of a collection response.
///
/// Returns `None` when the response has no table, which tells the caller to
/// sample instead. Counts that are not non-negative integers are skipped.
pub fn parse_collection_traits(json: &serde_json::Value) -> Option<RarityLookup> {
    let table = json.get("traits")?.as_object()?;
    let mut lookup = RarityLookup::new();
    for (trait_type, values) in table {
        let Some(values) = values.as_object() else {
            continue;
        };
        for (value, count) in values {
            if let Some(count) = count.as_u64().and_then(|c| u32::try_from(c).ok()) {
                lookup.insert(trait_type.as_str(), value.as_str(), count);
            }
        }
    }
    Some(lookup)
}

/// Add every trait on a page of NFTs to `lookup`. Returns the number of
/// trait instances counted.
pub fn count_page_traits(json: &serde_json::Value, lookup: &mut RarityLookup) -> usize {
    let mut counted: usize = 0;
    let nfts = json.get("nfts").and_then(serde_json::Value::as_array);
    for nft in nfts.into_iter().flatten() {
        for attribute in parse_traits(nft) {
            let current = lookup.count(&attribute.trait_type, &attribute.value).unwrap_or(0);
            lookup.insert(attribute.trait_type, attribute.value, current.saturating_add(1));
            counted = counted.saturating_add(1);
        }
    }
    counted
}

/// Build a [`Rover`] from a single-NFT response (`{ "nft": { ... } }`).
pub fn parse_nft(json: &serde_json::Value) -> Result<Rover, ProviderError> {
    let nft = json
        .get("nft")
        .ok_or_else(|| ProviderError::Parse("NFT data not found in response".to_owned()))?;

    let identifier = nft
        .get("identifier")
        .and_then(scalar_to_string)
        .ok_or_else(|| ProviderError::Parse("NFT missing identifier".to_owned()))?;

    let name = nft
        .get("name")
        .and_then(serde_json::Value::as_str)
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("Rover #{identifier}"), ToOwned::to_owned);

    let image_url = ["image_url", "display_image_url"]
        .iter()
        .find_map(|key| nft.get(*key).and_then(serde_json::Value::as_str).filter(|u| !u.is_empty()))
        .map(ToOwned::to_owned);

    Ok(Rover {
        identifier: TokenId::new(identifier),
        name,
        image_url,
        traits: parse_traits(nft),
    })
}

fn parse_traits(nft: &serde_json::Value) -> Vec<RoverTrait> {
    nft.get("traits")
        .and_then(serde_json::Value::as_array)
        .map(|traits| {
            traits
                .iter()
                .filter_map(|t| {
                    let trait_type = t.get("trait_type").and_then(serde_json::Value::as_str)?;
                    let value = t.get("value").and_then(scalar_to_string)?;
                    Some(RoverTrait::new(trait_type, value))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Marketplace values may be strings or numbers.
fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_traits_are_read() {
        let json = serde_json::json!({
            "collection": "rovers-by-mycobiotics-ltd",
            "traits": {
                "Body": { "Chrome": 250, "Rust": 40 },
                "Biome": { "Tundra": 900 },
                "Broken": "not a table"
            }
        });
        let lookup = parse_collection_traits(&json);
        assert!(lookup.is_some());
        let lookup = lookup.unwrap_or_default();
        assert_eq!(lookup.count("Body", "Chrome"), Some(250));
        assert_eq!(lookup.count("Biome", "Tundra"), Some(900));
        assert_eq!(lookup.trait_type_count(), 2);
    }

    #[test]
    fn missing_trait_table_means_sample() {
        let json = serde_json::json!({ "collection": "rovers-by-mycobiotics-ltd" });
        assert!(parse_collection_traits(&json).is_none());
    }

    #[test]
    fn page_traits_are_counted() {
        let json = serde_json::json!({
            "nfts": [
                { "traits": [ { "trait_type": "Body", "value": "Chrome" } ] },
                { "traits": [ { "trait_type": "Body", "value": "Chrome" }, { "trait_type": "Level", "value": 3 } ] },
                { "identifier": "9" }
            ],
            "next": "abc"
        });
        let mut lookup = RarityLookup::new();
        assert_eq!(count_page_traits(&json, &mut lookup), 3);
        assert_eq!(lookup.count("Body", "Chrome"), Some(2));
        assert_eq!(lookup.count("Level", "3"), Some(1));
    }

    #[test]
    fn nft_is_parsed_into_rover() {
        let json = serde_json::json!({
            "nft": {
                "identifier": "1234",
                "name": "Rover #1234",
                "image_url": null,
                "display_image_url": "https://cdn.example/1234.mp4",
                "traits": [
                    { "trait_type": "Body", "value": "Chrome" },
                    { "trait_type": "Biome", "value": "Tundra" }
                ]
            }
        });
        let rover = parse_nft(&json);
        assert!(rover.is_ok());
        if let Ok(rover) = rover {
            assert_eq!(rover.identifier.as_str(), "1234");
            assert_eq!(rover.image_url.as_deref(), Some("https://cdn.example/1234.mp4"));
            assert_eq!(rover.traits.len(), 2);
        }
    }

    #[test]
    fn unnamed_nft_gets_default_name() {
        let json = serde_json::json!({ "nft": { "identifier": 77, "name": null } });
        let rover = parse_nft(&json);
        assert!(rover.is_ok_and(|r| r.name == "Rover #77" && r.traits.is_empty()));
    }

    #[test]
    fn response_without_nft_is_rejected() {
        let json = serde_json::json!({ "detail": "nope" });
        assert!(matches!(parse_nft(&json), Err(ProviderError::Parse(_))));
    }
}
