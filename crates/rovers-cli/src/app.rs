//! Shared state for every subcommand.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use rovers_collection::{
    CachedRarityProvider, CollectionConfig, MetadataProvider, OpenSeaClient, RarityProvider,
    RaritySnapshot, StaticProvider,
};
use rovers_core::{GameConfig, TokioClock};
use rovers_types::{Rover, TokenId};

use crate::fixtures::Fixtures;

/// Where rarity counts and rover metadata come from.
pub enum RoverSource {
    /// The local fixtures.
    Fixtures(StaticProvider),
    /// The marketplace API, with trait counts cached.
    Live(Box<CachedRarityProvider<OpenSeaClient, TokioClock>>),
}

impl RoverSource {
    /// Build the marketplace source from `COLLECTION_*` variables.
    pub fn live() -> Result<Self> {
        let config = CollectionConfig::from_env()?;
        info!(
            api_url = %config.api_url,
            collection = %config.collection_slug,
            cache_ttl_secs = config.cache_ttl.as_secs(),
            "Using live collection data"
        );
        let ttl = config.cache_ttl;
        Ok(Self::Live(Box::new(CachedRarityProvider::new(
            OpenSeaClient::new(config),
            TokioClock,
            ttl,
        ))))
    }

    /// Current trait counts.
    pub async fn snapshot(&self) -> Result<RaritySnapshot> {
        let snapshot = match self {
            Self::Fixtures(provider) => provider.fetch_rarity().await?,
            Self::Live(provider) => provider.fetch_rarity().await?,
        };
        Ok(snapshot)
    }

    /// Metadata for one rover.
    pub async fn rover(&self, token: &str) -> Result<Rover> {
        let token = TokenId::new(token);
        let rover = match self {
            Self::Fixtures(provider) => provider.fetch_rover(&token).await,
            Self::Live(provider) => provider.inner().fetch_rover(&token).await,
        };
        rover.with_context(|| format!("rover {token} unavailable"))
    }
}

/// Configuration, fixtures and data source resolved from the command line.
pub struct App {
    /// Game tuning.
    pub config: GameConfig,
    /// Local catalog and sample rovers.
    pub fixtures: Fixtures,
    /// Rarity and metadata source.
    pub source: RoverSource,
}

impl App {
    /// Load configuration and fixtures and pick a data source.
    ///
    /// A missing configuration file falls back to the built-in defaults.
    pub fn load(config_path: &Path, fixtures_dir: &Path, live: bool) -> Result<Self> {
        let config = if config_path.exists() {
            GameConfig::from_file(config_path)
                .with_context(|| format!("invalid configuration {}", config_path.display()))?
        } else {
            info!(path = %config_path.display(), "No configuration file, using defaults");
            GameConfig::default()
        };

        let fixtures = Fixtures::load(fixtures_dir)?;
        info!(
            rovers = fixtures.rovers.len(),
            items = fixtures.items.len(),
            expeditions = fixtures.expeditions.len(),
            "Fixtures loaded"
        );

        let source = if live {
            RoverSource::live()?
        } else {
            RoverSource::Fixtures(StaticProvider::new(
                fixtures.snapshot.clone(),
                fixtures.rovers.clone(),
            ))
        };

        Ok(Self {
            config,
            fixtures,
            source,
        })
    }
}
