pub mod assistant;
pub mod catalog;
pub mod grounding;
pub mod providers;
pub mod relay;
pub mod sanitizer;
pub mod search;
pub mod trending;

use std::sync::Arc;

use crate::{
    config::ClientConfig,
    db::{create_redis_client, RedisTrendingStore, TrendingStore},
    models::TrendingEntry,
};

pub use assistant::{DetailSession, GroundedReply, MovieAssistant, PendingPrompt, PromptKind, Reply};
pub use catalog::{CatalogGateway, TmdbCatalog};
pub use grounding::{PersonaContext, PromptTemplate};
pub use relay::{ChatRelay, RelayClient, RelayError};
pub use sanitizer::Sanitizer;
pub use search::{SearchController, SearchSnapshot};
pub use trending::{TrendingClient, TrendingWriterHandle};

/// Everything the browsing side needs, wired from one configuration
pub struct ClientServices {
    pub search: SearchController,
    pub trending: TrendingClient,
    pub assistant: MovieAssistant,
    trending_limit: usize,
    writer: TrendingWriterHandle,
}

impl ClientServices {
    /// Connects to the real catalog, Redis and relay named in `config`.
    /// Must be called from within a Tokio runtime.
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let redis_client = create_redis_client(&config.redis_url)?;
        let catalog = TmdbCatalog::new(config.tmdb_api_key.clone(), config.tmdb_api_url.clone());

        Ok(Self::assemble(
            config,
            Arc::new(catalog),
            Arc::new(RedisTrendingStore::new(redis_client)),
            Arc::new(RelayClient::new(&config.relay_url)),
        ))
    }

    /// Wires the services over the given collaborators
    pub fn assemble(
        config: &ClientConfig,
        catalog: Arc<dyn CatalogGateway>,
        store: Arc<dyn TrendingStore>,
        relay: Arc<dyn ChatRelay>,
    ) -> Self {
        tracing::info!(
            catalog = catalog.name(),
            trending_store = store.name(),
            debounce_ms = config.search_debounce_ms,
            "Starting client services"
        );

        let (trending, writer) = TrendingClient::new(store);
        let search = SearchController::spawn(catalog, trending.clone(), config.search_debounce());
        let assistant = MovieAssistant::new(relay, Sanitizer::default(), PromptTemplate::default());

        Self {
            search,
            trending,
            assistant,
            trending_limit: config.trending_limit,
            writer,
        }
    }

    /// Current trending strip, at most `TRENDING_LIMIT` entries
    pub async fn trending_strip(&self) -> Vec<TrendingEntry> {
        self.trending.top_trending(self.trending_limit).await
    }

    /// Stops searching and flushes pending trending writes
    pub async fn shutdown(self) {
        drop(self.search);
        drop(self.trending);
        self.writer.shutdown().await;
    }
}
