use crate::{
    error::AppResult,
    models::{Movie, TrendingEntry},
};

pub mod memory;
pub mod redis;

pub use self::memory::MemoryTrendingStore;
pub use self::redis::{create_redis_client, RedisTrendingStore};

/// Keyed hit counter with a top-N query
///
/// Redis is the production backend; the in-memory store backs tests and
/// local runs without Redis.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrendingStore: Send + Sync {
    /// Creates the entry for `query` with count 1 and `movie` as its
    /// representative, or bumps the count of an existing entry while leaving
    /// its representative untouched.
    async fn record_hit(&self, query: &str, movie: &Movie) -> AppResult<()>;

    /// Entries ordered by descending count, at most `limit` of them
    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
