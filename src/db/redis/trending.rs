use redis::AsyncCommands;
use redis::Client;
use serde::{Deserialize, Serialize};

use crate::db::TrendingStore;
use crate::error::AppResult;
use crate::models::{trending_key, Movie, TrendingEntry};

/// Sorted set: member = trending key, score = hit count
const COUNTS_KEY: &str = "trending:counts";
/// Hash: field = trending key, value = JSON `StoredEntry`
const ENTRIES_KEY: &str = "trending:entries";

/// Creates a Redis client for the trending store
///
/// Opening the client only parses the URL; connections are made per call.
/// Inclusive stop index for the first `limit` ranks; `limit` must be non-zero
fn last_rank(limit: usize) -> isize {
    isize::try_from(limit).unwrap_or(isize::MAX) - 1
}

pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Representative data written once, when a term is first recorded
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    query: String,
    movie: Movie,
}

/// Trending store backed by a Redis sorted set
///
/// Ties in count are resolved by Redis' own ordering of equal scores.
#[derive(Clone)]
pub struct RedisTrendingStore {
    redis_client: Client,
}

impl RedisTrendingStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }
}

#[async_trait::async_trait]
impl TrendingStore for RedisTrendingStore {
    async fn record_hit(&self, query: &str, movie: &Movie) -> AppResult<()> {
        let key = trending_key(query);
        let stored = serde_json::to_string(&StoredEntry {
            query: query.trim().to_string(),
            movie: movie.clone(),
        })?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        // HSETNX keeps the first representative; ZINCRBY creates at 1 or bumps.
        let _: () = redis::pipe()
            .atomic()
            .hset_nx(ENTRIES_KEY, &key, stored)
            .ignore()
            .zincr(COUNTS_KEY, &key, 1)
            .ignore()
            .query_async(&mut conn)
            .await?;

        tracing::debug!(key = %key, movie_id = movie.id, "Recorded trending hit");
        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let ranked: Vec<(String, f64)> = conn
            .zrevrange_withscores(COUNTS_KEY, 0, last_rank(limit))
            .await?;
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<&str> = ranked.iter().map(|(key, _)| key.as_str()).collect();
        let stored: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(ENTRIES_KEY)
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut entries = Vec::with_capacity(ranked.len());
        for ((key, score), raw) in ranked.into_iter().zip(stored) {
            let Some(raw) = raw else {
                tracing::warn!(key = %key, "Trending counter without stored entry");
                continue;
            };
            match serde_json::from_str::<StoredEntry>(&raw) {
                Ok(entry) => entries.push(TrendingEntry {
                    query: entry.query,
                    count: score as u64,
                    movie: entry.movie,
                }),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping unreadable trending entry")
                }
            }
        }

        Ok(entries)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
