use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::db::TrendingStore;
use crate::error::AppResult;
use crate::models::{trending_key, Movie, TrendingEntry};

/// Process-local trending store
///
/// Entries keep insertion order, which is also the tie-break for equal counts.
#[derive(Default)]
pub struct MemoryTrendingStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    entries: Vec<TrendingEntry>,
    index: HashMap<String, usize>,
}

impl MemoryTrendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TrendingStore for MemoryTrendingStore {
    async fn record_hit(&self, query: &str, movie: &Movie) -> AppResult<()> {
        let key = trending_key(query);
        let mut inner = self.inner.write().await;

        match inner.index.get(&key).copied() {
            Some(position) => inner.entries[position].count += 1,
            None => {
                let position = inner.entries.len();
                inner.entries.push(TrendingEntry {
                    query: query.trim().to_string(),
                    count: 1,
                    movie: movie.clone(),
                });
                inner.index.insert(key, position);
            }
        }

        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>> {
        let inner = self.inner.read().await;
        let mut ranked = inner.entries.clone();
        // Stable sort keeps insertion order among equal counts
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_movie;

    #[tokio::test]
    async fn test_first_hit_creates_entry_with_count_one() {
        let store = MemoryTrendingStore::new();
        let inception = sample_movie(27205, "Inception");

        store.record_hit("Inception", &inception).await.unwrap();

        let top = store.top_trending(10).await.unwrap();
        assert_eq!(
            top,
            vec![TrendingEntry {
                query: "Inception".to_string(),
                count: 1,
                movie: inception,
            }]
        );
    }

    #[tokio::test]
    async fn test_repeat_hit_increments_and_keeps_representative() {
        let store = MemoryTrendingStore::new();
        let inception = sample_movie(27205, "Inception");

        store.record_hit("Inception", &inception).await.unwrap();
        store
            .record_hit("inception", &sample_movie(99, "Something Else"))
            .await
            .unwrap();

        let top = store.top_trending(10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].query, "Inception");
        assert_eq!(top[0].movie, inception);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = MemoryTrendingStore::new();

        store.record_hit("up", &sample_movie(1, "Up")).await.unwrap();
        store.record_hit("heat", &sample_movie(2, "Heat")).await.unwrap();
        store.record_hit("alien", &sample_movie(3, "Alien")).await.unwrap();
        store.record_hit("alien", &sample_movie(3, "Alien")).await.unwrap();

        let top = store.top_trending(3).await.unwrap();
        let queries: Vec<_> = top.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["alien", "up", "heat"]);

        let top = store.top_trending(1).await.unwrap();
        assert_eq!(top.len(), 1);
    }
}
