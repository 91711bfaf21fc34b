use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::db::TrendingStore;
use crate::models::{Movie, TrendingEntry};

/// Message for asynchronous trending writes
struct HitMessage {
    query: String,
    movie: Movie,
}

/// Best-effort client for the trending store
///
/// Hits are queued and written by a background task so that a slow or
/// unreachable store never holds up a search. Reads swallow failures and
/// return an empty ranking, since trending is an enhancement only.
#[derive(Clone)]
pub struct TrendingClient {
    store: Arc<dyn TrendingStore>,
    write_tx: mpsc::UnboundedSender<HitMessage>,
}

/// Handle for gracefully shutting down the trending writer
pub struct TrendingWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl TrendingWriterHandle {
    /// Stops the writer after flushing every hit queued so far
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Trending writer task failed");
        }
        tracing::info!("Trending writer stopped");
    }
}

impl TrendingClient {
    /// Creates the client and spawns its background writer
    pub fn new(store: Arc<dyn TrendingStore>) -> (Self, TrendingWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_store = store.clone();
        let task = tokio::spawn(async move {
            Self::writer_task(writer_store, write_rx, shutdown_rx).await;
        });

        let client = Self { store, write_tx };
        let handle = TrendingWriterHandle { shutdown_tx, task };

        (client, handle)
    }

    /// Background task that applies queued hits in arrival order
    async fn writer_task(
        store: Arc<dyn TrendingStore>,
        mut write_rx: mpsc::UnboundedReceiver<HitMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(store = store.name(), "Trending writer started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    Self::apply(store.as_ref(), msg).await;
                }
                Some(()) = shutdown_rx.recv() => {
                    // Clients may still hold senders, so drain only what is queued
                    while let Ok(msg) = write_rx.try_recv() {
                        Self::apply(store.as_ref(), msg).await;
                    }
                    break;
                }
                else => break,
            }
        }
    }

    async fn apply(store: &dyn TrendingStore, msg: HitMessage) {
        match store.record_hit(&msg.query, &msg.movie).await {
            Ok(()) => tracing::debug!(query = %msg.query, "Trending hit stored"),
            Err(e) => tracing::warn!(
                query = %msg.query,
                error = %e,
                "Failed to record trending hit"
            ),
        }
    }

    /// Queues a hit for `query` with `movie` as its representative
    ///
    /// Fire-and-forget: returns immediately and never reports failure.
    pub fn record_hit(&self, query: &str, movie: &Movie) {
        let msg = HitMessage {
            query: query.to_string(),
            movie: movie.clone(),
        };

        if self.write_tx.send(msg).is_err() {
            tracing::warn!(query = %query, "Trending writer is gone, dropping hit");
        }
    }

    /// Current ranking, or an empty list when the store cannot be read
    pub async fn top_trending(&self, limit: usize) -> Vec<TrendingEntry> {
        match self.store.top_trending(limit).await {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Loaded trending entries");
                entries
            }
            Err(e) => {
                tracing::warn!(error = %e, store = self.store.name(), "Failed to load trending entries");
                Vec::new()
            }
        }
    }
}
