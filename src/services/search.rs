use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep, Instant};

use crate::{
    error::AppResult,
    models::{CatalogPage, Movie},
    services::{catalog::CatalogGateway, trending::TrendingClient},
};

/// Shown for transport and HTTP failures; raw error text stays in the logs
pub const SEARCH_FAILED_MESSAGE: &str = "Error fetching movies. Please try again later.";

/// What a view renders for the search area
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    /// Raw term, updated on every keystroke
    pub query: String,
    /// Debounced term the current results belong to
    pub active_query: String,
    pub results: Vec<Movie>,
    pub loading: bool,
    pub error: Option<String>,
}

enum SearchCommand {
    /// The raw term changed; restart the debounce window
    Keystroke,
}

/// Fetch currently awaiting the catalog
struct InFlight {
    query: String,
    handle: JoinHandle<AppResult<CatalogPage>>,
}

/// Handle to a running search task
///
/// Keystrokes update the raw term immediately. The active term follows it
/// once input has been quiet for the debounce window, and only a change of
/// the active term starts a catalog fetch. A newer fetch aborts the one in
/// flight, so a slow reply for an old term never overwrites newer results.
/// Dropping the controller stops the task and aborts any outstanding fetch.
pub struct SearchController {
    commands: mpsc::UnboundedSender<SearchCommand>,
    state_tx: Arc<watch::Sender<SearchSnapshot>>,
    state: watch::Receiver<SearchSnapshot>,
}

impl SearchController {
    /// Starts the controller; it immediately loads the popular listing for
    /// the initial empty term.
    pub fn spawn(
        gateway: Arc<dyn CatalogGateway>,
        trending: TrendingClient,
        debounce: Duration,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(SearchSnapshot {
            loading: true,
            ..SearchSnapshot::default()
        });
        let state_tx = Arc::new(state_tx);

        let worker = SearchWorker {
            gateway,
            trending,
            debounce,
            state_tx: state_tx.clone(),
        };
        tokio::spawn(worker.run(command_rx));

        Self {
            commands,
            state_tx,
            state,
        }
    }

    /// Sets the raw term and restarts the debounce window
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.state_tx.send_modify(|s| s.query = text);
        if self.commands.send(SearchCommand::Keystroke).is_err() {
            tracing::warn!("Search task has stopped, ignoring input");
        }
    }

    /// Latest published state
    pub fn snapshot(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.clone()
    }
}

/// Task side of the controller; owns the debounce timer and the fetch.
/// The raw term belongs to the handle, so the worker only ever modifies
/// the other fields in place.
struct SearchWorker {
    gateway: Arc<dyn CatalogGateway>,
    trending: TrendingClient,
    debounce: Duration,
    state_tx: Arc<watch::Sender<SearchSnapshot>>,
}

impl SearchWorker {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<SearchCommand>) {
        let mut in_flight = Some(self.start_fetch(String::new(), None));

        let timer = sleep(self.debounce);
        tokio::pin!(timer);
        let mut timer_armed = false;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SearchCommand::Keystroke) => {
                        timer.as_mut().reset(Instant::now() + self.debounce);
                        timer_armed = true;
                    }
                    None => break,
                },
                () = &mut timer, if timer_armed => {
                    timer_armed = false;
                    let pending_query = {
                        let current = self.state_tx.borrow();
                        (current.query != current.active_query).then(|| current.query.clone())
                    };
                    if let Some(query) = pending_query {
                        in_flight = Some(self.start_fetch(query, in_flight.take()));
                    }
                }
                (query, joined) = wait_for(&mut in_flight) => {
                    in_flight = None;
                    self.finish_fetch(&query, joined);
                }
            }
        }

        if let Some(stale) = in_flight.take() {
            stale.handle.abort();
        }
        tracing::debug!("Search controller stopped");
    }

    /// Makes `query` the active term and fetches it, cancelling `previous`
    fn start_fetch(&self, query: String, previous: Option<InFlight>) -> InFlight {
        if let Some(previous) = previous {
            tracing::debug!(query = %previous.query, "Cancelling superseded search");
            previous.handle.abort();
        }

        self.state_tx.send_modify(|s| {
            s.active_query = query.clone();
            s.loading = true;
            s.error = None;
        });

        let gateway = self.gateway.clone();
        let fetch_query = query.clone();
        let handle = tokio::spawn(async move { gateway.fetch(&fetch_query).await });

        InFlight { query, handle }
    }

    /// Applies the outcome of the current fetch; `loading` is cleared once,
    /// after the outcome has been folded into the snapshot.
    fn finish_fetch(&self, query: &str, joined: Result<AppResult<CatalogPage>, JoinError>) {
        let (results, error) = match joined {
            Ok(Ok(CatalogPage::Results(movies))) => {
                if !query.is_empty() {
                    if let Some(first) = movies.first() {
                        self.trending.record_hit(query, first);
                    }
                }
                (movies, None)
            }
            Ok(Ok(CatalogPage::Failed(message))) => (Vec::new(), Some(message)),
            Ok(Err(e)) => {
                tracing::error!(query = %query, error = %e, "Error fetching movies");
                (Vec::new(), Some(SEARCH_FAILED_MESSAGE.to_string()))
            }
            Err(e) => {
                tracing::error!(query = %query, error = %e, "Search task failed");
                (Vec::new(), Some(SEARCH_FAILED_MESSAGE.to_string()))
            }
        };

        self.state_tx.send_modify(|s| {
            s.results = results;
            s.error = error;
            s.loading = false;
        });
    }
}

/// Resolves when the in-flight fetch finishes; never resolves when idle
async fn wait_for(
    in_flight: &mut Option<InFlight>,
) -> (String, Result<AppResult<CatalogPage>, JoinError>) {
    match in_flight {
        Some(fetch) => {
            let joined = (&mut fetch.handle).await;
            (fetch.query.clone(), joined)
        }
        None => pending().await,
    }
}
