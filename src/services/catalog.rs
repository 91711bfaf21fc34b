use reqwest::{header, Client as HttpClient};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogPage, Movie},
};

const FALLBACK_FAILURE_MESSAGE: &str = "Failed to fetch movies";

/// Source of movie listings
#[async_trait::async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Searches for `query`, or lists popular movies when it is empty
    async fn fetch(&self, query: &str) -> AppResult<CatalogPage>;

    /// Gateway name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Body shape shared by the catalog's success and failure replies
#[derive(Debug, Deserialize)]
struct CatalogBody {
    #[serde(default)]
    results: Option<Vec<Movie>>,
    #[serde(rename = "Response", default)]
    response_flag: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    status_message: Option<String>,
}

impl From<CatalogBody> for CatalogPage {
    fn from(body: CatalogBody) -> Self {
        let flagged = body.response_flag.as_deref() == Some("False") || body.success == Some(false);

        if flagged {
            let message = body
                .error
                .or(body.status_message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string());
            return CatalogPage::Failed(message);
        }

        CatalogPage::Results(body.results.unwrap_or_default())
    }
}

/// TMDB-compatible catalog: free-text search for a non-empty query,
/// popularity-sorted discovery for an empty one
#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogGateway for TmdbCatalog {
    async fn fetch(&self, query: &str) -> AppResult<CatalogPage> {
        let request = if query.is_empty() {
            self.http_client
                .get(format!("{}/discover/movie", self.api_url))
                .query(&[("sort_by", "popularity.desc")])
        } else {
            self.http_client
                .get(format!("{}/search/movie", self.api_url))
                .query(&[("query", query)])
        };

        let response = request
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                query = %query,
                status = %status,
                body = %body,
                "Catalog request failed"
            );
            return Err(AppError::Upstream(format!(
                "Catalog returned status {}",
                status
            )));
        }

        let body: CatalogBody = response.json().await?;
        let page = CatalogPage::from(body);

        match &page {
            CatalogPage::Results(movies) => tracing::info!(
                query = %query,
                results = movies.len(),
                gateway = self.name(),
                "Catalog fetch completed"
            ),
            CatalogPage::Failed(message) => tracing::warn!(
                query = %query,
                message = %message,
                "Catalog reported a failed request"
            ),
        }

        Ok(page)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
