pub mod chat;
pub mod movie;
pub mod trending;

pub use chat::{ChatRequest, ChatResponse, ErrorBody};
pub use movie::{CatalogPage, Movie};
pub use trending::{trending_key, TrendingEntry};

#[cfg(test)]
pub(crate) use movie::sample_movie;
