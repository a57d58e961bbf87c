//! Semantic similarity retrieval against the external vector index

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::VectorIndexClient;

#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Vector index error: {0}")]
    Index(String),
}

/// Metadata attached to an indexed reference document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Path of the backing source file, used for reference copying
    #[serde(default)]
    pub source: Option<String>,
    /// Page of the source document the chunk came from
    #[serde(default)]
    pub page: Option<u32>,
}

/// A reference document returned by similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

/// Trait for similarity search over the reference document index
///
/// An empty result is a valid terminal state for the request; callers must
/// not synthesize fallback context.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrieverError>;
}
