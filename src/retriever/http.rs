//! HTTP client for the vector index service

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RetrievedDocument, RetrieverError, SimilaritySearch};
use crate::model::VectorIndexConfig;
use async_trait::async_trait;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    collection: &'a str,
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<RetrievedDocument>,
}

/// Client for the vector index service holding the embedded reference corpus
///
/// Embedding and nearest-neighbour search both live behind the service; the
/// client only carries the query text and fan-out.
pub struct VectorIndexClient {
    client: Client,
    base_url: String,
    collection: String,
}

impl VectorIndexClient {
    pub fn new(config: &VectorIndexConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("dga-agent/0.1")
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
        }
    }
}

#[async_trait]
impl SimilaritySearch for VectorIndexClient {
    async fn search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrieverError> {
        let url = format!("{}/query", self.base_url);

        tracing::debug!(url = %url, collection = %self.collection, k = k, "Querying vector index");

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest {
                collection: &self.collection,
                query,
                top_k: k,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrieverError::Index(format!(
                "HTTP {} from vector index",
                response.status()
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrieverError::ParseError(e.to_string()))?;

        tracing::debug!(count = body.results.len(), "Vector index returned documents");

        Ok(body.results)
    }
}
