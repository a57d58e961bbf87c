//! Redis cache for generated diagnosis narratives
//!
//! Keyed by the deterministic query string built from gas readings and
//! user parameters; a hit skips the generation call entirely. The service
//! runs without the cache when Redis is unavailable.

use std::env;

use redis::{AsyncCommands, Client};

use crate::model::DiagnosisNarrative;

// Environment variable names
const ENV_REDIS_HOST: &str = "DGA_AGENT_REDIS_HOST";
const ENV_REDIS_PORT: &str = "DGA_AGENT_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "DGA_AGENT_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "DGA_AGENT_REDIS_DB";
const ENV_CACHE_TTL: &str = "DGA_AGENT_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 24 * 60 * 60; // 1 day

const PREFIX_NARRATIVE: &str = "narrative:";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

/// Redis-based cache for generated narratives
#[derive(Clone)]
pub struct DiagnosisCache {
    client: Client,
    ttl_seconds: u64,
}

impl DiagnosisCache {
    /// Create a new cache instance and verify connection
    ///
    /// Configuration via environment variables:
    /// - `DGA_AGENT_REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `DGA_AGENT_REDIS_PORT` - Redis port (default: 6379)
    /// - `DGA_AGENT_REDIS_PASSWORD` - Redis password (default: none)
    /// - `DGA_AGENT_REDIS_DB` - Redis database number (default: 0)
    /// - `DGA_AGENT_CACHE_TTL` - Cache TTL in seconds (default: 86400)
    pub async fn new() -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = env::var(ENV_CACHE_TTL)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        // Build Redis URL: redis://[password@]host:port/db
        let redis_url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        // Test the connection by pinging Redis
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(host = %host, port = %port, "Redis connection established");

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    /// Get a cached narrative by its query key
    pub async fn get_narrative(&self, query: &str) -> Result<DiagnosisNarrative, CacheError> {
        let key = format!("{}{}", PREFIX_NARRATIVE, query);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let cached: Option<String> = conn.get(&key).await?;
        let json = cached.ok_or_else(|| CacheError::Miss(key.clone()))?;

        serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Cache a narrative under its query key
    pub async fn set_narrative(
        &self,
        query: &str,
        narrative: &DiagnosisNarrative,
    ) -> Result<(), CacheError> {
        let key = format!("{}{}", PREFIX_NARRATIVE, query);
        let json = serde_json::to_string(narrative)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&key, json, self.ttl_seconds).await?;

        tracing::debug!(key = %key, "Cached narrative");
        Ok(())
    }
}
