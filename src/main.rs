use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod db;
mod model;
mod retriever;
mod service;

use db::repository::DiagnosisRepository;
use model::Config;
use retriever::VectorIndexClient;
use service::{DiagnosisCache, DiagnosisService, OllamaGenerator};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    if let Err(e) = std::fs::create_dir_all(&config.docs_dir) {
        tracing::warn!(error = %e, dir = %config.docs_dir.display(), "Failed to create docs directory");
    }

    // Initialize PostgreSQL database
    let db_pool = db::create_pool()
        .await
        .expect("Failed to create database pool");

    // Initialize database schema
    db::init_schema(&db_pool)
        .await
        .expect("Failed to initialize database schema");

    // Initialize Redis cache (optional - will log warning if Redis is unavailable)
    let cache = match DiagnosisCache::new().await {
        Ok(cache) => {
            tracing::info!("Redis narrative cache enabled");
            Some(cache)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
            None
        }
    };

    // External collaborators behind their request/response contracts
    let retriever = Arc::new(VectorIndexClient::new(&config.vector_index));
    let generator = Arc::new(OllamaGenerator::new(&config.generation));

    let diagnosis_service = web::Data::new(DiagnosisService::new(
        retriever,
        generator,
        cache.clone(),
        config.vector_index.top_k,
        config.docs_dir.clone(),
    ));

    let repository = web::Data::new(DiagnosisRepository::new(db_pool.clone()));
    let db_pool_data = web::Data::new(db_pool);
    let cache_data = web::Data::new(cache);

    tracing::info!("Starting DGA diagnosis agent on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(diagnosis_service.clone())
            .app_data(repository.clone())
            .app_data(db_pool_data.clone())
            .app_data(cache_data.clone())
            .configure(api::diagnosis::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
