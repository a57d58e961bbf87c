//! Liveness and readiness probes

use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::service::DiagnosisCache;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Per-dependency state reported by the readiness probe
#[derive(Serialize, ToSchema)]
pub struct DependencyHealth {
    /// Result database, required for serving traffic
    pub database: String,
    /// Narrative cache, optional at runtime
    pub cache: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessStatus {
    pub status: String,
    pub version: String,
    pub dependencies: DependencyHealth,
}

/// Liveness probe; answers 200 whenever the process is up
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn database_state(pool: &PgPool) -> &'static str {
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::error!(error = %e, "Readiness probe could not reach the database");
            "unhealthy"
        }
    }
}

/// Readiness probe
///
/// Ready only when the database answers; a disabled narrative cache is
/// reported but does not fail the probe. The vector index and generation
/// service are request-time dependencies and deliberately not probed here.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessStatus),
        (status = 503, description = "Service is not ready", body = ReadinessStatus)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(
    db_pool: web::Data<PgPool>,
    cache: web::Data<Option<DiagnosisCache>>,
) -> impl Responder {
    let database = database_state(db_pool.get_ref()).await;
    let ready = database == "healthy";

    let body = ReadinessStatus {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies: DependencyHealth {
            database: database.to_string(),
            cache: if cache.is_some() { "healthy" } else { "disabled" }.to_string(),
        },
    };

    if ready {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}
