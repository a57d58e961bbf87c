//! OpenAPI specification endpoints

use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::api::diagnosis::{
    DiagnoseRequest, DiagnoseResponse, MastersResponse, TransformerInfo,
};
use crate::api::health::{DependencyHealth, HealthStatus, ReadinessStatus};
use crate::model::{
    ClassificationResult, DiagnosisNarrative, FinalReport, GasReading, OilStatus, ReferenceEntry,
    RequestMeta,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::diagnosis::diagnose,
        crate::api::diagnosis::list_masters,
        crate::api::health::liveness,
        crate::api::health::readiness,
    ),
    components(schemas(
        DiagnoseRequest,
        DiagnoseResponse,
        MastersResponse,
        TransformerInfo,
        FinalReport,
        RequestMeta,
        GasReading,
        ClassificationResult,
        OilStatus,
        DiagnosisNarrative,
        ReferenceEntry,
        HealthStatus,
        ReadinessStatus,
        DependencyHealth,
    )),
    tags(
        (name = "diagnosis", description = "DGA diagnosis pipeline"),
        (name = "masters", description = "Substation and transformer master data"),
        (name = "health", description = "Service health probes"),
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
