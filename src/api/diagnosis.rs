//! REST API endpoints for the diagnosis pipeline and master data

use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::db::repository::DiagnosisRepository;
use crate::model::{FinalReport, OilParameter, RequestMeta};
use crate::service::{DiagnosisInput, DiagnosisService};

/// Request body for a diagnosis run
///
/// `document_text` is the concatenated text of all pages of the uploaded
/// lab report; the remaining fields are the manual oil-quality readings
/// and identifying form values, raw as entered.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DiagnoseRequest {
    pub document_text: String,
    #[serde(default)]
    pub appearance: String,
    #[serde(default)]
    pub water_content: String,
    #[serde(default)]
    pub resistivity: String,
    #[serde(default)]
    pub tan_delta: String,
    #[serde(default)]
    pub bdv: String,
    #[serde(default)]
    pub transformer_id: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub substation_short_id: String,
    #[serde(default)]
    pub substation_name: String,
    #[serde(default)]
    pub transformer_name: String,
}

impl DiagnoseRequest {
    /// Map the form fields onto the canonical parameter labels, in the
    /// fixed order they appear in the report and retrieval query.
    fn parameters(&self) -> Vec<OilParameter> {
        vec![
            OilParameter::new("Appearance & Colour", &self.appearance),
            OilParameter::new("Water content", &self.water_content),
            OilParameter::new("Resistivity @ 90°C", &self.resistivity),
            OilParameter::new("Tan Delta @90 °C", &self.tan_delta),
            OilParameter::new("B.D.V @ 61.8Hz with stirrer", &self.bdv),
            OilParameter::new("TRANSFORMER_ID", &self.transformer_id),
            OilParameter::new("Capacity", &self.capacity),
        ]
    }
}

/// Response carrying the assembled report and its rendered text form
#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnoseResponse {
    pub report: FinalReport,
    pub report_text: String,
}

/// Run the diagnosis pipeline for one uploaded lab report
#[utoipa::path(
    post,
    path = "/v1/diagnosis",
    request_body = DiagnoseRequest,
    responses(
        (status = 200, description = "Diagnosis completed", body = DiagnoseResponse),
        (status = 400, description = "A classifiable parameter value is not numeric"),
        (status = 422, description = "No gas data found or no similar records found"),
        (status = 502, description = "Vector index unavailable")
    ),
    tag = "diagnosis"
)]
#[post("/v1/diagnosis")]
pub async fn diagnose(
    service: web::Data<DiagnosisService>,
    repository: web::Data<DiagnosisRepository>,
    request: web::Json<DiagnoseRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let parameters = request.parameters();

    let input = DiagnosisInput {
        document_text: request.document_text,
        parameters: parameters.clone(),
        meta: RequestMeta {
            substation_short_id: request.substation_short_id,
            substation_name: request.substation_name,
            transformer_id: request.transformer_id,
            transformer_name: request.transformer_name,
            capacity: request.capacity,
            testing_date: Utc::now(),
        },
    };

    let report = service.diagnose(input).await?;

    // Persistence failure must not withhold the finished report
    if let Err(e) = repository.insert_result(&report, &parameters).await {
        tracing::error!(error = %e, "Failed to persist diagnosis result");
    }

    let report_text = report.render();

    Ok(HttpResponse::Ok().json(DiagnoseResponse {
        report,
        report_text,
    }))
}

/// Transformer entry in the masters response
#[derive(Debug, Serialize, ToSchema)]
pub struct TransformerInfo {
    pub transformer_name: String,
    pub transformer_capacity: Option<f64>,
}

/// Substation and transformer master data for form population
#[derive(Debug, Serialize, ToSchema)]
pub struct MastersResponse {
    /// Substation short id to substation name
    pub substations: BTreeMap<String, String>,
    /// Substation short id to its transformers, keyed by transformer id
    pub transformers: BTreeMap<String, BTreeMap<String, TransformerInfo>>,
}

/// List substation and transformer master data
#[utoipa::path(
    get,
    path = "/v1/masters",
    responses(
        (status = 200, description = "Master data retrieved", body = MastersResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "masters"
)]
#[get("/v1/masters")]
pub async fn list_masters(
    repository: web::Data<DiagnosisRepository>,
) -> Result<impl Responder, ApiError> {
    let substations: BTreeMap<String, String> = repository
        .list_substations()
        .await?
        .into_iter()
        .map(|row| (row.substation_short_id, row.substation_name))
        .collect();

    let mut transformers: BTreeMap<String, BTreeMap<String, TransformerInfo>> = BTreeMap::new();
    for row in repository.list_transformers().await? {
        transformers
            .entry(row.substation_short_id)
            .or_default()
            .insert(
                row.transformer_id,
                TransformerInfo {
                    transformer_name: row.transformer_name,
                    transformer_capacity: row.transformer_capacity,
                },
            );
    }

    Ok(HttpResponse::Ok().json(MastersResponse {
        substations,
        transformers,
    }))
}

/// Configure diagnosis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(diagnose).service(list_masters);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_keep_canonical_labels_and_order() {
        let request = DiagnoseRequest {
            document_text: String::new(),
            appearance: "Pale Yellow".to_string(),
            water_content: "18".to_string(),
            resistivity: String::new(),
            tan_delta: String::new(),
            bdv: "65".to_string(),
            transformer_id: "TR7".to_string(),
            capacity: "200".to_string(),
            substation_short_id: String::new(),
            substation_name: String::new(),
            transformer_name: String::new(),
        };

        let parameters = request.parameters();
        assert_eq!(parameters.len(), 7);
        assert_eq!(parameters[0].key, "Appearance & Colour");
        assert_eq!(parameters[4].key, "B.D.V @ 61.8Hz with stirrer");
        assert_eq!(parameters[4].value, "65");
        assert_eq!(parameters[6].key, "Capacity");
        assert_eq!(parameters[6].value, "200");
    }
}
