//! Row types and JSON shapes for persisted diagnosis results

use serde_json::json;
use sqlx::FromRow;

use crate::model::{FinalReport, OilParameter};

/// One row of the substation master table
#[derive(Debug, Clone, FromRow)]
pub struct SubstationRow {
    pub substation_short_id: String,
    pub substation_name: String,
}

/// One row of the transformer master table
#[derive(Debug, Clone, FromRow)]
pub struct TransformerRow {
    pub substation_short_id: String,
    pub transformer_id: String,
    pub transformer_name: String,
    pub transformer_capacity: Option<f64>,
}

/// Build the persisted test-input JSON: the gas map plus the raw form
/// inputs, nested under "parameters" for downstream trend analysis.
///
/// Duplicate gas names collapse to the last reading, matching the
/// map-shaped storage format.
pub fn test_input_json(report: &FinalReport, parameters: &[OilParameter]) -> serde_json::Value {
    let gases: serde_json::Map<String, serde_json::Value> = report
        .readings
        .iter()
        .map(|r| (r.gas_name.clone(), json!(r.ppm)))
        .collect();

    let form_inputs: serde_json::Map<String, serde_json::Value> = parameters
        .iter()
        .map(|p| (p.key.clone(), json!(p.value)))
        .collect();

    json!({
        "parameters": {
            "gases": gases,
            "form_inputs": form_inputs,
        }
    })
}
