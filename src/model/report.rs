//! Domain records for a single diagnosis request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentinel concentration for a gas row whose value column is a dash
pub const NOT_DETECTED: &str = "Not Detected";

/// A single gas concentration extracted from the lab report text
///
/// The ppm field stays exactly as captured from the source text (or the
/// `NOT_DETECTED` sentinel); no numeric parsing happens at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GasReading {
    pub gas_name: String,
    pub ppm: String,
}

/// One manually entered oil-quality parameter, raw value as typed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OilParameter {
    pub key: String,
    pub value: String,
}

impl OilParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Which standards table applies to a report, derived once from capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityClass {
    /// Above 170 MVA, classified against the TypeOne table
    HighCapacity,
    /// 170 MVA and below, classified against the TypeTwo table
    StandardCapacity,
}

impl CapacityClass {
    pub const THRESHOLD_MVA: f64 = 170.0;

    /// Derive the class from the raw capacity form value.
    ///
    /// An unparseable capacity falls back to `StandardCapacity` with a
    /// warning rather than failing the whole request.
    pub fn from_capacity(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(mva) if mva > Self::THRESHOLD_MVA => Self::HighCapacity,
            Ok(_) => Self::StandardCapacity,
            Err(_) => {
                tracing::warn!(capacity = %raw, "Capacity is not numeric, assuming standard capacity");
                Self::StandardCapacity
            }
        }
    }
}

/// Qualitative status of an oil parameter against the active standards table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OilStatus {
    Good,
    Fair,
    Poor,
    Unclassified,
}

impl std::fmt::Display for OilStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OilStatus::Good => "good",
            OilStatus::Fair => "fair",
            OilStatus::Poor => "poor",
            OilStatus::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

/// Classification outcome for one oil parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassificationResult {
    pub parameter_key: String,
    pub raw_value: String,
    pub status: OilStatus,
}

/// The two-section diagnostic narrative produced by the generator
///
/// Both fields are guaranteed non-empty; generation failure substitutes
/// the fixed `(Missing)` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisNarrative {
    pub remarks: String,
    pub preventive_steps: String,
}

impl DiagnosisNarrative {
    pub const PLACEHOLDER: &'static str = "(Missing)";

    pub fn missing() -> Self {
        Self {
            remarks: Self::PLACEHOLDER.to_string(),
            preventive_steps: Self::PLACEHOLDER.to_string(),
        }
    }

    /// Render the narrative back into its labeled two-section text form
    pub fn as_text(&self) -> String {
        format!(
            "Remarks: {}\nPreventive Steps: {}",
            self.remarks, self.preventive_steps
        )
    }
}

/// A reference document retained in the final report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceEntry {
    /// Retrieval rank, 1-based
    pub index: usize,
    /// Source file name
    pub source: String,
    /// Public locator of the copied document
    pub url: String,
}

/// Identifying fields for the report header
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RequestMeta {
    pub substation_short_id: String,
    pub substation_name: String,
    pub transformer_id: String,
    pub transformer_name: String,
    pub capacity: String,
    pub testing_date: DateTime<Utc>,
}

/// Aggregate result of one diagnosis run, immutable after assembly
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinalReport {
    pub meta: RequestMeta,
    pub readings: Vec<GasReading>,
    pub classifications: Vec<ClassificationResult>,
    pub narrative: DiagnosisNarrative,
    pub references: Vec<ReferenceEntry>,
}

impl FinalReport {
    /// Render the fixed-order textual report: header, identifying fields,
    /// gas readings, classified parameters, narrative, reference blocks.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "                   AI DGA DIAGNOSIS Report           {}\n{}",
            self.meta.testing_date.format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(50)
        ));
        lines.push(format!(
            "Substation Short Id = {}",
            self.meta.substation_short_id
        ));
        lines.push(format!("Substation Name     = {}", self.meta.substation_name));
        lines.push(format!("Transformer ID      = {}", self.meta.transformer_id));
        lines.push(format!(
            "Transformer Name    = {}",
            self.meta.transformer_name
        ));
        lines.push(format!("Capacity            = {}", self.meta.capacity));

        lines.push("=".repeat(60));
        lines.push("Input:".to_string());
        for reading in &self.readings {
            lines.push(format!("{} = {} ppm", reading.gas_name, reading.ppm));
        }

        for result in &self.classifications {
            lines.push(format!(
                "{} = {} ({})",
                result.parameter_key, result.raw_value, result.status
            ));
        }

        lines.push("-".repeat(60));
        lines.push(self.narrative.as_text());
        lines.push("-".repeat(60));

        for entry in &self.references {
            lines.push(format!("Reference {}", entry.index));
            lines.push(format!("source: {}", entry.source));
            lines.push("-".repeat(60));
        }

        lines.join("\n")
    }
}
