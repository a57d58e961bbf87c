//! Deterministic retrieval query construction
//!
//! The query string doubles as the narrative cache key, so identical
//! inputs must always serialize identically.

use crate::model::{GasReading, OilParameter};

/// Serialize gas readings and user parameters into a single query string:
/// `"H2=12.4, CH4=Not Detected, Water content=18, ..."`.
///
/// Gas readings come first in extraction order, then parameters in slice
/// order. Parameters whose value trims to empty are omitted.
pub fn build_query(readings: &[GasReading], parameters: &[OilParameter]) -> String {
    let gas_parts = readings
        .iter()
        .map(|r| format!("{}={}", r.gas_name, r.ppm));

    let param_parts = parameters
        .iter()
        .filter(|p| !p.value.trim().is_empty())
        .map(|p| format!("{}={}", p.key, p.value));

    gas_parts.chain(param_parts).collect::<Vec<_>>().join(", ")
}
