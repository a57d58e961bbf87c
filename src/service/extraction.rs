//! Gas concentration extraction from lab report text
//!
//! Scans the concatenated page text of an uploaded chromatograph report for
//! the tabular result rows and lifts out (gas name, concentration) pairs.

use regex::Regex;

use crate::model::{GasReading, NOT_DETECTED};

/// Extracts gas readings from raw lab report text
///
/// A result row looks like
/// `2.150  1  BB +I  1.2E+01  -  H2`:
/// a retention time, a peak flag, an optional detector code, one or two
/// area/height fields, the concentration (numeric or a dash for below
/// detection limit), and the gas identifier.
pub struct GasDataExtractor {
    row_pattern: Regex,
}

impl GasDataExtractor {
    pub fn new() -> Self {
        Self {
            row_pattern: Regex::new(
                r"(\d+\.\d+)\s+\d\s+(?:BB\s+\+I|BV\s+\+I|VBA\s+\+I)?\s*[\d.Ee+-]*\s*[\d.Ee+-]*\s*([\d.Ee+-]+|-)\s+(\w+)",
            )
            .unwrap(),
        }
    }

    /// Extract all gas readings in order of appearance.
    ///
    /// Concentration strings are kept verbatim; a dash becomes the
    /// `Not Detected` sentinel. Repeated gas names are all retained.
    /// An empty result means the document carries no recognizable gas
    /// data and the request must stop there.
    pub fn extract(&self, raw_text: &str) -> Vec<GasReading> {
        let readings: Vec<GasReading> = self
            .row_pattern
            .captures_iter(raw_text)
            .map(|caps| {
                let ppm = &caps[2];
                GasReading {
                    gas_name: caps[3].to_string(),
                    ppm: if ppm == "-" {
                        NOT_DETECTED.to_string()
                    } else {
                        ppm.to_string()
                    },
                }
            })
            .collect();

        tracing::debug!(count = readings.len(), "Extracted gas readings");
        readings
    }
}

impl Default for GasDataExtractor {
    fn default() -> Self {
        Self::new()
    }
}
