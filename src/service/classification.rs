//! Oil-quality parameter classification against the standards tables
//!
//! Two read-only tables exist: TypeOne for transformers above 170 MVA and
//! TypeTwo for the rest. A report is classified against exactly one of
//! them, chosen once from the transformer capacity.
//!
//! Parameter labels vary between report styles in spacing, casing, degree
//! symbols and unit/frequency annotations ("Tan Delta @90 °C" vs
//! "Tan Delta @90°C, 55 Hz"). Lookup therefore normalizes the label to its
//! lowercase alphanumeric form and matches on the parameter stem, so every
//! observed variant of the same parameter resolves to the same entry.

use crate::model::{CapacityClass, OilStatus};

#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("Parameter '{key}' has non-numeric value '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Threshold predicate over the parsed parameter value
///
/// `Within` bounds are inclusive on both ends, matching the standards
/// wording (e.g. TypeOne B.D.V: fair covers 50 <= v <= 60).
#[derive(Debug, Clone, Copy)]
enum Predicate {
    Above(f64),
    Below(f64),
    Within(f64, f64),
}

impl Predicate {
    fn matches(self, v: f64) -> bool {
        match self {
            Predicate::Above(x) => v > x,
            Predicate::Below(x) => v < x,
            Predicate::Within(lo, hi) => lo <= v && v <= hi,
        }
    }
}

/// One parameter's status bands, evaluated in declared order
struct TableEntry {
    /// Normalized parameter stem the lookup label must start with
    stem: &'static str,
    bands: &'static [(OilStatus, Predicate)],
}

/// Standards for transformers above 170 MVA
const TYPE_ONE: &[TableEntry] = &[
    TableEntry {
        stem: "bdv",
        bands: &[
            (OilStatus::Good, Predicate::Above(60.0)),
            (OilStatus::Fair, Predicate::Within(50.0, 60.0)),
            (OilStatus::Poor, Predicate::Below(50.0)),
        ],
    },
    TableEntry {
        stem: "tandelta",
        bands: &[
            (OilStatus::Good, Predicate::Below(0.1)),
            (OilStatus::Fair, Predicate::Within(0.1, 0.2)),
            (OilStatus::Poor, Predicate::Above(0.2)),
        ],
    },
    TableEntry {
        stem: "resistivity",
        bands: &[
            (OilStatus::Good, Predicate::Above(10.0)),
            (OilStatus::Fair, Predicate::Within(3.0, 10.0)),
            (OilStatus::Poor, Predicate::Below(3.0)),
        ],
    },
    TableEntry {
        stem: "watercontent",
        bands: &[
            (OilStatus::Good, Predicate::Below(15.0)),
            (OilStatus::Fair, Predicate::Within(15.0, 20.0)),
            (OilStatus::Poor, Predicate::Above(20.0)),
        ],
    },
];

/// Standards for transformers of 170 MVA and below
const TYPE_TWO: &[TableEntry] = &[
    TableEntry {
        stem: "bdv",
        bands: &[
            (OilStatus::Good, Predicate::Above(50.0)),
            (OilStatus::Fair, Predicate::Within(40.0, 50.0)),
            (OilStatus::Poor, Predicate::Below(40.0)),
        ],
    },
    TableEntry {
        stem: "tandelta",
        bands: &[
            (OilStatus::Good, Predicate::Below(0.1)),
            (OilStatus::Fair, Predicate::Within(0.1, 0.5)),
            (OilStatus::Poor, Predicate::Above(0.5)),
        ],
    },
    TableEntry {
        stem: "resistivity",
        bands: &[
            (OilStatus::Good, Predicate::Above(3.0)),
            (OilStatus::Fair, Predicate::Within(0.2, 3.0)),
            (OilStatus::Poor, Predicate::Below(0.2)),
        ],
    },
    TableEntry {
        stem: "watercontent",
        bands: &[
            (OilStatus::Good, Predicate::Below(20.0)),
            (OilStatus::Fair, Predicate::Within(20.0, 30.0)),
            (OilStatus::Poor, Predicate::Above(30.0)),
        ],
    },
    TableEntry {
        stem: "interfacialtension",
        bands: &[
            (OilStatus::Good, Predicate::Above(28.0)),
            (OilStatus::Fair, Predicate::Within(22.0, 28.0)),
            (OilStatus::Poor, Predicate::Below(22.0)),
        ],
    },
    TableEntry {
        stem: "acidity",
        bands: &[
            (OilStatus::Good, Predicate::Below(0.1)),
            (OilStatus::Fair, Predicate::Within(0.1, 0.2)),
            (OilStatus::Poor, Predicate::Above(0.2)),
        ],
    },
];

/// Lowercase alphanumeric form of a parameter label
pub(crate) fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn lookup<'a>(table: &'a [TableEntry], key: &str) -> Option<&'a TableEntry> {
    let normalized = normalize_key(key);
    table.iter().find(|entry| normalized.starts_with(entry.stem))
}

/// Classify one oil-quality parameter against the active standards table.
///
/// Returns `Unclassified` when the parameter has no table entry or when no
/// band matches its value. A value that fails numeric parsing while a table
/// entry exists is a hard error for the request.
pub fn classify(
    key: &str,
    value: &str,
    capacity_class: CapacityClass,
) -> Result<OilStatus, ClassificationError> {
    let table = match capacity_class {
        CapacityClass::HighCapacity => TYPE_ONE,
        CapacityClass::StandardCapacity => TYPE_TWO,
    };

    let Some(entry) = lookup(table, key) else {
        return Ok(OilStatus::Unclassified);
    };

    let v: f64 = value
        .trim()
        .parse()
        .map_err(|_| ClassificationError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })?;

    // Declared order matters: good, then fair, then poor, first match wins
    for (status, predicate) in entry.bands {
        if predicate.matches(v) {
            return Ok(*status);
        }
    }

    Ok(OilStatus::Unclassified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_capacity_bdv_is_good_above_sixty() {
        // capacity 200 MVA selects TypeOne
        let status = classify(
            "B.D.V @ 61.8Hz with stirrer",
            "65",
            CapacityClass::HighCapacity,
        )
        .unwrap();
        assert_eq!(status, OilStatus::Good);
    }

    #[test]
    fn standard_capacity_water_content_is_fair_at_twenty_five() {
        // capacity 100 MVA selects TypeTwo
        let status = classify("Water Content", "25", CapacityClass::StandardCapacity).unwrap();
        assert_eq!(status, OilStatus::Fair);
    }

    #[test]
    fn type_one_bdv_boundaries_are_inclusive_on_fair() {
        let class = CapacityClass::HighCapacity;
        let key = "B.D.V @ 61.8Hz with stirrer";

        assert_eq!(classify(key, "60", class).unwrap(), OilStatus::Fair);
        assert_eq!(classify(key, "60.0001", class).unwrap(), OilStatus::Good);
        assert_eq!(classify(key, "50", class).unwrap(), OilStatus::Fair);
        assert_eq!(classify(key, "49.9", class).unwrap(), OilStatus::Poor);
    }

    #[test]
    fn tan_delta_lower_boundary_falls_to_fair() {
        // good (v < 0.1) is evaluated first and rejects 0.1 exactly
        let status = classify("Tan Delta @90 °C", "0.1", CapacityClass::HighCapacity).unwrap();
        assert_eq!(status, OilStatus::Fair);
    }

    #[test]
    fn tables_differ_for_same_parameter() {
        assert_eq!(
            classify("Resistivity @ 90°C", "5", CapacityClass::HighCapacity).unwrap(),
            OilStatus::Fair
        );
        assert_eq!(
            classify("Resistivity @90°C", "5", CapacityClass::StandardCapacity).unwrap(),
            OilStatus::Good
        );
    }

    #[test]
    fn label_variants_resolve_to_the_same_entry() {
        for key in [
            "B.D.V @ 61.8Hz with stirrer",
            "B.D.V @ 61.8 Hz, With Stirrer",
            "b.d.v @61.8hz,stirrer",
        ] {
            assert_eq!(
                classify(key, "45", CapacityClass::StandardCapacity).unwrap(),
                OilStatus::Fair,
                "variant {key:?} missed the B.D.V entry"
            );
        }

        for key in ["Tan Delta @90 °C", "Tan Delta@90°C,55Hz"] {
            assert_eq!(
                classify(key, "0.3", CapacityClass::StandardCapacity).unwrap(),
                OilStatus::Fair,
                "variant {key:?} missed the Tan Delta entry"
            );
        }
    }

    #[test]
    fn unknown_parameters_are_unclassified_without_parsing() {
        assert_eq!(
            classify(
                "Appearance & Colour",
                "Pale Yellow",
                CapacityClass::HighCapacity
            )
            .unwrap(),
            OilStatus::Unclassified
        );
        assert_eq!(
            classify("TRANSFORMER_ID", "TR7", CapacityClass::StandardCapacity).unwrap(),
            OilStatus::Unclassified
        );
    }

    #[test]
    fn non_numeric_value_with_table_entry_is_an_error() {
        let err = classify("Water content", "n/a", CapacityClass::HighCapacity).unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidValue { .. }));
    }

    #[test]
    fn acidity_only_exists_in_type_two() {
        assert_eq!(
            classify("Acidity", "0.05", CapacityClass::StandardCapacity).unwrap(),
            OilStatus::Good
        );
        assert_eq!(
            classify("Acidity", "0.05", CapacityClass::HighCapacity).unwrap(),
            OilStatus::Unclassified
        );
    }

    #[test]
    fn inter_facial_tension_bands() {
        let class = CapacityClass::StandardCapacity;
        assert_eq!(
            classify("Inter Facial Tension", "30", class).unwrap(),
            OilStatus::Good
        );
        assert_eq!(
            classify("Inter Facial Tension", "28", class).unwrap(),
            OilStatus::Fair
        );
        assert_eq!(
            classify("Inter Facial Tension", "21", class).unwrap(),
            OilStatus::Poor
        );
    }
}
