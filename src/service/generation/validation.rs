//! Validation and normalization of the accumulated generation reply
//!
//! The sole content policy is the leading "Remarks:" label: a reply that
//! lacks it is discarded wholesale in favour of the fixed placeholders.
//! No deeper structural or factual checking is performed.

use crate::model::DiagnosisNarrative;

pub const REMARKS_LABEL: &str = "Remarks:";
pub const STEPS_LABEL: &str = "Preventive Steps:";

/// Normalize the raw accumulated reply into the two-section narrative.
pub fn normalize_reply(reply: &str) -> DiagnosisNarrative {
    let reply = reply.trim();

    let Some(body) = reply.strip_prefix(REMARKS_LABEL) else {
        return DiagnosisNarrative::missing();
    };

    let (remarks, steps) = match body.find(STEPS_LABEL) {
        Some(idx) => (&body[..idx], &body[idx + STEPS_LABEL.len()..]),
        None => (body, ""),
    };

    let remarks = remarks.trim();
    let steps = steps.trim();

    DiagnosisNarrative {
        remarks: if remarks.is_empty() {
            DiagnosisNarrative::PLACEHOLDER.to_string()
        } else {
            remarks.to_string()
        },
        preventive_steps: if steps.is_empty() {
            DiagnosisNarrative::PLACEHOLDER.to_string()
        } else {
            steps.to_string()
        },
    }
}
