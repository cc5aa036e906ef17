//! Hospitalization-history risk

use crate::value::FieldValue;
use serde::{Deserialize, Serialize};

/// Points for any hospitalization in the recent window
pub const RECENT_HOSPITALIZATION_POINTS: f64 = 25.0;
/// Points per reported admission
pub const POINTS_PER_ADMISSION: f64 = 5.0;
/// Points per day spent in hospital
pub const POINTS_PER_STAY_DAY: f64 = 0.5;

/// Answers from the hospitalization-history form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalizationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_hospitalization: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_count: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_stay_days: Option<FieldValue>,
    /// Carried for display; not scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_hospital_date: Option<FieldValue>,
    /// Carried for display; not scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_admission: Option<FieldValue>,
}

impl HospitalizationRecord {
    /// True only for the exact answer `"yes"`
    pub fn is_recent(&self) -> bool {
        self.recent_hospitalization
            .as_ref()
            .and_then(FieldValue::as_text)
            == Some("yes")
    }

    pub fn admissions(&self) -> u64 {
        non_negative_count(self.admission_count.as_ref())
    }

    pub fn stay_days(&self) -> u64 {
        non_negative_count(self.hospital_stay_days.as_ref())
    }
}

/// Unreadable and negative counts read as 0
fn non_negative_count(value: Option<&FieldValue>) -> u64 {
    value
        .and_then(FieldValue::parse_int)
        .map_or(0, |n| n.max(0) as u64)
}

/// Calculate the hospitalization score
///
/// Formula (only when the recent-hospitalization answer is `"yes"`):
/// 25 + 5 * admissions + 0.5 * stay days, capped at 100.
/// The result is left unrounded.
pub fn score_hospitalization(record: &HospitalizationRecord) -> f64 {
    if !record.is_recent() {
        return 0.0;
    }
    let risk = RECENT_HOSPITALIZATION_POINTS
        + record.admissions() as f64 * POINTS_PER_ADMISSION
        + record.stay_days() as f64 * POINTS_PER_STAY_DAY;
    risk.clamp(0.0, 100.0)
}
