//! Diagnosed-condition risk
//!
//! Global invariants enforced:
//! - Empty condition list scores the baseline, never 0
//! - Unknown codes contribute 0
//! - A code listed twice counts once
//! - Score is clamped to at most 100

use crate::value::FieldValue;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Condition score for a profile that reports no conditions
pub const BASELINE_RISK: u32 = 10;

/// Enumerated vocabulary of chronic condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCode {
    Diabetes,
    Hypertension,
    HeartDisease,
    Asthma,
    Copd,
    Arthritis,
    Cancer,
    Stroke,
    KidneyDisease,
    LiverDisease,
    ThyroidDisorder,
    MentalHealth,
    Dementia,
    Other,
}

impl ConditionCode {
    pub const ALL: [ConditionCode; 14] = [
        ConditionCode::Diabetes,
        ConditionCode::Hypertension,
        ConditionCode::HeartDisease,
        ConditionCode::Asthma,
        ConditionCode::Copd,
        ConditionCode::Arthritis,
        ConditionCode::Cancer,
        ConditionCode::Stroke,
        ConditionCode::KidneyDisease,
        ConditionCode::LiverDisease,
        ConditionCode::ThyroidDisorder,
        ConditionCode::MentalHealth,
        ConditionCode::Dementia,
        ConditionCode::Other,
    ];

    /// Look up a code exactly as the onboarding form submits it
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionCode::Diabetes => "diabetes",
            ConditionCode::Hypertension => "hypertension",
            ConditionCode::HeartDisease => "heart_disease",
            ConditionCode::Asthma => "asthma",
            ConditionCode::Copd => "copd",
            ConditionCode::Arthritis => "arthritis",
            ConditionCode::Cancer => "cancer",
            ConditionCode::Stroke => "stroke",
            ConditionCode::KidneyDisease => "kidney_disease",
            ConditionCode::LiverDisease => "liver_disease",
            ConditionCode::ThyroidDisorder => "thyroid_disorder",
            ConditionCode::MentalHealth => "mental_health",
            ConditionCode::Dementia => "dementia",
            ConditionCode::Other => "other",
        }
    }

    /// Display label used on the onboarding checklist
    pub fn label(&self) -> &'static str {
        match self {
            ConditionCode::Diabetes => "Diabetes",
            ConditionCode::Hypertension => "Hypertension",
            ConditionCode::HeartDisease => "Heart Disease",
            ConditionCode::Asthma => "Asthma",
            ConditionCode::Copd => "COPD",
            ConditionCode::Arthritis => "Arthritis",
            ConditionCode::Cancer => "Cancer (Past or Present)",
            ConditionCode::Stroke => "Stroke History",
            ConditionCode::KidneyDisease => "Kidney Disease",
            ConditionCode::LiverDisease => "Liver Disease",
            ConditionCode::ThyroidDisorder => "Thyroid Disorder",
            ConditionCode::MentalHealth => "Mental Health Condition",
            ConditionCode::Dementia => "Dementia/Alzheimer's",
            ConditionCode::Other => "Other Chronic Condition",
        }
    }

    /// Points added to the condition score
    pub fn risk_weight(&self) -> u32 {
        match self {
            ConditionCode::Diabetes => 79,
            ConditionCode::Hypertension => 60,
            ConditionCode::HeartDisease => 20,
            ConditionCode::Asthma => 72,
            ConditionCode::Copd => 18,
            ConditionCode::Arthritis => 81,
            ConditionCode::Cancer => 95,
            ConditionCode::Stroke => 87,
            ConditionCode::KidneyDisease => 90,
            ConditionCode::LiverDisease => 88,
            ConditionCode::ThyroidDisorder => 77,
            ConditionCode::MentalHealth => 60,
            ConditionCode::Dementia => 85,
            ConditionCode::Other => 55,
        }
    }
}

/// List of condition codes as submitted by a form
///
/// Deserializes from any JSON shape: an array contributes its string items,
/// anything else is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConditionList(pub Vec<String>);

impl ConditionList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Recognized codes in first-seen order, without duplicates
    pub fn recognized(&self) -> Vec<ConditionCode> {
        let mut seen = BTreeSet::new();
        self.codes()
            .filter_map(ConditionCode::from_code)
            .filter(|code| seen.insert(*code))
            .collect()
    }
}

impl<'de> Deserialize<'de> for ConditionList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<FieldValue>::deserialize(deserializer)?;
        let codes = value
            .map(|v| v.text_items().into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        Ok(ConditionList(codes))
    }
}

impl<S: Into<String>> FromIterator<S> for ConditionList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ConditionList(iter.into_iter().map(Into::into).collect())
    }
}

/// Calculate the condition score
///
/// An empty list scores [`BASELINE_RISK`]. Otherwise the weights of all
/// recognized codes are summed and capped at 100. A non-empty list of only
/// unknown codes scores 0.
pub fn score_conditions(conditions: &ConditionList) -> u32 {
    if conditions.is_empty() {
        return BASELINE_RISK;
    }
    let total: u32 = conditions
        .recognized()
        .iter()
        .map(ConditionCode::risk_weight)
        .sum();
    log::trace!("condition points before clamp: {}", total);
    total.min(100)
}
