//! Readmission risk aggregation
//!
//! Global invariants enforced:
//! - Partial scores are clamped before aggregation
//! - Rounding happens exactly once, in the aggregator
//! - Aggregate is clamped to [0, 100]
//! - Health stability is the exact integer complement of risk

use crate::conditions::{score_conditions, ConditionList};
use crate::hospitalization::{score_hospitalization, HospitalizationRecord};
use crate::lifestyle::{score_lifestyle, LifestyleProfile};
use crate::tier::{
    assign_risk_tier_with_thresholds, assign_stability_tier, RiskThresholds, RiskTier,
    StabilityTier,
};
use serde::{Deserialize, Serialize};

/// Partial scores from the three independent scorers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialScores {
    pub conditions: f64,
    pub hospitalization: f64,
    pub lifestyle: f64,
}

/// Configurable weights for the aggregate risk score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    pub conditions: f64,
    pub hospitalization: f64,
    pub lifestyle: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        RiskWeights {
            conditions: 0.5,
            hospitalization: 0.3,
            lifestyle: 0.2,
        }
    }
}

/// Run the three partial scorers
pub fn calculate_partial_scores(
    conditions: &ConditionList,
    hospitalization: &HospitalizationRecord,
    lifestyle: &LifestyleProfile,
) -> PartialScores {
    PartialScores {
        conditions: f64::from(score_conditions(conditions)),
        hospitalization: score_hospitalization(hospitalization),
        lifestyle: score_lifestyle(lifestyle),
    }
}

/// Aggregate partial scores with default weights
///
/// Formula:
/// risk = round(0.5 * conditions + 0.3 * hospitalization + 0.2 * lifestyle)
pub fn aggregate(partial: &PartialScores) -> u32 {
    aggregate_with_weights(partial, &RiskWeights::default())
}

/// Aggregate partial scores with custom weights
///
/// Ties round half away from zero (`f64::round`).
pub fn aggregate_with_weights(partial: &PartialScores, weights: &RiskWeights) -> u32 {
    let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) };
    let total = weights.conditions * clamp(partial.conditions)
        + weights.hospitalization * clamp(partial.hospitalization)
        + weights.lifestyle * clamp(partial.lifestyle);
    clamp(total.round()) as u32
}

/// Health-stability complement of a risk score
pub fn health_stability(risk: u32) -> u32 {
    100 - risk.min(100)
}

/// Complete readmission risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub partial: PartialScores,
    pub risk: u32,
    pub risk_tier: RiskTier,
    pub stability: u32,
    pub stability_tier: StabilityTier,
}

/// Calculate complete risk assessment (default weights/thresholds)
pub fn analyze_risk(
    conditions: &ConditionList,
    hospitalization: &HospitalizationRecord,
    lifestyle: &LifestyleProfile,
) -> RiskAssessment {
    analyze_risk_with_config(
        conditions,
        hospitalization,
        lifestyle,
        &RiskWeights::default(),
        &RiskThresholds::default(),
    )
}

/// Calculate complete risk assessment with custom weights and thresholds
pub fn analyze_risk_with_config(
    conditions: &ConditionList,
    hospitalization: &HospitalizationRecord,
    lifestyle: &LifestyleProfile,
    weights: &RiskWeights,
    thresholds: &RiskThresholds,
) -> RiskAssessment {
    let partial = calculate_partial_scores(conditions, hospitalization, lifestyle);
    let risk = aggregate_with_weights(&partial, weights);
    let stability = health_stability(risk);
    log::trace!(
        "partial scores {:?} -> risk {}, stability {}",
        partial,
        risk,
        stability
    );
    RiskAssessment {
        partial,
        risk,
        risk_tier: assign_risk_tier_with_thresholds(risk, thresholds),
        stability,
        stability_tier: assign_stability_tier(stability),
    }
}
