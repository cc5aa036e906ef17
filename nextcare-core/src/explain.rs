//! Human-readable risk factors
//!
//! Breaks a profile's risk down into the factors shown in the dashboard's
//! risk-details dialog. Each factor is ranked by the points it adds to the
//! aggregate risk score after dimension weighting.

use crate::conditions::{ConditionList, BASELINE_RISK};
use crate::hospitalization::{score_hospitalization, HospitalizationRecord};
use crate::lifestyle::{LifestyleDimension, LifestyleProfile, OPTIMAL_SLEEP_HOURS};
use crate::risk::RiskWeights;
use serde::{Deserialize, Serialize};

/// Contribution (in aggregate risk points) at or above which a factor is High
const HIGH_IMPACT_POINTS: f64 = 20.0;
/// Contribution at or above which a factor is Medium
const MEDIUM_IMPACT_POINTS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn from_contribution(points: f64) -> Self {
        if points >= HIGH_IMPACT_POINTS {
            Impact::High
        } else if points >= MEDIUM_IMPACT_POINTS {
            Impact::Medium
        } else {
            Impact::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Low => "Low",
        }
    }
}

/// One contributing risk factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub impact: Impact,
    pub description: String,
    /// Weighted points added to the aggregate risk, before the 100 cap
    pub contribution: f64,
}

impl RiskFactor {
    fn new(factor: impl Into<String>, contribution: f64, description: String) -> Self {
        RiskFactor {
            factor: factor.into(),
            impact: Impact::from_contribution(contribution),
            description,
            contribution,
        }
    }
}

fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        format!("{:.2}", points)
    }
}

fn condition_factors(conditions: &ConditionList, weight: f64, out: &mut Vec<RiskFactor>) {
    if conditions.is_empty() {
        let points = f64::from(BASELINE_RISK);
        out.push(RiskFactor::new(
            "Baseline risk",
            points * weight,
            format!(
                "No diagnosed conditions reported; a baseline condition score of {} applies",
                BASELINE_RISK
            ),
        ));
        return;
    }
    for code in conditions.recognized() {
        let points = f64::from(code.risk_weight());
        out.push(RiskFactor::new(
            code.label(),
            points * weight,
            format!(
                "Diagnosed condition adds {} points to the condition score",
                code.risk_weight()
            ),
        ));
    }
}

fn hospitalization_factor(
    record: &HospitalizationRecord,
    weight: f64,
    out: &mut Vec<RiskFactor>,
) {
    if !record.is_recent() {
        return;
    }
    let points = score_hospitalization(record);
    out.push(RiskFactor::new(
        "Recent hospitalization",
        points * weight,
        format!(
            "Hospitalized recently with {} admission(s) and {} day(s) of stay",
            record.admissions(),
            record.stay_days()
        ),
    ));
}

fn lifestyle_factors(profile: &LifestyleProfile, weight: f64, out: &mut Vec<RiskFactor>) {
    for dimension in LifestyleDimension::ALL {
        let points = profile.dimension_points(dimension);
        if points <= 0.0 {
            continue;
        }
        let answer = profile.answer(dimension).unwrap_or_default();
        out.push(RiskFactor::new(
            dimension.label(),
            points * weight,
            format!(
                "Answer '{}' adds {} points to the lifestyle score",
                answer,
                format_points(points)
            ),
        ));
    }

    let sleep_points = profile.sleep_points();
    if let Some(hours) = profile.sleep().filter(|_| sleep_points > 0.0) {
        out.push(RiskFactor::new(
            "Sleep duration",
            sleep_points * weight,
            format!(
                "Sleeping {} hours is {} hours from the {} hour optimum",
                format_points(hours),
                format_points((hours - OPTIMAL_SLEEP_HOURS).abs()),
                OPTIMAL_SLEEP_HOURS
            ),
        ));
    }
}

/// List the factors behind a profile's risk score
///
/// Ordered by contribution descending, then factor name ascending.
pub fn explain_factors(
    conditions: &ConditionList,
    hospitalization: &HospitalizationRecord,
    lifestyle: &LifestyleProfile,
    weights: &RiskWeights,
) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    condition_factors(conditions, weights.conditions, &mut factors);
    hospitalization_factor(hospitalization, weights.hospitalization, &mut factors);
    lifestyle_factors(lifestyle, weights.lifestyle, &mut factors);

    factors.retain(|f| f.contribution > 0.0);
    factors.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.factor.cmp(&b.factor))
    });
    factors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors_ordered_by_contribution() {
        let conditions: ConditionList = ["copd", "cancer"].into_iter().collect();
        let hospitalization = HospitalizationRecord {
            recent_hospitalization: Some("yes".into()),
            admission_count: Some("2".into()),
            hospital_stay_days: Some("5".into()),
            ..Default::default()
        };
        let lifestyle = LifestyleProfile {
            smoking_status: Some("current".into()),
            physical_activity: Some("active".into()),
            sleep_hours: Some(5.0.into()),
            ..Default::default()
        };

        let factors = explain_factors(
            &conditions,
            &hospitalization,
            &lifestyle,
            &RiskWeights::default(),
        );
        let names: Vec<&str> = factors.iter().map(|f| f.factor.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Cancer (Past or Present)", // 47.5
                "Recent hospitalization",   // 11.25
                "COPD",                     // 9
                "Smoking",                  // 3
                "Sleep duration",           // 0.75
            ]
        );
        assert_eq!(factors[0].impact, Impact::High);
        assert_eq!(factors[1].impact, Impact::Medium);
        assert_eq!(factors[3].impact, Impact::Low);
        assert_eq!(
            factors[4].description,
            "Sleeping 5 hours is 2.50 hours from the 7.5 hour optimum"
        );
    }

    #[test]
    fn test_baseline_factor_for_no_conditions() {
        let factors = explain_factors(
            &ConditionList::default(),
            &HospitalizationRecord::default(),
            &LifestyleProfile::default(),
            &RiskWeights::default(),
        );
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factor, "Baseline risk");
        assert_eq!(factors[0].contribution, 5.0);
    }

    #[test]
    fn test_optimal_sleep_has_no_factor() {
        let lifestyle = LifestyleProfile {
            sleep_hours: Some("7.5".into()),
            ..Default::default()
        };
        let factors = explain_factors(
            &["unknown"].into_iter().collect(),
            &HospitalizationRecord::default(),
            &lifestyle,
            &RiskWeights::default(),
        );
        assert!(factors.is_empty());
    }
}
