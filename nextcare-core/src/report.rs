//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::explain::{explain_factors, RiskFactor};
use crate::profile::PatientProfile;
use crate::risk::{analyze_risk_with_config, PartialScores, RiskWeights};
use crate::stability::{assess_stability, StabilityAssessment};
use crate::tier::RiskThresholds;
use serde::{Deserialize, Serialize};

/// Complete score report for one profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProfileReport {
    /// Where the profile came from (file path or store name)
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub partial: PartialScores,
    pub risk: u32,
    pub risk_tier: String,
    pub risk_color: String,
    pub description: String,
    pub stability: u32,
    pub stability_tier: String,
    pub stability_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_stability: Option<StabilityAssessment>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub factors: Vec<RiskFactor>,
}

/// Options controlling what a report contains
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub weights: RiskWeights,
    pub thresholds: RiskThresholds,
    /// Include the ranked risk-factor breakdown
    pub explain: bool,
}

impl ProfileReport {
    /// Score a profile and build its report
    pub fn new(source: String, profile: &PatientProfile, options: &ReportOptions) -> Self {
        let assessment = analyze_risk_with_config(
            &profile.conditions,
            &profile.hospitalization,
            &profile.lifestyle,
            &options.weights,
            &options.thresholds,
        );

        let factors = if options.explain {
            explain_factors(
                &profile.conditions,
                &profile.hospitalization,
                &profile.lifestyle,
                &options.weights,
            )
        } else {
            Vec::new()
        };

        ProfileReport {
            source,
            id: profile.display_name().map(str::to_string),
            partial: assessment.partial,
            risk: assessment.risk,
            risk_tier: assessment.risk_tier.label().to_string(),
            risk_color: assessment.risk_tier.color().to_string(),
            description: assessment.risk_tier.description().to_string(),
            stability: assessment.stability,
            stability_tier: assessment.stability_tier.label().to_string(),
            stability_description: assessment.stability_tier.description().to_string(),
            clinical_stability: profile.stability.as_ref().map(assess_stability),
            factors,
        }
    }
}

/// Sort reports deterministically
pub fn sort_reports(mut reports: Vec<ProfileReport>) -> Vec<ProfileReport> {
    reports.sort_by(|a, b| {
        // 1. Risk descending
        b.risk
            .cmp(&a.risk)
            // 2. Source ascending
            .then_with(|| a.source.cmp(&b.source))
            // 3. Id ascending
            .then_with(|| a.id.cmp(&b.id))
    });
    reports
}

/// Render reports as text output
pub fn render_text(reports: &[ProfileReport]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<5} {:<10} {:<10} {:<10} {:<24} {}\n",
        "RISK", "TIER", "STABILITY", "TIER", "SOURCE", "ID"
    ));

    for report in reports {
        output.push_str(&format!(
            "{:<5} {:<10} {:<10} {:<10} {:<24} {}\n",
            report.risk,
            report.risk_tier,
            report.stability,
            report.stability_tier,
            truncate_or_pad(&report.source, 24),
            report.id.as_deref().unwrap_or("-"),
        ));
        if let Some(ref clinical) = report.clinical_stability {
            output.push_str(&format!(
                "      clinical stability {} ({})\n",
                clinical.score, clinical.tier
            ));
        }
        for factor in &report.factors {
            output.push_str(&format!(
                "      [{:<6}] {}: {}\n",
                factor.impact.as_str(),
                factor.factor,
                factor.description
            ));
        }
    }

    output
}

/// Render a single clinical stability assessment as text
pub fn render_stability_text(assessment: &StabilityAssessment) -> String {
    let mut output = format!(
        "Health Stability Score: {} ({})\n{}\n",
        assessment.score, assessment.tier, assessment.description
    );
    for reason in &assessment.reasons {
        output.push_str(&format!("  - {}\n", reason));
    }
    output
}

/// Render reports as JSON output
pub fn render_json(reports: &[ProfileReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
