//! Tier classification
//!
//! Two independent scales live here and are never mixed:
//! - [`RiskTier`] classifies the readmission risk score (higher is worse)
//! - [`StabilityTier`] classifies the health-stability complement
//!   (`100 - risk`, higher is better) on a finer five-level scale
//!
//! The alternate stability engine has its own third table, see
//! [`crate::stability::StabilityBand`].

use serde::{Deserialize, Serialize};

/// Risk-scale tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,      // < 30
    Moderate, // 30-60
    High,     // 60-80
    VeryHigh, // >= 80
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::VeryHigh => "very_high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::VeryHigh => "Very High",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => "text-green-600",
            RiskTier::Moderate => "text-yellow-600",
            RiskTier::High => "text-orange-600",
            RiskTier::VeryHigh => "text-red-600",
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            RiskTier::Low => "bg-green-100",
            RiskTier::Moderate => "bg-yellow-100",
            RiskTier::High => "bg-orange-100",
            RiskTier::VeryHigh => "bg-red-100",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskTier::Low => {
                "Your current health profile suggests a lower risk of hospital readmission."
            }
            RiskTier::Moderate => {
                "Your health profile indicates some risk factors that could lead to readmission."
            }
            RiskTier::High => {
                "Your health profile shows significant risk factors that require careful management."
            }
            RiskTier::VeryHigh => {
                "Your health profile shows serious risk factors; review your care plan with your care team soon."
            }
        }
    }
}

/// Lower bounds of the upper three risk tiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub moderate: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            moderate: 30.0,
            high: 60.0,
            very_high: 80.0,
        }
    }
}

/// Assign a risk tier with default thresholds
pub fn assign_risk_tier(score: u32) -> RiskTier {
    assign_risk_tier_with_thresholds(score, &RiskThresholds::default())
}

/// Assign a risk tier with custom thresholds (each bound is inclusive)
pub fn assign_risk_tier_with_thresholds(score: u32, thresholds: &RiskThresholds) -> RiskTier {
    let score = f64::from(score);
    if score < thresholds.moderate {
        RiskTier::Low
    } else if score < thresholds.high {
        RiskTier::Moderate
    } else if score < thresholds.very_high {
        RiskTier::High
    } else {
        RiskTier::VeryHigh
    }
}

/// Stability-scale tier, named by the residual risk it implies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityTier {
    Minimal,  // >= 95
    Low,      // 81-94
    Moderate, // 51-80
    High,     // 1-50
    Critical, // 0
}

impl StabilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityTier::Minimal => "minimal",
            StabilityTier::Low => "low",
            StabilityTier::Moderate => "moderate",
            StabilityTier::High => "high",
            StabilityTier::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StabilityTier::Minimal => "Minimal",
            StabilityTier::Low => "Low",
            StabilityTier::Moderate => "Moderate",
            StabilityTier::High => "High",
            StabilityTier::Critical => "Critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            StabilityTier::Minimal => "text-blue-600",
            StabilityTier::Low => "text-green-600",
            StabilityTier::Moderate => "text-yellow-600",
            StabilityTier::High => "text-orange-600",
            StabilityTier::Critical => "text-red-600",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StabilityTier::Minimal => {
                "Your health is optimally stable. Keep following your current care routine."
            }
            StabilityTier::Low => {
                "Your health is stable with few risk factors. Keep attending scheduled follow-ups."
            }
            StabilityTier::Moderate => {
                "Your health is moderately stable. Some factors need attention in your care plan."
            }
            StabilityTier::High => {
                "Your health stability is low. Several factors put you at risk of readmission."
            }
            StabilityTier::Critical => {
                "Your health stability is critical. Contact your care team as soon as possible."
            }
        }
    }
}

/// Assign a stability-scale tier to a health-stability score
pub fn assign_stability_tier(stability: u32) -> StabilityTier {
    match stability {
        95..=u32::MAX => StabilityTier::Minimal,
        81..=94 => StabilityTier::Low,
        51..=80 => StabilityTier::Moderate,
        1..=50 => StabilityTier::High,
        0 => StabilityTier::Critical,
    }
}
