//! Lifestyle risk
//!
//! Four categorical answers are looked up in fixed tables and summed. Sleep
//! adds a penalty proportional to the distance from the optimum, in either
//! direction.

use crate::value::FieldValue;
use serde::{Deserialize, Serialize};

/// Optimal nightly sleep in hours
pub const OPTIMAL_SLEEP_HOURS: f64 = 7.5;
/// Points per hour of deviation from [`OPTIMAL_SLEEP_HOURS`]
pub const SLEEP_DEVIATION_POINTS: f64 = 1.5;

const SMOKING_WEIGHTS: &[(&str, f64)] = &[("never", 0.0), ("former", 5.0), ("current", 15.0)];

const ALCOHOL_WEIGHTS: &[(&str, f64)] = &[
    ("none", 0.0),
    ("occasional", 3.0),
    ("moderate", 7.0),
    ("frequent", 12.0),
];

const ACTIVITY_WEIGHTS: &[(&str, f64)] = &[
    ("active", 0.0),
    ("moderate", 2.0),
    ("light", 5.0),
    ("sedentary", 10.0),
];

const STRESS_WEIGHTS: &[(&str, f64)] = &[
    ("low", 0.0),
    ("moderate", 5.0),
    ("high", 10.0),
    ("severe", 15.0),
];

/// Categorical lifestyle questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifestyleDimension {
    Smoking,
    Alcohol,
    Activity,
    Stress,
}

impl LifestyleDimension {
    pub const ALL: [LifestyleDimension; 4] = [
        LifestyleDimension::Smoking,
        LifestyleDimension::Alcohol,
        LifestyleDimension::Activity,
        LifestyleDimension::Stress,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LifestyleDimension::Smoking => "Smoking",
            LifestyleDimension::Alcohol => "Alcohol consumption",
            LifestyleDimension::Activity => "Physical activity",
            LifestyleDimension::Stress => "Stress level",
        }
    }

    fn weights(&self) -> &'static [(&'static str, f64)] {
        match self {
            LifestyleDimension::Smoking => SMOKING_WEIGHTS,
            LifestyleDimension::Alcohol => ALCOHOL_WEIGHTS,
            LifestyleDimension::Activity => ACTIVITY_WEIGHTS,
            LifestyleDimension::Stress => STRESS_WEIGHTS,
        }
    }

    /// Points for an answer; unrecognized answers score 0
    pub fn weight_for(&self, answer: &str) -> f64 {
        self.weights()
            .iter()
            .find(|(value, _)| *value == answer)
            .map_or(0.0, |(_, weight)| *weight)
    }
}

/// Answers from the lifestyle form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoking_status: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alcohol_consumption: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_activity: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<FieldValue>,
    /// Free text; not scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_description: Option<FieldValue>,
}

impl LifestyleProfile {
    /// Raw answer for a categorical dimension, if it is text
    pub fn answer(&self, dimension: LifestyleDimension) -> Option<&str> {
        let field = match dimension {
            LifestyleDimension::Smoking => &self.smoking_status,
            LifestyleDimension::Alcohol => &self.alcohol_consumption,
            LifestyleDimension::Activity => &self.physical_activity,
            LifestyleDimension::Stress => &self.stress_level,
        };
        field.as_ref().and_then(FieldValue::as_text)
    }

    /// Points contributed by one categorical dimension
    pub fn dimension_points(&self, dimension: LifestyleDimension) -> f64 {
        self.answer(dimension)
            .map_or(0.0, |answer| dimension.weight_for(answer))
    }

    /// Reported sleep, when answered and readable as a finite number
    pub fn sleep(&self) -> Option<f64> {
        self.sleep_hours
            .as_ref()
            .and_then(FieldValue::filled)
            .and_then(FieldValue::parse_float)
    }

    /// Penalty for sleeping more or less than the optimum
    pub fn sleep_points(&self) -> f64 {
        self.sleep()
            .map_or(0.0, |hours| (hours - OPTIMAL_SLEEP_HOURS).abs() * SLEEP_DEVIATION_POINTS)
    }
}

/// Calculate the lifestyle score (fractional, capped to [0, 100])
pub fn score_lifestyle(profile: &LifestyleProfile) -> f64 {
    let categorical: f64 = LifestyleDimension::ALL
        .iter()
        .map(|d| profile.dimension_points(*d))
        .sum();
    (categorical + profile.sleep_points()).clamp(0.0, 100.0)
}
