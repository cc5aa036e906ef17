//! Alternate health-stability engine
//!
//! Scores vitals, chronic conditions, medication adherence and labs
//! directly with a point model: start at 100, subtract 10 per abnormality,
//! add 5 per stable finding. Every finding is logged as a reason that feeds
//! the description.
//!
//! This engine does not compose with the readmission risk pipeline, and its
//! band cut points (30/60/90) differ from both scales in [`crate::tier`].

use crate::conditions::{ConditionCode, ConditionList};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};

pub const STARTING_SCORE: i64 = 100;
pub const ABNORMALITY_POINTS: i64 = 10;
pub const POSITIVE_POINTS: i64 = 5;

/// Vital signs; `bloodPressure` is `"SYS/DIA"`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<FieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_sugar: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<FieldValue>,
}

/// Input to [`assess_stability`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityAssessmentInput {
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub chronic_conditions: ConditionList,
    /// `good`, `average` or `poor`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication_adherence: Option<FieldValue>,
    #[serde(default)]
    pub lab_results: LabResults,
}

/// Stability band of the alternate engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StabilityBand {
    Critical,  // <= 30
    Moderate,  // 31-60
    Good,      // 61-90
    Excellent, // > 90
}

impl StabilityBand {
    pub fn label(&self) -> &'static str {
        match self {
            StabilityBand::Critical => "Critical Stability",
            StabilityBand::Moderate => "Moderate Stability",
            StabilityBand::Good => "Good Stability",
            StabilityBand::Excellent => "Excellent Stability",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            StabilityBand::Critical => "text-red-600",
            StabilityBand::Moderate => "text-yellow-600",
            StabilityBand::Good => "text-green-600",
            StabilityBand::Excellent => "text-blue-600",
        }
    }

    /// Sentence explaining the band from the collected reasons
    pub fn describe(&self, reasons: &[String]) -> String {
        let joined = reasons.join(", ");
        match self {
            StabilityBand::Critical => {
                let cause = if joined.is_empty() {
                    "multiple high-risk factors"
                } else {
                    joined.as_str()
                };
                format!("Your current health profile suggests critical stability due to: {cause}.")
            }
            StabilityBand::Moderate if joined.is_empty() => {
                "Your current health profile suggests moderate stability.".to_string()
            }
            StabilityBand::Moderate => {
                format!("Your current health profile suggests moderate stability due to: {joined}.")
            }
            StabilityBand::Good if joined.is_empty() => {
                "Your current health profile suggests good stability.".to_string()
            }
            StabilityBand::Good => {
                format!("Your current health profile suggests good stability with: {joined}.")
            }
            StabilityBand::Excellent => {
                "Your current health profile suggests excellent stability. Keep up the good work!"
                    .to_string()
            }
        }
    }
}

/// Assign the alternate engine's band to a score
pub fn assign_stability_band(score: u32) -> StabilityBand {
    if score <= 30 {
        StabilityBand::Critical
    } else if score <= 60 {
        StabilityBand::Moderate
    } else if score <= 90 {
        StabilityBand::Good
    } else {
        StabilityBand::Excellent
    }
}

/// Result of [`assess_stability`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityAssessment {
    pub score: u32,
    pub tier: String,
    pub color: String,
    pub description: String,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl StabilityAssessment {
    pub fn band(&self) -> StabilityBand {
        assign_stability_band(self.score)
    }
}

/// Running tally of findings
#[derive(Debug, Default)]
struct Findings {
    abnormalities: i64,
    positives: i64,
    reasons: Vec<String>,
}

impl Findings {
    fn abnormal(&mut self, reason: impl Into<String>) {
        self.abnormalities += 1;
        self.reasons.push(reason.into());
    }

    fn positive(&mut self, reason: impl Into<String>) {
        self.positives += 1;
        self.reasons.push(reason.into());
    }

    fn score(&self) -> u32 {
        let raw = STARTING_SCORE - ABNORMALITY_POINTS * self.abnormalities
            + POSITIVE_POINTS * self.positives;
        raw.clamp(0, 100) as u32
    }
}

/// Read `"SYS/DIA"`; either side may be unreadable
fn parse_blood_pressure(value: &FieldValue) -> (Option<f64>, Option<f64>) {
    let number = |s: &str| FieldValue::from(s).to_number();
    match value {
        FieldValue::Text(s) => match s.split_once('/') {
            Some((sys, dia)) => (number(sys), number(dia)),
            None => (number(s), None),
        },
        other => (other.to_number(), None),
    }
}

/// Every listed entry counts, repeats included
fn check_conditions(conditions: &ConditionList, findings: &mut Findings) {
    for code in conditions.codes().filter(|c| is_high_risk_condition(c)) {
        findings.abnormal(format!("Chronic condition: {}", code.replace('_', " ")));
    }
}

/// Answered field read as a whole number
fn reading(value: Option<&FieldValue>) -> Option<f64> {
    value.and_then(FieldValue::filled).and_then(FieldValue::to_number)
}

fn check_blood_pressure(vitals: &Vitals, findings: &mut Findings) {
    let Some(bp) = vitals.blood_pressure.as_ref().and_then(FieldValue::filled) else {
        return;
    };
    let (sys, dia) = parse_blood_pressure(bp);
    if sys.is_some_and(|s| s > 140.0) || dia.is_some_and(|d| d > 90.0) {
        findings.abnormal("Elevated blood pressure");
    } else if let (Some(s), Some(d)) = (sys, dia) {
        if (90.0..=120.0).contains(&s) && (60.0..=80.0).contains(&d) {
            findings.positive("Stable blood pressure");
        }
    }
}

fn check_heart_rate(vitals: &Vitals, findings: &mut Findings) {
    let Some(hr) = reading(vitals.heart_rate.as_ref()) else {
        return;
    };
    if !(50.0..=100.0).contains(&hr) {
        findings.abnormal("Abnormal heart rate");
    } else {
        findings.positive("Stable heart rate");
    }
}

fn check_adherence(adherence: Option<&FieldValue>, findings: &mut Findings) {
    match adherence.and_then(FieldValue::as_text) {
        Some("good") => findings.positive("Good medication adherence"),
        Some("poor") => findings.abnormal("Poor medication adherence"),
        _ => {}
    }
}

fn check_labs(labs: &LabResults, findings: &mut Findings) {
    if let Some(sugar) = reading(labs.blood_sugar.as_ref()) {
        if sugar > 180.0 {
            findings.abnormal("Elevated blood sugar");
        } else if (70.0..=130.0).contains(&sugar) {
            findings.positive("Stable blood sugar");
        }
    }
    if let Some(chol) = reading(labs.cholesterol.as_ref()) {
        if chol > 240.0 {
            findings.abnormal("High cholesterol");
        } else if chol < 200.0 {
            findings.positive("Healthy cholesterol");
        }
    }
}

/// Assess health stability with the additive point model
///
/// Never fails: unanswered or unreadable vitals and labs are skipped,
/// unknown condition codes and adherence answers are ignored.
pub fn assess_stability(input: &StabilityAssessmentInput) -> StabilityAssessment {
    let mut findings = Findings::default();
    check_conditions(&input.chronic_conditions, &mut findings);
    check_blood_pressure(&input.vitals, &mut findings);
    check_heart_rate(&input.vitals, &mut findings);
    check_adherence(input.medication_adherence.as_ref(), &mut findings);
    check_labs(&input.lab_results, &mut findings);

    let score = findings.score();
    let band = assign_stability_band(score);
    log::trace!(
        "stability: {} abnormalities, {} positives -> {}",
        findings.abnormalities,
        findings.positives,
        score
    );

    StabilityAssessment {
        score,
        tier: band.label().to_string(),
        color: band.color().to_string(),
        description: band.describe(&findings.reasons),
        reasons: findings.reasons,
    }
}

/// Every condition code counts as a chronic abnormality
pub fn is_high_risk_condition(code: &str) -> bool {
    ConditionCode::from_code(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> StabilityAssessmentInput {
        StabilityAssessmentInput {
            vitals: Vitals {
                blood_pressure: Some("118/76".into()),
                heart_rate: Some(72.0.into()),
            },
            chronic_conditions: ConditionList::default(),
            medication_adherence: Some("good".into()),
            lab_results: LabResults {
                blood_sugar: Some(95.0.into()),
                cholesterol: Some("180".into()),
            },
        }
    }

    #[test]
    fn test_empty_input_is_excellent() {
        let result = assess_stability(&StabilityAssessmentInput::default());
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, "Excellent Stability");
        assert_eq!(result.color, "text-blue-600");
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_positives_cannot_exceed_100() {
        let result = assess_stability(&healthy());
        assert_eq!(result.score, 100);
        assert_eq!(result.reasons.len(), 5);
        assert_eq!(result.band(), StabilityBand::Excellent);
    }

    #[test]
    fn test_conditions_and_vitals() {
        let input = StabilityAssessmentInput {
            vitals: Vitals {
                blood_pressure: Some("150/95".into()),
                heart_rate: Some(110.0.into()),
            },
            chronic_conditions: ["diabetes", "heart_disease", "unknown"].into_iter().collect(),
            medication_adherence: Some("poor".into()),
            lab_results: LabResults {
                blood_sugar: Some(200.0.into()),
                cholesterol: Some(250.0.into()),
            },
        };
        let result = assess_stability(&input);
        // 7 abnormalities
        assert_eq!(result.score, 30);
        assert_eq!(result.tier, "Critical Stability");
        assert_eq!(
            result.description,
            "Your current health profile suggests critical stability due to: \
             Chronic condition: diabetes, Chronic condition: heart disease, \
             Elevated blood pressure, Abnormal heart rate, Poor medication adherence, \
             Elevated blood sugar, High cholesterol."
        );
    }

    #[test]
    fn test_thyroid_disorder_is_high_risk() {
        assert!(is_high_risk_condition("thyroid_disorder"));
        assert!(!is_high_risk_condition("gout"));

        let input = StabilityAssessmentInput {
            chronic_conditions: ["thyroid_disorder", "gout"].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(assess_stability(&input).score, 90);
    }

    #[test]
    fn test_repeated_condition_counts_each_entry() {
        let input = StabilityAssessmentInput {
            chronic_conditions: ["copd", "copd"].into_iter().collect(),
            ..Default::default()
        };
        let result = assess_stability(&input);
        assert_eq!(result.score, 80);
        assert_eq!(
            result.reasons,
            vec!["Chronic condition: copd", "Chronic condition: copd"]
        );
    }

    #[test]
    fn test_numeric_zero_readings_are_skipped() {
        let input = StabilityAssessmentInput {
            vitals: Vitals {
                blood_pressure: Some(FieldValue::Number(0.0)),
                heart_rate: Some(FieldValue::Number(0.0)),
            },
            lab_results: LabResults {
                blood_sugar: Some(FieldValue::Number(0.0)),
                cholesterol: Some(FieldValue::Number(0.0)),
            },
            ..Default::default()
        };
        let result = assess_stability(&input);
        assert_eq!(result.score, 100);
        assert!(result.reasons.is_empty());

        // A typed "0" is a reading
        let typed = StabilityAssessmentInput {
            vitals: Vitals {
                heart_rate: Some("0".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(assess_stability(&typed).reasons, vec!["Abnormal heart rate"]);
    }

    #[test]
    fn test_mixed_findings() {
        let input = StabilityAssessmentInput {
            chronic_conditions: ["copd", "stroke", "dementia"].into_iter().collect(),
            medication_adherence: Some("good".into()),
            ..Default::default()
        };
        let result = assess_stability(&input);
        // 100 - 30 + 5
        assert_eq!(result.score, 75);
        assert_eq!(result.tier, "Good Stability");
        assert!(result.description.starts_with(
            "Your current health profile suggests good stability with: Chronic condition: copd"
        ));
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(assign_stability_band(0), StabilityBand::Critical);
        assert_eq!(assign_stability_band(30), StabilityBand::Critical);
        assert_eq!(assign_stability_band(31), StabilityBand::Moderate);
        assert_eq!(assign_stability_band(60), StabilityBand::Moderate);
        assert_eq!(assign_stability_band(61), StabilityBand::Good);
        assert_eq!(assign_stability_band(90), StabilityBand::Good);
        assert_eq!(assign_stability_band(91), StabilityBand::Excellent);
    }

    #[test]
    fn test_blood_pressure_parsing() {
        assert_eq!(
            parse_blood_pressure(&"120/80".into()),
            (Some(120.0), Some(80.0))
        );
        assert_eq!(parse_blood_pressure(&"150".into()), (Some(150.0), None));
        assert_eq!(parse_blood_pressure(&"high/low".into()), (None, None));

        // Systolic alone can still be elevated, but never stable
        let mut findings = Findings::default();
        let vitals = Vitals {
            blood_pressure: Some("150".into()),
            heart_rate: None,
        };
        check_blood_pressure(&vitals, &mut findings);
        assert_eq!(findings.abnormalities, 1);

        let mut findings = Findings::default();
        let vitals = Vitals {
            blood_pressure: Some("110".into()),
            heart_rate: None,
        };
        check_blood_pressure(&vitals, &mut findings);
        assert_eq!((findings.abnormalities, findings.positives), (0, 0));
    }

    #[test]
    fn test_unreadable_values_are_neutral() {
        let input = StabilityAssessmentInput {
            vitals: Vitals {
                blood_pressure: Some("n/a".into()),
                heart_rate: Some("fast".into()),
            },
            medication_adherence: Some("average".into()),
            lab_results: LabResults {
                blood_sugar: Some(FieldValue::Bool(true)),
                cholesterol: Some("".into()),
            },
            ..Default::default()
        };
        let result = assess_stability(&input);
        assert_eq!(result.score, 100);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_moderate_description_without_reasons_has_no_suffix() {
        assert_eq!(
            StabilityBand::Moderate.describe(&[]),
            "Your current health profile suggests moderate stability."
        );
        assert_eq!(
            StabilityBand::Critical.describe(&[]),
            "Your current health profile suggests critical stability due to: multiple high-risk factors."
        );
    }

    #[test]
    fn test_deserialize_from_form_payload() {
        let input: StabilityAssessmentInput = serde_json::from_str(
            r#"{
                "vitals": {"bloodPressure": "135/85", "heartRate": "48"},
                "chronicConditions": ["asthma"],
                "medicationAdherence": "average",
                "labResults": {"bloodSugar": 120, "cholesterol": 210}
            }"#,
        )
        .unwrap();
        let result = assess_stability(&input);
        // asthma, heart rate -> 2 abnormalities; blood sugar -> 1 positive
        assert_eq!(result.score, 85);
        assert_eq!(result.tier, "Good Stability");
    }
}
