//! Patient profiles
//!
//! A profile is the onboarding answers collected for one patient, stored as
//! a loosely typed JSON record. Field names follow the onboarding forms.

use crate::conditions::ConditionList;
use crate::hospitalization::HospitalizationRecord;
use crate::lifestyle::LifestyleProfile;
use crate::stability::StabilityAssessmentInput;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub conditions: ConditionList,
    #[serde(default)]
    pub hospitalization: HospitalizationRecord,
    #[serde(default)]
    pub lifestyle: LifestyleProfile,
    /// Clinical readings for the alternate stability engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<StabilityAssessmentInput>,
}

impl PatientProfile {
    /// Name to show for the profile: id, then username, then email
    pub fn display_name(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse patient profile JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize patient profile")
    }
}

/// Load a profile from a JSON file
pub fn load_profile(path: &Path) -> Result<PatientProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    PatientProfile::from_json(&content).with_context(|| format!("in {}", path.display()))
}
