//! Configuration file support
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.nextcarerc.json` in the profile root
//! 3. `nextcare.config.json` in the profile root
//! 4. `"nextcare"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.
//! Only the readmission risk pipeline is configurable; the stability-scale
//! tiers and the alternate stability engine are fixed.

use crate::risk::RiskWeights;
use crate::tier::RiskThresholds;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default exclude patterns applied when no config is specified
const DEFAULT_EXCLUDES: &[&str] = &["**/node_modules/**", "**/.nextcare/**"];

/// NextCare configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NextcareConfig {
    /// Glob patterns for profile files to include (default: all `.json`)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for profile files to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Custom risk tier thresholds
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Custom aggregation weights
    #[serde(default)]
    pub weights: Option<WeightConfig>,

    /// Minimum risk score to report (default: report all)
    #[serde(default)]
    pub min_risk: Option<u32>,

    /// Maximum number of results to show
    #[serde(default)]
    pub top: Option<usize>,
}

/// Custom risk tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Risk score where the Moderate tier starts (default: 30)
    pub moderate: Option<f64>,
    /// Risk score where the High tier starts (default: 60)
    pub high: Option<f64>,
    /// Risk score where the Very High tier starts (default: 80)
    pub very_high: Option<f64>,
}

/// Custom aggregation weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    /// Weight for the condition score (default: 0.5)
    pub conditions: Option<f64>,
    /// Weight for the hospitalization score (default: 0.3)
    pub hospitalization: Option<f64>,
    /// Weight for the lifestyle score (default: 0.2)
    pub lifestyle: Option<f64>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    pub weights: RiskWeights,
    pub thresholds: RiskThresholds,
    /// Filters
    pub min_risk: Option<u32>,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl ThresholdConfig {
    fn resolved(&self) -> RiskThresholds {
        let defaults = RiskThresholds::default();
        RiskThresholds {
            moderate: self.moderate.unwrap_or(defaults.moderate),
            high: self.high.unwrap_or(defaults.high),
            very_high: self.very_high.unwrap_or(defaults.very_high),
        }
    }
}

impl WeightConfig {
    fn resolved(&self) -> RiskWeights {
        let defaults = RiskWeights::default();
        RiskWeights {
            conditions: self.conditions.unwrap_or(defaults.conditions),
            hospitalization: self.hospitalization.unwrap_or(defaults.hospitalization),
            lifestyle: self.lifestyle.unwrap_or(defaults.lifestyle),
        }
    }
}

impl NextcareConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        // Thresholds must be inside the score range and strictly increasing
        if let Some(ref t) = self.thresholds {
            let r = t.resolved();
            for (name, val) in [
                ("moderate", r.moderate),
                ("high", r.high),
                ("very_high", r.very_high),
            ] {
                if !(val > 0.0 && val <= 100.0) {
                    anyhow::bail!("thresholds.{} must be in (0, 100] (got {})", name, val);
                }
            }
            if r.moderate >= r.high {
                anyhow::bail!(
                    "thresholds.moderate ({}) must be less than thresholds.high ({})",
                    r.moderate,
                    r.high
                );
            }
            if r.high >= r.very_high {
                anyhow::bail!(
                    "thresholds.high ({}) must be less than thresholds.very_high ({})",
                    r.high,
                    r.very_high
                );
            }
        }

        // Weights are fractions of the aggregate
        if let Some(ref w) = self.weights {
            let fields = [
                ("conditions", w.conditions),
                ("hospitalization", w.hospitalization),
                ("lifestyle", w.lifestyle),
            ];
            for (name, val) in fields {
                if let Some(v) = val {
                    if !(0.0..=1.0).contains(&v) {
                        anyhow::bail!("weights.{} must be between 0 and 1 (got {})", name, v);
                    }
                }
            }
        }

        if let Some(min) = self.min_risk {
            if min > 100 {
                anyhow::bail!("min_risk must be at most 100 (got {})", min);
            }
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.include {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        // User excludes replace the defaults
        let exclude = {
            let mut builder = GlobSetBuilder::new();
            if self.exclude.is_empty() {
                for pattern in DEFAULT_EXCLUDES {
                    builder.add(Glob::new(pattern)?);
                }
            } else {
                for pattern in &self.exclude {
                    builder.add(Glob::new(pattern)?);
                }
            }
            builder.build()?
        };

        Ok(ResolvedConfig {
            include,
            exclude,
            weights: self
                .weights
                .as_ref()
                .map(WeightConfig::resolved)
                .unwrap_or_default(),
            thresholds: self
                .thresholds
                .as_ref()
                .map(ThresholdConfig::resolved)
                .unwrap_or_default(),
            min_risk: self.min_risk,
            top_n: self.top,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if a profile path should be included based on include/exclude patterns
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if self.exclude.is_match(path_str.as_ref()) {
            return false;
        }

        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_ref());
        }

        true
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        NextcareConfig::default().resolve()
    }
}

/// Dedicated config file names, checked in order
pub const CONFIG_FILE_NAMES: [&str; 2] = [".nextcarerc.json", "nextcare.config.json"];

/// Web projects keep their config under this key of `package.json`
const PACKAGE_JSON: &str = "package.json";
const PACKAGE_KEY: &str = "nextcare";

/// True for file names that hold configuration rather than a profile
pub fn is_config_file_name(name: &str) -> bool {
    name == PACKAGE_JSON || CONFIG_FILE_NAMES.contains(&name)
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Deserialize and validate a config object read from `path`
fn config_from_value(value: serde_json::Value, path: &Path) -> Result<NextcareConfig> {
    let config: NextcareConfig = serde_json::from_value(value)
        .with_context(|| format!("invalid config in: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;
    Ok(config)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<NextcareConfig> {
    config_from_value(read_json(path)?, path)
}

/// Discover a config under the profile root
///
/// Dedicated files win over `package.json`, and a `package.json` without a
/// `"nextcare"` key counts as no config.
pub fn discover_config(root: &Path) -> Result<Option<(NextcareConfig, PathBuf)>> {
    let dedicated = CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file());
    if let Some(path) = dedicated {
        return Ok(Some((load_config_file(&path)?, path)));
    }

    let pkg_path = root.join(PACKAGE_JSON);
    if !pkg_path.is_file() {
        return Ok(None);
    }
    match read_json(&pkg_path)?.get_mut(PACKAGE_KEY).map(serde_json::Value::take) {
        Some(value) => Ok(Some((config_from_value(value, &pkg_path)?, pkg_path))),
        None => Ok(None),
    }
}

/// The explicit config if one was given, otherwise whatever `root` holds
pub fn locate_config(
    root: &Path,
    explicit: Option<&Path>,
) -> Result<Option<(NextcareConfig, PathBuf)>> {
    match explicit {
        Some(path) => Ok(Some((load_config_file(path)?, path.to_path_buf()))),
        None => discover_config(root),
    }
}

/// Load and resolve config for a profile root, falling back to defaults
pub fn load_and_resolve(root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let Some((config, path)) = locate_config(root, explicit)? else {
        log::debug!("no config under {}; using defaults", root.display());
        return ResolvedConfig::defaults();
    };
    log::info!("using config: {}", path.display());
    let mut resolved = config.resolve()?;
    resolved.config_path = Some(path);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = NextcareConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert!(resolved.include.is_none());
        assert_eq!(resolved.weights, RiskWeights::default());
        assert_eq!(resolved.weights.conditions, 0.5);
        assert_eq!(resolved.weights.hospitalization, 0.3);
        assert_eq!(resolved.weights.lifestyle, 0.2);
        assert_eq!(resolved.thresholds.moderate, 30.0);
        assert_eq!(resolved.thresholds.high, 60.0);
        assert_eq!(resolved.thresholds.very_high, 80.0);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "include": ["patients/**/*.json"],
            "exclude": ["**/archive/**"],
            "thresholds": {"moderate": 25, "high": 55, "very_high": 75},
            "weights": {"conditions": 0.6, "hospitalization": 0.2, "lifestyle": 0.2},
            "min_risk": 40,
            "top": 10
        }"#;
        let config: NextcareConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert!(resolved.include.is_some());
        assert_eq!(resolved.thresholds.moderate, 25.0);
        assert_eq!(resolved.thresholds.very_high, 75.0);
        assert_eq!(resolved.weights.conditions, 0.6);
        assert_eq!(resolved.min_risk, Some(40));
        assert_eq!(resolved.top_n, Some(10));
    }

    #[test]
    fn test_partial_weights_keep_defaults() {
        let json = r#"{"weights": {"lifestyle": 0.4}}"#;
        let config: NextcareConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.weights.conditions, 0.5);
        assert_eq!(resolved.weights.lifestyle, 0.4);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let result: Result<NextcareConfig, _> = serde_json::from_str(r#"{"colour": "red"}"#);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_bad_weights() {
        for json in [
            r#"{"weights": {"conditions": -0.1}}"#,
            r#"{"weights": {"lifestyle": 1.5}}"#,
        ] {
            let config: NextcareConfig = serde_json::from_str(json).unwrap();
            assert!(config.validate().is_err(), "{}", json);
        }
    }

    #[test]
    fn test_reject_bad_thresholds() {
        for json in [
            r#"{"thresholds": {"moderate": 0}}"#,
            r#"{"thresholds": {"very_high": 120}}"#,
            r#"{"thresholds": {"moderate": 60, "high": 30}}"#,
            r#"{"thresholds": {"high": 85}}"#,
        ] {
            let config: NextcareConfig = serde_json::from_str(json).unwrap();
            assert!(config.validate().is_err(), "{}", json);
        }
    }

    #[test]
    fn test_reject_min_risk_over_100() {
        let config: NextcareConfig = serde_json::from_str(r#"{"min_risk": 101}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_invalid_glob_pattern() {
        let config: NextcareConfig = serde_json::from_str(r#"{"include": ["[bad"]}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_should_include_default_excludes() {
        let resolved = ResolvedConfig::defaults().unwrap();
        assert!(resolved.should_include(Path::new("patients/alice.json")));
        assert!(!resolved.should_include(Path::new("web/node_modules/pkg/data.json")));
        assert!(!resolved.should_include(Path::new("root/.nextcare/session.json")));
    }

    #[test]
    fn test_discover_rc_file_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".nextcarerc.json"), r#"{"top": 3}"#).unwrap();
        fs::write(dir.path().join("nextcare.config.json"), r#"{"top": 7}"#).unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.top, Some(3));
        assert!(path.ends_with(".nextcarerc.json"));
    }

    #[test]
    fn test_discover_package_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "nextcare-web", "nextcare": {"min_risk": 50}}"#,
        )
        .unwrap();

        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert_eq!(resolved.min_risk, Some(50));
        assert!(resolved.config_path.unwrap().ends_with("package.json"));
    }

    #[test]
    fn test_package_json_without_key_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "x"}"#).unwrap();
        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert!(resolved.config_path.is_none());
    }

    #[test]
    fn test_explicit_path_with_invalid_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"weights": {"conditions": 2.0}}"#).unwrap();
        let err = load_and_resolve(dir.path(), Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("weights.conditions"));
    }

    #[test]
    fn test_config_file_names() {
        assert!(is_config_file_name(".nextcarerc.json"));
        assert!(is_config_file_name("package.json"));
        assert!(!is_config_file_name("patient.json"));
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".nextcarerc.json"), r#"{"top": 3}"#).unwrap();
        let explicit = dir.path().join("other.json");
        fs::write(&explicit, r#"{"top": 9}"#).unwrap();

        let (config, path) = locate_config(dir.path(), Some(&explicit)).unwrap().unwrap();
        assert_eq!(config.top, Some(9));
        assert_eq!(path, explicit);
        assert!(locate_config(&dir.path().join("missing"), None).unwrap().is_none());
    }

    #[test]
    fn test_package_json_with_unknown_key_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"nextcare": {"colour": "red"}}"#,
        )
        .unwrap();
        assert!(discover_config(dir.path()).is_err());
    }
}
