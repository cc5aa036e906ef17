//! NextCare core library - readmission risk and health stability scoring

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Scoring is pure: no I/O, clocks, randomness or shared state
// - Malformed input degrades to a neutral contribution, never an error
// - Every score a caller can observe is within [0, 100]
// - Identical input yields byte-for-byte identical output

pub mod conditions;
pub mod config;
pub mod explain;
pub mod hospitalization;
pub mod lifestyle;
pub mod profile;
pub mod report;
pub mod risk;
pub mod session;
pub mod stability;
pub mod tier;
pub mod value;

pub use config::ResolvedConfig;
pub use profile::{load_profile, PatientProfile};
pub use report::{render_json, render_text, sort_reports, ProfileReport, ReportOptions};
pub use risk::{analyze_risk, RiskAssessment};
pub use stability::{assess_stability, StabilityAssessment, StabilityAssessmentInput};

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

pub struct ScoreOptions {
    pub min_risk: Option<u32>,
    pub top_n: Option<usize>,
    pub explain: bool,
}

impl ScoreOptions {
    /// Report options for a resolved config (or defaults)
    pub fn report_options(&self, resolved_config: Option<&ResolvedConfig>) -> ReportOptions {
        ReportOptions {
            weights: resolved_config.map(|c| c.weights).unwrap_or_default(),
            thresholds: resolved_config.map(|c| c.thresholds).unwrap_or_default(),
            explain: self.explain,
        }
    }
}

/// Score profiles at the given path with default configuration
pub fn score_path(path: &Path, options: ScoreOptions) -> Result<Vec<ProfileReport>> {
    score_path_with_config(path, options, None)
}

/// Score profiles at the given path with optional resolved configuration
pub fn score_path_with_config(
    path: &Path,
    options: ScoreOptions,
    resolved_config: Option<&ResolvedConfig>,
) -> Result<Vec<ProfileReport>> {
    let report_options = options.report_options(resolved_config);
    let files = collect_profile_files(path, resolved_config)?;
    let reports = score_profile_files(&files, &report_options, || {});
    Ok(filter_reports(sort_reports(reports), &options))
}

/// Score profile files in parallel
///
/// Files that fail to load are skipped with a warning. `on_scored` runs
/// once per file, from worker threads. Reports keep the order of `files`.
pub fn score_profile_files<F>(
    files: &[PathBuf],
    options: &ReportOptions,
    on_scored: F,
) -> Vec<ProfileReport>
where
    F: Fn() + Sync,
{
    let results: Vec<Result<ProfileReport>> = files
        .par_iter()
        .map(|file| {
            let result = score_profile_file(file, options);
            on_scored();
            result
        })
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut skipped_files: usize = 0;
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                log::warn!("skipping profile {}: {:#}", file.display(), e);
                skipped_files += 1;
            }
        }
    }
    if skipped_files > 0 {
        log::warn!("skipped {} profile(s) due to load errors", skipped_files);
    }
    reports
}

/// Apply min-risk and top-N filters to sorted reports
pub fn filter_reports(reports: Vec<ProfileReport>, options: &ScoreOptions) -> Vec<ProfileReport> {
    let filtered = reports
        .into_iter()
        .filter(|r| match options.min_risk {
            Some(min) => r.risk >= min,
            None => true,
        });
    match options.top_n {
        Some(top_n) => filtered.take(top_n).collect(),
        None => filtered.collect(),
    }
}

/// Load and score a single profile file
pub fn score_profile_file(path: &Path, options: &ReportOptions) -> Result<ProfileReport> {
    let profile = load_profile(path)?;
    Ok(ProfileReport::new(
        path.display().to_string(),
        &profile,
        options,
    ))
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || name == "node_modules" || name == "target"
}

fn is_profile_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Collect profile files from a path (file or directory)
///
/// A file path is returned as-is. A directory is walked recursively for
/// `.json` files, skipping hidden directories, and the config's
/// include/exclude globs are matched against paths relative to it.
/// Config files themselves are never treated as profiles.
pub fn collect_profile_files(
    path: &Path,
    resolved_config: Option<&ResolvedConfig>,
) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut files = Vec::new();
    collect_recursive(path, &mut files)?;
    files.retain(|file| {
        let relative = file.strip_prefix(path).unwrap_or(file.as_path());
        let is_config = relative.to_str().is_some_and(config::is_config_file_name);
        let included = match resolved_config {
            Some(config) => config.should_include(relative),
            None => true,
        };
        !is_config && included
    });

    // Sort files for deterministic order
    files.sort();
    log::debug!("found {} profile file(s) in {}", files.len(), path.display());
    Ok(files)
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;

        if metadata.is_symlink() {
            continue;
        }
        if metadata.is_dir() {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_skipped_dir);
            if !skipped {
                collect_recursive(&path, files)?;
            }
        } else if metadata.is_file() && is_profile_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}
