//! NextCare CLI - readmission risk and health stability scoring

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use nextcare_core::config;
use nextcare_core::report::render_stability_text;
use nextcare_core::session::{FileSessionStore, SessionStore};
use nextcare_core::stability::StabilityAssessmentInput;
use nextcare_core::{
    assess_stability, collect_profile_files, filter_reports, load_profile, render_json,
    render_text, score_profile_files, sort_reports, ProfileReport, ReportOptions, ScoreOptions,
};
use std::path::{Path, PathBuf};

/// Directories with at least this many profiles show a progress bar
const PROGRESS_MIN_FILES: usize = 50;

#[derive(Parser)]
#[command(name = "nextcare")]
#[command(about = "Readmission risk and health stability scoring for patient profiles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a profile file or every profile in a directory
    Score {
        /// Path to profile JSON file or directory
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Show only top N results (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Minimum risk score to report (overrides config file)
        #[arg(long)]
        min_risk: Option<u32>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// List the factors contributing to each risk score
        #[arg(long)]
        explain: bool,
    },
    /// Run the clinical stability assessment on vitals, labs and adherence
    Stability {
        /// Path to stability input JSON file
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Manage the saved session profile
    Session {
        /// Directory holding the `.nextcare` session folder
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[command(subcommand)]
        action: SessionAction,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Score and print the saved profile
    Show {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Save a profile file as the current session
    Save {
        /// Path to profile JSON file
        path: PathBuf,
    },
    /// Remove the saved profile
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without scoring
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            path,
            format,
            top,
            min_risk,
            config: config_path,
            explain,
        } => {
            let normalized_path = if path.is_relative() {
                std::env::current_dir()?.join(&path)
            } else {
                path
            };
            if !normalized_path.exists() {
                anyhow::bail!("Path does not exist: {}", normalized_path.display());
            }

            let config_root = if normalized_path.is_dir() {
                normalized_path.clone()
            } else {
                normalized_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| normalized_path.clone())
            };
            let resolved_config = config::load_and_resolve(&config_root, config_path.as_deref())
                .context("failed to load configuration")?;

            // CLI flags override config file values
            let options = ScoreOptions {
                min_risk: min_risk.or(resolved_config.min_risk),
                top_n: top.or(resolved_config.top_n),
                explain,
            };
            let report_options = options.report_options(Some(&resolved_config));

            let files = collect_profile_files(&normalized_path, Some(&resolved_config))?;
            let reports = score_with_progress(&files, &report_options)?;
            let reports = filter_reports(sort_reports(reports), &options);

            print_reports(&reports, format);
        }
        Commands::Stability { path, format } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let input: StabilityAssessmentInput = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse stability input: {}", path.display()))?;
            let assessment = assess_stability(&input);

            match format {
                OutputFormat::Text => print!("{}", render_stability_text(&assessment)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&assessment)
                        .context("failed to serialize assessment")?
                ),
            }
        }
        Commands::Session { root, action } => {
            let mut store = FileSessionStore::new(&root);
            handle_session(&mut store, action, &root)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let (config, source) = load_config_for_command(path.as_deref())?;
                config.resolve().context("configuration is invalid")?;
                match source {
                    Some(p) => println!("Config valid: {}", p.display()),
                    None => println!("No config file found; defaults are valid"),
                }
            }
            ConfigAction::Show { path } => {
                let (config, source) = load_config_for_command(path.as_deref())?;
                let resolved = config.resolve()?;
                match source {
                    Some(p) => println!("Config: {}", p.display()),
                    None => println!("Config: (defaults)"),
                }
                println!("Weights:");
                println!("  conditions:      {}", resolved.weights.conditions);
                println!("  hospitalization: {}", resolved.weights.hospitalization);
                println!("  lifestyle:       {}", resolved.weights.lifestyle);
                println!("Risk thresholds:");
                println!("  moderate:  {}", resolved.thresholds.moderate);
                println!("  high:      {}", resolved.thresholds.high);
                println!("  very_high: {}", resolved.thresholds.very_high);
                println!("Filters:");
                match resolved.min_risk {
                    Some(m) => println!("  min_risk: {}", m),
                    None => println!("  min_risk: (none)"),
                }
                match resolved.top_n {
                    Some(t) => println!("  top:      {}", t),
                    None => println!("  top:      (none)"),
                }
            }
        },
    }

    Ok(())
}

/// Score profile files, showing a progress bar for large batches
fn score_with_progress(
    files: &[PathBuf],
    options: &ReportOptions,
) -> anyhow::Result<Vec<ProfileReport>> {
    let progress = if files.len() >= PROGRESS_MIN_FILES {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} profiles")?
                .progress_chars("#>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let reports = score_profile_files(files, options, || progress.inc(1));
    progress.finish_and_clear();
    Ok(reports)
}

fn print_reports(reports: &[ProfileReport], format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", render_text(reports)),
        OutputFormat::Json => println!("{}", render_json(reports)),
    }
}

fn handle_session(
    store: &mut dyn SessionStore,
    action: SessionAction,
    root: &Path,
) -> anyhow::Result<()> {
    match action {
        SessionAction::Show { format } => match store.current_profile()? {
            Some(profile) => {
                let report =
                    ProfileReport::new("session".to_string(), &profile, &session_options(root)?);
                print_reports(&[report], format);
            }
            None => println!("No saved session profile"),
        },
        SessionAction::Save { path } => {
            let profile = load_profile(&path)?;
            store.save_profile(&profile)?;
            println!(
                "Saved session profile{}",
                profile
                    .display_name()
                    .map(|n| format!(" for {}", n))
                    .unwrap_or_default()
            );
        }
        SessionAction::Clear => {
            store.clear()?;
            println!("Session cleared");
        }
    }
    Ok(())
}

/// Session reports honor the config discovered at the session root
fn session_options(root: &Path) -> anyhow::Result<ReportOptions> {
    let resolved = config::load_and_resolve(root, None).context("failed to load configuration")?;
    Ok(ReportOptions {
        weights: resolved.weights,
        thresholds: resolved.thresholds,
        explain: true,
    })
}

fn load_config_for_command(
    path: Option<&Path>,
) -> anyhow::Result<(config::NextcareConfig, Option<PathBuf>)> {
    let cwd = std::env::current_dir()?;
    Ok(match config::locate_config(&cwd, path)? {
        Some((config, source)) => (config, Some(source)),
        None => (config::NextcareConfig::default(), None),
    })
}
