//! Command-line interface module for tidyrules.
//!
//! This module handles:
//! - Argument parsing
//! - Locating and loading the rule set
//! - Choosing the directory to organize
//! - Driving the organizer and reporting each file and the final summary

use crate::config::{ConfigError, RuleSet, default_config_path};
use crate::file_organizer::{FileOrganizer, FileOutcome, OrganizeError, RunStats};
use crate::output::OutputFormatter;
use clap::Parser;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Organize files into folders using rules from a configuration file.
#[derive(Debug, Clone, Parser)]
#[command(name = "tidyrules", version, about)]
pub struct Cli {
    /// Directory to organize (default: rules.target_directory from the config)
    pub directory: Option<PathBuf>,

    /// Process subdirectories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Show what would be done without moving any files
    #[arg(short, long)]
    pub dry_run: bool,

    /// Path to the config file (default: <config dir>/file-organizer/config.json)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log every decision
    #[arg(short, long)]
    pub verbose: bool,

    /// Write an empty configuration if none exists, then exit
    #[arg(long)]
    pub init: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize {
        /// Walk the whole tree.
        recursive: bool,
        /// If true, simulate the operation without making changes.
        dry_run: bool,
    },
    /// Create the configuration file.
    Init,
}

impl Cli {
    pub fn organize_command(&self) -> OrganizeCommand {
        if self.init {
            OrganizeCommand::Init
        } else {
            OrganizeCommand::Organize {
                recursive: self.recursive,
                dry_run: self.dry_run,
            }
        }
    }
}

/// Errors that end a CLI invocation before or instead of a run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Organize(#[from] OrganizeError),
    #[error(
        "No directory specified and no target_directory in the config. \
         Pass a directory or set rules.target_directory."
    )]
    NoDirectory,
}

/// Runs the CLI application with parsed arguments.
pub fn run_cli(cli: &Cli) -> Result<(), CliError> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    match cli.organize_command() {
        OrganizeCommand::Init => init_config(&config_path),
        OrganizeCommand::Organize { recursive, dry_run } => {
            organize_with_config(cli.directory.as_deref(), &config_path, recursive, dry_run)
                .map(|_| ())
        }
    }
}

/// Writes a default configuration unless one already exists.
pub fn init_config(config_path: &Path) -> Result<(), CliError> {
    if config_path.exists() {
        OutputFormatter::warning(&format!(
            "Configuration already exists at {}",
            config_path.display()
        ));
        return Ok(());
    }
    RuleSet::default().save(config_path)?;
    OutputFormatter::success(&format!(
        "Created configuration at {}",
        config_path.display()
    ));
    Ok(())
}

/// Picks the directory to organize: the explicit one, else the configured one.
pub fn resolve_source_dir(explicit: Option<&Path>, rule_set: &RuleSet) -> Result<PathBuf, CliError> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| rule_set.rules().target_directory.clone())
        .ok_or(CliError::NoDirectory)
}

/// Loads the rule set at `config_path` and organizes a directory with it.
///
/// This function:
/// 1. Loads the rule set (a missing file means an empty rule set)
/// 2. Resolves and validates the source directory
/// 3. Collects the files to consider
/// 4. Classifies, resolves and moves each file, printing one line per action
/// 5. Prints the run summary
///
/// Per-file failures are reported and counted but do not make this fail.
pub fn organize_with_config(
    directory: Option<&Path>,
    config_path: &Path,
    recursive: bool,
    dry_run: bool,
) -> Result<RunStats, CliError> {
    let rule_set = RuleSet::load(config_path)?;
    let source = resolve_source_dir(directory, &rule_set)?;
    let base = FileOrganizer::prepare_source(&source)?;

    let organizer = FileOrganizer::new(&rule_set, dry_run);
    let dry_run = organizer.is_dry_run();

    OutputFormatter::info(&format!("Organizing files in: {}", base.display()));
    if dry_run {
        OutputFormatter::dry_run_notice("No files will be moved.");
    }
    if rule_set.categories().is_empty() {
        OutputFormatter::warning(&format!(
            "No categories defined in {}; every file will be skipped.",
            config_path.display()
        ));
    }

    let files = FileOrganizer::collect_files(&base, recursive)?;
    let pb = OutputFormatter::create_progress_bar(files.len() as u64);
    let mut per_destination: HashMap<String, usize> = HashMap::new();

    let stats = organizer.process_files(&base, &files, |outcome| {
        pb.suspend(|| report_outcome(outcome, &base));
        if let FileOutcome::Moved { destination, .. } = outcome {
            *per_destination
                .entry(relative_folder(destination, &base))
                .or_insert(0) += 1;
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    OutputFormatter::summary_table(&per_destination, stats.moved);
    OutputFormatter::run_summary(&stats, dry_run);
    if dry_run {
        OutputFormatter::plain("\n✓ Dry run complete. No files were modified.");
    } else if stats.errors > 0 {
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    }

    Ok(stats)
}

/// Prints the line for one file's outcome.
fn report_outcome(outcome: &FileOutcome, base: &Path) {
    match outcome {
        FileOutcome::Moved {
            source,
            destination,
            ..
        } if source == destination => {
            log::info!("{} is already in place", source.display());
        }
        FileOutcome::Moved {
            source,
            destination,
            dry_run: true,
            ..
        } => OutputFormatter::dry_run_notice(&format!(
            "Would move: {} -> {}",
            source.display(),
            destination.display()
        )),
        FileOutcome::Moved {
            source,
            destination,
            ..
        } => OutputFormatter::success(&format!(
            "Moved: {} -> {}/",
            display_name(source),
            relative_folder(destination, base)
        )),
        FileOutcome::Errored { path, error } => {
            log::warn!("{}: {}", path.display(), error);
            OutputFormatter::error(&format!("Error moving {}: {}", path.display(), error));
        }
        FileOutcome::Ignored { path, reason } => {
            log::debug!("Ignored {} ({:?})", path.display(), reason);
        }
        FileOutcome::Unmatched { path } => {
            log::debug!("No category for {}", path.display());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The destination folder of `destination`, relative to `base` when possible.
fn relative_folder(destination: &Path, base: &Path) -> String {
    let folder = destination.parent().unwrap_or(destination);
    folder
        .strip_prefix(base)
        .unwrap_or(folder)
        .display()
        .to_string()
}
