//! Batch organization of a directory.
//!
//! This module walks a source directory, decides what happens to each file,
//! and carries it out. Every file ends in exactly one terminal outcome:
//! ignored, unmatched, moved, or errored. A failure on one file is recorded
//! and the run continues with the next one.

use crate::classifier::classify;
use crate::config::{RuleSet, Rules};
use crate::path_resolver::{PathResolver, Resolution};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Well-known OS artifacts skipped when `ignore_system` is set.
pub const SYSTEM_FILES: &[&str] = &[
    ".DS_Store",
    ".localized",
    "Thumbs.db",
    "ehthumbs.db",
    "Desktop.ini",
    "desktop.ini",
];

/// Errors that can occur during file organization operations.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source directory does not exist or is not a directory.
    #[error("Invalid source directory {}: {reason}", .path.display())]
    InvalidSourceDir { path: PathBuf, reason: String },
    /// Enumerating the source directory failed.
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to create a destination directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to move a file to its destination.
    #[error("Failed to move {} to {}: {source}", .path.display(), .destination.display())]
    FileMoveFailure {
        path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file's metadata could not be read.
    #[error("Failed to read metadata of {}: {source}", .path.display())]
    MetadataUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Why a file was left alone before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Hidden,
    System,
}

/// The terminal state a file reached during a run.
#[derive(Debug)]
pub enum FileOutcome {
    /// Skipped by the hidden/system ignore policy.
    Ignored { path: PathBuf, reason: IgnoreReason },
    /// No category matched.
    Unmatched { path: PathBuf },
    /// Moved, or would have been in a dry run. `source == destination`
    /// when the file was already where it belongs.
    Moved {
        source: PathBuf,
        destination: PathBuf,
        category: String,
        dry_run: bool,
    },
    /// The move or one of its preconditions failed.
    Errored { path: PathBuf, error: OrganizeError },
}

/// Aggregate counters for one run.
///
/// `processed == moved + skipped + errors` always holds at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: usize,
    pub moved: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &FileOutcome) {
        self.processed += 1;
        match outcome {
            FileOutcome::Ignored { .. } | FileOutcome::Unmatched { .. } => self.skipped += 1,
            FileOutcome::Moved { .. } => self.moved += 1,
            FileOutcome::Errored { .. } => self.errors += 1,
        }
    }
}

/// Organizes files according to a rule set.
///
/// The rule set is borrowed read-only; statistics are created per run and
/// returned by value.
pub struct FileOrganizer<'a> {
    rule_set: &'a RuleSet,
    dry_run: bool,
}

impl<'a> FileOrganizer<'a> {
    /// Creates an organizer. `dry_run` is combined with the rule set's own flag.
    pub fn new(rule_set: &'a RuleSet, dry_run: bool) -> Self {
        Self {
            rule_set,
            dry_run: dry_run || rule_set.rules().dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn rules(&self) -> &Rules {
        self.rule_set.rules()
    }

    /// Validates the source directory and returns its canonical form.
    pub fn prepare_source(source_dir: &Path) -> OrganizeResult<PathBuf> {
        let canonical = fs::canonicalize(source_dir).map_err(|e| OrganizeError::InvalidSourceDir {
            path: source_dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !canonical.is_dir() {
            return Err(OrganizeError::InvalidSourceDir {
                path: source_dir.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }
        Ok(canonical)
    }

    /// Lists the regular files to consider, before anything is moved.
    ///
    /// Symlinks are not followed and are not treated as files.
    pub fn collect_files(source_dir: &Path, recursive: bool) -> OrganizeResult<Vec<PathBuf>> {
        if recursive {
            let mut files = Vec::new();
            for entry in WalkDir::new(source_dir).min_depth(1) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) if e.depth() == 0 => {
                        return Err(OrganizeError::ReadDirFailed {
                            path: source_dir.to_path_buf(),
                            source: e.into(),
                        });
                    }
                    Err(e) => log::warn!("Skipping unreadable entry: {}", e),
                }
            }
            return Ok(files);
        }

        let entries = fs::read_dir(source_dir).map_err(|e| OrganizeError::ReadDirFailed {
            path: source_dir.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) if entry.file_type().map(|t| t.is_file()).unwrap_or(false) => {
                    files.push(entry.path())
                }
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable entry in {}: {}", source_dir.display(), e),
            }
        }
        Ok(files)
    }

    /// Organizes `source_dir` and returns the run's statistics. With
    /// `recursive` the whole tree is walked, otherwise only its immediate
    /// children.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidyrules::config::RuleSet;
    /// use tidyrules::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let rule_set = RuleSet::load(Path::new("config.json")).unwrap();
    /// let stats = FileOrganizer::new(&rule_set, false)
    ///     .organize_directory(Path::new("/home/me/Downloads"), false)
    ///     .unwrap();
    /// println!("moved {} of {}", stats.moved, stats.processed);
    /// ```
    pub fn organize_directory(&self, source_dir: &Path, recursive: bool) -> OrganizeResult<RunStats> {
        let base = Self::prepare_source(source_dir)?;
        let files = Self::collect_files(&base, recursive)?;
        Ok(self.process_files(&base, &files, |_| {}))
    }

    /// Runs every file in `files` to a terminal outcome, reporting each one to
    /// `observe`. Destinations are resolved under `base_dir`.
    pub fn process_files<F>(&self, base_dir: &Path, files: &[PathBuf], mut observe: F) -> RunStats
    where
        F: FnMut(&FileOutcome),
    {
        let mut stats = RunStats::default();
        // Destinations promised by earlier files of a dry run.
        let mut planned = HashSet::new();
        for path in files {
            let outcome = self.process_file_planned(base_dir, path, &mut planned);
            log::debug!("{:?}", outcome);
            stats.record(&outcome);
            observe(&outcome);
        }
        stats
    }

    /// Decides and carries out what happens to one file.
    pub fn process_file(&self, base_dir: &Path, path: &Path) -> FileOutcome {
        self.process_file_planned(base_dir, path, &mut HashSet::new())
    }

    fn process_file_planned(
        &self,
        base_dir: &Path,
        path: &Path,
        planned: &mut HashSet<PathBuf>,
    ) -> FileOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(reason) = ignore_reason(&file_name, self.rules()) {
            return FileOutcome::Ignored {
                path: path.to_path_buf(),
                reason,
            };
        }

        let Some(classification) = classify(&file_name, self.rule_set) else {
            return FileOutcome::Unmatched {
                path: path.to_path_buf(),
            };
        };

        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(time) => time,
            Err(e) => {
                return FileOutcome::Errored {
                    path: path.to_path_buf(),
                    error: OrganizeError::MetadataUnavailable {
                        path: path.to_path_buf(),
                        source: e,
                    },
                };
            }
        };

        let resolution = PathResolver::new(self.rules())
            .with_reserved(planned)
            .resolve(base_dir, classification.destination, path, modified);
        let category = classification.category_name().to_string();

        let destination = match resolution {
            Resolution::InPlace(destination) => destination,
            Resolution::Move(destination) if self.dry_run => {
                planned.insert(destination.clone());
                destination
            }
            Resolution::Move(destination) => {
                if let Err(error) = move_file(path, &destination) {
                    return FileOutcome::Errored {
                        path: path.to_path_buf(),
                        error,
                    };
                }
                destination
            }
        };

        FileOutcome::Moved {
            source: path.to_path_buf(),
            destination,
            category,
            dry_run: self.dry_run,
        }
    }
}

/// Applies the hidden/system ignore policy to a bare file name.
pub fn ignore_reason(file_name: &str, rules: &Rules) -> Option<IgnoreReason> {
    if rules.ignore_hidden && file_name.starts_with('.') {
        return Some(IgnoreReason::Hidden);
    }
    if rules.ignore_system && SYSTEM_FILES.contains(&file_name) {
        return Some(IgnoreReason::System);
    }
    None
}

/// Moves a file, creating the destination directory first.
///
/// A plain rename is tried first; if that fails (typically across devices) the
/// file is copied and the original removed.
fn move_file(source: &Path, destination: &Path) -> OrganizeResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let failure = |e: io::Error| OrganizeError::FileMoveFailure {
        path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    };

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "Rename across devices, copying {} instead",
                source.display()
            );
            fs::copy(source, destination).map_err(failure)?;
            fs::remove_file(source).map_err(failure)
        }
        Err(e) => Err(failure(e)),
    }
}
