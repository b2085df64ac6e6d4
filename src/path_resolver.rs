//! Destination path resolution.
//!
//! Turns a classification into a concrete path that does not overwrite
//! anything already on disk. Nothing here creates directories or moves
//! files; the organizer does that once it decides to act.
//!
//! Resolution is scan-then-act and therefore only as good as the
//! assumption that no other process is writing into the destination at
//! the same time.

use crate::config::Rules;
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where a file should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The file already sits at its destination. Nothing to move.
    InPlace(PathBuf),
    /// The file should be moved to this free path.
    Move(PathBuf),
}

impl Resolution {
    pub fn path(&self) -> &Path {
        match self {
            Resolution::InPlace(path) | Resolution::Move(path) => path,
        }
    }

    pub fn is_in_place(&self) -> bool {
        matches!(self, Resolution::InPlace(_))
    }
}

/// Computes collision-free destinations under the organized directory.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    rules: &'a Rules,
    reserved: Option<&'a HashSet<PathBuf>>,
}

impl<'a> PathResolver<'a> {
    pub fn new(rules: &'a Rules) -> Self {
        Self {
            rules,
            reserved: None,
        }
    }

    /// Treats every path in `reserved` as occupied, as if earlier planned
    /// moves had already happened. Dry runs use this.
    pub fn with_reserved(mut self, reserved: &'a HashSet<PathBuf>) -> Self {
        self.reserved = Some(reserved);
        self
    }

    /// The folder a file lands in: `base_dir/segment`, plus a `YYYY-MM`
    /// folder from `modified` when date partitioning is on.
    pub fn destination_dir(&self, base_dir: &Path, segment: &str, modified: SystemTime) -> PathBuf {
        let dir = base_dir.join(segment);
        if self.rules.create_subdirs_by_date {
            dir.join(date_segment(modified))
        } else {
            dir
        }
    }

    /// Resolves the destination for `source`.
    ///
    /// The first candidate keeps the original file name. While a candidate
    /// is occupied by something other than `source`, the next one is
    /// `{stem}_{n}{suffix}` with `n` counting up from 1. Reaching `source`
    /// itself yields [`Resolution::InPlace`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidyrules::config::Rules;
    /// use tidyrules::path_resolver::PathResolver;
    /// use std::path::Path;
    /// use std::time::SystemTime;
    ///
    /// let rules = Rules::default();
    /// let resolution = PathResolver::new(&rules).resolve(
    ///     Path::new("/home/me/Downloads"),
    ///     "Images",
    ///     Path::new("/home/me/Downloads/a.png"),
    ///     SystemTime::now(),
    /// );
    /// println!("{}", resolution.path().display());
    /// ```
    pub fn resolve(
        &self,
        base_dir: &Path,
        segment: &str,
        source: &Path,
        modified: SystemTime,
    ) -> Resolution {
        let dest_dir = self.destination_dir(base_dir, segment, modified);
        let file_name = source.file_name().unwrap_or(source.as_os_str());

        let mut candidate = dest_dir.join(file_name);
        let mut counter: u64 = 1;
        loop {
            if is_same_file(&candidate, source) {
                return Resolution::InPlace(candidate);
            }
            if !self.is_taken(&candidate) {
                return Resolution::Move(candidate);
            }
            candidate = dest_dir.join(numbered_name(file_name, counter));
            counter += 1;
        }
    }

    fn is_taken(&self, path: &Path) -> bool {
        is_occupied(path) || self.reserved.is_some_and(|reserved| reserved.contains(path))
    }
}

/// `{stem}_{n}{suffix}`, split at the last dot like the classifier does.
/// Works on the raw name so non-UTF-8 bytes survive.
fn numbered_name(file_name: &OsStr, n: u64) -> OsString {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => {
            let mut name = stem.to_os_string();
            name.push(format!("_{}.", n));
            name.push(ext);
            name
        }
        _ => {
            let mut name = file_name.to_os_string();
            name.push(format!("_{}", n));
            name
        }
    }
}

/// `YYYY-MM` in the host's local time zone.
pub fn date_segment(modified: SystemTime) -> String {
    DateTime::<Local>::from(modified).format("%Y-%m").to_string()
}

/// Any entry counts as occupying a path, including a dangling symlink.
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Compares canonical parent directories plus file names. The final
/// component is never followed, so a symlink sitting at the candidate is
/// not mistaken for its target.
fn is_same_file(candidate: &Path, source: &Path) -> bool {
    if candidate == source {
        return true;
    }
    match (canonical_location(candidate), canonical_location(source)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn canonical_location(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}
