//! tidyrules - rule-based file organization
//!
//! This library classifies files by user-declared categories (extensions,
//! filename patterns, and a match mode combining them), resolves a
//! destination that never overwrites an existing file, and moves files there
//! in a single sequential batch with per-file error isolation.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod glob_pattern;
pub mod output;
pub mod path_resolver;

pub use classifier::{Classification, classify};
pub use config::{ConfigError, RuleSet, Rules};
pub use file_category::{Category, MatchMode};
pub use file_organizer::{FileOrganizer, FileOutcome, OrganizeError, RunStats};
pub use path_resolver::{PathResolver, Resolution};

pub use cli::{Cli, OrganizeCommand, run_cli};
