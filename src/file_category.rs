//! User-declared file categories.
//!
//! A category bundles the rules the classifier evaluates for a file: a set of
//! extensions, a list of filename patterns, the boolean policy combining the
//! two, and the folder that matched files are moved into.
//!
//! # Examples
//!
//! ```
//! use tidyrules::file_category::{Category, MatchMode};
//!
//! let images = Category::new("images", ["PNG", ".Jpg"], ["IMG_*"], MatchMode::Either, "");
//! assert!(images.extensions().contains(".png"));
//! assert!(images.extensions().contains(".jpg"));
//! assert_eq!(images.destination(), "images");
//! ```

use crate::glob_pattern::GlobPattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How extension and pattern results are combined for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Extension AND pattern must match.
    Both,
    /// Extension OR pattern may match.
    #[default]
    Either,
    /// Only the extension is considered.
    Extension,
    /// Only the filename patterns are considered.
    Pattern,
}

impl MatchMode {
    /// Applies this policy to the two partial results.
    pub fn combine(self, ext_match: bool, pattern_match: bool) -> bool {
        match self {
            MatchMode::Both => ext_match && pattern_match,
            MatchMode::Either => ext_match || pattern_match,
            MatchMode::Extension => ext_match,
            MatchMode::Pattern => pattern_match,
        }
    }

    /// The name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::Both => "both",
            MatchMode::Either => "either",
            MatchMode::Extension => "extension",
            MatchMode::Pattern => "pattern",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named rule bundle.
///
/// Extensions are normalized once, here, to a lower-case dot-prefixed form.
/// The classifier compares against them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: BTreeSet<String>,
    patterns: Vec<GlobPattern>,
    match_mode: MatchMode,
    destination: String,
}

impl Category {
    /// Creates a category, normalizing its extensions and patterns.
    ///
    /// Blank entries are dropped. A blank `destination` falls back to `name`.
    pub fn new<E, P>(
        name: &str,
        extensions: E,
        patterns: P,
        match_mode: MatchMode,
        destination: &str,
    ) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let name = name.trim().to_string();
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .map(|p| GlobPattern::new(&p))
            .collect();
        let destination = match destination.trim() {
            "" => name.clone(),
            dest => dest.to_string(),
        };

        Self {
            name,
            extensions,
            patterns,
            match_mode,
            destination,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    pub fn patterns(&self) -> &[GlobPattern] {
        &self.patterns
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    /// The folder, relative to the organized directory, that receives matches.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// True if `name` identifies this category, ignoring case.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Evaluates this category against an already-lowered extension and a
    /// bare file name.
    pub fn matches(&self, extension: &str, file_name: &str) -> bool {
        let ext_match = !extension.is_empty() && self.extensions.contains(extension);
        let pattern_match = self.patterns.iter().any(|p| p.matches(file_name));
        self.match_mode.combine(ext_match, pattern_match)
    }

    pub(crate) fn to_record(&self) -> CategoryRecord {
        CategoryRecord {
            extensions: self.extensions.iter().cloned().collect(),
            patterns: self.patterns.iter().map(|p| p.as_str().to_string()).collect(),
            match_mode: self.match_mode,
            destination: self.destination.clone(),
        }
    }

    pub(crate) fn from_record(name: &str, record: CategoryRecord) -> Self {
        Self::new(
            name,
            record.extensions,
            record.patterns,
            record.match_mode,
            &record.destination,
        )
    }
}

/// The persisted shape of a category. Its name is the key it is stored under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CategoryRecord {
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub destination: String,
}

/// Normalizes a user-supplied extension to `.ext` in lower case.
///
/// Returns `None` for blank input.
///
/// ```
/// use tidyrules::file_category::normalize_extension;
///
/// assert_eq!(normalize_extension("PDF").as_deref(), Some(".pdf"));
/// assert_eq!(normalize_extension(" .Tar ").as_deref(), Some(".tar"));
/// assert_eq!(normalize_extension("  "), None);
/// ```
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }
    let lower = ext.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{}", lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_extensions_normalized_at_creation() {
        let category = Category::new("docs", ["PDF", ".TXT", " md ", ""], NONE, MatchMode::Extension, "");
        let exts: Vec<_> = category.extensions().iter().cloned().collect();
        assert_eq!(exts, vec![".md", ".pdf", ".txt"]);
    }

    #[test]
    fn test_blank_destination_falls_back_to_name() {
        let category = Category::new("music", ["mp3"], NONE, MatchMode::Extension, "   ");
        assert_eq!(category.destination(), "music");

        let category = Category::new("music", ["mp3"], NONE, MatchMode::Extension, "Audio");
        assert_eq!(category.destination(), "Audio");
    }

    #[test]
    fn test_blank_patterns_dropped() {
        let category = Category::new("shots", NONE, ["Screenshot*", " ", ""], MatchMode::Pattern, "");
        assert_eq!(category.patterns().len(), 1);
        assert_eq!(category.patterns()[0].as_str(), "Screenshot*");
    }

    #[test]
    fn test_has_name_ignores_case() {
        let category = Category::new("Images", ["png"], NONE, MatchMode::Extension, "");
        assert!(category.has_name("images"));
        assert!(category.has_name("IMAGES"));
        assert!(!category.has_name("image"));
    }

    #[test]
    fn test_match_mode_truth_table() {
        let cases = [
            (MatchMode::Both, [false, false, false, true]),
            (MatchMode::Either, [false, true, true, true]),
            (MatchMode::Extension, [false, false, true, true]),
            (MatchMode::Pattern, [false, true, false, true]),
        ];
        let inputs = [(false, false), (false, true), (true, false), (true, true)];

        for (mode, expected) in cases {
            for ((ext, pat), want) in inputs.iter().zip(expected) {
                assert_eq!(
                    mode.combine(*ext, *pat),
                    want,
                    "{} with ext={} pattern={}",
                    mode,
                    ext,
                    pat
                );
            }
        }
    }

    #[test]
    fn test_empty_rule_lists_never_match() {
        let category = Category::new("empty", NONE, NONE, MatchMode::Either, "");
        assert!(!category.matches(".png", "a.png"));
    }

    #[test]
    fn test_empty_extension_never_matches() {
        let category = Category::new("dotfiles", ["."], NONE, MatchMode::Extension, "");
        assert!(category.extensions().is_empty());
        assert!(!category.matches("", "Makefile"));
    }

    #[test]
    fn test_match_mode_serde_names() {
        let mode: MatchMode = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(mode, MatchMode::Both);
        assert_eq!(serde_json::to_string(&MatchMode::Pattern).unwrap(), "\"pattern\"");
        assert!(serde_json::from_str::<MatchMode>("\"Both\"").is_err());
    }

    #[test]
    fn test_record_round_trip_keeps_destination() {
        let category = Category::new("screens", NONE, ["Screenshot*"], MatchMode::Pattern, "Shots");
        let restored = Category::from_record("screens", category.to_record());
        assert_eq!(restored, category);
    }
}
