//! Rule set loading and persistence.
//!
//! The configuration record has two top-level members, `categories` and
//! `rules`. Categories are stored as a mapping from name to rule bundle, and
//! the order they appear in the document is the order they are evaluated in.
//!
//! # Configuration File Format
//!
//! JSON is the default. A path ending in `.toml` is read and written as TOML
//! with the same schema:
//!
//! ```toml
//! [categories.screenshots]
//! patterns = ["Screenshot*"]
//! match_mode = "pattern"
//! destination = "Screenshots"
//!
//! [categories.images]
//! extensions = [".png", ".jpg"]
//! match_mode = "extension"
//! destination = "Images"
//!
//! [rules]
//! ignore_hidden = true
//! ignore_system = true
//! create_subdirs_by_date = false
//! dry_run = false
//! target_directory = "/home/me/Downloads"
//! ```

use crate::file_category::{Category, CategoryRecord};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the platform config dir that holds the default config.
pub const CONFIG_DIR_NAME: &str = "file-organizer";
/// File name of the default config.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Errors that can occur while loading or saving a rule set.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
    #[error("Duplicate category name '{0}' (names are case-insensitive)")]
    DuplicateCategory(String),
    #[error("Could not serialize configuration: {0}")]
    Serialize(String),
    #[error("No configuration directory could be determined for this platform")]
    NoConfigDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// On-disk encoding of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Global switches that apply to every file in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Skip files whose name starts with a dot.
    #[serde(default = "default_true")]
    pub ignore_hidden: bool,

    /// Skip well-known OS artifacts such as `Thumbs.db`.
    #[serde(default = "default_true")]
    pub ignore_system: bool,

    /// Partition destinations into `YYYY-MM` folders by modification time.
    #[serde(default)]
    pub create_subdirs_by_date: bool,

    /// Report moves without performing them.
    #[serde(default)]
    pub dry_run: bool,

    /// Directory organized when none is given on the command line.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_path",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

/// Treats an empty string the same as a missing path.
fn deserialize_optional_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from))
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            ignore_hidden: true,
            ignore_system: true,
            create_subdirs_by_date: false,
            dry_run: false,
            target_directory: None,
        }
    }
}

/// An ordered list of categories plus the global rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    categories: Vec<Category>,
    rules: Rules,
}

impl RuleSet {
    /// Builds a rule set, rejecting category names that collide ignoring case.
    pub fn new(categories: Vec<Category>, rules: Rules) -> ConfigResult<Self> {
        for (i, category) in categories.iter().enumerate() {
            if categories[..i].iter().any(|c| c.has_name(category.name())) {
                return Err(ConfigError::DuplicateCategory(category.name().to_string()));
            }
        }
        Ok(Self { categories, rules })
    }

    /// Categories in evaluation order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut Rules {
        &mut self.rules
    }

    /// Looks a category up by name, ignoring case.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.has_name(name))
    }

    /// Loads a rule set from `path`.
    ///
    /// A missing file is a first run, not an error: the result is an empty
    /// category list with default rules.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file exists but cannot be read and
    /// `ConfigError::Invalid` if it cannot be parsed.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::info!(
                "No configuration at {}, starting with an empty rule set",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let parsed = match ConfigFormat::from_path(path) {
            ConfigFormat::Json => Self::from_json_str(&content),
            ConfigFormat::Toml => Self::from_toml_str(&content),
        };

        parsed.map_err(|e| match e {
            ConfigError::Invalid { reason, .. } => ConfigError::Invalid {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parses a JSON configuration document.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFile = serde_json::from_str(content).map_err(|e| ConfigError::Invalid {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        file.into_rule_set()
    }

    /// Parses a TOML configuration document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Invalid {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        file.into_rule_set()
    }

    /// Renders the rule set in the given format.
    pub fn to_string_as(&self, format: ConfigFormat) -> ConfigResult<String> {
        let file = ConfigFile::from_rule_set(self);
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&file)
                .map_err(|e| ConfigError::Serialize(e.to_string())),
            ConfigFormat::Toml => {
                toml::to_string_pretty(&file).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
        }
    }

    /// Writes the rule set to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_string_as(ConfigFormat::from_path(path))?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// `<platform config dir>/file-organizer/config.json`.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// The on-disk document shape.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    categories: OrderedCategories,
    #[serde(default)]
    rules: Rules,
}

impl ConfigFile {
    fn from_rule_set(rule_set: &RuleSet) -> Self {
        Self {
            categories: OrderedCategories(
                rule_set
                    .categories
                    .iter()
                    .map(|c| (c.name().to_string(), c.to_record()))
                    .collect(),
            ),
            rules: rule_set.rules.clone(),
        }
    }

    fn into_rule_set(self) -> ConfigResult<RuleSet> {
        let categories = self
            .categories
            .0
            .into_iter()
            .map(|(name, record)| Category::from_record(&name, record))
            .collect();
        RuleSet::new(categories, self.rules)
    }
}

/// A name-to-category mapping that keeps document order.
#[derive(Debug, Default)]
struct OrderedCategories(Vec<(String, CategoryRecord)>);

impl Serialize for OrderedCategories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, record) in &self.0 {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderedCategories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedCategories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of category names to category rules")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, record)) = access.next_entry::<String, CategoryRecord>()? {
                    entries.push((name, record));
                }
                Ok(OrderedCategories(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_category::MatchMode;
    use tempfile::TempDir;

    const SAMPLE_JSON: &str = r#"{
        "categories": {
            "zeta": { "extensions": ["PNG"], "match_mode": "extension", "destination": "Z" },
            "alpha": { "patterns": ["Screenshot*"], "match_mode": "pattern", "destination": "" },
            "mid": { "extensions": [".pdf"], "patterns": ["inv*"] }
        },
        "rules": {
            "ignore_hidden": false,
            "create_subdirs_by_date": true,
            "target_directory": "/tmp/inbox"
        }
    }"#;

    #[test]
    fn test_default_rules() {
        let rules = Rules::default();
        assert!(rules.ignore_hidden);
        assert!(rules.ignore_system);
        assert!(!rules.create_subdirs_by_date);
        assert!(!rules.dry_run);
        assert!(rules.target_directory.is_none());
    }

    #[test]
    fn test_json_preserves_declaration_order() {
        let rule_set = RuleSet::from_json_str(SAMPLE_JSON).unwrap();
        let names: Vec<_> = rule_set.categories().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_json_fields_and_defaults() {
        let rule_set = RuleSet::from_json_str(SAMPLE_JSON).unwrap();

        let zeta = rule_set.category("ZETA").unwrap();
        assert!(zeta.extensions().contains(".png"));
        assert_eq!(zeta.destination(), "Z");

        let alpha = rule_set.category("alpha").unwrap();
        assert_eq!(alpha.destination(), "alpha");

        let mid = rule_set.category("mid").unwrap();
        assert_eq!(mid.match_mode(), MatchMode::Either);

        let rules = rule_set.rules();
        assert!(!rules.ignore_hidden);
        assert!(rules.ignore_system);
        assert!(rules.create_subdirs_by_date);
        assert_eq!(rules.target_directory, Some(PathBuf::from("/tmp/inbox")));
    }

    #[test]
    fn test_empty_target_directory_is_none() {
        let rule_set =
            RuleSet::from_json_str(r#"{"categories": {}, "rules": {"target_directory": ""}}"#)
                .unwrap();
        assert!(rule_set.rules().target_directory.is_none());
    }

    #[test]
    fn test_missing_members_default() {
        let rule_set = RuleSet::from_json_str("{}").unwrap();
        assert!(rule_set.categories().is_empty());
        assert_eq!(rule_set.rules(), &Rules::default());
    }

    #[test]
    fn test_duplicate_names_rejected_case_insensitively() {
        let result = RuleSet::from_json_str(
            r#"{"categories": {"Images": {"extensions": [".png"]}, "images": {"extensions": [".jpg"]}}}"#,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateCategory(_))));
    }

    #[test]
    fn test_invalid_match_mode_is_an_error() {
        let result =
            RuleSet::from_json_str(r#"{"categories": {"x": {"match_mode": "sometimes"}}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_toml_preserves_declaration_order() {
        let content = r#"
            [categories.screenshots]
            patterns = ["Screenshot*"]
            match_mode = "pattern"

            [categories.images]
            extensions = ["png"]
            match_mode = "extension"
            destination = "Images"

            [rules]
            dry_run = true
        "#;
        let rule_set = RuleSet::from_toml_str(content).unwrap();
        let names: Vec<_> = rule_set.categories().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["screenshots", "images"]);
        assert!(rule_set.rules().dry_run);
        assert!(rule_set.category("images").unwrap().extensions().contains(".png"));
    }

    #[test]
    fn test_load_missing_file_is_first_run() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let rule_set = RuleSet::load(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(rule_set, RuleSet::default());
    }

    #[test]
    fn test_load_unparseable_file_reports_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        match RuleSet::load(&path) {
            Err(ConfigError::Invalid { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected invalid config error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let original = RuleSet::from_json_str(SAMPLE_JSON).unwrap();

        for file in ["nested/config.json", "config.toml"] {
            let path = temp_dir.path().join(file);
            original.save(&path).unwrap();
            let loaded = RuleSet::load(&path).unwrap();
            assert_eq!(loaded, original, "round trip through {}", file);
        }
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/config.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }
}
