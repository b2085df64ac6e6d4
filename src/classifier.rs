//! Rule evaluation: which category, if any, a file name belongs to.
//!
//! Categories are tried in declaration order and the first one whose match
//! mode evaluates true wins. A later category is never consulted once an
//! earlier one has matched, even if it would be a "better" fit.

use crate::config::RuleSet;
use crate::file_category::Category;

/// The outcome of a successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    /// The matching category.
    pub category: &'a Category,
    /// The folder segment files of this category are moved into.
    pub destination: &'a str,
}

impl Classification<'_> {
    pub fn category_name(&self) -> &str {
        self.category.name()
    }
}

/// Returns the lower-cased extension of `file_name`, dot included.
///
/// The extension starts at the last dot. A leading dot alone (`.bashrc`) or a
/// trailing dot (`notes.`) does not make an extension.
///
/// ```
/// use tidyrules::classifier::file_extension;
///
/// assert_eq!(file_extension("Photo.JPG"), ".jpg");
/// assert_eq!(file_extension("archive.tar.gz"), ".gz");
/// assert_eq!(file_extension(".bashrc"), "");
/// assert_eq!(file_extension("README"), "");
/// ```
pub fn file_extension(file_name: &str) -> String {
    split_extension(file_name).1.to_lowercase()
}

/// Splits a file name into stem and suffix using the same rule as
/// [`file_extension`]. The suffix keeps its original case.
pub(crate) fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Classifies a bare file name against the rule set.
pub fn classify<'a>(file_name: &str, rules: &'a RuleSet) -> Option<Classification<'a>> {
    let extension = file_extension(file_name);

    rules
        .categories()
        .iter()
        .find(|category| category.matches(&extension, file_name))
        .map(|category| Classification {
            category,
            destination: category.destination(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_category::MatchMode;

    const NONE: [&str; 0] = [];

    fn rule_set(categories: Vec<Category>) -> RuleSet {
        RuleSet::new(categories, Default::default()).expect("valid rule set")
    }

    #[test]
    fn test_split_extension_edge_cases() {
        assert_eq!(split_extension("a.png"), ("a", ".png"));
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension(".hidden.txt"), (".hidden", ".txt"));
        assert_eq!(split_extension("trailing."), ("trailing.", ""));
        assert_eq!(split_extension("plain"), ("plain", ""));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let rules = rule_set(vec![Category::new(
            "images",
            [".png"],
            NONE,
            MatchMode::Extension,
            "Images",
        )]);

        let hit = classify("HOLIDAY.PNG", &rules).expect("should match");
        assert_eq!(hit.category_name(), "images");
        assert_eq!(hit.destination, "Images");
    }

    #[test]
    fn test_first_declared_category_wins() {
        let rules = rule_set(vec![
            Category::new("screenshots", NONE, ["Screenshot*"], MatchMode::Pattern, ""),
            Category::new("images", [".png"], NONE, MatchMode::Extension, ""),
        ]);
        assert_eq!(
            classify("Screenshot 1.png", &rules).unwrap().category_name(),
            "screenshots"
        );
        assert_eq!(classify("cat.png", &rules).unwrap().category_name(), "images");

        let reversed = rule_set(vec![
            Category::new("images", [".png"], NONE, MatchMode::Extension, ""),
            Category::new("screenshots", NONE, ["Screenshot*"], MatchMode::Pattern, ""),
        ]);
        assert_eq!(
            classify("Screenshot 1.png", &reversed).unwrap().category_name(),
            "images"
        );
    }

    #[test]
    fn test_match_modes_against_one_file() {
        let file = "invoice_march.pdf";
        let make = |mode, exts: &[&str], pats: &[&str]| {
            rule_set(vec![Category::new(
                "c",
                exts.iter().copied(),
                pats.iter().copied(),
                mode,
                "",
            )])
        };

        // ext matches, pattern does not
        assert!(classify(file, &make(MatchMode::Both, &[".pdf"], &["receipt*"])).is_none());
        assert!(classify(file, &make(MatchMode::Either, &[".pdf"], &["receipt*"])).is_some());
        assert!(classify(file, &make(MatchMode::Extension, &[".pdf"], &["receipt*"])).is_some());
        assert!(classify(file, &make(MatchMode::Pattern, &[".pdf"], &["receipt*"])).is_none());

        // both match
        assert!(classify(file, &make(MatchMode::Both, &[".pdf"], &["invoice*"])).is_some());

        // pattern matches, ext does not
        assert!(classify(file, &make(MatchMode::Extension, &[".doc"], &["invoice*"])).is_none());
        assert!(classify(file, &make(MatchMode::Pattern, &[".doc"], &["invoice*"])).is_some());
    }

    #[test]
    fn test_pattern_match_is_case_sensitive() {
        let rules = rule_set(vec![Category::new(
            "screenshots",
            NONE,
            ["Screenshot*"],
            MatchMode::Pattern,
            "",
        )]);
        assert!(classify("Screenshot 2024.png", &rules).is_some());
        assert!(classify("screenshot 2024.png", &rules).is_none());
        assert!(classify("photo.png", &rules).is_none());
    }

    #[test]
    fn test_no_categories_means_no_match() {
        let rules = rule_set(Vec::new());
        assert!(classify("anything.txt", &rules).is_none());
    }
}
