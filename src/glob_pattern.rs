//! Filename wildcard patterns.
//!
//! Category patterns use a small grammar:
//!
//! | token | meaning                                          |
//! |-------|--------------------------------------------------|
//! | `*`   | any run of characters, including the empty run   |
//! | `?`   | exactly one character (one Unicode scalar value) |
//! | other | itself, literally                                |
//!
//! There are no character classes and no escapes, so `[`, `]`, `\` and `/`
//! are ordinary literals. Matching is case-sensitive and anchored at both
//! ends. Patterns are only ever applied to a bare file name.
//!
//! ```
//! use tidyrules::glob_pattern::GlobPattern;
//!
//! let pattern = GlobPattern::new("Screenshot*");
//! assert!(pattern.matches("Screenshot 2024.png"));
//! assert!(!pattern.matches("screenshot 2024.png"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyOne,
    Literal(char),
}

/// A compiled wildcard pattern. Keeps its source text for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct GlobPattern {
    source: String,
    tokens: Vec<Token>,
}

impl GlobPattern {
    /// Compiles a pattern. Every string is a valid pattern.
    pub fn new(source: &str) -> Self {
        let mut tokens = Vec::with_capacity(source.len());
        for c in source.chars() {
            let token = match c {
                '*' => Token::AnyRun,
                '?' => Token::AnyOne,
                other => Token::Literal(other),
            };
            // Adjacent stars are equivalent to one.
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        Self {
            source: source.to_string(),
            tokens,
        }
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `name` matches the whole pattern.
    ///
    /// Greedy two-cursor matcher: on a mismatch it backtracks to the most
    /// recent `*` and lets it swallow one more character. Linear in the
    /// common case, never exponential.
    pub fn matches(&self, name: &str) -> bool {
        let text: Vec<char> = name.chars().collect();
        let tokens = &self.tokens;

        let (mut t, mut p) = (0usize, 0usize);
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match tokens.get(p) {
                Some(Token::AnyRun) => {
                    backtrack = Some((p, t));
                    p += 1;
                }
                Some(Token::AnyOne) => {
                    t += 1;
                    p += 1;
                }
                Some(Token::Literal(c)) if *c == text[t] => {
                    t += 1;
                    p += 1;
                }
                _ => match backtrack {
                    Some((star_p, star_t)) => {
                        p = star_p + 1;
                        t = star_t + 1;
                        backtrack = Some((star_p, star_t + 1));
                    }
                    None => return false,
                },
            }
        }

        tokens[p..].iter().all(|token| *token == Token::AnyRun)
    }
}

impl From<String> for GlobPattern {
    fn from(source: String) -> Self {
        Self::new(&source)
    }
}

impl From<GlobPattern> for String {
    fn from(pattern: GlobPattern) -> Self {
        pattern.source
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, name: &str) -> bool {
        GlobPattern::new(pattern).matches(name)
    }

    #[test]
    fn test_literal_pattern_is_anchored() {
        assert!(matches("report.pdf", "report.pdf"));
        assert!(!matches("report.pdf", "report.pdf.bak"));
        assert!(!matches("report.pdf", "old_report.pdf"));
    }

    #[test]
    fn test_star_matches_any_run() {
        assert!(matches("Screenshot*", "Screenshot 2024.png"));
        assert!(matches("Screenshot*", "Screenshot"));
        assert!(matches("*.png", ".png"));
        assert!(matches("IMG_*_*.jpg", "IMG_2024_01.jpg"));
        assert!(!matches("Screenshot*", "My Screenshot.png"));
    }

    #[test]
    fn test_question_mark_matches_exactly_one() {
        assert!(matches("file?.txt", "file1.txt"));
        assert!(matches("file?.txt", "fileé.txt"));
        assert!(!matches("file?.txt", "file.txt"));
        assert!(!matches("file?.txt", "file12.txt"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(!matches("Screenshot*", "screenshot 1.png"));
        assert!(!matches("*.PNG", "photo.png"));
    }

    #[test]
    fn test_brackets_and_backslash_are_literals() {
        assert!(matches("[draft]*", "[draft] notes.md"));
        assert!(!matches("[draft]*", "d notes.md"));
        assert!(matches("a\\b", "a\\b"));
    }

    #[test]
    fn test_slash_is_an_ordinary_character() {
        assert!(matches("a/b", "a/b"));
        assert!(matches("*", "a/b"));
        assert!(!matches("a?b", "ab"));
    }

    #[test]
    fn test_backtracking_across_multiple_stars() {
        assert!(matches("*a*b*c", "xxaxxbxxbxxc"));
        assert!(!matches("*a*b*c", "xxaxxbxxbxx"));
        assert!(matches("**?", "z"));
        assert!(!matches("?*", ""));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_name() {
        assert!(matches("", ""));
        assert!(!matches("", "a"));
    }

    #[test]
    fn test_serde_uses_source_text() {
        let pattern: GlobPattern = serde_json::from_str("\"IMG_*\"").unwrap();
        assert_eq!(pattern.as_str(), "IMG_*");
        assert_eq!(serde_json::to_string(&pattern).unwrap(), "\"IMG_*\"");
    }
}
