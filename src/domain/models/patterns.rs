//! Glob pattern lists for region and instance type filtering.
//!
//! Lists are written as comma or whitespace separated globs, e.g.
//! `"eu-*, us-east-1"` or `"c5.* m5.large"`. How an empty list behaves
//! depends on which side of a filter it sits on: an allow-list with no
//! patterns lets everything through, a deny-list with no patterns blocks
//! nothing.

use std::fmt;

use glob::Pattern;

use crate::domain::error::ConfigError;

/// A parsed list of glob patterns, kept together with its source text
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    raw: String,
    patterns: Vec<Pattern>,
}

impl PatternList {
    /// Parse a comma/whitespace separated list of globs for `field`
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let patterns = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                Pattern::new(token).map_err(|e| ConfigError::invalid(field, token, e.msg))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.trim().to_string(),
            patterns,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if any pattern matches; false for an empty list
    pub fn any_match(&self, value: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(value))
    }

    /// Allow-list semantics: an empty list admits everything
    pub fn allows(&self, value: &str) -> bool {
        self.is_empty() || self.any_match(value)
    }

    /// Deny-list semantics: an empty list denies nothing
    pub fn denies(&self, value: &str) -> bool {
        self.any_match(value)
    }

    /// The original text the list was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PatternList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_commas_and_whitespace() {
        let list = PatternList::parse("regions", "eu-*, us-east-1\tap-south-1").unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.allows("eu-west-1"));
        assert!(list.allows("us-east-1"));
        assert!(list.allows("ap-south-1"));
        assert!(!list.allows("us-west-2"));
    }

    #[test]
    fn test_empty_list_asymmetry() {
        let list = PatternList::parse("allowed_instance_types", "").unwrap();
        assert!(list.is_empty());
        assert!(list.allows("m5.large"));
        assert!(!list.denies("m5.large"));
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let list = PatternList::parse("regions", "  , ,  ").unwrap();
        assert!(list.is_empty());
        assert!(list.allows("eu-west-1"));
    }

    #[test]
    fn test_question_mark_glob() {
        let list = PatternList::parse("disallowed_instance_types", "t?.micro").unwrap();
        assert!(list.denies("t2.micro"));
        assert!(list.denies("t3.micro"));
        assert!(!list.denies("t3a.micro"));
    }

    #[test]
    fn test_invalid_glob_names_field() {
        let err = PatternList::parse("regions", "eu-[").unwrap_err();
        assert_eq!(err.field(), "regions");
    }
}
