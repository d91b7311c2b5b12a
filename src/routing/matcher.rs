//! Route matching logic.
//!
//! # Responsibilities
//! - Match the raw request URL against a prefix string
//! - Match the raw request URL against a regular expression
//!
//! # Design Decisions
//! - Matching runs on the raw URL, query string included
//! - Prefix matching is case-sensitive
//! - Patterns are unanchored: a match anywhere in the URL counts

use regex::Regex;

/// Trait for matching request URLs.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the URL matches this condition.
    fn matches(&self, url: &str) -> bool;
}

/// Matches the URL prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, url: &str) -> bool {
        url.starts_with(&self.prefix)
    }
}

/// Matches the URL against a regular expression.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Regex,
}

impl PatternMatcher {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Matcher for PatternMatcher {
    fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

/// Conversion into a boxed matcher, so routes can be registered with
/// either a string prefix or a [`Regex`].
pub trait IntoMatcher {
    fn into_matcher(self) -> Box<dyn Matcher>;
}

impl IntoMatcher for &str {
    fn into_matcher(self) -> Box<dyn Matcher> {
        Box::new(PathPrefixMatcher::new(self))
    }
}

impl IntoMatcher for String {
    fn into_matcher(self) -> Box<dyn Matcher> {
        Box::new(PathPrefixMatcher::new(self))
    }
}

impl IntoMatcher for Regex {
    fn into_matcher(self) -> Box<dyn Matcher> {
        Box::new(PatternMatcher::new(self))
    }
}

impl IntoMatcher for Box<dyn Matcher> {
    fn into_matcher(self) -> Box<dyn Matcher> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matcher() {
        let matcher = PathPrefixMatcher::new("/api");
        assert!(matcher.matches("/api"));
        assert!(matcher.matches("/api/v1?x=1"));
        assert!(matcher.matches("/apiary"));
        assert!(!matcher.matches("/images"));
        assert!(!matcher.matches("/API"));
    }

    #[test]
    fn test_root_prefix_matches_everything() {
        let matcher = "/".into_matcher();
        assert!(matcher.matches("/"));
        assert!(matcher.matches("/anything/else"));
    }

    #[test]
    fn test_pattern_matcher() {
        let matcher = Regex::new(r"^/users/[0-9]+$").unwrap().into_matcher();
        assert!(matcher.matches("/users/42"));
        assert!(!matcher.matches("/users/bob"));
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let matcher = PatternMatcher::new(Regex::new("etag").unwrap());
        assert!(matcher.matches("/etagged"));
        assert!(matcher.matches("/x?mode=etag"));
    }
}
