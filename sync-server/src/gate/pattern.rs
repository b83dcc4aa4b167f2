//! Path patterns in the `/events/:id` style.
//!
//! Supported syntax:
//! - literal text, matched exactly
//! - `:name`, one non-empty path segment
//! - `(.*)` or `*`, any remainder (including nothing)
//!
//! A trailing slash on the request path is always accepted.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("route pattern must start with '/': {0}")]
    NotAbsolute(String),

    #[error("route pattern has a parameter without a name: {0}")]
    UnnamedParam(String),

    #[error("route pattern has an unsupported group: {0}")]
    UnsupportedGroup(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    regex: Regex,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_string()));
        }

        let body = pattern.trim_end_matches('/');
        let mut re = String::from("^");
        let mut literal = String::new();
        let mut chars = body.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                ':' => {
                    let mut name = String::new();
                    while let Some(&n) = chars.peek() {
                        if n.is_ascii_alphanumeric() || n == '_' {
                            name.push(n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if name.is_empty() {
                        return Err(PatternError::UnnamedParam(pattern.to_string()));
                    }
                    re.push_str(&regex::escape(&literal));
                    literal.clear();
                    re.push_str("([^/]+?)");
                }
                '*' => {
                    re.push_str(&regex::escape(&literal));
                    literal.clear();
                    re.push_str("(.*)");
                }
                '(' => {
                    let group: String = chars.by_ref().take(3).collect();
                    if group != ".*)" {
                        return Err(PatternError::UnsupportedGroup(pattern.to_string()));
                    }
                    re.push_str(&regex::escape(&literal));
                    literal.clear();
                    re.push_str("(.*)");
                }
                other => literal.push(other),
            }
        }

        re.push_str(&regex::escape(&literal));
        re.push_str("/?$");

        // Everything user-supplied went through regex::escape
        let regex = Regex::new(&re).map_err(|_| PatternError::UnsupportedGroup(pattern.to_string()))?;

        Ok(Self { regex })
    }

    /// Whether `path` (with or without a query string) matches.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        self.regex.is_match(path)
    }
}

/// Compile a list of patterns, failing on the first bad one.
pub fn parse_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<RoutePattern>, PatternError> {
    patterns.iter().map(|p| RoutePattern::parse(p.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> RoutePattern {
        RoutePattern::parse(p).unwrap()
    }

    #[test]
    fn test_root() {
        let root = pattern("/");
        assert!(root.matches("/"));
        assert!(!root.matches("/events"));
    }

    #[test]
    fn test_literal() {
        let p = pattern("/api/webhooks/clerk");
        assert!(p.matches("/api/webhooks/clerk"));
        assert!(p.matches("/api/webhooks/clerk/"));
        assert!(p.matches("/api/webhooks/clerk?x=1"));
        assert!(!p.matches("/api/webhooks/clerk/extra"));
        assert!(!p.matches("/api/webhooks"));
    }

    #[test]
    fn test_param() {
        let p = pattern("/events/:id");
        assert!(p.matches("/events/123"));
        assert!(p.matches("/events/abc-def/"));
        assert!(!p.matches("/events/"));
        assert!(!p.matches("/events"));
        assert!(!p.matches("/events/1/edit"));
    }

    #[test]
    fn test_wildcards() {
        let group = pattern("/api/uploadthing(.*)");
        assert!(group.matches("/api/uploadthing"));
        assert!(group.matches("/api/uploadthing/callback"));

        let star = pattern("/docs/*");
        assert!(star.matches("/docs/a/b/c"));
        assert!(!star.matches("/other"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = pattern("/a.b");
        assert!(p.matches("/a.b"));
        assert!(!p.matches("/axb"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(
            RoutePattern::parse("events").unwrap_err(),
            PatternError::NotAbsolute("events".to_string())
        );
        assert!(matches!(
            RoutePattern::parse("/events/:").unwrap_err(),
            PatternError::UnnamedParam(_)
        ));
        assert!(matches!(
            RoutePattern::parse("/events/(\\d+)").unwrap_err(),
            PatternError::UnsupportedGroup(_)
        ));
    }
}
