//! Request matching predicates.
//!
//! # Responsibilities
//! - Match the current request URL (exact or prefix, case-sensitive)
//! - Match the request method
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Matchers are pure: they read the request, never modify it
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use std::fmt;

use crate::http::{MethodSet, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request) -> bool;
}

/// Matches the request URL exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, req: &Request) -> bool {
        req.url() == self.path
    }
}

/// Matches the request URL prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request) -> bool {
        req.url().starts_with(&self.prefix)
    }
}

/// Matches the request method against a set.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: MethodSet,
}

impl MethodMatcher {
    pub fn new(methods: MethodSet) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request) -> bool {
        self.methods.contains(req.method())
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn get(url: &str) -> Request {
        Request::builder(Method::GET, url).build().unwrap()
    }

    #[test]
    fn test_exact_matcher() {
        let matcher = ExactPathMatcher::new("/index.html");
        assert!(matcher.matches(&get("/index.html?x=1")));
        assert!(!matcher.matches(&get("/INDEX.html")));
        assert!(!matcher.matches(&get("/index.html/more")));
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api");
        assert!(matcher.matches(&get("/api/v1")));
        assert!(!matcher.matches(&get("/images")));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(PathPrefixMatcher::new("/api")),
            Box::new(MethodMatcher::new(MethodSet::POST)),
        ]);
        assert!(!matcher.matches(&get("/api/v1")));

        let post = Request::builder(Method::POST, "/api/v1").build().unwrap();
        assert!(matcher.matches(&post));
    }
}
