//! URL rewrite rules and their registry.
//!
//! # Responsibilities
//! - Describe a rewrite: source pattern, target URL, parameters from the
//!   target's query string, matcher and optional filter
//! - Keep rules in registration order
//! - Apply every matching rule to a request, in order
//!
//! # Design Decisions
//! - Last match wins: the scan never stops early, each match overwrites the
//!   URL and merges its parameters, so later rules override earlier ones
//! - Rules are applied in place, so a later rule sees the URL an earlier rule
//!   produced (rewrite chains)
//! - The registry lock is re-entrant and held for the whole scan; the list is
//!   read one rule at a time so matchers may add or remove rules

use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::collections::SyncList;
use crate::handlers::RequestFilter;
use crate::http::Request;
use crate::observability::metrics;
use crate::routing::matcher::{ExactPathMatcher, Matcher};

/// A single rewrite rule.
pub struct RewriteRule {
    from: String,
    to_url: String,
    params: Vec<(String, String)>,
    matcher: Box<dyn Matcher>,
    filter: Option<RequestFilter>,
}

impl RewriteRule {
    /// Rewrite requests for exactly `from` to `to`. A query string in `to`
    /// becomes parameters merged into the request.
    pub fn new(from: impl Into<String>, to: &str) -> Self {
        let from = from.into();
        let (to_url, query) = split_target(to);
        let params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            matcher: Box::new(ExactPathMatcher::new(from.clone())),
            from,
            to_url: to_url.to_string(),
            params,
            filter: None,
        }
    }

    /// Replace the default exact-path matcher.
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_filter(mut self, filter: RequestFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    /// Target URL without its query string.
    pub fn to_url(&self) -> &str {
        &self.to_url
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Returns true if the rule applies to the request in its current state.
    pub fn matches(&self, req: &Request) -> bool {
        self.matcher.matches(req) && self.filter.as_ref().map_or(true, |f| f(req))
    }
}

impl fmt::Debug for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteRule")
            .field("from", &self.from)
            .field("to_url", &self.to_url)
            .field("params", &self.params)
            .field("matcher", &self.matcher)
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

fn split_target(to: &str) -> (&str, &str) {
    to.split_once('?').unwrap_or((to, ""))
}

/// Ordered rewrite rules behind a re-entrant lock.
#[derive(Debug, Default)]
pub struct RewriteRegistry {
    lock: ReentrantMutex<()>,
    rules: SyncList<Arc<RewriteRule>>,
}

impl RewriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the registry lock. Re-entrant for the calling thread.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Append a rule. The returned handle can later remove it.
    pub fn add(&self, rule: RewriteRule) -> Arc<RewriteRule> {
        let _guard = self.lock();
        let rule = Arc::new(rule);
        self.rules.push_back(rule.clone());
        tracing::debug!(from = %rule.from, to = %rule.to_url, "Rewrite added");
        rule
    }

    /// Remove the first rule with this source and target. Any query string in
    /// `to` is ignored.
    pub fn remove(&self, from: &str, to: &str) -> bool {
        let _guard = self.lock();
        let (to_url, _) = split_target(to);
        let removed = self
            .rules
            .remove_first_if(|r| r.from == from && r.to_url == to_url);
        tracing::debug!(from = %from, to = %to_url, removed, "Rewrite remove");
        removed
    }

    /// Remove the rule behind a handle returned by [`RewriteRegistry::add`].
    pub fn remove_rule(&self, rule: &Arc<RewriteRule>) -> bool {
        let _guard = self.lock();
        self.rules.remove_first_if(|r| Arc::ptr_eq(r, rule))
    }

    /// Apply every matching rule to `req`. Returns the number applied.
    pub fn resolve(&self, req: &mut Request) -> usize {
        let _guard = self.lock();
        let mut applied = 0;
        let mut index = 0;
        while let Some(rule) = self.rules.get(index) {
            index += 1;
            if !rule.matches(req) {
                continue;
            }
            tracing::trace!(
                request_id = %req.id(),
                from = %rule.from,
                to = %rule.to_url,
                "Rewrite applied"
            );
            req.set_url(rule.to_url.as_str());
            req.merge_params(&rule.params);
            applied += 1;
        }
        if applied > 0 {
            metrics::record_rewrites(applied);
        }
        applied
    }

    pub fn clear(&self) {
        let _guard = self.lock();
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Copy of the current rules, in order.
    pub fn rules(&self) -> Vec<Arc<RewriteRule>> {
        self.rules.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::PathPrefixMatcher;
    use http::Method;

    fn get(url: &str) -> Request {
        Request::builder(Method::GET, url).build().unwrap()
    }

    #[test]
    fn test_rule_splits_query() {
        let rule = RewriteRule::new("/", "/index.htm?lang=en&theme=dark%20blue");
        assert_eq!(rule.to_url(), "/index.htm");
        assert_eq!(
            rule.params(),
            &[
                ("lang".to_string(), "en".to_string()),
                ("theme".to_string(), "dark blue".to_string())
            ]
        );
    }

    #[test]
    fn test_last_match_wins_and_params_merge() {
        let registry = RewriteRegistry::new();
        registry.add(
            RewriteRule::new("", "/a?p=1&q=1").with_matcher(PathPrefixMatcher::new("/dev")),
        );
        registry.add(RewriteRule::new("", "/b?p=2").with_matcher(PathPrefixMatcher::new("/")));

        let mut req = get("/device");
        assert_eq!(registry.resolve(&mut req), 2);
        assert_eq!(req.url(), "/b");
        assert_eq!(req.param("p"), Some("2"));
        assert_eq!(req.param("q"), Some("1"));
    }

    #[test]
    fn test_chained_rules_see_previous_rewrite() {
        let registry = RewriteRegistry::new();
        registry.add(RewriteRule::new("/old", "/new"));
        registry.add(RewriteRule::new("/new", "/newest"));

        let mut req = get("/old");
        registry.resolve(&mut req);
        assert_eq!(req.url(), "/newest");
    }

    #[test]
    fn test_no_match_leaves_request_alone() {
        let registry = RewriteRegistry::new();
        registry.add(RewriteRule::new("/x", "/y?z=1"));

        let mut req = get("/other?k=v");
        assert_eq!(registry.resolve(&mut req), 0);
        assert_eq!(req.url(), "/other");
        assert_eq!(req.params().len(), 1);
    }

    #[test]
    fn test_filter_blocks_rule() {
        let registry = RewriteRegistry::new();
        registry.add(
            RewriteRule::new("/", "/admin.htm")
                .with_filter(Arc::new(|r: &Request| r.has_param("admin"))),
        );

        let mut plain = get("/");
        registry.resolve(&mut plain);
        assert_eq!(plain.url(), "/");

        let mut admin = get("/?admin=1");
        registry.resolve(&mut admin);
        assert_eq!(admin.url(), "/admin.htm");
    }

    #[test]
    fn test_remove_by_pair_and_handle() {
        let registry = RewriteRegistry::new();
        let first = registry.add(RewriteRule::new("/a", "/b?x=1"));
        registry.add(RewriteRule::new("/c", "/d"));

        assert!(registry.remove("/c", "/d"));
        assert!(!registry.remove("/c", "/d"));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("/a", "/b?ignored=1"));
        assert!(!registry.remove_rule(&first));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_matcher_may_mutate_registry() {
        #[derive(Debug)]
        struct SelfRemoving(Arc<RewriteRegistry>);

        impl Matcher for SelfRemoving {
            fn matches(&self, _req: &Request) -> bool {
                self.0.remove("/gone", "/x");
                self.0.add(RewriteRule::new("/late", "/y"));
                true
            }
        }

        let registry = Arc::new(RewriteRegistry::new());
        registry.add(RewriteRule::new("/gone", "/x"));
        registry.add(RewriteRule::new("", "/z").with_matcher(SelfRemoving(registry.clone())));

        let mut req = get("/gone");
        registry.resolve(&mut req);
        assert!(registry.rules().iter().all(|r| r.from() != "/gone"));
        assert_eq!(registry.len(), 2);
        assert_eq!(req.url(), "/z");
    }
}
