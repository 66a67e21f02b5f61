//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, url, params, addresses)
//!     → rewrite.rs (apply every matching rule, last match wins)
//!     → handler_registry.rs (first handler with filter ∧ can_handle)
//!     → catch-all when nothing matched
//!     → handler bound to the request
//!
//! Configuration (any time, any thread):
//!     add/remove rewrite → RewriteRegistry (rewrite lock)
//!     add/remove handler → HandlerRegistry (handler lock)
//!     reset/reload       → both locks, rewrite first
//!     dispatch           → rewrite lock held through handler selection
//! ```
//!
//! # Design Decisions
//! - Registries are mutable at runtime, guarded by re-entrant locks so
//!   user callbacks running inside dispatch may reconfigure routes
//! - No regex in hot path (exact/prefix/extension matching only)
//! - O(n) scans; registries hold tens of entries

pub mod dispatcher;
pub mod handler_registry;
pub mod matcher;
pub mod rewrite;

pub use dispatcher::{DispatchError, Dispatcher};
pub use handler_registry::HandlerRegistry;
pub use matcher::{AndMatcher, ExactPathMatcher, Matcher, MethodMatcher, PathPrefixMatcher};
pub use rewrite::{RewriteRegistry, RewriteRule};
