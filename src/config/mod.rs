//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → Dispatcher::apply_config / Dispatcher::reload
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → spawn_reloader task calls Dispatcher::reload
//!     → in-flight dispatches see old or new registries, never a mix
//!       within one registry access
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - An invalid reload keeps the current routes

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ObservabilityConfig, RewriteConfig, RouterConfig, ServerConfig, StaticMountConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::{spawn_reloader, ConfigWatcher};
