//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the routing core.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Server settings consumed by the transport layer.
    pub server: ServerConfig,

    /// Rewrite rules, applied in order.
    pub rewrites: Vec<RewriteConfig>,

    /// Directories served as static content.
    pub static_mounts: Vec<StaticMountConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,

    /// Receive timeout for client connections in seconds.
    pub rx_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            rx_timeout_secs: 3,
        }
    }
}

/// A rewrite from an exact path to a target URL.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RewriteConfig {
    /// Path to match.
    pub from: String,

    /// Target URL, optionally with a query string (`/page?lang=en`).
    pub to: String,
}

/// A static content mount.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StaticMountConfig {
    /// Uri prefix to serve under.
    pub uri: String,

    /// Directory on disk.
    pub path: String,

    /// Value of the `Cache-Control` header.
    #[serde(default)]
    pub cache_control: Option<String>,

    /// File served for directory urls.
    #[serde(default = "default_file")]
    pub default_file: String,
}

fn default_file() -> String {
    "index.htm".to_string()
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit dispatch metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
