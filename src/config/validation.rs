//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and path shapes
//! - Detect duplicate rewrites
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RouterConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("rewrite #{index}: `{field}` must start with '/' (got {value:?})")]
    RewritePath {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("rewrite #{index}: duplicate of {from:?} -> {to:?}")]
    DuplicateRewrite {
        index: usize,
        from: String,
        to: String,
    },

    #[error("static mount #{index}: uri must start with '/' (got {uri:?})")]
    MountUri { index: usize, uri: String },

    #[error("static mount #{index}: path must not be empty")]
    MountPath { index: usize },

    #[error("static mount #{index}: default_file must be a plain file name (got {file:?})")]
    MountDefaultFile { index: usize, file: String },
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let mut seen = HashSet::new();
    for (index, rewrite) in config.rewrites.iter().enumerate() {
        for (field, value) in [("from", &rewrite.from), ("to", &rewrite.to)] {
            if !value.starts_with('/') {
                errors.push(ValidationError::RewritePath {
                    index,
                    field,
                    value: value.clone(),
                });
            }
        }
        if !seen.insert((rewrite.from.as_str(), rewrite.to.as_str())) {
            errors.push(ValidationError::DuplicateRewrite {
                index,
                from: rewrite.from.clone(),
                to: rewrite.to.clone(),
            });
        }
    }

    for (index, mount) in config.static_mounts.iter().enumerate() {
        if !mount.uri.starts_with('/') {
            errors.push(ValidationError::MountUri {
                index,
                uri: mount.uri.clone(),
            });
        }
        if mount.path.trim().is_empty() {
            errors.push(ValidationError::MountPath { index });
        }
        if mount.default_file.contains('/') {
            errors.push(ValidationError::MountDefaultFile {
                index,
                file: mount.default_file.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RewriteConfig, StaticMountConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RouterConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.server.port = 0;
        config.rewrites = vec![
            RewriteConfig { from: "/a".into(), to: "/b".into() },
            RewriteConfig { from: "a".into(), to: "/b".into() },
            RewriteConfig { from: "/a".into(), to: "/b".into() },
        ];
        config.static_mounts = vec![StaticMountConfig {
            uri: "www".into(),
            path: " ".into(),
            cache_control: None,
            default_file: "sub/index.htm".into(),
        }];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::ZeroPort));
        assert!(errors.contains(&ValidationError::DuplicateRewrite {
            index: 2,
            from: "/a".into(),
            to: "/b".into(),
        }));
        assert!(errors.contains(&ValidationError::MountPath { index: 0 }));
    }
}
