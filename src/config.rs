//! Editing limits for a CP-net.
//!
//! ```toml
//! degeneracy_cost_cap = 4096
//!
//! [link]
//! allow_cycles = false
//! max_in_degree = 5
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on the number of CPT leaves the degeneracy analyzer scans.
pub const DEFAULT_DEGENERACY_COST_CAP: u64 = 4096;

/// Constraints applied when linking two variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPolicy {
    /// Permit links that close a directed cycle.
    pub allow_cycles: bool,
    /// Maximum number of parents per variable; `None` is unbounded.
    pub max_in_degree: Option<usize>,
}

impl LinkPolicy {
    /// Cycles refused, in-degree unbounded.
    pub const fn acyclic() -> Self {
        Self {
            allow_cycles: false,
            max_in_degree: None,
        }
    }

    /// Cycles refused, at most `max_in_degree` parents.
    pub const fn bounded(max_in_degree: usize) -> Self {
        Self {
            allow_cycles: false,
            max_in_degree: Some(max_in_degree),
        }
    }

    /// Anything goes. Used when loading documents.
    pub const fn permissive() -> Self {
        Self {
            allow_cycles: true,
            max_in_degree: None,
        }
    }
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::acyclic()
    }
}

/// Per-net configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    pub link: LinkPolicy,
    /// Largest CPT (in leaves) the degeneracy analyzer will scan; `None` is unbounded.
    pub degeneracy_cost_cap: Option<u64>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            link: LinkPolicy::default(),
            degeneracy_cost_cap: Some(DEFAULT_DEGENERACY_COST_CAP),
        }
    }
}

impl NetConfig {
    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(NetConfig::from_toml_str("").unwrap(), NetConfig::default());
    }

    #[test]
    fn parses_link_table() {
        let config = NetConfig::from_toml_str(
            "degeneracy_cost_cap = 16\n[link]\nallow_cycles = true\nmax_in_degree = 3\n",
        )
        .unwrap();
        assert_eq!(config.degeneracy_cost_cap, Some(16));
        assert_eq!(
            config.link,
            LinkPolicy {
                allow_cycles: true,
                max_in_degree: Some(3)
            }
        );
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(matches!(
            NetConfig::from_toml_str("[link]\nallow_cycles = 3\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            NetConfig::load(Path::new("/nonexistent/cpnet.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
