//! Runtime configuration
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! excluded_reports = ["MIMEsearch", "LinkSearch", "FileDuplicateSearch"]
//! max_result_bytes = 8388608
//! high_limits_capability = "apihighlimits"
//!
//! [limits]
//! default = 10
//! min = 1
//! max = 500
//! max_high = 5000
//!
//! [namespaces]
//! 4 = "Wikipedia"
//!
//! [permissions]
//! sysop = ["unwatchedpages", "apihighlimits"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::auth::GroupPermissions;
use crate::errors::{QueryPageError, Result};
use crate::registry::SUPERSEDED_REPORTS;
use crate::title::Namespaces;

/// Page-size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitConfig {
    pub default: u64,
    pub min: u64,
    /// Ceiling for ordinary identities.
    pub max: u64,
    /// Ceiling for identities holding the high-limits capability.
    pub max_high: u64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            default: 10,
            min: 1,
            max: 500,
            max_high: 5000,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportPageConfig {
    pub limits: LimitConfig,
    /// Report names never exposed, even when registered.
    pub excluded_reports: Vec<String>,
    /// Serialized-size budget for buffered responses.
    pub max_result_bytes: Option<usize>,
    /// Capability that lifts the page-size ceiling to `limits.max_high`.
    pub high_limits_capability: String,
    /// Namespace prefix overrides, keyed by namespace id.
    pub namespaces: BTreeMap<String, String>,
    /// Group → capabilities table.
    pub permissions: GroupPermissions,
}

impl Default for ReportPageConfig {
    fn default() -> Self {
        Self {
            limits: LimitConfig::default(),
            excluded_reports: SUPERSEDED_REPORTS.iter().map(|s| s.to_string()).collect(),
            max_result_bytes: None,
            high_limits_capability: "apihighlimits".to_string(),
            namespaces: BTreeMap::new(),
            permissions: GroupPermissions::default(),
        }
    }
}

impl ReportPageConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Config` on malformed TOML or inconsistent limits.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| QueryPageError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that `1 <= min <= default <= max <= max_high`.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first violated bound.
    pub fn validate(&self) -> Result<()> {
        let l = &self.limits;
        let problem = if l.min == 0 {
            Some("limits.min must be at least 1")
        } else if l.default < l.min || l.default > l.max {
            Some("limits.default must lie within [min, max]")
        } else if l.max > l.max_high {
            Some("limits.max must not exceed limits.max_high")
        } else {
            None
        };
        if let Some(message) = problem {
            return Err(QueryPageError::Config {
                message: message.to_string(),
            });
        }
        if let Some(key) = self.namespaces.keys().find(|k| k.parse::<i32>().is_err()) {
            return Err(QueryPageError::Config {
                message: format!("namespace key '{}' is not an integer id", key),
            });
        }
        Ok(())
    }

    /// Namespace table with the configured overrides applied.
    pub fn namespaces(&self) -> Namespaces {
        let overrides: BTreeMap<i32, String> = self
            .namespaces
            .iter()
            .filter_map(|(id, prefix)| id.parse::<i32>().ok().map(|id| (id, prefix.clone())))
            .collect();
        Namespaces::with_overrides(&overrides)
    }
}
