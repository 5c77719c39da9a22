//! Static report catalogue
//!
//! Loads fixed reports from TOML, for demos, fixtures and local tooling:
//!
//! ```toml
//! [[report]]
//! name = "Ancientpages"
//! cached = true
//! cached_at = "2011-10-16T22:24:58Z"
//! timestamps = true
//! rows = [
//!   { ns = 0, title = "Old_page", value = 20050101000000 },
//!   { ns = 1, title = "Old_page", value = 20060101000000, fields = { rev = 12 } },
//! ]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{QueryPageError, Result};
use crate::model::{ReportRow, SortValue};
use crate::source::{ReportRegistration, StaticReport};
use crate::timestamp;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRow {
    #[serde(default)]
    ns: i32,
    title: String,
    value: RawValue,
    #[serde(default)]
    fields: BTreeMap<String, serde_json::Value>,
}

/// One report entry in a catalogue file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogueReport {
    pub name: String,
    #[serde(default)]
    pub cached: bool,
    /// Set to `false` with `cached = true` to mark the report disabled.
    #[serde(default = "default_true")]
    pub cacheable: bool,
    #[serde(default)]
    pub cached_at: Option<String>,
    #[serde(default)]
    pub timestamps: bool,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    rows: Vec<RawRow>,
}

fn default_true() -> bool {
    true
}

/// A set of static reports.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalogue {
    #[serde(default, rename = "report")]
    pub reports: Vec<CatalogueReport>,
}

impl Catalogue {
    /// # Errors
    ///
    /// Returns `Config` on malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| QueryPageError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// Registrations in file order, ready for `Registry::build`.
    ///
    /// # Errors
    ///
    /// Returns `Config` when a timestamp cannot be parsed or `cached_at` is
    /// set on a report that is not served from a maintained cache.
    pub fn registrations(&self) -> Result<Vec<ReportRegistration>> {
        self.reports
            .iter()
            .map(|entry| -> Result<ReportRegistration> {
                Ok(entry.to_static_report()?.into_registration(entry.name.clone()))
            })
            .collect()
    }
}

impl CatalogueReport {
    fn to_static_report(&self) -> Result<StaticReport> {
        if self.cached_at.is_some() && !(self.cached && self.cacheable) {
            return Err(QueryPageError::Config {
                message: format!(
                    "report {}: cached_at requires cached = true and cacheable = true",
                    self.name
                ),
            });
        }

        let rows = self
            .rows
            .iter()
            .map(|raw| self.convert_row(raw))
            .collect::<Result<Vec<_>>>()?;

        let mut report = StaticReport::new(rows);
        if self.cached {
            report = if self.cacheable {
                let cached_at = match &self.cached_at {
                    Some(text) => Some(self.parse_timestamp(text)?),
                    None => None,
                };
                report.cached(cached_at)
            } else {
                report.disabled()
            };
        }
        if self.timestamps {
            report = report.with_timestamps();
        }
        if let Some(permission) = &self.permission {
            report = report.with_permission(permission.clone());
        }
        Ok(report)
    }

    fn convert_row(&self, raw: &RawRow) -> Result<ReportRow> {
        let sort_value = match &raw.value {
            RawValue::Int(n) => SortValue::Integer(*n),
            RawValue::Float(f) => SortValue::Float(*f),
            RawValue::Text(text) => SortValue::Timestamp(self.parse_timestamp(text)?),
        };
        let mut row = ReportRow::new(raw.ns, raw.title.clone(), sort_value);
        row.extra_fields = raw.fields.clone();
        Ok(row)
    }

    fn parse_timestamp(&self, text: &str) -> Result<chrono::DateTime<chrono::Utc>> {
        timestamp::parse(text).ok_or_else(|| QueryPageError::Config {
            message: format!("report {}: unparseable timestamp '{}'", self.name, text),
        })
    }
}
