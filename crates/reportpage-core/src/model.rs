//! Data model for report paging
//!
//! Descriptors are owned by the registry; rows, requests and results live
//! for a single page run.

use crate::errors::{QueryPageError, Result};
use crate::timestamp;
use crate::title::TitleInfo;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Row fields produced by the standard columns; never repeated in the extras bag.
pub const RESERVED_ROW_FIELDS: &[&str] = &["namespace", "title", "value", "qc_type"];

// ---------------------------------------------------------------------------
// Registry side
// ---------------------------------------------------------------------------

/// Static facts about a registered report, captured when the registry is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDescriptor {
    /// Public, case-sensitive report name.
    pub name: String,
    /// Whether the report reads from a precomputed cache.
    pub is_cached: bool,
    /// Whether the cache is currently being refreshed (only meaningful when cached).
    pub is_cacheable: bool,
    /// Capability an identity must hold to run the report.
    pub required_permission: Option<String>,
}

/// HTTP-style cacheability of a page response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Identical for every caller.
    Public,
    /// Depends on who is asking.
    Private,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::Public => "public",
            CacheMode::Private => "private",
        }
    }
}

impl ReportDescriptor {
    /// Classify responses for this report.
    ///
    /// Derived from the permission requirement only; the caller's actual
    /// rights play no part.
    pub fn cache_mode(&self) -> CacheMode {
        match self.required_permission.as_deref() {
            Some(p) if !p.is_empty() => CacheMode::Private,
            _ => CacheMode::Public,
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// The value a report sorts by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
}

impl SortValue {
    /// Read the value as a point in time, if it can be one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SortValue::Timestamp(ts) => Some(*ts),
            SortValue::Integer(n) => timestamp::from_integer(*n),
            SortValue::Float(_) => None,
        }
    }
}

impl Serialize for SortValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SortValue::Integer(n) => serializer.serialize_i64(*n),
            SortValue::Float(f) => serializer.serialize_f64(*f),
            SortValue::Timestamp(ts) => serializer.serialize_str(&timestamp::to_iso8601(ts)),
        }
    }
}

/// One row produced by a report source.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub namespace_id: i32,
    pub local_name: String,
    pub sort_value: SortValue,
    pub extra_fields: BTreeMap<String, serde_json::Value>,
}

impl ReportRow {
    pub fn new(namespace_id: i32, local_name: impl Into<String>, sort_value: SortValue) -> Self {
        Self {
            namespace_id,
            local_name: local_name.into(),
            sort_value,
            extra_fields: BTreeMap::new(),
        }
    }

    /// Attach a pass-through field.
    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_fields.insert(name.into(), value);
        self
    }
}

/// A row as handed to the output sink in direct mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedRow {
    pub value: SortValue,
    /// ISO-8601 copy of `value` for timestamp-sorted reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub title: TitleInfo,
    /// Source-specific fields, keyed by their original names.
    #[serde(rename = "databaseresult", skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

/// A validated request for one page of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    report_name: String,
    offset: u64,
    limit: u64,
}

impl PageRequest {
    /// `offset + limit` must fit in a `u64`; every continuation offset the
    /// runner computes is bounded by it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `limit` is zero or `offset + limit`
    /// overflows.
    pub fn new(report_name: impl Into<String>, offset: u64, limit: u64) -> Result<Self> {
        if limit == 0 {
            return Err(QueryPageError::InvalidParameter {
                param: "limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if offset.checked_add(limit).is_none() {
            return Err(QueryPageError::InvalidParameter {
                param: "offset".to_string(),
                reason: format!("must be no greater than {}", u64::MAX - limit),
            });
        }
        Ok(Self {
            report_name: report_name.into(),
            offset,
            limit,
        })
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Response header disclosing the report's cache state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageHeader {
    pub name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub cached: bool,
    #[serde(rename = "cachedtimestamp", skip_serializing_if = "Option::is_none")]
    pub cached_timestamp: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,
}

/// How a page run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Report is administratively disabled; nothing was fetched.
    Disabled,
    /// Rows were pushed to the output sink.
    Emitted { count: usize },
    /// Identifiers were handed to the entity resolver.
    Forwarded { count: usize },
}

/// Result of one page run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub header: PageHeader,
    pub outcome: PageOutcome,
    /// Offset to pass on the next call; `None` when the report is exhausted.
    pub continuation: Option<u64>,
}

impl PageResult {
    /// Rows emitted or identifiers forwarded.
    pub fn row_count(&self) -> usize {
        match self.outcome {
            PageOutcome::Disabled => 0,
            PageOutcome::Emitted { count } | PageOutcome::Forwarded { count } => count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(permission: Option<&str>) -> ReportDescriptor {
        ReportDescriptor {
            name: "Unwatchedpages".to_string(),
            is_cached: true,
            is_cacheable: true,
            required_permission: permission.map(str::to_string),
        }
    }

    #[test]
    fn test_cache_mode_from_permission() {
        assert_eq!(descriptor(None).cache_mode(), CacheMode::Public);
        assert_eq!(descriptor(Some("")).cache_mode(), CacheMode::Public);
        assert_eq!(
            descriptor(Some("unwatchedpages")).cache_mode(),
            CacheMode::Private
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = PageRequest::new("Ancientpages", 0, 0).unwrap_err();
        assert!(matches!(err, QueryPageError::InvalidParameter { .. }));
    }

    #[test]
    fn test_offset_near_max_rejected() {
        let err = PageRequest::new("Ancientpages", u64::MAX - 1, 5).unwrap_err();
        assert!(
            matches!(err, QueryPageError::InvalidParameter { ref param, .. } if param == "offset")
        );
        assert!(PageRequest::new("Ancientpages", u64::MAX - 5, 5).is_ok());
    }

    #[test]
    fn test_header_omits_unset_flags() {
        let header = PageHeader {
            name: "Ancientpages".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Ancientpages" }));
    }

    #[test]
    fn test_emitted_row_shape() {
        let row = EmittedRow {
            value: SortValue::Integer(20111016222458),
            timestamp: Some("2011-10-16T22:24:58Z".to_string()),
            title: TitleInfo {
                ns: 0,
                title: "Main Page".to_string(),
            },
            extra: BTreeMap::from([("page_len".to_string(), serde_json::json!(42))]),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": 20111016222458i64,
                "timestamp": "2011-10-16T22:24:58Z",
                "ns": 0,
                "title": "Main Page",
                "databaseresult": { "page_len": 42 }
            })
        );
    }

    #[test]
    fn test_sort_value_as_timestamp() {
        assert!(SortValue::Float(1.5).as_timestamp().is_none());
        assert!(SortValue::Integer(20111016222458).as_timestamp().is_some());
    }
}
