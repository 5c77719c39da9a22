//! Report sources
//!
//! Every report is an opaque data provider behind [`ReportSource`]. The
//! registry keeps a factory per report name and only instantiates a source
//! when a page is requested.

use crate::model::ReportRow;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a source while fetching rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SourceError {
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A named report that yields rows in a stable order.
pub trait ReportSource: Send {
    /// Whether rows come from a precomputed cache rather than a live query.
    fn is_cached(&self) -> bool {
        false
    }

    /// Whether the cache is being maintained. A cached report that is not
    /// cacheable is disabled.
    fn is_cacheable(&self) -> bool {
        true
    }

    /// When the cache was last refreshed.
    fn cached_timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Whether the sort value is a timestamp.
    fn uses_timestamps(&self) -> bool {
        false
    }

    /// Capability required to run the report.
    fn required_permission(&self) -> Option<&str> {
        None
    }

    /// Fetch up to `count` rows starting at `offset`. Fewer rows mean the
    /// report is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` if the underlying query fails.
    fn fetch(&self, offset: u64, count: u64) -> Result<Vec<ReportRow>, SourceError>;
}

/// Builds a fresh source instance for one page run.
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn ReportSource> + Send + Sync>;

/// A `(factory, public name)` pair fed to the registry.
#[derive(Clone)]
pub struct ReportRegistration {
    pub name: String,
    pub factory: SourceFactory,
}

impl ReportRegistration {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ReportSource> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }
}

impl fmt::Debug for ReportRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportRegistration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A report over a fixed, in-memory row set.
#[derive(Debug, Clone, Default)]
pub struct StaticReport {
    rows: Vec<ReportRow>,
    cached: bool,
    cacheable: bool,
    cached_at: Option<DateTime<Utc>>,
    uses_timestamps: bool,
    permission: Option<String>,
}

impl StaticReport {
    /// Live (uncached) report over `rows`.
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self {
            rows,
            cacheable: true,
            ..Default::default()
        }
    }

    /// Mark as served from a cache refreshed at `cached_at`.
    pub fn cached(mut self, cached_at: Option<DateTime<Utc>>) -> Self {
        self.cached = true;
        self.cached_at = cached_at;
        self
    }

    /// Mark as cached but no longer refreshed.
    pub fn disabled(mut self) -> Self {
        self.cached = true;
        self.cacheable = false;
        self
    }

    pub fn with_timestamps(mut self) -> Self {
        self.uses_timestamps = true;
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Registration that clones this report for every run.
    pub fn into_registration(self, name: impl Into<String>) -> ReportRegistration {
        ReportRegistration::new(name, move || Box::new(self.clone()) as Box<dyn ReportSource>)
    }
}

impl ReportSource for StaticReport {
    fn is_cached(&self) -> bool {
        self.cached
    }

    fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    fn cached_timestamp(&self) -> Option<DateTime<Utc>> {
        self.cached_at
    }

    fn uses_timestamps(&self) -> bool {
        self.uses_timestamps
    }

    fn required_permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    fn fetch(&self, offset: u64, count: u64) -> Result<Vec<ReportRow>, SourceError> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(count).unwrap_or(usize::MAX);
        Ok(self.rows.iter().skip(start).take(take).cloned().collect())
    }
}
