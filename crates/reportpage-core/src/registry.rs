//! Report registry
//!
//! Name-indexed, read-only view over the available reports. Built once from
//! injected registrations; superseded names are filtered out at build time.

use crate::errors::{QueryPageError, Result};
use crate::model::{CacheMode, ReportDescriptor};
use crate::source::{ReportRegistration, ReportSource, SourceFactory};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Reports that duplicate a more specific listing elsewhere and are never
/// exposed through the paged interface.
pub const SUPERSEDED_REPORTS: &[&str] = &["MIMEsearch", "LinkSearch", "FileDuplicateSearch"];

/// A registered report: its descriptor plus the factory that builds it.
#[derive(Clone)]
pub struct RegisteredReport {
    descriptor: ReportDescriptor,
    factory: SourceFactory,
}

impl RegisteredReport {
    pub fn descriptor(&self) -> &ReportDescriptor {
        &self.descriptor
    }

    /// Build a fresh source for one run.
    pub fn instantiate(&self) -> Box<dyn ReportSource> {
        (self.factory)()
    }
}

impl std::fmt::Debug for RegisteredReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredReport")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Immutable mapping from public report name to report.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    reports: BTreeMap<String, RegisteredReport>,
}

impl Registry {
    /// Build the registry from `registrations`, skipping any name in `excluded`.
    ///
    /// Registrations are applied in order, so a later registration for a
    /// name replaces an earlier one. Each factory is invoked once to capture
    /// the report's descriptor.
    pub fn build<I, E>(registrations: I, excluded: E) -> Self
    where
        I: IntoIterator<Item = ReportRegistration>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let excluded: BTreeSet<String> = excluded
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let mut reports = BTreeMap::new();

        for registration in registrations {
            if excluded.contains(&registration.name) {
                debug!(report = %registration.name, "skipping superseded report");
                continue;
            }
            let probe = (registration.factory)();
            let descriptor = ReportDescriptor {
                name: registration.name.clone(),
                is_cached: probe.is_cached(),
                is_cacheable: probe.is_cacheable(),
                required_permission: probe.required_permission().map(str::to_string),
            };
            reports.insert(
                registration.name,
                RegisteredReport {
                    descriptor,
                    factory: registration.factory,
                },
            );
        }

        Self { reports }
    }

    /// Build with the default superseded set excluded.
    pub fn with_default_exclusions<I>(registrations: I) -> Self
    where
        I: IntoIterator<Item = ReportRegistration>,
    {
        Self::build(registrations, SUPERSEDED_REPORTS)
    }

    /// Sorted list of valid report names.
    pub fn list_names(&self) -> Vec<&str> {
        self.reports.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.reports.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Look up a report by its exact, case-sensitive name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReport` if no report has that name.
    pub fn resolve(&self, name: &str) -> Result<&RegisteredReport> {
        self.reports
            .get(name)
            .ok_or_else(|| QueryPageError::UnknownReport {
                name: name.to_string(),
            })
    }

    /// Descriptor for a report.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReport` if no report has that name.
    pub fn descriptor(&self, name: &str) -> Result<&ReportDescriptor> {
        self.resolve(name).map(RegisteredReport::descriptor)
    }

    /// Cacheability of responses for `name`, from its descriptor alone.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReport` if no report has that name.
    pub fn cache_mode(&self, name: &str) -> Result<CacheMode> {
        self.descriptor(name).map(ReportDescriptor::cache_mode)
    }
}
