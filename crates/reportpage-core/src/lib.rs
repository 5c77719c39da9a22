//! reportpage core - paged access to named reports
//!
//! This crate provides:
//! - A registry mapping public report names to report source factories
//! - A pagination runner with over-fetch continuation, cache-state
//!   disclosure and a per-report permission gate
//! - Direct row emission to an output sink, or identifier forwarding to an
//!   entity resolver
//! - Parameter validation, configuration and a static report catalogue
//! - The structured error and logging facilities used throughout

pub mod auth;
pub mod catalogue;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod params;
pub mod registry;
pub mod response;
pub mod runner;
pub mod sink;
pub mod source;
pub mod timestamp;
pub mod title;

#[doc(hidden)]
pub use reportpage_core_types;
#[doc(hidden)]
pub use tracing as __tracing;

// Re-export commonly used types
pub use auth::{AllowAll, Authorizer, GroupPermissions, Identity};
pub use config::{LimitConfig, ReportPageConfig};
pub use errors::{ExError, ExErrorKind, QueryPageError, Result};
pub use model::{
    CacheMode, EmittedRow, PageHeader, PageOutcome, PageRequest, PageResult, ReportDescriptor,
    ReportRow, SortValue,
};
pub use params::{LimitParam, PageParams, ParamValidator, ValidatedRequest};
pub use registry::{Registry, SUPERSEDED_REPORTS};
pub use response::PageResponse;
pub use runner::{EmitMode, PageRunner};
pub use sink::{EntityRef, EntityResolver, Fit, OutputSink, PageBuffer};
pub use source::{ReportRegistration, ReportSource, SourceError, StaticReport};
