//! Pagination runner
//!
//! Executes one page of a report:
//!
//! 1. resolve the report name and build its source
//! 2. check the acting identity against the source's required permission
//! 3. disclose cache state in the header; a disabled report stops here
//! 4. fetch `limit + 1` rows so a full page can tell whether more exist
//! 5. emit rows to the sink, or forward identifiers to the resolver
//!
//! Continuation offsets:
//! - page full: `offset + limit`
//! - sink refused the `n`th row of the page: `offset + n - 1`, i.e. the
//!   refused row is the first row of the next page

use std::time::Instant;

use reportpage_core_types::RequestContext;
use tracing::{info_span, Span};

use crate::auth::{Authorizer, Identity};
use crate::errors::{QueryPageError, Result};
use crate::model::{
    EmittedRow, PageHeader, PageOutcome, PageRequest, PageResult, ReportRow, RESERVED_ROW_FIELDS,
};
use crate::registry::Registry;
use crate::response::PageResponse;
use crate::sink::{EntityRef, EntityResolver, Fit, OutputSink, PageBuffer};
use crate::source::ReportSource;
use crate::timestamp::to_iso8601;
use crate::title::Namespaces;
use crate::{log_op_end, log_op_error, log_op_start};

/// Operation name used in run log events.
pub const RUN_OP: &str = "report_page_run";

/// Where the rows of a page go.
pub enum EmitMode<'a> {
    /// Serialize each row and push it to the sink.
    Direct(&'a mut dyn OutputSink),
    /// Collect `(namespace_id, local_name)` pairs and hand them to the
    /// resolver in one batch.
    Identifiers(&'a mut dyn EntityResolver),
}

/// Runs pages against a registry.
///
/// Holds only shared references and read-only tables; one runner can serve
/// any number of independent requests.
pub struct PageRunner<'a> {
    registry: &'a Registry,
    authorizer: &'a dyn Authorizer,
    namespaces: Namespaces,
}

impl<'a> PageRunner<'a> {
    pub fn new(registry: &'a Registry, authorizer: &'a dyn Authorizer) -> Self {
        Self {
            registry,
            authorizer,
            namespaces: Namespaces::default(),
        }
    }

    pub fn with_namespaces(mut self, namespaces: Namespaces) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Run one page of `request` on behalf of `identity`.
    ///
    /// # Errors
    ///
    /// - `UnknownReport` if the report is not registered
    /// - `PermissionDenied` if `identity` lacks the report's capability;
    ///   nothing is fetched or emitted
    /// - `SourceFault` if the fetch fails
    /// - `ResolverFault` if the entity resolver rejects the batch
    pub fn run(
        &self,
        request: &PageRequest,
        identity: &Identity,
        mode: EmitMode<'_>,
    ) -> Result<PageResult> {
        let start = Instant::now();
        log_op_start!(
            RUN_OP,
            report = request.report_name(),
            offset = request.offset(),
            limit = request.limit(),
        );

        match self.execute(request, identity, mode) {
            Ok(result) => {
                log_op_end!(
                    RUN_OP,
                    duration_ms = start.elapsed().as_millis() as u64,
                    report = request.report_name(),
                    emitted = result.row_count() as u64,
                    disabled = result.header.disabled,
                    continue_offset = ?result.continuation,
                );
                Ok(result)
            }
            Err(err) => {
                log_op_error!(
                    RUN_OP,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    report = request.report_name(),
                );
                Err(err)
            }
        }
    }

    /// [`run`](Self::run) inside a span carrying the request's correlation id.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_in_context(
        &self,
        ctx: &RequestContext,
        request: &PageRequest,
        identity: &Identity,
        mode: EmitMode<'_>,
    ) -> Result<PageResult> {
        let span = request_span(ctx, identity);
        let _guard = span.enter();
        self.run(request, identity, mode)
    }

    /// Run in direct mode into a [`PageBuffer`] and assemble the response.
    ///
    /// `max_bytes` bounds the serialized size of the buffered rows.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_buffered(
        &self,
        request: &PageRequest,
        identity: &Identity,
        max_bytes: Option<usize>,
    ) -> Result<PageResponse> {
        let mut buffer = match max_bytes {
            Some(max) => PageBuffer::with_byte_budget(max),
            None => PageBuffer::new(),
        };
        let result = self.run(request, identity, EmitMode::Direct(&mut buffer))?;
        Ok(PageResponse::from_result(result, buffer.into_rows()))
    }

    /// [`run_buffered`](Self::run_buffered) inside the request's span.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_buffered_in_context(
        &self,
        ctx: &RequestContext,
        request: &PageRequest,
        identity: &Identity,
        max_bytes: Option<usize>,
    ) -> Result<PageResponse> {
        let span = request_span(ctx, identity);
        let _guard = span.enter();
        self.run_buffered(request, identity, max_bytes)
    }

    fn execute(
        &self,
        request: &PageRequest,
        identity: &Identity,
        mut mode: EmitMode<'_>,
    ) -> Result<PageResult> {
        let name = request.report_name();
        let source = self.registry.resolve(name)?.instantiate();

        if let Some(permission) = source.required_permission().filter(|p| !p.is_empty()) {
            if !self.authorizer.has_capability(identity, permission) {
                return Err(QueryPageError::PermissionDenied {
                    name: name.to_string(),
                    permission: permission.to_string(),
                });
            }
        }

        let header = disclose_cache(name, source.as_ref());
        if header.disabled {
            return Ok(PageResult {
                header,
                outcome: PageOutcome::Disabled,
                continuation: None,
            });
        }

        let offset = request.offset();
        let limit = request.limit();
        let rows = source
            .fetch(offset, limit.saturating_add(1))
            .map_err(|e| QueryPageError::SourceFault {
                name: name.to_string(),
                message: e.message,
            })?;

        let uses_timestamps = source.uses_timestamps();
        let mut count: u64 = 0;
        let mut emitted = 0usize;
        let mut refs = Vec::new();
        let mut continuation = None;

        for row in rows {
            count += 1;
            // PageRequest guarantees offset + limit fits in a u64.
            if count > limit {
                continuation = Some(offset + limit);
                break;
            }
            match &mut mode {
                EmitMode::Direct(sink) => {
                    if sink.push(self.emit_record(row, uses_timestamps)) == Fit::Full {
                        continuation = Some(offset + count - 1);
                        break;
                    }
                    emitted += 1;
                }
                EmitMode::Identifiers(_) => refs.push(EntityRef {
                    namespace_id: row.namespace_id,
                    local_name: row.local_name,
                }),
            }
        }

        let outcome = match mode {
            EmitMode::Direct(_) => PageOutcome::Emitted { count: emitted },
            EmitMode::Identifiers(resolver) => {
                let forwarded = refs.len();
                resolver
                    .resolve(refs)
                    .map_err(|message| QueryPageError::ResolverFault {
                        name: name.to_string(),
                        message,
                    })?;
                PageOutcome::Forwarded { count: forwarded }
            }
        };

        Ok(PageResult {
            header,
            outcome,
            continuation,
        })
    }

    fn emit_record(&self, row: ReportRow, uses_timestamps: bool) -> EmittedRow {
        let timestamp = if uses_timestamps {
            row.sort_value.as_timestamp().map(|ts| to_iso8601(&ts))
        } else {
            None
        };
        let title = self.namespaces.title_info(row.namespace_id, &row.local_name);
        let extra = row
            .extra_fields
            .into_iter()
            .filter(|(field, _)| !RESERVED_ROW_FIELDS.contains(&field.as_str()))
            .collect();

        EmittedRow {
            value: row.sort_value,
            timestamp,
            title,
            extra,
        }
    }
}

fn request_span(ctx: &RequestContext, identity: &Identity) -> Span {
    info_span!(
        "report_page",
        request_id = %ctx.request_id,
        actor = ctx.actor.as_deref().unwrap_or(identity.name.as_str()),
    )
}

fn disclose_cache(name: &str, source: &dyn ReportSource) -> PageHeader {
    let mut header = PageHeader {
        name: name.to_string(),
        ..PageHeader::default()
    };
    if source.is_cached() {
        if source.is_cacheable() {
            header.cached = true;
            header.cached_timestamp = source.cached_timestamp().map(|ts| to_iso8601(&ts));
        } else {
            header.disabled = true;
        }
    }
    header
}
