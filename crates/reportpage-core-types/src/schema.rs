//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the logging macros,
//! the test capture layer and anything that parses the JSON log output.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Report paging
pub const FIELD_REPORT: &str = "report";
pub const FIELD_OFFSET: &str = "offset";
pub const FIELD_LIMIT: &str = "limit";
pub const FIELD_EMITTED: &str = "emitted";
pub const FIELD_CONTINUE_OFFSET: &str = "continue_offset";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
