//! Caller-facing response envelope
//!
//! ```json
//! {
//!   "name": "Ancientpages",
//!   "cached": true,
//!   "cachedtimestamp": "2011-10-16T22:24:58Z",
//!   "results": [ { "value": 20100101000000, "ns": 0, "title": "Old" } ],
//!   "continue": { "offset": 10 }
//! }
//! ```

use serde::Serialize;

use crate::errors::Result;
use crate::model::{EmittedRow, PageHeader, PageOutcome, PageResult};

/// Offset to send back on the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Continuation {
    pub offset: u64,
}

/// Serializable page response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub header: PageHeader,
    /// Absent when the report is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<EmittedRow>>,
    #[serde(rename = "continue", skip_serializing_if = "Option::is_none")]
    pub continuation: Option<Continuation>,
}

impl PageResponse {
    /// Combine a run result with the rows its sink collected.
    pub fn from_result(result: PageResult, rows: Vec<EmittedRow>) -> Self {
        let results = match result.outcome {
            PageOutcome::Disabled => None,
            PageOutcome::Emitted { .. } | PageOutcome::Forwarded { .. } => Some(rows),
        };
        Self {
            header: result.header,
            results,
            continuation: result.continuation.map(|offset| Continuation { offset }),
        }
    }

    pub fn next_offset(&self) -> Option<u64> {
        self.continuation.map(|c| c.offset)
    }

    /// # Errors
    ///
    /// Returns `Serialization` if a row holds a value JSON cannot represent.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
