//! Request parameters: validation and self-description
//!
//! Raw caller input is checked against the registry before a run, so the
//! runner's `UnknownReport` path is only reachable by callers that build a
//! `PageRequest` by hand.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::auth::{Authorizer, Identity};
use crate::config::LimitConfig;
use crate::errors::{QueryPageError, Result};
use crate::model::PageRequest;
use crate::registry::Registry;

/// The `limit` parameter: a number or the literal `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitParam {
    Value(u64),
    Max,
}

impl FromStr for LimitParam {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "max" {
            return Ok(LimitParam::Max);
        }
        s.parse::<u64>()
            .map(LimitParam::Value)
            .map_err(|_| format!("'{}' is neither a number nor 'max'", s))
    }
}

impl fmt::Display for LimitParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitParam::Value(n) => write!(f, "{}", n),
            LimitParam::Max => write!(f, "max"),
        }
    }
}

/// Raw parameters as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageParams {
    pub page: String,
    pub offset: Option<u64>,
    pub limit: Option<LimitParam>,
}

/// A request that passed validation, plus any non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub request: PageRequest,
    pub warnings: Vec<String>,
}

/// Validates [`PageParams`] against the registry and page-size bounds.
pub struct ParamValidator<'a> {
    registry: &'a Registry,
    authorizer: &'a dyn Authorizer,
    limits: LimitConfig,
    high_limits_capability: String,
}

impl<'a> ParamValidator<'a> {
    pub fn new(
        registry: &'a Registry,
        authorizer: &'a dyn Authorizer,
        limits: LimitConfig,
        high_limits_capability: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            authorizer,
            limits,
            high_limits_capability: high_limits_capability.into(),
        }
    }

    /// Largest page `identity` may request.
    pub fn max_limit(&self, identity: &Identity) -> u64 {
        if self
            .authorizer
            .has_capability(identity, &self.high_limits_capability)
        {
            self.limits.max_high
        } else {
            self.limits.max
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidParameter` when `page` is not a registered report
    /// name, `limit` is below the minimum, or `offset + limit` overflows.
    pub fn validate(&self, params: &PageParams, identity: &Identity) -> Result<ValidatedRequest> {
        if !self.registry.contains(&params.page) {
            return Err(QueryPageError::InvalidParameter {
                param: "page".to_string(),
                reason: format!("unrecognized value '{}'", params.page),
            });
        }

        let max = self.max_limit(identity);
        let mut warnings = Vec::new();
        let limit = match params.limit {
            None => self.limits.default.min(max),
            Some(LimitParam::Max) => max,
            Some(LimitParam::Value(n)) if n < self.limits.min => {
                return Err(QueryPageError::InvalidParameter {
                    param: "limit".to_string(),
                    reason: format!("must be no less than {}", self.limits.min),
                });
            }
            Some(LimitParam::Value(n)) if n > max => {
                let warning = format!("limit may not be over {} (set to {})", max, max);
                warn!(identity = %identity.name, requested = n, max, "limit clamped");
                warnings.push(warning);
                max
            }
            Some(LimitParam::Value(n)) => n,
        };

        let request = PageRequest::new(params.page.clone(), params.offset.unwrap_or(0), limit)?;
        Ok(ValidatedRequest { request, warnings })
    }
}

// ---------------------------------------------------------------------------
// Self-description
// ---------------------------------------------------------------------------

/// Documentation for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highmax: Option<u64>,
    pub help: &'static str,
}

/// Help output for the paged report interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDescription {
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub examples: Vec<String>,
}

/// Describe the accepted parameters for the current registry and limits.
pub fn describe(registry: &Registry, limits: &LimitConfig) -> ModuleDescription {
    let names: Vec<String> = registry.list_names().into_iter().map(str::to_string).collect();
    let example = names
        .first()
        .map(|name| format!("page={}&limit={}", name, limits.default))
        .into_iter()
        .collect();

    ModuleDescription {
        description: "Get a list provided by a named report",
        params: vec![
            ParamSpec {
                name: "page",
                kind: "enum",
                required: true,
                default: None,
                allowed: Some(names),
                min: None,
                max: None,
                highmax: None,
                help: "The name of the report. Note, this is case sensitive",
            },
            ParamSpec {
                name: "offset",
                kind: "integer",
                required: false,
                default: Some(serde_json::json!(0)),
                allowed: None,
                min: Some(0),
                max: None,
                highmax: None,
                help: "When more results are available, use this to continue",
            },
            ParamSpec {
                name: "limit",
                kind: "limit",
                required: false,
                default: Some(serde_json::json!(limits.default)),
                allowed: None,
                min: Some(limits.min),
                max: Some(limits.max),
                highmax: Some(limits.max_high),
                help: "Number of results to return, or 'max'",
            },
        ],
        examples: example,
    }
}
