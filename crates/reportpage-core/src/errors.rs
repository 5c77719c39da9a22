use reportpage_core_types::RequestId;
use thiserror::Error;

/// Result type alias using QueryPageError
pub type Result<T> = std::result::Result<T, QueryPageError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that transports can hand to
/// callers and tests can assert on without matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Request validation
    InvalidInput,

    // Lookup
    NotFound,

    // Access control
    Forbidden,

    // Collaborators
    ExternalService,

    // Configuration / encoding
    Config,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Structured view of a [`QueryPageError`] with classification fields for
/// programmatic handling and context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (the report name for page runs)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (report: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for report paging
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryPageError {
    /// Report name is not registered
    #[error("Unknown report: {name}")]
    UnknownReport { name: String },

    /// Acting identity lacks the report's required capability
    #[error("Permission denied for report {name}: requires '{permission}'")]
    PermissionDenied { name: String, permission: String },

    /// The report source failed while fetching rows
    #[error("Report {name} failed: {message}")]
    SourceFault { name: String, message: String },

    /// The entity resolver rejected the forwarded identifiers
    #[error("Entity resolution failed for report {name}: {message}")]
    ResolverFault { name: String, message: String },

    /// A request parameter failed validation
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter { param: String, reason: String },

    /// Configuration or catalogue could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl QueryPageError {
    /// Report name the error relates to, if any
    pub fn report_name(&self) -> Option<&str> {
        match self {
            QueryPageError::UnknownReport { name }
            | QueryPageError::PermissionDenied { name, .. }
            | QueryPageError::SourceFault { name, .. }
            | QueryPageError::ResolverFault { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl From<QueryPageError> for ExError {
    fn from(err: QueryPageError) -> Self {
        match err {
            QueryPageError::UnknownReport { name } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(name)
                .with_op("resolve_report")
                .with_message("Report is not registered"),

            QueryPageError::PermissionDenied { name, permission } => {
                ExError::new(ExErrorKind::Forbidden)
                    .with_entity_id(name)
                    .with_op("authorize")
                    .with_message(format!("Missing capability '{}'", permission))
            }

            QueryPageError::SourceFault { name, message } => {
                ExError::new(ExErrorKind::ExternalService)
                    .with_entity_id(name)
                    .with_op("fetch")
                    .with_message(message)
            }

            QueryPageError::ResolverFault { name, message } => {
                ExError::new(ExErrorKind::ExternalService)
                    .with_entity_id(name)
                    .with_op("resolve_entities")
                    .with_message(message)
            }

            QueryPageError::InvalidParameter { param, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("validate_params")
                    .with_message(format!("{}: {}", param, reason))
            }

            QueryPageError::Config { message } => {
                ExError::new(ExErrorKind::Config).with_message(message)
            }

            QueryPageError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for QueryPageError {
    fn from(err: serde_json::Error) -> Self {
        QueryPageError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for QueryPageError {
    fn from(err: toml::de::Error) -> Self {
        QueryPageError::Config {
            message: err.to_string(),
        }
    }
}
