use thiserror::Error;

/// Result type alias using the canonical error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the schema store maps to exactly one kind, and
/// every kind has a stable code that callers and tests can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Write-boundary validation
    InvalidInput,
    InvalidStatus,
    NotFound,

    // Integrity constraints
    /// UNIQUE or PRIMARY KEY collision (e.g. duplicate email)
    AlreadyExists,
    /// NOT NULL or CHECK violation
    ConstraintViolation,
    /// Reference to a missing parent, or a RESTRICT-ed delete
    ForeignKeyViolation,

    // Migration sequencing
    /// Duplicate, out-of-order, missing or unknown migration unit
    MigrationOrder,
    /// An applied unit's SQL no longer matches the ledger checksum
    ChecksumMismatch,
    /// A unit failed while executing and was rolled back
    MigrationFailed,

    // Integration/IO
    Persistence,
    Serialization,
    Crypto,
    Config,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidStatus => "ERR_INVALID_STATUS",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::ForeignKeyViolation => "ERR_FOREIGN_KEY_VIOLATION",
            ExErrorKind::MigrationOrder => "ERR_MIGRATION_ORDER",
            ExErrorKind::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            ExErrorKind::MigrationFailed => "ERR_MIGRATION_FAILED",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Crypto => "ERR_CRYPTO",
            ExErrorKind::Config => "ERR_CONFIG",
        }
    }

    /// Whether this kind comes from an integrity constraint in the store
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            ExErrorKind::AlreadyExists
                | ExErrorKind::ConstraintViolation
                | ExErrorKind::ForeignKeyViolation
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus enough context
/// (operation, entity, migration unit, underlying cause) to diagnose a
/// failure without re-running it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    migration_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            migration_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add migration unit context
    pub fn with_migration_id(mut self, id: impl Into<String>) -> Self {
        self.migration_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the migration unit this error belongs to, if any
    pub fn migration_id(&self) -> Option<&str> {
        self.migration_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the underlying cause, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(migration_id) = &self.migration_id {
            write!(f, " (migration: {})", migration_id)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Validation failures raised while building records at the write boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A required text field is empty or whitespace-only
    #[error("Field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// Email address is not of the form local@domain
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    /// Value offered as a password hash looks like a plaintext password
    #[error("Password hash must be a PHC or modular crypt string")]
    PlaintextPassword,

    /// Response status outside the recognized set
    #[error("Unknown response status: {value}")]
    UnknownStatus { value: String },

    /// Score is NaN or infinite
    #[error("Score must be a finite number, got {value}")]
    NonFiniteScore { value: f64 },
}

impl From<ModelError> for ExError {
    fn from(err: ModelError) -> Self {
        let message = err.to_string();
        match err {
            ModelError::UnknownStatus { value } => ExError::new(ExErrorKind::InvalidStatus)
                .with_op("parse_status")
                .with_entity_id(value)
                .with_message(message),

            ModelError::EmptyField { .. }
            | ModelError::InvalidEmail { .. }
            | ModelError::PlaintextPassword
            | ModelError::NonFiniteScore { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("validate")
                .with_message(message),
        }
    }
}
