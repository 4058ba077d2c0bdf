use thiserror::Error;

use crate::resources::{Action, ObjectKind};

/// Startup configuration errors. These are the only errors that stop the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Operation rate is not positive, or its period is not representable.
    #[error("ops cannot be <= 0 (got {0})")]
    InvalidRate(f64),

    /// A duration setting is zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending setting.
        field: &'static str,
    },

    /// Bounded concurrency was requested with a limit of zero.
    #[error("max_in_flight must be at least 1")]
    ZeroConcurrency,

    /// Target namespace is empty.
    #[error("namespace cannot be empty")]
    EmptyNamespace,

    /// A duration string could not be parsed.
    #[error("invalid duration `{input}`: {reason}")]
    InvalidDuration {
        /// Raw input as supplied on the command line.
        input: String,
        /// Human-readable parse failure.
        reason: String,
    },

    /// Metrics bind address could not be parsed.
    #[error("invalid metrics bind address `{0}`")]
    InvalidBindAddress(String),
}

impl ConfigError {
    /// Creates an `InvalidDuration` variant.
    #[must_use]
    pub fn invalid_duration(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single create or delete call against the orchestration API.
///
/// Never fatal: a cycle logs it, counts it and moves on.
#[derive(Debug, Clone, Error)]
#[error("could not {action} {kind} {namespace}/{name}: {message}")]
pub struct ApiError {
    /// Kind of object the call targeted.
    pub kind: ObjectKind,
    /// Action that failed.
    pub action: Action,
    /// Namespace of the object.
    pub namespace: String,
    /// Object name (the cycle identity).
    pub name: String,
    /// Error reported by the API client.
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(
        kind: ObjectKind,
        action: Action,
        namespace: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            action,
            namespace: namespace.into(),
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Answer of the name-resolution oracle when no address came back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The oracle positively reported that the name does not exist.
    #[error("no such host `{0}`")]
    NotFound(String),

    /// Any other resolution failure; callers keep polling.
    #[error("transient resolution error: {0}")]
    Transient(String),
}

impl OracleError {
    /// Returns `true` for the canonical "not found" signal.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for orchestration API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result alias for oracle lookups.
pub type OracleResult<T> = Result<T, OracleError>;
