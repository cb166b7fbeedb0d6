//! Core Error Types
//!
//! Defines the error taxonomy shared by the phase router workspace. Every
//! failure aborts the whole `consume` call it happens in; there are no partial
//! results and nothing is retried automatically.

use thiserror::Error;

use crate::outcome::OutcomeType;

/// Error type for phase resolution and execution.
#[derive(Error, Debug)]
pub enum PhaseError {
    /// No registered phase declares the requested outcome type.
    #[error("No providers found for outcome type {0}")]
    NoProvider(OutcomeType),

    /// Providers exist, but every alternative's dependency chain failed
    /// (cycle or missing transitive dependency).
    #[error("Failed to resolve phase chain for the outcome of type {0}")]
    UnresolvableChain(OutcomeType),

    /// A value for this type was written twice into the same store.
    #[error("Outcome of type {0} has already been provided")]
    DuplicateOutcome(OutcomeType),

    /// Strict outcome checking: a phase ran but did not supply what it declared.
    #[error("Phase {phase} did not provide declared outcome(s): {}", format_types(.missing))]
    UnmetPromise {
        phase: String,
        missing: Vec<OutcomeType>,
    },

    /// The chain ran but the requested type is still absent.
    #[error("Outcome of type {0} was not produced")]
    OutcomeNotProduced(OutcomeType),

    /// Failure reported by a phase handler itself
    #[error("Phase handler error: {0}")]
    Handler(String),

    /// Invalid router configuration
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for phase errors
pub type PhaseResult<T> = Result<T, PhaseError>;

impl PhaseError {
    /// Create a handler error
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error was raised while resolving the phase chain,
    /// before any phase ran.
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, Self::NoProvider(_) | Self::UnresolvableChain(_))
    }

    /// The outcome type this error is about, if it names exactly one.
    pub fn outcome_type(&self) -> Option<OutcomeType> {
        match self {
            Self::NoProvider(t)
            | Self::UnresolvableChain(t)
            | Self::DuplicateOutcome(t)
            | Self::OutcomeNotProduced(t) => Some(*t),
            _ => None,
        }
    }
}

fn format_types(types: &[OutcomeType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert PhaseError to a string
impl From<PhaseError> for String {
    fn from(err: PhaseError) -> String {
        err.to_string()
    }
}
