//! VR-002: Resolution error taxonomy.
//!
//! Every resolver returns `Result<_, ResolveError>`. Any error aborts the
//! pipeline; nothing is retried or rolled back.

use crate::transport::TransportError;
use thiserror::Error;

/// A resource reference string that does not follow the identifier grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed resource reference '{reference}': {reason}")]
pub struct FormatError {
    pub reference: String,
    pub reason: String,
}

impl FormatError {
    pub fn new(reference: &str, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while resolving a create request.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Contradictory or incomplete argument combination.
    #[error("{0}")]
    Usage(String),

    /// A value failed domain validation. `choices` lists valid alternatives.
    #[error("{message} Please pick one from {choices:?}")]
    InvalidInput {
        message: String,
        choices: Vec<String>,
    },

    /// Structurally impossible combination (e.g. SSH on Windows).
    #[error("{0}")]
    Unsupported(String),

    /// A reference that must exist does not.
    #[error("{0}")]
    NotFound(String),

    /// A prompt was required but no terminal is attached.
    #[error("{0}")]
    NoInteractivity(String),

    /// Malformed resource reference.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// SSH key material could not be read or generated.
    #[error("{0}")]
    KeyMaterial(String),

    /// The resource service call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ResolveError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::InvalidInput { .. } | Self::Unsupported(_) | Self::Format(_) => 2,
            Self::NotFound(_) => 3,
            Self::NoInteractivity(_) => 4,
            Self::KeyMaterial(_) | Self::Transport(_) => 1,
        }
    }
}
