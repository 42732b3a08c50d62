//! VR-020: Credential collaborators for the auth resolver.
//!
//! Both sit behind traits so the resolver can be driven by deterministic
//! fakes: `KeyMaterialSource` yields an SSH public key, `Prompter` asks the
//! user for a masked secret.

pub mod keys;
pub mod prompt;

use crate::core::error::ResolveError;
use thiserror::Error;

pub use keys::LocalKeyMaterial;
pub use prompt::TerminalPrompter;

/// Where the SSH public key should come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRequest {
    /// Literal key or path to a public key file.
    pub value: Option<String>,
    /// Generate a key pair when no usable key is found.
    pub generate: bool,
}

/// Resolves SSH public key material.
pub trait KeyMaterialSource {
    /// Return the OpenSSH public key text. Fails with `NotFound` when no
    /// source is usable and generation was not requested.
    fn public_key(&self, request: &KeyRequest) -> Result<String, ResolveError>;
}

/// Prompt failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("no interactive terminal available")]
    NoInteractivity,

    #[error("prompt failed: {0}")]
    Failed(String),
}

/// Interactive secret entry.
pub trait Prompter {
    /// Ask for a masked secret, optionally asking twice to confirm.
    fn prompt_password(&self, prompt: &str, confirm: bool) -> Result<String, PromptError>;
}

impl From<PromptError> for ResolveError {
    fn from(e: PromptError) -> Self {
        ResolveError::NoInteractivity(e.to_string())
    }
}
