use std::fmt;

use snippet_core::error::ValidationError;
use thiserror::Error;

/// Which managed resource an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Prompt,
    Guardrail,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prompt => "prompt",
            Self::Guardrail => "guardrail",
        })
    }
}

/// Coarse classification of a [`BedrockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something the current remote state can't satisfy.
    Usage,
    /// A value failed structural validation before any call was made.
    Validation,
    /// The remote API or the local environment failed.
    Remote,
}

#[derive(Debug, Error)]
pub enum BedrockError {
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: ResourceKind, name: String },

    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: ResourceKind, name: String },

    #[error("{kind} '{name}' has no version {version}")]
    VersionNotFound {
        kind: ResourceKind,
        name: String,
        version: u32,
    },

    #[error("{kind} version must be positive; omit it to address the draft")]
    InvalidVersion { kind: ResourceKind },

    #[error("missing prompt variables: {}", missing.join(", "))]
    MissingVariables { missing: Vec<String> },

    #[error("unsupported image file: {0}")]
    UnsupportedImage(String),

    #[error("prompt '{0}' targets an agent, not a model")]
    NoModelTarget(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("request could not be built: {0}")]
    Request(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("AWS config error: {0}")]
    Config(String),
}

impl BedrockError {
    /// Wrap an SDK failure, keeping its whole source chain in the message.
    pub fn remote(operation: &'static str, err: &dyn std::error::Error) -> Self {
        Self::Remote {
            operation,
            message: format_err_chain(err),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::VersionNotFound { .. }
            | Self::InvalidVersion { .. }
            | Self::MissingVariables { .. }
            | Self::UnsupportedImage(_)
            | Self::NoModelTarget(_)
            | Self::Config(_) => ErrorKind::Usage,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Remote { .. }
            | Self::ResponseParse(_)
            | Self::Request(_)
            | Self::Serialization(_)
            | Self::Io(_) => ErrorKind::Remote,
        }
    }
}

/// Walk the full error chain and join all causes into one string.
///
/// AWS SDK errors often have terse `Display` impls (e.g. "service error")
/// but useful detail in the source chain.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
