use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid role '{0}': must be one of ('user', 'assistant')")]
    InvalidRole(String),

    #[error("{field} '{value}' does not match pattern {pattern}")]
    Pattern {
        field: &'static str,
        value: String,
        pattern: &'static str,
    },

    #[error("{field} length must be between {min} and {max}, got {actual}")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be a whole number, got {actual}")]
    NotWhole { field: &'static str, actual: f64 },

    #[error("{field} must be between {min} and {max}, got {actual}")]
    Range {
        field: &'static str,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("content block of type '{kind}' {reason}")]
    ContentMismatch {
        kind: &'static str,
        reason: &'static str,
    },

    #[error("unsupported template type '{0}': only CHAT templates are supported")]
    TemplateType(String),

    #[error("prompt variant '{0}' sets both modelId and genAiResource")]
    ConflictingTarget(String),

    #[error("prompt variant '{0}' sets neither modelId nor genAiResource")]
    MissingTarget(String),

    #[error("default variant '{0}' does not name any of the request's variants")]
    UnknownDefaultVariant(String),

    #[error("template has no {0}")]
    EmptyTemplate(&'static str),

    #[error("unsupported image media type: {0}")]
    MediaType(String),

    #[error("request body is already encoded; build from a structured body")]
    BodyAlreadyEncoded,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
