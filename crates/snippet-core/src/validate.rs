//! Field-level checks shared by every model and request type.
//!
//! Bedrock documents its constraints as regex patterns, length bounds and
//! numeric ranges. Each constraint lives here once; model types compose them
//! in their [`Validate`] impls so that a value is either fully valid or
//! rejected with the first violation found.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;

/// Structural validation run on construction and on remote data.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;

    /// Validate and hand the value back, for use at the end of a struct literal.
    fn validated(self) -> Result<Self, ValidationError>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self)
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Some(value) => value.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validate::validate)
    }
}

/// A lazily compiled Bedrock field pattern.
pub struct Pattern {
    source: &'static str,
    regex: OnceLock<Regex>,
}

impl Pattern {
    const fn new(source: &'static str) -> Self {
        Self {
            source,
            regex: OnceLock::new(),
        }
    }

    /// # Panics
    ///
    /// Panics if the pattern source does not compile. Sources are the
    /// constants below, so a panic indicates a typo in this module.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex
            .get_or_init(|| {
                Regex::new(self.source)
                    .unwrap_or_else(|e| panic!("invalid pattern {}: {e}", self.source))
            })
            .is_match(value)
    }

    pub fn check(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
        if self.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::Pattern {
                field,
                value: value.to_string(),
                pattern: self.source,
            })
        }
    }
}

/// Prompt, variant and input-variable names.
pub static NAME: Pattern = Pattern::new(r"^([0-9a-zA-Z][_-]?){1,100}$");

pub static MODEL_ID: Pattern = Pattern::new(
    r"^(arn:aws(-[^:]{1,12})?:(bedrock|sagemaker):[a-z0-9-]{1,20}:([0-9]{12})?:([a-z-]+/)?)?([a-zA-Z0-9.-]{1,63}){0,2}(([:][a-z0-9-]{1,63}){0,2})?(/[a-z0-9]{1,12})?$",
);

pub static AGENT_ALIAS_ARN: Pattern = Pattern::new(
    r"^arn:aws:bedrock:[a-z0-9-]{1,20}:[0-9]{12}:agent-alias/[0-9a-zA-Z]{10}/[0-9a-zA-Z]{10}$",
);

// The unanchored alternation is Bedrock's own pattern, kept as published.
pub static PROMPT_IDENTIFIER: Pattern = Pattern::new(
    r"^([0-9a-zA-Z]{10})|(arn:aws:bedrock:[a-z0-9-]{1,20}:[0-9]{12}:prompt/[0-9a-zA-Z]{10})(?::[0-9]{1,5})?$",
);

pub static GUARDRAIL_IDENTIFIER: Pattern = Pattern::new(
    r"^(([a-z0-9]+)|(arn:aws(-[^:]+)?:bedrock:[a-z0-9-]{1,20}:[0-9]{12}:guardrail/[a-z0-9]+))$",
);

pub static GUARDRAIL_VERSION: Pattern = Pattern::new(r"^(([1-9][0-9]{0,7})|(DRAFT))$");

pub static KMS_KEY_ARN: Pattern = Pattern::new(
    r"^arn:aws(|-cn|-us-gov):kms:[a-zA-Z0-9-]*:[0-9]{12}:key/[a-zA-Z0-9-]{36}$",
);

pub static TAG: Pattern = Pattern::new(r"^[a-zA-Z0-9\s._:/=+@-]*$");

/// Check a string's length in characters.
pub fn check_chars(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    check_len(field, value.chars().count(), min, max)
}

/// Check a collection's item count.
pub fn check_items<T>(
    field: &'static str,
    items: &[T],
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    check_len(field, items.len(), min, max)
}

fn check_len(
    field: &'static str,
    actual: usize,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    if (min..=max).contains(&actual) {
        Ok(())
    } else {
        Err(ValidationError::Length {
            field,
            min,
            max,
            actual,
        })
    }
}

/// Check an inclusive numeric range. NaN is always out of range.
pub fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::Range {
            field,
            min,
            max,
            actual: value,
        })
    }
}
