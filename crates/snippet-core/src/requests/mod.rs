//! Payload shapes for the management and runtime APIs.

pub mod guardrail;
pub mod invoke;
pub mod prompt;

use crate::error::ValidationError;
use crate::validate;

pub const MAX_DESCRIPTION_LEN: usize = 200;

pub(crate) fn check_description(description: Option<&str>) -> Result<(), ValidationError> {
    match description {
        Some(text) => validate::check_chars("description", text, 1, MAX_DESCRIPTION_LEN),
        None => Ok(()),
    }
}
