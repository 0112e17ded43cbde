//! snippet-core
//!
//! Pure domain types, field validation, and request builders for Bedrock
//! prompt management. No AWS SDK dependency; this is the shared vocabulary
//! the service layer speaks.

pub mod error;
pub mod models;
pub mod requests;
pub mod validate;
