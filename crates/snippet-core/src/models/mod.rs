pub mod content;
pub mod guardrail;
pub mod resource;
pub mod template;
pub mod variant;
