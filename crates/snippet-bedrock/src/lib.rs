//! snippet-bedrock
//!
//! Prompt management, guardrail management and prompt invocation over the
//! Bedrock agent, control-plane and runtime APIs.
//!
//! Services talk to Bedrock through the traits in [`api`]; [`config`] builds
//! the SDK clients that implement them.

pub mod api;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod guardrail;
pub mod invoke;
pub mod prompt;
mod sdk;

pub use api::Lookup;
pub use config::{BedrockClients, ClientConfig, CredentialSource};
pub use error::{BedrockError, ErrorKind};
pub use guardrail::{GuardrailChanges, GuardrailManager, NewGuardrail};
pub use invoke::{InvocationOutput, PromptInvoker, ResponseMode};
pub use prompt::{NewPrompt, PromptChanges, PromptManager};
