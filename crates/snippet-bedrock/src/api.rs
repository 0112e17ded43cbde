//! The remote operations the services depend on.
//!
//! Each trait mirrors the slice of one Bedrock API this crate calls. The
//! `sdk` module implements them for the AWS SDK clients; tests implement
//! them with in-memory fakes.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use snippet_core::models::guardrail::Tag;
use snippet_core::models::resource::{
    FoundationModelSummary, GuardrailDetail, GuardrailSummary, PromptDetail, PromptSummary,
};
use snippet_core::requests::guardrail::{
    CreateGuardrailRequest, CreateGuardrailVersionRequest, UpdateGuardrailRequest,
};
use snippet_core::requests::invoke::InvokeModelRequest;
use snippet_core::requests::prompt::{
    CreatePromptRequest, CreatePromptVersionRequest, UpdatePromptRequest,
};

use crate::error::BedrockError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a read that may legitimately find nothing.
///
/// "Resource not found" is an answer, not a failure: version probing and
/// existence checks branch on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}

/// The ARN of numbered version `version` of the resource at `arn`.
pub fn versioned_arn(arn: &str, version: u32) -> String {
    let suffix = format!(":{version}");
    if arn.ends_with(&suffix) {
        arn.to_string()
    } else {
        format!("{arn}{suffix}")
    }
}

/// Prompt management (`bedrock-agent`).
pub trait PromptApi: Send + Sync {
    /// Every prompt's draft, across all pages.
    fn list_prompts(&self) -> BoxFuture<'_, Result<Vec<PromptSummary>, BedrockError>>;

    /// The draft when `version` is `None`, otherwise that numbered version.
    fn get_prompt<'a>(
        &'a self,
        prompt_identifier: &'a str,
        version: Option<u32>,
    ) -> BoxFuture<'a, Result<Lookup<PromptDetail>, BedrockError>>;

    fn create_prompt(
        &self,
        request: CreatePromptRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>>;

    fn update_prompt(
        &self,
        request: UpdatePromptRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>>;

    fn create_prompt_version(
        &self,
        request: CreatePromptVersionRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>>;

    fn delete_prompt<'a>(&'a self, prompt_identifier: &'a str)
    -> BoxFuture<'a, Result<(), BedrockError>>;

    fn list_tags<'a>(
        &'a self,
        resource_arn: &'a str,
    ) -> BoxFuture<'a, Result<Lookup<BTreeMap<String, String>>, BedrockError>>;
}

/// Guardrail management (`bedrock`).
pub trait GuardrailApi: Send + Sync {
    fn list_guardrails(&self) -> BoxFuture<'_, Result<Vec<GuardrailSummary>, BedrockError>>;

    fn get_guardrail<'a>(
        &'a self,
        guardrail_identifier: &'a str,
        version: Option<u32>,
    ) -> BoxFuture<'a, Result<Lookup<GuardrailDetail>, BedrockError>>;

    fn create_guardrail(
        &self,
        request: CreateGuardrailRequest,
    ) -> BoxFuture<'_, Result<GuardrailSummary, BedrockError>>;

    fn update_guardrail(
        &self,
        request: UpdateGuardrailRequest,
    ) -> BoxFuture<'_, Result<GuardrailSummary, BedrockError>>;

    /// Returns the new version string.
    fn create_guardrail_version(
        &self,
        request: CreateGuardrailVersionRequest,
    ) -> BoxFuture<'_, Result<String, BedrockError>>;

    fn delete_guardrail<'a>(
        &'a self,
        guardrail_identifier: &'a str,
    ) -> BoxFuture<'a, Result<(), BedrockError>>;

    fn list_tags<'a>(
        &'a self,
        resource_arn: &'a str,
    ) -> BoxFuture<'a, Result<Lookup<Vec<Tag>>, BedrockError>>;
}

/// Foundation model catalog (`bedrock`).
pub trait FoundationModelApi: Send + Sync {
    fn list_foundation_models(
        &self,
    ) -> BoxFuture<'_, Result<Vec<FoundationModelSummary>, BedrockError>>;
}

/// Model invocation (`bedrock-runtime`).
pub trait RuntimeApi: Send + Sync {
    /// Send an encoded request and return the raw response body.
    fn invoke_model(
        &self,
        request: InvokeModelRequest,
    ) -> BoxFuture<'_, Result<Vec<u8>, BedrockError>>;
}
