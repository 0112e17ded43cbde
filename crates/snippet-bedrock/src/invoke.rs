//! Invoking a managed prompt.
//!
//! Text invocation sends `{"promptVariables": ...}` to the prompt's ARN and
//! lets Bedrock fill the template. Multimodal invocation can't go through the
//! prompt ARN, so it derives an Anthropic messages body from the stored
//! variant, appends the image, and calls the variant's model directly.
//!
//! Only the first message's first block and the first system block of the
//! variant are used when deriving that body.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use snippet_core::error::ValidationError;
use snippet_core::models::content::{ImageMediaType, ImageSource};
use snippet_core::models::variant::PromptVariant;
use snippet_core::requests::invoke::{
    AnthropicModelRequestBody, GuardrailAttachment, InvokeModelRequest, PromptVariablesBody,
};

use crate::api::{PromptApi, RuntimeApi, versioned_arn};
use crate::error::BedrockError;
use crate::prompt::PromptManager;

/// How much of the model response to hand back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// The text of the first content block.
    #[default]
    ResultOnly,
    /// The whole parsed JSON response.
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutput {
    Text(String),
    Full(Value),
}

impl InvocationOutput {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Full(value) => response_text(value),
        }
    }
}

/// A prompt resolved once and ready to invoke repeatedly.
pub struct PromptInvoker {
    prompt: PromptManager,
    version: Option<u32>,
    prompt_arn: String,
    variant: PromptVariant,
    required_variables: BTreeSet<String>,
    default_body: AnthropicModelRequestBody,
    runtime: Arc<dyn RuntimeApi>,
}

impl PromptInvoker {
    /// Fetch the named prompt (its draft, or `version`) and derive everything
    /// later invocations need from its first variant.
    pub async fn connect(
        name: impl Into<String>,
        version: Option<u32>,
        prompts: Arc<dyn PromptApi>,
        runtime: Arc<dyn RuntimeApi>,
    ) -> Result<Self, BedrockError> {
        let prompt = PromptManager::new(name, prompts);
        let detail = prompt.get(version).await?;
        let variant = first_variant(detail.variants)?;

        let prompt_arn = match version {
            Some(version) => versioned_arn(&detail.arn, version),
            None => detail.arn,
        };
        let required_variables = variant
            .chat()
            .variable_names()
            .map(str::to_string)
            .collect();
        let default_body = AnthropicModelRequestBody::from_variant(&variant)?;

        info!(
            prompt = %prompt.name(),
            arn = %prompt_arn,
            model_id = variant.model_id().unwrap_or("agent"),
            "connected prompt invoker"
        );

        Ok(Self {
            prompt,
            version,
            prompt_arn,
            variant,
            required_variables,
            default_body,
            runtime,
        })
    }

    pub fn prompt_arn(&self) -> &str {
        &self.prompt_arn
    }

    pub fn variant(&self) -> &PromptVariant {
        &self.variant
    }

    pub fn required_variables(&self) -> &BTreeSet<String> {
        &self.required_variables
    }

    pub fn default_body(&self) -> &AnthropicModelRequestBody {
        &self.default_body
    }

    /// Build the prompt-variables request. Every variable the template
    /// declares must be supplied.
    pub fn text_request(
        &self,
        variables: &HashMap<String, String>,
        guardrail: Option<GuardrailAttachment>,
    ) -> Result<InvokeModelRequest, BedrockError> {
        let missing: Vec<String> = self
            .required_variables
            .iter()
            .filter(|name| !variables.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(BedrockError::MissingVariables { missing });
        }

        let body: PromptVariablesBody = variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        Ok(InvokeModelRequest::build(&self.prompt_arn, body, guardrail)?)
    }

    pub async fn invoke_text(
        &self,
        variables: &HashMap<String, String>,
        mode: ResponseMode,
        guardrail: Option<GuardrailAttachment>,
    ) -> Result<InvocationOutput, BedrockError> {
        let invocation_id = Uuid::new_v4();
        let request = self.text_request(variables, guardrail)?;
        info!(
            invocation_id = %invocation_id,
            prompt = %self.prompt.name(),
            variables = variables.len(),
            guardrail = request.guardrail_identifier().unwrap_or("none"),
            "invoking prompt"
        );

        let response = self.runtime.invoke_model(request).await?;
        let output = parse_response(&response, mode)?;

        info!(invocation_id = %invocation_id, bytes = response.len(), "prompt invocation complete");
        Ok(output)
    }

    /// Build a direct model request with the image at `image_path` appended
    /// to the variant's first user turn.
    ///
    /// `version` selects another version of the same prompt to derive the
    /// body from; `None` uses the one this invoker was connected to.
    pub async fn multimodal_request(
        &self,
        image_path: &Path,
        version: Option<u32>,
        guardrail: Option<GuardrailAttachment>,
    ) -> Result<InvokeModelRequest, BedrockError> {
        let media_type = image_path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageMediaType::from_extension)
            .ok_or_else(|| BedrockError::UnsupportedImage(image_path.display().to_string()))?;

        let (model_id, mut body) = match version {
            Some(version) if Some(version) != self.version => {
                let detail = self.prompt.get(Some(version)).await?;
                let variant = first_variant(detail.variants)?;
                (
                    self.model_target(&variant)?,
                    AnthropicModelRequestBody::from_variant(&variant)?,
                )
            }
            _ => (self.model_target(&self.variant)?, self.default_body.clone()),
        };

        let bytes = tokio::fs::read(image_path).await?;
        debug!(path = %image_path.display(), bytes = bytes.len(), "read image");
        body.attach_image(ImageSource::base64(media_type, STANDARD.encode(&bytes)));

        Ok(InvokeModelRequest::build(model_id, body, guardrail)?)
    }

    pub async fn invoke_multimodal(
        &self,
        image_path: &Path,
        version: Option<u32>,
        mode: ResponseMode,
        guardrail: Option<GuardrailAttachment>,
    ) -> Result<InvocationOutput, BedrockError> {
        let invocation_id = Uuid::new_v4();
        let request = self.multimodal_request(image_path, version, guardrail).await?;
        info!(
            invocation_id = %invocation_id,
            prompt = %self.prompt.name(),
            model_id = %request.model_id(),
            guardrail = request.guardrail_identifier().unwrap_or("none"),
            "invoking model with image"
        );

        let response = self.runtime.invoke_model(request).await?;
        let output = parse_response(&response, mode)?;

        info!(
            invocation_id = %invocation_id,
            bytes = response.len(),
            "multimodal invocation complete"
        );
        Ok(output)
    }

    fn model_target(&self, variant: &PromptVariant) -> Result<String, BedrockError> {
        variant
            .model_id()
            .map(str::to_string)
            .ok_or_else(|| BedrockError::NoModelTarget(self.prompt.name().to_string()))
    }
}

fn first_variant(variants: Vec<PromptVariant>) -> Result<PromptVariant, BedrockError> {
    variants
        .into_iter()
        .next()
        .ok_or(BedrockError::Validation(ValidationError::EmptyTemplate("variants")))
}

/// Parse a raw model response according to `mode`.
pub fn parse_response(body: &[u8], mode: ResponseMode) -> Result<InvocationOutput, BedrockError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| BedrockError::ResponseParse(format!("response is not JSON: {e}")))?;
    match mode {
        ResponseMode::Full => Ok(InvocationOutput::Full(value)),
        ResponseMode::ResultOnly => response_text(&value)
            .map(|text| InvocationOutput::Text(text.to_string()))
            .ok_or_else(|| {
                BedrockError::ResponseParse("response has no text in content[0]".to_string())
            }),
    }
}

fn response_text(value: &Value) -> Option<&str> {
    value.pointer("/content/0/text").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_only_takes_first_text_block() {
        let body = br#"{"content":[{"type":"text","text":"hi"},{"type":"text","text":"ignored"}]}"#;
        let output = parse_response(body, ResponseMode::ResultOnly).unwrap();
        assert_eq!(output, InvocationOutput::Text("hi".into()));
    }

    #[test]
    fn result_only_requires_text() {
        let err = parse_response(br#"{"content":[]}"#, ResponseMode::ResultOnly).unwrap_err();
        assert!(matches!(err, BedrockError::ResponseParse(_)));

        // Full mode hands back whatever JSON came in.
        let output = parse_response(br#"{"content":[]}"#, ResponseMode::Full).unwrap();
        assert_eq!(output.text(), None);
    }

    #[test]
    fn non_json_response_is_a_parse_error() {
        let err = parse_response(b"<html>", ResponseMode::Full).unwrap_err();
        assert!(err.to_string().contains("not JSON"));
    }
}
