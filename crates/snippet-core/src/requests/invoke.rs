//! Model invocation payloads.
//!
//! Two body shapes reach `InvokeModel`: the Anthropic messages body, used
//! when calling a foundation model directly, and the prompt-variables body,
//! used when the model id is a managed prompt ARN and the platform performs
//! template substitution. [`InvokeModelRequest::build`] encodes either one
//! exactly once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::content::{AnthropicContentBlock, AnthropicMessage, ImageSource, Message, Role};
use crate::models::template::{DEFAULT_MAX_TOKENS, MAX_STOP_SEQUENCES, MAX_TOKENS_LIMIT};
pub use crate::models::variant::MAX_TOP_K;
use crate::models::variant::{MAX_MODEL_ID_LEN, PromptVariant};
use crate::validate::{self, Validate};

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_TOP_K: u32 = 100;

/// Guardrail version used when only an identifier is supplied.
pub const DRAFT_GUARDRAIL_VERSION: &str = "DRAFT";

/// Request body in the Anthropic messages format.
///
/// Deserialization fills the documented defaults and then validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModelRequestBody")]
pub struct AnthropicModelRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub anthropic_version: String,
}

#[derive(Deserialize)]
struct RawModelRequestBody {
    #[serde(default)]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default)]
    stop_sequences: Vec<String>,
    #[serde(default = "default_unit")]
    temperature: f32,
    #[serde(default = "default_unit")]
    top_p: f32,
    #[serde(default = "default_top_k")]
    top_k: u32,
    #[serde(default = "default_anthropic_version")]
    anthropic_version: String,
}

impl TryFrom<RawModelRequestBody> for AnthropicModelRequestBody {
    type Error = ValidationError;

    fn try_from(raw: RawModelRequestBody) -> Result<Self, Self::Error> {
        Self {
            system: raw.system,
            messages: raw.messages,
            max_tokens: raw.max_tokens,
            stop_sequences: raw.stop_sequences,
            temperature: raw.temperature,
            top_p: raw.top_p,
            top_k: raw.top_k,
            anthropic_version: raw.anthropic_version,
        }
        .validated()
    }
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_unit() -> f32 {
    1.0
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

fn default_anthropic_version() -> String {
    ANTHROPIC_VERSION.to_string()
}

impl AnthropicModelRequestBody {
    /// A body with one user message and default sampling.
    pub fn new(system: Option<String>, messages: Vec<AnthropicMessage>) -> Self {
        Self {
            system,
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            stop_sequences: Vec::new(),
            temperature: 1.0,
            top_p: 1.0,
            top_k: DEFAULT_TOP_K,
            anthropic_version: default_anthropic_version(),
        }
    }

    /// Derive a body from a stored variant.
    ///
    /// Only the first message's first block and the first system block are
    /// read. Template placeholders are left as-is.
    pub fn from_variant(variant: &PromptVariant) -> Result<Self, ValidationError> {
        let chat = variant.chat();
        let message = chat
            .first_message()
            .ok_or(ValidationError::EmptyTemplate("messages"))?;
        let text = message
            .first_text()
            .ok_or(ValidationError::EmptyTemplate("message content"))?;

        let mut body = Self::new(
            chat.first_system().map(|block| block.text.clone()),
            vec![Message {
                role: message.role,
                content: vec![AnthropicContentBlock::from_text(text)],
            }],
        );
        if let Some(inference) = &variant.inference_configuration {
            body.max_tokens = inference.text.max_tokens;
            body.stop_sequences = inference.text.stop_sequences.clone();
            body.temperature = inference.text.temperature;
            body.top_p = inference.text.top_p;
        }
        if let Some(top_k) = variant.top_k() {
            body.top_k = u32::try_from(top_k).unwrap_or(u32::MAX);
        }
        body.validated()
    }

    /// Append an image to the trailing user turn, or open a new one.
    pub fn attach_image(&mut self, source: ImageSource) {
        let block = AnthropicContentBlock::from_image(source);
        match self.messages.last_mut() {
            Some(last) if last.role == Role::User => last.content.push(block),
            _ => self.messages.push(Message::user(vec![block])),
        }
    }
}

impl Validate for AnthropicModelRequestBody {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::check_items("messages", &self.messages, 1, usize::MAX)?;
        validate::check_range("max_tokens", self.max_tokens.into(), 0.0, MAX_TOKENS_LIMIT.into())?;
        validate::check_items("stop_sequences", &self.stop_sequences, 0, MAX_STOP_SEQUENCES)?;
        validate::check_range("temperature", self.temperature.into(), 0.0, 1.0)?;
        validate::check_range("top_p", self.top_p.into(), 0.0, 1.0)?;
        validate::check_range("top_k", self.top_k.into(), 1.0, MAX_TOP_K.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVariableValue {
    pub text: String,
}

/// Body sent when invoking a managed prompt by ARN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariablesBody {
    pub prompt_variables: BTreeMap<String, PromptVariableValue>,
}

impl<K, V> FromIterator<(K, V)> for PromptVariablesBody
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            prompt_variables: iter
                .into_iter()
                .map(|(name, value)| (name.into(), PromptVariableValue { text: value.into() }))
                .collect(),
        }
    }
}

/// Anything [`InvokeModelRequest::build`] accepts as a body.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelBody {
    Anthropic(AnthropicModelRequestBody),
    PromptVariables(PromptVariablesBody),
    /// A body that has already been serialized. Building from it fails.
    Encoded(String),
}

impl From<AnthropicModelRequestBody> for ModelBody {
    fn from(body: AnthropicModelRequestBody) -> Self {
        Self::Anthropic(body)
    }
}

impl From<PromptVariablesBody> for ModelBody {
    fn from(body: PromptVariablesBody) -> Self {
        Self::PromptVariables(body)
    }
}

impl ModelBody {
    fn encode(&self) -> Result<String, ValidationError> {
        match self {
            Self::Anthropic(body) => Ok(serde_json::to_string(body)?),
            Self::PromptVariables(body) => Ok(serde_json::to_string(body)?),
            Self::Encoded(_) => Err(ValidationError::BodyAlreadyEncoded),
        }
    }
}

/// Guardrail to apply to an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailAttachment {
    pub identifier: String,
    pub version: String,
}

impl GuardrailAttachment {
    pub fn new(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
        }
    }

    /// Attach the guardrail's working draft.
    pub fn draft(identifier: impl Into<String>) -> Self {
        Self::new(identifier, DRAFT_GUARDRAIL_VERSION)
    }
}

impl Validate for GuardrailAttachment {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::GUARDRAIL_IDENTIFIER.check("guardrailIdentifier", &self.identifier)?;
        validate::GUARDRAIL_VERSION.check("guardrailVersion", &self.version)
    }
}

/// A fully encoded `InvokeModel` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeModelRequest {
    model_id: String,
    body: String,
    accept: &'static str,
    content_type: &'static str,
    guardrail: Option<GuardrailAttachment>,
}

impl InvokeModelRequest {
    /// Validate the target and guardrail, then encode `body` as compact JSON
    /// with absent fields omitted.
    pub fn build(
        model_id: impl Into<String>,
        body: impl Into<ModelBody>,
        guardrail: Option<GuardrailAttachment>,
    ) -> Result<Self, ValidationError> {
        let model_id = model_id.into();
        validate::check_chars("modelId", &model_id, 1, MAX_MODEL_ID_LEN)?;
        guardrail.validate()?;
        let body = body.into().encode()?;
        Ok(Self {
            model_id,
            body,
            accept: JSON_CONTENT_TYPE,
            content_type: JSON_CONTENT_TYPE,
            guardrail,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn accept(&self) -> &str {
        self.accept
    }

    pub fn content_type(&self) -> &str {
        self.content_type
    }

    pub fn guardrail_identifier(&self) -> Option<&str> {
        self.guardrail.as_ref().map(|g| g.identifier.as_str())
    }

    pub fn guardrail_version(&self) -> Option<&str> {
        self.guardrail.as_ref().map(|g| g.version.as_str())
    }
}
