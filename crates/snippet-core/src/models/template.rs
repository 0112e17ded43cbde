use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::content::{ContentBlock, Message, PromptInputVariable, SystemContentBlock};
use crate::validate::{self, Validate};

pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const MAX_TOKENS_LIMIT: u32 = 4096;
pub const MAX_STOP_SEQUENCES: usize = 4;
pub const MAX_INPUT_VARIABLES: usize = 5;

/// Messages, optional system blocks and named variables of a chat prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPromptTemplateConfiguration {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<Vec<SystemContentBlock>>,
    #[serde(default)]
    pub input_variables: Vec<PromptInputVariable>,
}

impl ChatPromptTemplateConfiguration {
    /// A single user turn with an optional system instruction.
    pub fn single_turn(
        system_prompt: Option<&str>,
        user_prompt: &str,
        input_variables: &[String],
    ) -> Result<Self, ValidationError> {
        Self {
            messages: vec![Message::user(vec![ContentBlock::new(user_prompt)])],
            system: system_prompt.map(|text| vec![SystemContentBlock::new(text)]),
            input_variables: input_variables
                .iter()
                .map(PromptInputVariable::new)
                .collect::<Result<_, _>>()?,
        }
        .validated()
    }

    pub fn first_message(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn first_system(&self) -> Option<&SystemContentBlock> {
        self.system.as_ref().and_then(|blocks| blocks.first())
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.input_variables.iter().map(|v| v.name.as_str())
    }
}

impl Validate for ChatPromptTemplateConfiguration {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::check_items("inputVariables", &self.input_variables, 0, MAX_INPUT_VARIABLES)?;
        self.input_variables.validate()
    }
}

/// Template configuration of a variant. Only chat templates are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplateConfiguration {
    pub chat: ChatPromptTemplateConfiguration,
}

impl Validate for PromptTemplateConfiguration {
    fn validate(&self) -> Result<(), ValidationError> {
        self.chat.validate()
    }
}

/// Sampling parameters for a text prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptModelInferenceConfiguration {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    #[serde(default = "default_unit")]
    pub temperature: f32,
    #[serde(default = "default_unit")]
    pub top_p: f32,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_unit() -> f32 {
    1.0
}

impl Default for PromptModelInferenceConfiguration {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            stop_sequences: Vec::new(),
            temperature: 1.0,
            top_p: 1.0,
        }
    }
}

impl PromptModelInferenceConfiguration {
    pub fn new(
        max_tokens: u32,
        temperature: f32,
        top_p: f32,
        stop_sequences: Vec<String>,
    ) -> Result<Self, ValidationError> {
        Self {
            max_tokens,
            stop_sequences,
            temperature,
            top_p,
        }
        .validated()
    }
}

impl Validate for PromptModelInferenceConfiguration {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::check_range("maxTokens", self.max_tokens.into(), 0.0, MAX_TOKENS_LIMIT.into())?;
        validate::check_items("stopSequences", &self.stop_sequences, 0, MAX_STOP_SEQUENCES)?;
        validate::check_range("temperature", self.temperature.into(), 0.0, 1.0)?;
        validate::check_range("topP", self.top_p.into(), 0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInferenceConfiguration {
    pub text: PromptModelInferenceConfiguration,
}

impl Validate for PromptInferenceConfiguration {
    fn validate(&self) -> Result<(), ValidationError> {
        self.text.validate()
    }
}
