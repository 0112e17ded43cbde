use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::guardrail::{GuardrailWordPolicyConfig, Tag};
use crate::requests::check_description;
use crate::validate::{self, Validate};

pub const MAX_MESSAGING_LEN: usize = 500;

/// Payload for `CreateGuardrail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuardrailRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub blocked_input_messaging: String,
    pub blocked_outputs_messaging: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_policy_config: Option<GuardrailWordPolicyConfig>,
}

impl Validate for CreateGuardrailRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::NAME.check("name", &self.name)?;
        check_description(self.description.as_deref())?;
        check_messaging(&self.blocked_input_messaging, &self.blocked_outputs_messaging)?;
        self.tags.validate()?;
        self.word_policy_config.validate()
    }
}

/// Payload for `UpdateGuardrail`. Always replaces the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGuardrailRequest {
    pub guardrail_identifier: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub blocked_input_messaging: String,
    pub blocked_outputs_messaging: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_policy_config: Option<GuardrailWordPolicyConfig>,
}

impl Validate for UpdateGuardrailRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::GUARDRAIL_IDENTIFIER.check("guardrailIdentifier", &self.guardrail_identifier)?;
        validate::NAME.check("name", &self.name)?;
        check_description(self.description.as_deref())?;
        check_messaging(&self.blocked_input_messaging, &self.blocked_outputs_messaging)?;
        self.word_policy_config.validate()
    }
}

/// Payload for `CreateGuardrailVersion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuardrailVersionRequest {
    pub guardrail_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for CreateGuardrailVersionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::GUARDRAIL_IDENTIFIER.check("guardrailIdentifier", &self.guardrail_identifier)?;
        check_description(self.description.as_deref())
    }
}

fn check_messaging(input: &str, outputs: &str) -> Result<(), ValidationError> {
    validate::check_chars("blockedInputMessaging", input, 1, MAX_MESSAGING_LEN)?;
    validate::check_chars("blockedOutputsMessaging", outputs, 1, MAX_MESSAGING_LEN)
}
