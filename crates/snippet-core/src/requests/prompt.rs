use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::guardrail::validate_tag_map;
use crate::models::variant::PromptVariant;
use crate::requests::check_description;
use crate::validate::{self, Validate};

pub const MAX_VARIANTS: usize = 1;

/// Payload for `CreatePrompt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromptRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub variants: Vec<PromptVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_encryption_key_arn: Option<String>,
}

impl Validate for CreatePromptRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::NAME.check("name", &self.name)?;
        check_description(self.description.as_deref())?;
        if let Some(tags) = &self.tags {
            validate_tag_map(tags)?;
        }
        check_variants(&self.variants, self.default_variant.as_deref())?;
        check_kms_key(self.customer_encryption_key_arn.as_deref())
    }
}

/// Payload for `UpdatePrompt`. Always replaces the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromptRequest {
    pub prompt_identifier: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variants: Vec<PromptVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_encryption_key_arn: Option<String>,
}

impl Validate for UpdatePromptRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::PROMPT_IDENTIFIER.check("promptIdentifier", &self.prompt_identifier)?;
        validate::NAME.check("name", &self.name)?;
        check_description(self.description.as_deref())?;
        check_variants(&self.variants, self.default_variant.as_deref())?;
        check_kms_key(self.customer_encryption_key_arn.as_deref())
    }
}

/// Payload for `CreatePromptVersion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromptVersionRequest {
    pub prompt_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl Validate for CreatePromptVersionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::PROMPT_IDENTIFIER.check("promptIdentifier", &self.prompt_identifier)?;
        check_description(self.description.as_deref())?;
        match &self.tags {
            Some(tags) => validate_tag_map(tags),
            None => Ok(()),
        }
    }
}

fn check_variants(
    variants: &[PromptVariant],
    default_variant: Option<&str>,
) -> Result<(), ValidationError> {
    validate::check_items("variants", variants, 0, MAX_VARIANTS)?;
    variants.iter().try_for_each(Validate::validate)?;
    if let Some(default) = default_variant {
        validate::NAME.check("defaultVariant", default)?;
        if !variants.iter().any(|v| v.name == default) {
            return Err(ValidationError::UnknownDefaultVariant(default.to_string()));
        }
    }
    Ok(())
}

fn check_kms_key(arn: Option<&str>) -> Result<(), ValidationError> {
    match arn {
        Some(arn) => validate::KMS_KEY_ARN.check("customerEncryptionKeyArn", arn),
        None => Ok(()),
    }
}
