//! Shapes of the remote prompt and guardrail resources as the service layer
//! sees them, independent of any SDK.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::guardrail::Tag;
use crate::models::variant::PromptVariant;

/// Version string Bedrock reports for the mutable draft.
pub const DRAFT_VERSION: &str = "DRAFT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSummary {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDetail {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub default_variant: Option<String>,
    pub customer_encryption_key_arn: Option<String>,
    pub variants: Vec<PromptVariant>,
    pub updated_at: Option<jiff::Timestamp>,
}

impl PromptDetail {
    pub fn first_variant(&self) -> Option<&PromptVariant> {
        self.variants.first()
    }
}

/// One entry of a prompt's version history. Version 0 is the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion {
    pub version: u32,
    pub variant: Option<PromptVariant>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailSummary {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailDetail {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub blocked_input_messaging: String,
    pub blocked_outputs_messaging: String,
    /// Blocked words, empty when the guardrail has no word policy.
    pub words: Vec<String>,
    pub updated_at: Option<jiff::Timestamp>,
}

/// One entry of a guardrail's version history. Version 0 is the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailVersion {
    pub version: u32,
    pub words: Vec<String>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundationModelSummary {
    pub model_id: String,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
}

impl FoundationModelSummary {
    pub fn accepts_images(&self) -> bool {
        self.input_modalities.iter().any(|m| m == "IMAGE")
    }
}
