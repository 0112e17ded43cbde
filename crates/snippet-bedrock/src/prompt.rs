//! Lifecycle of one named managed prompt.
//!
//! A [`PromptManager`] is bound to a prompt name, not an id: every call that
//! needs the id resolves it from a fresh listing, so a prompt deleted and
//! recreated under the same name is picked up without rebuilding the manager.
//!
//! Updates always rewrite the draft. The draft is fetched, the caller's
//! [`PromptChanges`] are laid over its first variant, and the merged variant
//! is submitted as the prompt's only variant under the default variant name.
//! Fetch-merge-submit is not transactional; concurrent writers to the same
//! prompt race.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use snippet_core::error::ValidationError;
use snippet_core::models::content::{ContentBlock, Message, PromptInputVariable, SystemContentBlock};
use snippet_core::models::resource::{PromptDetail, PromptSummary, PromptVersion};
use snippet_core::models::template::{
    ChatPromptTemplateConfiguration, DEFAULT_MAX_TOKENS, PromptInferenceConfiguration,
    PromptModelInferenceConfiguration, PromptTemplateConfiguration,
};
use snippet_core::models::variant::{PromptVariant, TOP_K_FIELD, VariantTarget, top_k_fields};
use snippet_core::requests::prompt::{
    CreatePromptRequest, CreatePromptVersionRequest, UpdatePromptRequest,
};
use snippet_core::validate::Validate;

use crate::api::{Lookup, PromptApi, versioned_arn};
use crate::error::{BedrockError, ResourceKind};

/// `top_k` written into new prompts when the caller doesn't choose one.
pub const DEFAULT_PROMPT_TOP_K: u32 = 15;

/// Everything needed to create a prompt with a single chat variant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrompt {
    pub model_id: String,
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub description: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub stop_sequences: Vec<String>,
    pub input_variables: Vec<String>,
    pub tags: Option<BTreeMap<String, String>>,
    pub customer_encryption_key_arn: Option<String>,
}

impl NewPrompt {
    pub fn new(
        model_id: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            system_prompt: Some(system_prompt.into()),
            user_prompt: user_prompt.into(),
            description: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 1.0,
            top_p: 1.0,
            top_k: DEFAULT_PROMPT_TOP_K,
            stop_sequences: Vec::new(),
            input_variables: Vec::new(),
            tags: None,
            customer_encryption_key_arn: None,
        }
    }
}

/// Fields to override on update. `None` keeps the draft's current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptChanges {
    pub model_id: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop_sequences: Option<Vec<String>>,
    pub input_variables: Option<Vec<String>>,
}

pub struct PromptManager {
    name: String,
    default_variant: String,
    api: Arc<dyn PromptApi>,
}

impl PromptManager {
    pub fn new(name: impl Into<String>, api: Arc<dyn PromptApi>) -> Self {
        let name = name.into();
        Self {
            default_variant: format!("{name}-variant"),
            name,
            api,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_variant(&self) -> &str {
        &self.default_variant
    }

    async fn find(&self) -> Result<Option<PromptSummary>, BedrockError> {
        let prompts = self.api.list_prompts().await?;
        Ok(prompts.into_iter().find(|p| p.name == self.name))
    }

    /// The prompt's id, resolved by exact name match.
    pub async fn id(&self) -> Result<String, BedrockError> {
        self.find()
            .await?
            .map(|p| p.id)
            .ok_or_else(|| self.not_found())
    }

    pub async fn is_created(&self) -> Result<bool, BedrockError> {
        Ok(self.find().await?.is_some())
    }

    pub async fn create(&self, prompt: NewPrompt) -> Result<PromptSummary, BedrockError> {
        if self.is_created().await? {
            return Err(BedrockError::AlreadyExists {
                kind: ResourceKind::Prompt,
                name: self.name.clone(),
            });
        }

        let template = ChatPromptTemplateConfiguration::single_turn(
            prompt.system_prompt.as_deref(),
            &prompt.user_prompt,
            &prompt.input_variables,
        )?;
        let inference = PromptModelInferenceConfiguration::new(
            prompt.max_tokens,
            prompt.temperature,
            prompt.top_p,
            prompt.stop_sequences,
        )?;
        let variant = self.variant(
            template,
            VariantTarget::Model(prompt.model_id),
            inference,
            top_k_fields(prompt.top_k),
        )?;

        let request = CreatePromptRequest {
            name: self.name.clone(),
            description: prompt.description,
            tags: prompt.tags,
            variants: vec![variant],
            default_variant: Some(self.default_variant.clone()),
            customer_encryption_key_arn: prompt.customer_encryption_key_arn,
        }
        .validated()?;

        let summary = self.api.create_prompt(request).await?;
        info!(prompt = %self.name, id = %summary.id, "created prompt");
        Ok(summary)
    }

    /// Snapshot the draft as a new numbered version.
    ///
    /// Without a `description` the draft's description is carried over.
    pub async fn create_version(
        &self,
        description: Option<String>,
        tags: Option<BTreeMap<String, String>>,
    ) -> Result<PromptSummary, BedrockError> {
        let id = self.id().await?;
        let draft = self.fetch(&id, None).await?;

        let request = CreatePromptVersionRequest {
            prompt_identifier: id,
            description: description.or(draft.description),
            tags,
        }
        .validated()?;

        let summary = self.api.create_prompt_version(request).await?;
        info!(prompt = %self.name, version = %summary.version, "created prompt version");
        Ok(summary)
    }

    /// The draft when `version` is `None`, otherwise numbered version `version`.
    pub async fn get(&self, version: Option<u32>) -> Result<PromptDetail, BedrockError> {
        if version == Some(0) {
            return Err(BedrockError::InvalidVersion {
                kind: ResourceKind::Prompt,
            });
        }
        let id = self.id().await?;
        self.fetch(&id, version).await
    }

    /// Every version from the draft (0) upwards, with its variant and tags.
    ///
    /// Versions are read in order until the remote reports one missing.
    pub async fn list_versions(&self) -> Result<Vec<PromptVersion>, BedrockError> {
        let id = self.id().await?;
        let draft = self.fetch(&id, None).await?;

        let mut versions = Vec::new();
        for version in 0u32.. {
            let (arn, lookup) = if version == 0 {
                (draft.arn.clone(), None)
            } else {
                (versioned_arn(&draft.arn, version), Some(version))
            };

            let Lookup::Found(tags) = self.api.list_tags(&arn).await? else {
                debug!(prompt = %self.name, version, "no tags; version scan finished");
                break;
            };
            let Lookup::Found(detail) = self.api.get_prompt(&id, lookup).await? else {
                debug!(prompt = %self.name, version, "no prompt; version scan finished");
                break;
            };

            versions.push(PromptVersion {
                version,
                variant: detail.variants.into_iter().next(),
                tags,
            });
        }

        info!(prompt = %self.name, count = versions.len(), "listed prompt versions");
        Ok(versions)
    }

    /// Lay `changes` over the draft's first variant and submit the result.
    pub async fn update(&self, changes: PromptChanges) -> Result<PromptSummary, BedrockError> {
        let id = self.id().await?;
        let draft = self.fetch(&id, None).await?;
        let current = draft
            .first_variant()
            .ok_or(ValidationError::EmptyTemplate("variants"))?;

        // Untouched parts of the template are carried over verbatim.
        let chat = current.chat();
        let message = match changes.user_prompt {
            Some(text) => Message::user(vec![ContentBlock::new(text)]),
            None => chat
                .first_message()
                .cloned()
                .ok_or(ValidationError::EmptyTemplate("messages"))?,
        };
        let system = match changes.system_prompt {
            Some(text) => Some(vec![SystemContentBlock::new(text)]),
            None => chat.system.clone(),
        };
        let input_variables = match changes.input_variables {
            Some(names) => names
                .iter()
                .map(PromptInputVariable::new)
                .collect::<Result<_, _>>()?,
            None => chat.input_variables.clone(),
        };
        let template = ChatPromptTemplateConfiguration {
            messages: vec![message],
            system,
            input_variables,
        }
        .validated()?;

        let target = match changes.model_id {
            Some(model_id) => VariantTarget::Model(model_id),
            None => current.target.clone(),
        };

        let base = current
            .inference_configuration
            .as_ref()
            .map(|config| config.text.clone())
            .unwrap_or_default();
        let inference = PromptModelInferenceConfiguration::new(
            changes.max_tokens.unwrap_or(base.max_tokens),
            changes.temperature.unwrap_or(base.temperature),
            changes.top_p.unwrap_or(base.top_p),
            changes.stop_sequences.unwrap_or(base.stop_sequences),
        )?;

        let mut additional = current
            .additional_model_request_fields
            .clone()
            .unwrap_or_default();
        if let Some(top_k) = changes.top_k {
            additional.insert(TOP_K_FIELD.to_string(), Value::from(top_k));
        }

        let variant = self.variant(template, target, inference, additional)?;
        let request = UpdatePromptRequest {
            prompt_identifier: id,
            name: self.name.clone(),
            description: changes.description.or(draft.description),
            variants: vec![variant],
            default_variant: Some(self.default_variant.clone()),
            customer_encryption_key_arn: draft.customer_encryption_key_arn,
        }
        .validated()?;

        let summary = self.api.update_prompt(request).await?;
        info!(prompt = %self.name, id = %summary.id, "updated prompt");
        Ok(summary)
    }

    pub async fn delete(&self) -> Result<(), BedrockError> {
        let id = self.id().await?;
        self.api.delete_prompt(&id).await?;
        info!(prompt = %self.name, id = %id, "deleted prompt");
        Ok(())
    }

    async fn fetch(&self, id: &str, version: Option<u32>) -> Result<PromptDetail, BedrockError> {
        match self.api.get_prompt(id, version).await? {
            Lookup::Found(detail) => Ok(detail),
            Lookup::NotFound => Err(match version {
                Some(version) => BedrockError::VersionNotFound {
                    kind: ResourceKind::Prompt,
                    name: self.name.clone(),
                    version,
                },
                None => self.not_found(),
            }),
        }
    }

    fn variant(
        &self,
        template: ChatPromptTemplateConfiguration,
        target: VariantTarget,
        inference: PromptModelInferenceConfiguration,
        additional: serde_json::Map<String, Value>,
    ) -> Result<PromptVariant, BedrockError> {
        let variant = PromptVariant {
            name: self.default_variant.clone(),
            template_configuration: PromptTemplateConfiguration { chat: template },
            target,
            inference_configuration: Some(PromptInferenceConfiguration { text: inference }),
            additional_model_request_fields: Some(additional),
        }
        .validated()?;
        Ok(variant)
    }

    fn not_found(&self) -> BedrockError {
        BedrockError::NotFound {
            kind: ResourceKind::Prompt,
            name: self.name.clone(),
        }
    }
}
