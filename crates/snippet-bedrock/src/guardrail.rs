//! Lifecycle of one named guardrail with a word blocklist.

use std::sync::Arc;

use tracing::{debug, info};

use snippet_core::models::guardrail::{GuardrailWordPolicyConfig, Tag};
use snippet_core::models::resource::{GuardrailDetail, GuardrailSummary, GuardrailVersion};
use snippet_core::requests::guardrail::{
    CreateGuardrailRequest, CreateGuardrailVersionRequest, UpdateGuardrailRequest,
};
use snippet_core::validate::Validate;

use crate::api::{GuardrailApi, Lookup, versioned_arn};
use crate::error::{BedrockError, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuardrail {
    pub description: Option<String>,
    pub blocked_input_message: String,
    pub blocked_output_message: String,
    pub restricted_words: Vec<String>,
    pub tags: Option<Vec<Tag>>,
}

impl NewGuardrail {
    pub fn new(
        blocked_input_message: impl Into<String>,
        blocked_output_message: impl Into<String>,
        restricted_words: Vec<String>,
    ) -> Self {
        Self {
            description: None,
            blocked_input_message: blocked_input_message.into(),
            blocked_output_message: blocked_output_message.into(),
            restricted_words,
            tags: None,
        }
    }
}

/// Fields to override on update. `None` keeps the draft's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardrailChanges {
    pub description: Option<String>,
    pub blocked_input_message: Option<String>,
    pub blocked_output_message: Option<String>,
    pub restricted_words: Option<Vec<String>>,
}

pub struct GuardrailManager {
    name: String,
    api: Arc<dyn GuardrailApi>,
}

impl GuardrailManager {
    pub fn new(name: impl Into<String>, api: Arc<dyn GuardrailApi>) -> Self {
        Self {
            name: name.into(),
            api,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self) -> Result<Option<GuardrailSummary>, BedrockError> {
        let guardrails = self.api.list_guardrails().await?;
        Ok(guardrails.into_iter().find(|g| g.name == self.name))
    }

    pub async fn id(&self) -> Result<String, BedrockError> {
        self.find()
            .await?
            .map(|g| g.id)
            .ok_or_else(|| self.not_found())
    }

    pub async fn is_created(&self) -> Result<bool, BedrockError> {
        Ok(self.find().await?.is_some())
    }

    pub async fn create(&self, guardrail: NewGuardrail) -> Result<GuardrailSummary, BedrockError> {
        if self.is_created().await? {
            return Err(BedrockError::AlreadyExists {
                kind: ResourceKind::Guardrail,
                name: self.name.clone(),
            });
        }

        let word_count = guardrail.restricted_words.len();
        let request = CreateGuardrailRequest {
            name: self.name.clone(),
            description: guardrail.description,
            blocked_input_messaging: guardrail.blocked_input_message,
            blocked_outputs_messaging: guardrail.blocked_output_message,
            tags: guardrail.tags,
            word_policy_config: word_policy(guardrail.restricted_words)?,
        }
        .validated()?;

        let summary = self.api.create_guardrail(request).await?;
        info!(guardrail = %self.name, id = %summary.id, words = word_count, "created guardrail");
        Ok(summary)
    }

    /// Snapshot the draft as a new numbered version and return its number.
    ///
    /// Without a `description` the draft's description is carried over.
    pub async fn create_version(
        &self,
        description: Option<String>,
    ) -> Result<String, BedrockError> {
        let id = self.id().await?;
        let draft = self.fetch(&id, None).await?;

        let request = CreateGuardrailVersionRequest {
            guardrail_identifier: id,
            description: description.or(draft.description),
        }
        .validated()?;

        let version = self.api.create_guardrail_version(request).await?;
        info!(guardrail = %self.name, version = %version, "created guardrail version");
        Ok(version)
    }

    pub async fn get(&self, version: Option<u32>) -> Result<GuardrailDetail, BedrockError> {
        if version == Some(0) {
            return Err(BedrockError::InvalidVersion {
                kind: ResourceKind::Guardrail,
            });
        }
        let id = self.id().await?;
        self.fetch(&id, version).await
    }

    /// Every version from the draft (0) upwards, with its words and tags.
    ///
    /// Tags are looked up at `{arn}` for the draft and `{arn}:{version}`
    /// after that; the first missing lookup ends the scan.
    pub async fn list_versions(&self) -> Result<Vec<GuardrailVersion>, BedrockError> {
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
                debug!(guardrail = %self.name, version, "no tags; version scan finished");
                break;
            };
            let Lookup::Found(detail) = self.api.get_guardrail(&id, lookup).await? else {
                debug!(guardrail = %self.name, version, "no guardrail; version scan finished");
                break;
            };

            versions.push(GuardrailVersion {
                version,
                words: detail.words,
                tags,
            });
        }

        info!(guardrail = %self.name, count = versions.len(), "listed guardrail versions");
        Ok(versions)
    }

    /// Lay `changes` over the draft and submit the result. The current word
    /// list is reused when no replacement is given.
    pub async fn update(
        &self,
        changes: GuardrailChanges,
    ) -> Result<GuardrailSummary, BedrockError> {
        let id = self.id().await?;
        let draft = self.fetch(&id, None).await?;

        let words = changes.restricted_words.unwrap_or(draft.words);
        let word_count = words.len();
        let request = UpdateGuardrailRequest {
            guardrail_identifier: id,
            name: self.name.clone(),
            description: changes.description.or(draft.description),
            blocked_input_messaging: changes
                .blocked_input_message
                .unwrap_or(draft.blocked_input_messaging),
            blocked_outputs_messaging: changes
                .blocked_output_message
                .unwrap_or(draft.blocked_outputs_messaging),
            word_policy_config: word_policy(words)?,
        }
        .validated()?;

        let summary = self.api.update_guardrail(request).await?;
        info!(guardrail = %self.name, id = %summary.id, words = word_count, "updated guardrail");
        Ok(summary)
    }

    pub async fn delete(&self) -> Result<(), BedrockError> {
        let id = self.id().await?;
        self.api.delete_guardrail(&id).await?;
        info!(guardrail = %self.name, id = %id, "deleted guardrail");
        Ok(())
    }

    async fn fetch(&self, id: &str, version: Option<u32>) -> Result<GuardrailDetail, BedrockError> {
        match self.api.get_guardrail(id, version).await? {
            Lookup::Found(detail) => Ok(detail),
            Lookup::NotFound => Err(match version {
                Some(version) => BedrockError::VersionNotFound {
                    kind: ResourceKind::Guardrail,
                    name: self.name.clone(),
                    version,
                },
                None => self.not_found(),
            }),
        }
    }

    fn not_found(&self) -> BedrockError {
        BedrockError::NotFound {
            kind: ResourceKind::Guardrail,
            name: self.name.clone(),
        }
    }
}

/// An empty word list means no word policy at all.
fn word_policy(words: Vec<String>) -> Result<Option<GuardrailWordPolicyConfig>, BedrockError> {
    if words.is_empty() {
        return Ok(None);
    }
    Ok(Some(GuardrailWordPolicyConfig::from_words(words)?))
}
