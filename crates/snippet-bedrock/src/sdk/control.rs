//! [`GuardrailApi`] and [`FoundationModelApi`] over `aws_sdk_bedrock`.

use aws_sdk_bedrock::Client;
use aws_sdk_bedrock::types as sdk;
use aws_smithy_types::DateTime;
use tracing::debug;

use snippet_core::models::guardrail::{GuardrailWordPolicyConfig, Tag};
use snippet_core::models::resource::{FoundationModelSummary, GuardrailDetail, GuardrailSummary};
use snippet_core::requests::guardrail::{
    CreateGuardrailRequest, CreateGuardrailVersionRequest, UpdateGuardrailRequest,
};

use super::{required, timestamp};
use crate::api::{BoxFuture, FoundationModelApi, GuardrailApi, Lookup};
use crate::error::BedrockError;

impl GuardrailApi for Client {
    fn list_guardrails(&self) -> BoxFuture<'_, Result<Vec<GuardrailSummary>, BedrockError>> {
        Box::pin(async move {
            let mut guardrails = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let resp = self
                    .list_guardrails()
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|e| BedrockError::remote("bedrock:ListGuardrails", &e))?;

                guardrails.extend(resp.guardrails().iter().map(|g| GuardrailSummary {
                    id: required(g.id()),
                    arn: required(g.arn()),
                    name: required(g.name()),
                    version: required(g.version()),
                }));

                match resp.next_token() {
                    Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                    _ => break,
                }
            }
            debug!(count = guardrails.len(), "listed guardrails");
            Ok(guardrails)
        })
    }

    fn get_guardrail<'a>(
        &'a self,
        guardrail_identifier: &'a str,
        version: Option<u32>,
    ) -> BoxFuture<'a, Result<Lookup<GuardrailDetail>, BedrockError>> {
        Box::pin(async move {
            let resp = match self
                .get_guardrail()
                .guardrail_identifier(guardrail_identifier)
                .set_guardrail_version(version.map(|v| v.to_string()))
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    let is_not_found = e
                        .as_service_error()
                        .map(|se| se.is_resource_not_found_exception())
                        .unwrap_or(false);
                    if is_not_found {
                        return Ok(Lookup::NotFound);
                    }
                    return Err(BedrockError::remote("bedrock:GetGuardrail", &e));
                }
            };

            let words = resp
                .word_policy()
                .map(|policy| {
                    policy
                        .words()
                        .iter()
                        .map(|word| word.text().to_string())
                        .collect()
                })
                .unwrap_or_default();
            let updated_at: Option<&DateTime> = Option::from(resp.updated_at());

            Ok(Lookup::Found(GuardrailDetail {
                id: required(resp.guardrail_id()),
                arn: required(resp.guardrail_arn()),
                name: required(resp.name()),
                version: required(resp.version()),
                description: resp.description().map(str::to_string),
                blocked_input_messaging: required(resp.blocked_input_messaging()),
                blocked_outputs_messaging: required(resp.blocked_outputs_messaging()),
                words,
                updated_at: timestamp(updated_at),
            }))
        })
    }

    fn create_guardrail(
        &self,
        request: CreateGuardrailRequest,
    ) -> BoxFuture<'_, Result<GuardrailSummary, BedrockError>> {
        Box::pin(async move {
            let tags = request
                .tags
                .as_deref()
                .map(|tags| tags.iter().map(tag_to_sdk).collect::<Result<Vec<_>, _>>())
                .transpose()?;
            let word_policy = request
                .word_policy_config
                .as_ref()
                .map(word_policy_to_sdk)
                .transpose()?;

            let resp = self
                .create_guardrail()
                .name(&request.name)
                .set_description(request.description)
                .blocked_input_messaging(request.blocked_input_messaging)
                .blocked_outputs_messaging(request.blocked_outputs_messaging)
                .set_tags(tags)
                .set_word_policy_config(word_policy)
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock:CreateGuardrail", &e))?;

            Ok(GuardrailSummary {
                id: required(resp.guardrail_id()),
                arn: required(resp.guardrail_arn()),
                name: request.name,
                version: required(resp.version()),
            })
        })
    }

    fn update_guardrail(
        &self,
        request: UpdateGuardrailRequest,
    ) -> BoxFuture<'_, Result<GuardrailSummary, BedrockError>> {
        Box::pin(async move {
            let word_policy = request
                .word_policy_config
                .as_ref()
                .map(word_policy_to_sdk)
                .transpose()?;

            let resp = self
                .update_guardrail()
                .guardrail_identifier(&request.guardrail_identifier)
                .name(&request.name)
                .set_description(request.description)
                .blocked_input_messaging(request.blocked_input_messaging)
                .blocked_outputs_messaging(request.blocked_outputs_messaging)
                .set_word_policy_config(word_policy)
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock:UpdateGuardrail", &e))?;

            Ok(GuardrailSummary {
                id: required(resp.guardrail_id()),
                arn: required(resp.guardrail_arn()),
                name: request.name,
                version: required(resp.version()),
            })
        })
    }

    fn create_guardrail_version(
        &self,
        request: CreateGuardrailVersionRequest,
    ) -> BoxFuture<'_, Result<String, BedrockError>> {
        Box::pin(async move {
            let resp = self
                .create_guardrail_version()
                .guardrail_identifier(&request.guardrail_identifier)
                .set_description(request.description)
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock:CreateGuardrailVersion", &e))?;
            Ok(required(resp.version()))
        })
    }

    fn delete_guardrail<'a>(
        &'a self,
        guardrail_identifier: &'a str,
    ) -> BoxFuture<'a, Result<(), BedrockError>> {
        Box::pin(async move {
            self.delete_guardrail()
                .guardrail_identifier(guardrail_identifier)
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock:DeleteGuardrail", &e))?;
            Ok(())
        })
    }

    fn list_tags<'a>(
        &'a self,
        resource_arn: &'a str,
    ) -> BoxFuture<'a, Result<Lookup<Vec<Tag>>, BedrockError>> {
        Box::pin(async move {
            match self
                .list_tags_for_resource()
                .resource_arn(resource_arn)
                .send()
                .await
            {
                Ok(resp) => Ok(Lookup::Found(
                    resp.tags()
                        .iter()
                        .map(|tag| Tag {
                            key: tag.key().to_string(),
                            value: tag.value().to_string(),
                        })
                        .collect(),
                )),
                Err(e) => {
                    let is_not_found = e
                        .as_service_error()
                        .map(|se| se.is_resource_not_found_exception())
                        .unwrap_or(false);
                    if is_not_found {
                        return Ok(Lookup::NotFound);
                    }
                    Err(BedrockError::remote("bedrock:ListTagsForResource", &e))
                }
            }
        })
    }
}

impl FoundationModelApi for Client {
    fn list_foundation_models(
        &self,
    ) -> BoxFuture<'_, Result<Vec<FoundationModelSummary>, BedrockError>> {
        Box::pin(async move {
            let resp = self
                .list_foundation_models()
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock:ListFoundationModels", &e))?;

            Ok(resp
                .model_summaries()
                .iter()
                .map(|m| FoundationModelSummary {
                    model_id: m.model_id().to_string(),
                    input_modalities: m
                        .input_modalities()
                        .iter()
                        .map(|modality| modality.as_str().to_string())
                        .collect(),
                    output_modalities: m
                        .output_modalities()
                        .iter()
                        .map(|modality| modality.as_str().to_string())
                        .collect(),
                })
                .collect())
        })
    }
}

fn tag_to_sdk(tag: &Tag) -> Result<sdk::Tag, BedrockError> {
    sdk::Tag::builder()
        .key(&tag.key)
        .value(&tag.value)
        .build()
        .map_err(|e| BedrockError::Request(e.to_string()))
}

fn word_policy_to_sdk(
    policy: &GuardrailWordPolicyConfig,
) -> Result<sdk::GuardrailWordPolicyConfig, BedrockError> {
    let words = policy
        .words()
        .into_iter()
        .map(|word| {
            sdk::GuardrailWordConfig::builder()
                .text(word)
                .build()
                .map_err(|e| BedrockError::Request(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sdk::GuardrailWordPolicyConfig::builder()
        .set_words_config(Some(words))
        .build())
}
