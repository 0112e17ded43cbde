//! [`PromptApi`] over `aws_sdk_bedrockagent`.
//!
//! Inherent client methods share names with the trait's; method resolution
//! picks the inherent SDK builders inside these impls.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_bedrockagent::Client;
use aws_sdk_bedrockagent::types as sdk;
use aws_smithy_types::DateTime;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use snippet_core::error::ValidationError;
use snippet_core::models::content::{ContentBlock, Message, PromptInputVariable, SystemContentBlock};
use snippet_core::models::resource::{PromptDetail, PromptSummary};
use snippet_core::models::template::{
    ChatPromptTemplateConfiguration, PromptInferenceConfiguration,
    PromptModelInferenceConfiguration, PromptTemplateConfiguration,
};
use snippet_core::models::variant::{
    PromptAgentResource, PromptGenAiResource, PromptVariant, TOP_K_FIELD, VariantTarget,
};
use snippet_core::requests::prompt::{
    CreatePromptRequest, CreatePromptVersionRequest, UpdatePromptRequest,
};

use super::{required, timestamp};
use crate::api::{BoxFuture, Lookup, PromptApi};
use crate::document;
use crate::error::BedrockError;

impl PromptApi for Client {
    fn list_prompts(&self) -> BoxFuture<'_, Result<Vec<PromptSummary>, BedrockError>> {
        Box::pin(async move {
            let mut prompts = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let resp = self
                    .list_prompts()
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|e| BedrockError::remote("bedrock-agent:ListPrompts", &e))?;

                prompts.extend(resp.prompt_summaries().iter().map(|p| PromptSummary {
                    id: required(p.id()),
                    arn: required(p.arn()),
                    name: required(p.name()),
                    version: required(p.version()),
                }));

                match resp.next_token() {
                    Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                    _ => break,
                }
            }
            debug!(count = prompts.len(), "listed prompts");
            Ok(prompts)
        })
    }

    fn get_prompt<'a>(
        &'a self,
        prompt_identifier: &'a str,
        version: Option<u32>,
    ) -> BoxFuture<'a, Result<Lookup<PromptDetail>, BedrockError>> {
        Box::pin(async move {
            let resp = match self
                .get_prompt()
                .prompt_identifier(prompt_identifier)
                .set_prompt_version(version.map(|v| v.to_string()))
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
                    return Err(BedrockError::remote("bedrock-agent:GetPrompt", &e));
                }
            };

            let variants = resp
                .variants()
                .iter()
                .map(variant_from_sdk)
                .collect::<Result<Vec<_>, _>>()?;
            let updated_at: Option<&DateTime> = Option::from(resp.updated_at());

            Ok(Lookup::Found(PromptDetail {
                id: required(resp.id()),
                arn: required(resp.arn()),
                name: required(resp.name()),
                version: required(resp.version()),
                description: resp.description().map(str::to_string),
                default_variant: resp.default_variant().map(str::to_string),
                customer_encryption_key_arn: resp
                    .customer_encryption_key_arn()
                    .map(str::to_string),
                variants,
                updated_at: timestamp(updated_at),
            }))
        })
    }

    fn create_prompt(
        &self,
        request: CreatePromptRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>> {
        Box::pin(async move {
            let variants = request
                .variants
                .iter()
                .map(variant_to_sdk)
                .collect::<Result<Vec<_>, _>>()?;
            let resp = self
                .create_prompt()
                .name(&request.name)
                .set_description(request.description)
                .set_tags(request.tags.map(hash_tags))
                .set_variants(Some(variants))
                .set_default_variant(request.default_variant)
                .set_customer_encryption_key_arn(request.customer_encryption_key_arn)
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock-agent:CreatePrompt", &e))?;

            Ok(PromptSummary {
                id: required(resp.id()),
                arn: required(resp.arn()),
                name: required(resp.name()),
                version: required(resp.version()),
            })
        })
    }

    fn update_prompt(
        &self,
        request: UpdatePromptRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>> {
        Box::pin(async move {
            let variants = request
                .variants
                .iter()
                .map(variant_to_sdk)
                .collect::<Result<Vec<_>, _>>()?;
            let resp = self
                .update_prompt()
                .prompt_identifier(&request.prompt_identifier)
                .name(&request.name)
                .set_description(request.description)
                .set_variants(Some(variants))
                .set_default_variant(request.default_variant)
                .set_customer_encryption_key_arn(request.customer_encryption_key_arn)
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock-agent:UpdatePrompt", &e))?;

            Ok(PromptSummary {
                id: required(resp.id()),
                arn: required(resp.arn()),
                name: required(resp.name()),
                version: required(resp.version()),
            })
        })
    }

    fn create_prompt_version(
        &self,
        request: CreatePromptVersionRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>> {
        Box::pin(async move {
            let resp = self
                .create_prompt_version()
                .prompt_identifier(&request.prompt_identifier)
                .set_description(request.description)
                .set_tags(request.tags.map(hash_tags))
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock-agent:CreatePromptVersion", &e))?;

            Ok(PromptSummary {
                id: required(resp.id()),
                arn: required(resp.arn()),
                name: required(resp.name()),
                version: required(resp.version()),
            })
        })
    }

    fn delete_prompt<'a>(
        &'a self,
        prompt_identifier: &'a str,
    ) -> BoxFuture<'a, Result<(), BedrockError>> {
        Box::pin(async move {
            self.delete_prompt()
                .prompt_identifier(prompt_identifier)
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock-agent:DeletePrompt", &e))?;
            Ok(())
        })
    }

    fn list_tags<'a>(
        &'a self,
        resource_arn: &'a str,
    ) -> BoxFuture<'a, Result<Lookup<BTreeMap<String, String>>, BedrockError>> {
        Box::pin(async move {
            match self
                .list_tags_for_resource()
                .resource_arn(resource_arn)
                .send()
                .await
            {
                Ok(resp) => Ok(Lookup::Found(
                    resp.tags()
                        .map(|tags| {
                            tags.iter()
                                .map(|(k, v)| (k.clone(), v.clone()))
                                .collect()
                        })
                        .unwrap_or_default(),
                )),
                Err(e) => {
                    let is_not_found = e
                        .as_service_error()
                        .map(|se| se.is_resource_not_found_exception())
                        .unwrap_or(false);
                    if is_not_found {
                        return Ok(Lookup::NotFound);
                    }
                    Err(BedrockError::remote("bedrock-agent:ListTagsForResource", &e))
                }
            }
        })
    }
}

fn hash_tags(tags: BTreeMap<String, String>) -> HashMap<String, String> {
    tags.into_iter().collect()
}

fn build_err(e: impl std::fmt::Display) -> BedrockError {
    BedrockError::Request(e.to_string())
}

// ── SDK → domain ─────────────────────────────────────────────────────────────

fn variant_from_sdk(variant: &sdk::PromptVariant) -> Result<PromptVariant, BedrockError> {
    let chat = match variant.template_configuration() {
        Some(sdk::PromptTemplateConfiguration::Chat(chat)) => chat,
        _ => {
            return Err(ValidationError::TemplateType(
                variant.template_type().as_str().to_string(),
            )
            .into());
        }
    };

    let messages = chat
        .messages()
        .iter()
        .map(|m| {
            let content: Vec<ContentBlock> = m
                .content()
                .iter()
                .filter_map(|block| block.as_text().ok())
                .map(ContentBlock::new)
                .collect();
            Message::new(m.role().as_str(), content)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let system: Vec<SystemContentBlock> = chat
        .system()
        .iter()
        .filter_map(|block| block.as_text().ok())
        .map(SystemContentBlock::new)
        .collect();

    let input_variables = chat
        .input_variables()
        .iter()
        .filter_map(|v| v.name())
        .map(PromptInputVariable::new)
        .collect::<Result<Vec<_>, _>>()?;

    let inference_configuration = variant
        .inference_configuration()
        .and_then(|config| config.as_text().ok())
        .map(|text| {
            let defaults = PromptModelInferenceConfiguration::default();
            PromptInferenceConfiguration {
                text: PromptModelInferenceConfiguration {
                    max_tokens: text
                        .max_tokens()
                        .and_then(|n| u32::try_from(n).ok())
                        .unwrap_or(defaults.max_tokens),
                    stop_sequences: text.stop_sequences().to_vec(),
                    temperature: text.temperature().unwrap_or(defaults.temperature),
                    top_p: text.top_p().unwrap_or(defaults.top_p),
                },
            }
        });

    let additional_model_request_fields: Option<Map<String, Value>> =
        match variant.additional_model_request_fields() {
            Some(fields) => {
                let map = document::document_to_map(fields);
                match &map {
                    None => warn!(
                        variant = variant.name(),
                        "additionalModelRequestFields is not an object; dropped"
                    ),
                    Some(fields) => {
                        if let Some(top_k) = fields.get(TOP_K_FIELD) {
                            if !top_k.is_number() {
                                warn!(
                                    variant = variant.name(),
                                    %top_k,
                                    "top_k is not a number; the stored value is ignored"
                                );
                            }
                        }
                    }
                }
                map
            }
            None => None,
        };

    let gen_ai_resource = variant
        .gen_ai_resource()
        .and_then(|resource| resource.as_agent().ok())
        .map(|agent| PromptGenAiResource {
            agent: PromptAgentResource {
                agent_identifier: agent.agent_identifier().to_string(),
            },
        });

    let variant = PromptVariant::from_parts(
        variant.name().to_string(),
        PromptTemplateConfiguration {
            chat: ChatPromptTemplateConfiguration {
                messages,
                system: (!system.is_empty()).then_some(system),
                input_variables,
            },
        },
        variant.model_id().map(str::to_string),
        gen_ai_resource,
        inference_configuration,
        additional_model_request_fields,
    )?;
    Ok(variant)
}

// ── domain → SDK ─────────────────────────────────────────────────────────────

fn variant_to_sdk(variant: &PromptVariant) -> Result<sdk::PromptVariant, BedrockError> {
    let chat = variant.chat();

    let messages = chat
        .messages
        .iter()
        .map(|m| {
            sdk::Message::builder()
                .role(sdk::ConversationRole::from(m.role.as_str()))
                .set_content(Some(
                    m.content
                        .iter()
                        .map(|block| sdk::ContentBlock::Text(block.text.clone()))
                        .collect(),
                ))
                .build()
                .map_err(build_err)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let system = chat.system.as_ref().map(|blocks| {
        blocks
            .iter()
            .map(|block| sdk::SystemContentBlock::Text(block.text.clone()))
            .collect()
    });

    let input_variables = chat
        .input_variables
        .iter()
        .map(|v| sdk::PromptInputVariable::builder().name(&v.name).build())
        .collect();

    let template = sdk::ChatPromptTemplateConfiguration::builder()
        .set_messages(Some(messages))
        .set_system(system)
        .set_input_variables(Some(input_variables))
        .build()
        .map_err(build_err)?;

    let inference = variant.inference_configuration.as_ref().map(|config| {
        let text = &config.text;
        sdk::PromptInferenceConfiguration::Text(
            sdk::PromptModelInferenceConfiguration::builder()
                .max_tokens(i32::try_from(text.max_tokens).unwrap_or(i32::MAX))
                .set_stop_sequences(Some(text.stop_sequences.clone()))
                .temperature(text.temperature)
                .top_p(text.top_p)
                .build(),
        )
    });

    let (model_id, gen_ai_resource) = match &variant.target {
        VariantTarget::Model(id) => (Some(id.clone()), None),
        VariantTarget::Agent(agent) => {
            let resource = sdk::PromptAgentResource::builder()
                .agent_identifier(&agent.agent_identifier)
                .build()
                .map_err(build_err)?;
            (None, Some(sdk::PromptGenAiResource::Agent(resource)))
        }
    };

    sdk::PromptVariant::builder()
        .name(&variant.name)
        .template_type(sdk::PromptTemplateType::Chat)
        .template_configuration(sdk::PromptTemplateConfiguration::Chat(template))
        .set_model_id(model_id)
        .set_gen_ai_resource(gen_ai_resource)
        .set_inference_configuration(inference)
        .set_additional_model_request_fields(
            variant
                .additional_model_request_fields
                .as_ref()
                .map(document::map_to_document),
        )
        .build()
        .map_err(build_err)
}
