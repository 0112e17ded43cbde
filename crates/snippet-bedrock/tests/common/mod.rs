//! In-memory stand-ins for the Bedrock APIs.
//!
//! Each fake keeps remote state behind a `Mutex` and records the operations
//! it served, so tests can assert both on outcomes and on call order.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use snippet_bedrock::api::{
    BoxFuture, FoundationModelApi, GuardrailApi, Lookup, PromptApi, RuntimeApi,
};
use snippet_bedrock::error::BedrockError;
use snippet_core::models::guardrail::Tag;
use snippet_core::models::resource::{
    DRAFT_VERSION, FoundationModelSummary, GuardrailDetail, GuardrailSummary, PromptDetail,
    PromptSummary,
};
use snippet_core::models::variant::PromptVariant;
use snippet_core::requests::guardrail::{
    CreateGuardrailRequest, CreateGuardrailVersionRequest, UpdateGuardrailRequest,
};
use snippet_core::requests::invoke::InvokeModelRequest;
use snippet_core::requests::prompt::{
    CreatePromptRequest, CreatePromptVersionRequest, UpdatePromptRequest,
};

pub const MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";
const ACCOUNT_PREFIX: &str = "arn:aws:bedrock:us-east-1:123456789012";

// ── Prompts ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakePrompts {
    state: Mutex<PromptState>,
}

#[derive(Default)]
struct PromptState {
    next_id: u32,
    drafts: BTreeMap<String, PromptDetail>,
    versions: BTreeMap<String, Vec<PromptDetail>>,
    tags: BTreeMap<String, BTreeMap<String, String>>,
    calls: Vec<String>,
    last_update: Option<UpdatePromptRequest>,
}

impl FakePrompts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_update(&self) -> Option<UpdatePromptRequest> {
        self.state.lock().unwrap().last_update.clone()
    }

    /// Drop the tag entry of an arn so lookups at it report not-found.
    pub fn forget_tags(&self, arn: &str) {
        self.state.lock().unwrap().tags.remove(arn);
    }
}

/// Variants pass through their wire form, as they would over the network.
fn round_trip(variants: &[PromptVariant]) -> Vec<PromptVariant> {
    let value = serde_json::to_value(variants).unwrap();
    serde_json::from_value(value).unwrap()
}

fn prompt_summary(detail: &PromptDetail) -> PromptSummary {
    PromptSummary {
        id: detail.id.clone(),
        arn: detail.arn.clone(),
        name: detail.name.clone(),
        version: detail.version.clone(),
    }
}

impl PromptApi for FakePrompts {
    fn list_prompts(&self) -> BoxFuture<'_, Result<Vec<PromptSummary>, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push("list_prompts".into());
            Ok(state.drafts.values().map(prompt_summary).collect())
        })
    }

    fn get_prompt<'a>(
        &'a self,
        prompt_identifier: &'a str,
        version: Option<u32>,
    ) -> BoxFuture<'a, Result<Lookup<PromptDetail>, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("get_prompt {prompt_identifier} {version:?}"));
            let found = match version {
                None => state.drafts.get(prompt_identifier).cloned(),
                Some(v) => state
                    .versions
                    .get(prompt_identifier)
                    .and_then(|versions| versions.get(v as usize - 1))
                    .cloned(),
            };
            Ok(found.into())
        })
    }

    fn create_prompt(
        &self,
        request: CreatePromptRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("create_prompt {}", request.name));
            state.next_id += 1;
            let id = format!("PROMPT{:04}", state.next_id);
            let arn = format!("{ACCOUNT_PREFIX}:prompt/{id}");
            let detail = PromptDetail {
                id: id.clone(),
                arn: arn.clone(),
                name: request.name,
                version: DRAFT_VERSION.to_string(),
                description: request.description,
                default_variant: request.default_variant,
                customer_encryption_key_arn: request.customer_encryption_key_arn,
                variants: round_trip(&request.variants),
                updated_at: Some(jiff::Timestamp::now()),
            };
            let summary = prompt_summary(&detail);
            state.tags.insert(arn, request.tags.unwrap_or_default());
            state.drafts.insert(id, detail);
            Ok(summary)
        })
    }

    fn update_prompt(
        &self,
        request: UpdatePromptRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(format!("update_prompt {}", request.prompt_identifier));
            state.last_update = Some(request.clone());
            let draft = state
                .drafts
                .get_mut(&request.prompt_identifier)
                .ok_or_else(|| BedrockError::Remote {
                    operation: "bedrock-agent:UpdatePrompt",
                    message: "ResourceNotFoundException".into(),
                })?;
            draft.name = request.name;
            draft.description = request.description;
            draft.variants = round_trip(&request.variants);
            draft.default_variant = request.default_variant;
            draft.customer_encryption_key_arn = request.customer_encryption_key_arn;
            draft.updated_at = Some(jiff::Timestamp::now());
            Ok(prompt_summary(draft))
        })
    }

    fn create_prompt_version(
        &self,
        request: CreatePromptVersionRequest,
    ) -> BoxFuture<'_, Result<PromptSummary, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(format!("create_prompt_version {}", request.prompt_identifier));
            let draft = state
                .drafts
                .get(&request.prompt_identifier)
                .cloned()
                .ok_or_else(|| BedrockError::Remote {
                    operation: "bedrock-agent:CreatePromptVersion",
                    message: "ResourceNotFoundException".into(),
                })?;
            let versions = state.versions.entry(draft.id.clone()).or_default();
            let number = versions.len() + 1;
            let snapshot = PromptDetail {
                arn: format!("{}:{number}", draft.arn),
                version: number.to_string(),
                description: request.description,
                ..draft
            };
            versions.push(snapshot.clone());
            state
                .tags
                .insert(snapshot.arn.clone(), request.tags.unwrap_or_default());
            Ok(prompt_summary(&snapshot))
        })
    }

    fn delete_prompt<'a>(
        &'a self,
        prompt_identifier: &'a str,
    ) -> BoxFuture<'a, Result<(), BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("delete_prompt {prompt_identifier}"));
            if let Some(draft) = state.drafts.remove(prompt_identifier) {
                state.tags.retain(|arn, _| !arn.starts_with(&draft.arn));
            }
            state.versions.remove(prompt_identifier);
            Ok(())
        })
    }

    fn list_tags<'a>(
        &'a self,
        resource_arn: &'a str,
    ) -> BoxFuture<'a, Result<Lookup<BTreeMap<String, String>>, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("list_tags {resource_arn}"));
            Ok(state.tags.get(resource_arn).cloned().into())
        })
    }
}

// ── Guardrails ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeGuardrails {
    state: Mutex<GuardrailState>,
}

#[derive(Default)]
struct GuardrailState {
    next_id: u32,
    drafts: BTreeMap<String, GuardrailDetail>,
    versions: BTreeMap<String, Vec<GuardrailDetail>>,
    tags: BTreeMap<String, Vec<Tag>>,
    calls: Vec<String>,
    last_create: Option<CreateGuardrailRequest>,
    last_update: Option<UpdateGuardrailRequest>,
}

impl FakeGuardrails {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_create(&self) -> Option<CreateGuardrailRequest> {
        self.state.lock().unwrap().last_create.clone()
    }

    pub fn last_update(&self) -> Option<UpdateGuardrailRequest> {
        self.state.lock().unwrap().last_update.clone()
    }
}

fn guardrail_summary(detail: &GuardrailDetail) -> GuardrailSummary {
    GuardrailSummary {
        id: detail.id.clone(),
        arn: detail.arn.clone(),
        name: detail.name.clone(),
        version: detail.version.clone(),
    }
}

fn words_of(
    config: Option<&snippet_core::models::guardrail::GuardrailWordPolicyConfig>,
) -> Vec<String> {
    config
        .map(|policy| policy.words().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

impl GuardrailApi for FakeGuardrails {
    fn list_guardrails(&self) -> BoxFuture<'_, Result<Vec<GuardrailSummary>, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push("list_guardrails".into());
            Ok(state.drafts.values().map(guardrail_summary).collect())
        })
    }

    fn get_guardrail<'a>(
        &'a self,
        guardrail_identifier: &'a str,
        version: Option<u32>,
    ) -> BoxFuture<'a, Result<Lookup<GuardrailDetail>, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(format!("get_guardrail {guardrail_identifier} {version:?}"));
            let found = match version {
                None => state.drafts.get(guardrail_identifier).cloned(),
                Some(v) => state
                    .versions
                    .get(guardrail_identifier)
                    .and_then(|versions| versions.get(v as usize - 1))
                    .cloned(),
            };
            Ok(found.into())
        })
    }

    fn create_guardrail(
        &self,
        request: CreateGuardrailRequest,
    ) -> BoxFuture<'_, Result<GuardrailSummary, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("create_guardrail {}", request.name));
            state.last_create = Some(request.clone());
            state.next_id += 1;
            let id = format!("gr{:08}", state.next_id);
            let arn = format!("{ACCOUNT_PREFIX}:guardrail/{id}");
            let detail = GuardrailDetail {
                id: id.clone(),
                arn: arn.clone(),
                name: request.name,
                version: DRAFT_VERSION.to_string(),
                description: request.description,
                blocked_input_messaging: request.blocked_input_messaging,
                blocked_outputs_messaging: request.blocked_outputs_messaging,
                words: words_of(request.word_policy_config.as_ref()),
                updated_at: Some(jiff::Timestamp::now()),
            };
            let summary = guardrail_summary(&detail);
            state.tags.insert(arn, request.tags.unwrap_or_default());
            state.drafts.insert(id, detail);
            Ok(summary)
        })
    }

    fn update_guardrail(
        &self,
        request: UpdateGuardrailRequest,
    ) -> BoxFuture<'_, Result<GuardrailSummary, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(format!("update_guardrail {}", request.guardrail_identifier));
            state.last_update = Some(request.clone());
            let draft = state
                .drafts
                .get_mut(&request.guardrail_identifier)
                .ok_or_else(|| BedrockError::Remote {
                    operation: "bedrock:UpdateGuardrail",
                    message: "ResourceNotFoundException".into(),
                })?;
            draft.name = request.name;
            draft.description = request.description;
            draft.blocked_input_messaging = request.blocked_input_messaging;
            draft.blocked_outputs_messaging = request.blocked_outputs_messaging;
            draft.words = words_of(request.word_policy_config.as_ref());
            Ok(guardrail_summary(draft))
        })
    }

    fn create_guardrail_version(
        &self,
        request: CreateGuardrailVersionRequest,
    ) -> BoxFuture<'_, Result<String, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(format!("create_guardrail_version {}", request.guardrail_identifier));
            let draft = state
                .drafts
                .get(&request.guardrail_identifier)
                .cloned()
                .ok_or_else(|| BedrockError::Remote {
                    operation: "bedrock:CreateGuardrailVersion",
                    message: "ResourceNotFoundException".into(),
                })?;
            let versions = state.versions.entry(draft.id.clone()).or_default();
            let number = versions.len() + 1;
            let snapshot = GuardrailDetail {
                version: number.to_string(),
                description: request.description,
                ..draft
            };
            let arn = format!("{}:{number}", snapshot.arn);
            versions.push(snapshot);
            state.tags.insert(arn, Vec::new());
            Ok(number.to_string())
        })
    }

    fn delete_guardrail<'a>(
        &'a self,
        guardrail_identifier: &'a str,
    ) -> BoxFuture<'a, Result<(), BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push(format!("delete_guardrail {guardrail_identifier}"));
            if let Some(draft) = state.drafts.remove(guardrail_identifier) {
                state.tags.retain(|arn, _| !arn.starts_with(&draft.arn));
            }
            state.versions.remove(guardrail_identifier);
            Ok(())
        })
    }

    fn list_tags<'a>(
        &'a self,
        resource_arn: &'a str,
    ) -> BoxFuture<'a, Result<Lookup<Vec<Tag>>, BedrockError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("list_tags {resource_arn}"));
            Ok(state.tags.get(resource_arn).cloned().into())
        })
    }
}

// ── Runtime ──────────────────────────────────────────────────────────────────

pub struct FakeRuntime {
    response: Value,
    requests: Mutex<Vec<InvokeModelRequest>>,
}

impl FakeRuntime {
    /// A runtime that answers every call with an Anthropic-style message
    /// whose only content block is `text`.
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            response: json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "text", "text": text }],
                "stop_reason": "end_turn",
                "usage": { "input_tokens": 12, "output_tokens": 4 }
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<InvokeModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl RuntimeApi for FakeRuntime {
    fn invoke_model(
        &self,
        request: InvokeModelRequest,
    ) -> BoxFuture<'_, Result<Vec<u8>, BedrockError>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request);
            Ok(serde_json::to_vec(&self.response)?)
        })
    }
}

// ── Models ───────────────────────────────────────────────────────────────────

pub struct FakeModels(pub Vec<FoundationModelSummary>);

impl FoundationModelApi for FakeModels {
    fn list_foundation_models(
        &self,
    ) -> BoxFuture<'_, Result<Vec<FoundationModelSummary>, BedrockError>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

pub fn model(model_id: &str, inputs: &[&str]) -> FoundationModelSummary {
    FoundationModelSummary {
        model_id: model_id.to_string(),
        input_modalities: inputs.iter().map(|m| m.to_string()).collect(),
        output_modalities: vec!["TEXT".to_string()],
    }
}
