//! Prompt variants: one named configuration of a prompt.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::template::{
    ChatPromptTemplateConfiguration, PromptInferenceConfiguration, PromptTemplateConfiguration,
};
use crate::validate::{self, Validate};

/// The only template type this crate produces.
pub const TEMPLATE_TYPE_CHAT: &str = "CHAT";

/// Well-known key in `additionalModelRequestFields` carrying top-k sampling.
pub const TOP_K_FIELD: &str = "top_k";

/// Upper bound Anthropic models accept for `top_k`.
pub const MAX_TOP_K: u32 = 500;

pub const MAX_MODEL_ID_LEN: usize = 2048;

/// An agent alias the prompt is delegated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptAgentResource {
    pub agent_identifier: String,
}

impl PromptAgentResource {
    pub fn new(agent_identifier: impl Into<String>) -> Result<Self, ValidationError> {
        Self {
            agent_identifier: agent_identifier.into(),
        }
        .validated()
    }
}

impl Validate for PromptAgentResource {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::AGENT_ALIAS_ARN.check("agentIdentifier", &self.agent_identifier)
    }
}

/// Wire wrapper for the delegated resource (`genAiResource.agent`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptGenAiResource {
    pub agent: PromptAgentResource,
}

/// What a variant runs against: a foundation model or a delegated agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantTarget {
    Model(String),
    Agent(PromptAgentResource),
}

impl VariantTarget {
    pub fn model_id(&self) -> Option<&str> {
        match self {
            Self::Model(id) => Some(id),
            Self::Agent(_) => None,
        }
    }
}

impl Validate for VariantTarget {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Model(id) => {
                validate::check_chars("modelId", id, 1, MAX_MODEL_ID_LEN)?;
                validate::MODEL_ID.check("modelId", id)
            }
            Self::Agent(agent) => agent.validate(),
        }
    }
}

/// One named configuration of a prompt.
///
/// On the wire the target is two optional fields, `modelId` and
/// `genAiResource`; deserialization rejects payloads that set both or
/// neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PromptVariantWire", into = "PromptVariantWire")]
pub struct PromptVariant {
    pub name: String,
    pub template_configuration: PromptTemplateConfiguration,
    pub target: VariantTarget,
    pub inference_configuration: Option<PromptInferenceConfiguration>,
    pub additional_model_request_fields: Option<Map<String, Value>>,
}

impl PromptVariant {
    /// Assemble a variant from the wire's two optional target fields.
    pub fn from_parts(
        name: String,
        template_configuration: PromptTemplateConfiguration,
        model_id: Option<String>,
        gen_ai_resource: Option<PromptGenAiResource>,
        inference_configuration: Option<PromptInferenceConfiguration>,
        additional_model_request_fields: Option<Map<String, Value>>,
    ) -> Result<Self, ValidationError> {
        let target = match (model_id, gen_ai_resource) {
            (Some(model_id), None) => VariantTarget::Model(model_id),
            (None, Some(resource)) => VariantTarget::Agent(resource.agent),
            (Some(_), Some(_)) => return Err(ValidationError::ConflictingTarget(name)),
            (None, None) => return Err(ValidationError::MissingTarget(name)),
        };
        Self {
            name,
            template_configuration,
            target,
            inference_configuration,
            additional_model_request_fields,
        }
        .validated()
    }

    pub fn chat(&self) -> &ChatPromptTemplateConfiguration {
        &self.template_configuration.chat
    }

    pub fn model_id(&self) -> Option<&str> {
        self.target.model_id()
    }

    /// `top_k` from the additional request fields, when it is a whole
    /// number. Prompts edited in the console may carry it as a float (`15.0`).
    pub fn top_k(&self) -> Option<u64> {
        let value = self.additional_model_request_fields.as_ref()?.get(TOP_K_FIELD)?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|n| n.fract() == 0.0 && *n >= 0.0)
                .map(|n| n as u64)
        })
    }
}

impl Validate for PromptVariant {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::NAME.check("variant name", &self.name)?;
        self.target.validate()?;
        self.template_configuration.validate()?;
        self.inference_configuration.validate()?;
        check_top_k(self.additional_model_request_fields.as_ref())
    }
}

/// A numeric `top_k` must be a whole number in `1..=MAX_TOP_K`. Other
/// value types are left to the model; the map is otherwise free-form.
fn check_top_k(fields: Option<&Map<String, Value>>) -> Result<(), ValidationError> {
    let Some(top_k) = fields.and_then(|f| f.get(TOP_K_FIELD)).and_then(Value::as_f64) else {
        return Ok(());
    };
    if top_k.fract() != 0.0 {
        return Err(ValidationError::NotWhole {
            field: TOP_K_FIELD,
            actual: top_k,
        });
    }
    validate::check_range(TOP_K_FIELD, top_k, 1.0, MAX_TOP_K.into())
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptVariantWire {
    name: String,
    #[serde(default = "chat_template_type")]
    template_type: String,
    template_configuration: PromptTemplateConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gen_ai_resource: Option<PromptGenAiResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inference_configuration: Option<PromptInferenceConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    additional_model_request_fields: Option<Map<String, Value>>,
}

fn chat_template_type() -> String {
    TEMPLATE_TYPE_CHAT.to_string()
}

impl TryFrom<PromptVariantWire> for PromptVariant {
    type Error = ValidationError;

    fn try_from(wire: PromptVariantWire) -> Result<Self, Self::Error> {
        if !wire.template_type.eq_ignore_ascii_case(TEMPLATE_TYPE_CHAT) {
            return Err(ValidationError::TemplateType(wire.template_type));
        }
        Self::from_parts(
            wire.name,
            wire.template_configuration,
            wire.model_id,
            wire.gen_ai_resource,
            wire.inference_configuration,
            wire.additional_model_request_fields,
        )
    }
}

impl From<PromptVariant> for PromptVariantWire {
    fn from(variant: PromptVariant) -> Self {
        let (model_id, gen_ai_resource) = match variant.target {
            VariantTarget::Model(id) => (Some(id), None),
            VariantTarget::Agent(agent) => (None, Some(PromptGenAiResource { agent })),
        };
        Self {
            name: variant.name,
            template_type: chat_template_type(),
            template_configuration: variant.template_configuration,
            model_id,
            gen_ai_resource,
            inference_configuration: variant.inference_configuration,
            additional_model_request_fields: variant.additional_model_request_fields,
        }
    }
}

/// Additional request fields carrying only `top_k`.
pub fn top_k_fields(top_k: u32) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(TOP_K_FIELD.to_string(), Value::from(top_k));
    fields
}
