//! Client configuration: region and credential source, turned into an
//! `SdkConfig` and the three Bedrock clients.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{FoundationModelApi, GuardrailApi, PromptApi, RuntimeApi};
use crate::error::BedrockError;

const REGION_ENV: &str = "AWS_REGION";
const PROFILE_ENV: &str = "AWS_PROFILE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Falls back to the SDK's own region resolution when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub credentials: CredentialSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSource {
    Inline {
        access_key_id: String,
        secret_access_key: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        session_token: Option<String>,
    },
    Profile {
        profile_name: String,
    },
    #[default]
    DefaultChain,
}

impl ClientConfig {
    /// Read `AWS_REGION` and `AWS_PROFILE`. Anything else is left to the
    /// SDK's default provider chain.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.is_empty());
        let credentials = match non_empty(PROFILE_ENV) {
            Some(profile_name) => CredentialSource::Profile { profile_name },
            None => CredentialSource::DefaultChain,
        };
        Self {
            region: non_empty(REGION_ENV),
            credentials,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, BedrockError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BedrockError::Config(format!("failed to read config at {}: {e}", path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            BedrockError::Config(format!("invalid config at {}: {e}", path.display()))
        })
    }

    /// Build an `SdkConfig` from the region and credential source.
    pub async fn load(&self) -> aws_config::SdkConfig {
        let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &self.region {
            builder = builder.region(aws_config::Region::new(region.clone()));
        }

        match &self.credentials {
            CredentialSource::Inline {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                builder = builder.credentials_provider(
                    aws_sdk_bedrockagent::config::Credentials::new(
                        access_key_id,
                        secret_access_key,
                        session_token.clone(),
                        None,
                        "snippet-config",
                    ),
                );
            }
            CredentialSource::Profile { profile_name } => {
                builder = builder.profile_name(profile_name);
            }
            CredentialSource::DefaultChain => {}
        }

        let config = builder.load().await;
        info!(
            region = config.region().map(|r| r.as_ref()).unwrap_or("unset"),
            "loaded AWS config"
        );
        config
    }
}

/// The SDK clients behind their API traits.
#[derive(Clone)]
pub struct BedrockClients {
    pub prompts: Arc<dyn PromptApi>,
    pub guardrails: Arc<dyn GuardrailApi>,
    pub models: Arc<dyn FoundationModelApi>,
    pub runtime: Arc<dyn RuntimeApi>,
}

impl BedrockClients {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        let control = Arc::new(aws_sdk_bedrock::Client::new(config));
        Self {
            prompts: Arc::new(aws_sdk_bedrockagent::Client::new(config)),
            guardrails: control.clone(),
            models: control,
            runtime: Arc::new(aws_sdk_bedrockruntime::Client::new(config)),
        }
    }

    pub async fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.load().await)
    }

    pub fn prompt_manager(&self, name: impl Into<String>) -> crate::prompt::PromptManager {
        crate::prompt::PromptManager::new(name, self.prompts.clone())
    }

    pub fn guardrail_manager(&self, name: impl Into<String>) -> crate::guardrail::GuardrailManager {
        crate::guardrail::GuardrailManager::new(name, self.guardrails.clone())
    }

    /// Connect an invoker to the named prompt's draft or `version`.
    pub async fn prompt_invoker(
        &self,
        name: impl Into<String>,
        version: Option<u32>,
    ) -> Result<crate::invoke::PromptInvoker, BedrockError> {
        crate::invoke::PromptInvoker::connect(
            name,
            version,
            self.prompts.clone(),
            self.runtime.clone(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn env_profile_selects_profile_credentials() {
        let env = HashMap::from([
            (REGION_ENV, "us-west-2".to_string()),
            (PROFILE_ENV, "dev".to_string()),
        ]);
        let config = ClientConfig::from_lookup(|key| env.get(key).cloned());
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert!(matches!(
            config.credentials,
            CredentialSource::Profile { ref profile_name } if profile_name == "dev"
        ));
    }

    #[test]
    fn empty_env_uses_default_chain() {
        let env = HashMap::from([(PROFILE_ENV, String::new())]);
        let config = ClientConfig::from_lookup(|key| env.get(key).cloned());
        assert!(config.region.is_none());
        assert!(matches!(config.credentials, CredentialSource::DefaultChain));
    }
}
