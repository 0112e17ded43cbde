//! Integration tests against real Bedrock.
//!
//! These tests create, invoke and delete real resources. They need valid
//! credentials in the environment (e.g. `AWS_PROFILE` or
//! `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`) and access to the Claude 3
//! Haiku model in `us-east-1`.
//!
//! Run with: `cargo test -p snippet-bedrock --test live -- --ignored --test-threads=1`

use std::collections::HashMap;

use snippet_bedrock::catalog::multimodal_models;
use snippet_bedrock::{
    BedrockClients, ClientConfig, CredentialSource, NewGuardrail, NewPrompt, ResponseMode,
};
use snippet_core::requests::invoke::GuardrailAttachment;

const MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

async fn clients() -> BedrockClients {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let config = ClientConfig {
        region: Some("us-east-1".into()),
        ..ClientConfig::from_env()
    };
    if let CredentialSource::Profile { profile_name } = &config.credentials {
        println!("using profile {profile_name}");
    }
    BedrockClients::from_config(&config).await
}

#[tokio::test]
#[ignore]
async fn haiku_accepts_images() {
    let clients = clients().await;
    let models = multimodal_models(clients.models.as_ref()).await.unwrap();
    for m in &models {
        println!("  {} in={:?}", m.model_id, m.input_modalities);
    }
    assert!(models.iter().any(|m| m.model_id == MODEL_ID));
}

#[tokio::test]
#[ignore]
async fn prompt_lifecycle_with_guardrail() {
    let clients = clients().await;
    let prompts = clients.prompt_manager("snippet-live-test-prompt");
    let guardrails = clients.guardrail_manager("snippet-live-test-guardrail");

    if prompts.is_created().await.unwrap() {
        prompts.delete().await.unwrap();
    }
    if guardrails.is_created().await.unwrap() {
        guardrails.delete().await.unwrap();
    }

    prompts
        .create(NewPrompt {
            input_variables: vec!["name".into()],
            ..NewPrompt::new(
                MODEL_ID,
                "You are a helpful assistant that greets the user.",
                "Say hello to {{name}} in one short sentence.",
            )
        })
        .await
        .unwrap();
    guardrails
        .create(NewGuardrail::new(
            "Sorry, I can't answer that.",
            "Sorry, the response was blocked.",
            vec!["foo".into()],
        ))
        .await
        .unwrap();
    let guardrail_id = guardrails.id().await.unwrap();

    let invoker = clients
        .prompt_invoker("snippet-live-test-prompt", None)
        .await
        .unwrap();
    let output = invoker
        .invoke_text(
            &HashMap::from([("name".to_string(), "Bedrock".to_string())]),
            ResponseMode::ResultOnly,
            Some(GuardrailAttachment::draft(guardrail_id)),
        )
        .await;

    // Clean up before asserting so a failed invocation doesn't leak resources.
    prompts.delete().await.unwrap();
    guardrails.delete().await.unwrap();

    let output = output.unwrap();
    println!("response: {:?}", output.text());
    assert!(output.text().is_some_and(|text| !text.is_empty()));
}
