mod common;

use std::sync::Arc;

use snippet_bedrock::error::{BedrockError, ErrorKind, ResourceKind};
use snippet_bedrock::{GuardrailChanges, GuardrailManager, NewGuardrail};
use snippet_core::models::guardrail::Tag;

use common::FakeGuardrails;

fn manager(api: &Arc<FakeGuardrails>) -> GuardrailManager {
    GuardrailManager::new("test-guardrail", api.clone())
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

async fn create_blocklist(guardrails: &GuardrailManager) {
    guardrails
        .create(NewGuardrail {
            description: Some("dummy guardrail".into()),
            tags: Some(vec![Tag::new("team", "nlp").unwrap()]),
            ..NewGuardrail::new(
                "Sorry, I can't answer that.",
                "Sorry, the response was blocked.",
                words(&["foo", "bar"]),
            )
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn create_builds_word_policy_and_tags() {
    let api = FakeGuardrails::new();
    let guardrails = manager(&api);
    create_blocklist(&guardrails).await;

    let request = api.last_create().unwrap();
    let policy = request.word_policy_config.unwrap();
    assert_eq!(policy.words(), ["foo", "bar"]);
    assert_eq!(request.tags.unwrap()[0].key, "team");

    let draft = guardrails.get(None).await.unwrap();
    assert_eq!(draft.words, words(&["foo", "bar"]));
    assert_eq!(draft.blocked_input_messaging, "Sorry, I can't answer that.");
}

#[tokio::test]
async fn create_without_words_sends_no_policy() {
    let api = FakeGuardrails::new();
    manager(&api)
        .create(NewGuardrail::new("blocked", "blocked", Vec::new()))
        .await
        .unwrap();
    assert!(api.last_create().unwrap().word_policy_config.is_none());
}

#[tokio::test]
async fn create_rejects_existing_name() {
    let api = FakeGuardrails::new();
    let guardrails = manager(&api);
    create_blocklist(&guardrails).await;

    let err = guardrails
        .create(NewGuardrail::new("a", "b", words(&["baz"])))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BedrockError::AlreadyExists { kind: ResourceKind::Guardrail, .. }
    ));
}

#[tokio::test]
async fn create_rejects_overlong_word() {
    let api = FakeGuardrails::new();
    let err = manager(&api)
        .create(NewGuardrail::new("a", "b", vec!["x".repeat(101)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(api.last_create().is_none());
}

#[tokio::test]
async fn update_reuses_words_when_not_replaced() {
    let api = FakeGuardrails::new();
    let guardrails = manager(&api);
    create_blocklist(&guardrails).await;

    guardrails
        .update(GuardrailChanges {
            blocked_input_message: Some("Input blocked.".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let update = api.last_update().unwrap();
    assert_eq!(update.word_policy_config.unwrap().words(), ["foo", "bar"]);
    assert_eq!(update.blocked_input_messaging, "Input blocked.");
    assert_eq!(update.blocked_outputs_messaging, "Sorry, the response was blocked.");
    assert_eq!(update.description.as_deref(), Some("dummy guardrail"));

    guardrails
        .update(GuardrailChanges {
            restricted_words: Some(words(&["qux"])),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(guardrails.get(None).await.unwrap().words, words(&["qux"]));
}

#[tokio::test]
async fn versions_carry_their_own_words() {
    let api = FakeGuardrails::new();
    let guardrails = manager(&api);
    create_blocklist(&guardrails).await;

    assert_eq!(guardrails.create_version(None).await.unwrap(), "1");
    guardrails
        .update(GuardrailChanges {
            restricted_words: Some(words(&["qux"])),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        guardrails
            .create_version(Some("second".into()))
            .await
            .unwrap(),
        "2"
    );

    let versions = guardrails.list_versions().await.unwrap();
    assert_eq!(versions.len(), 3);
    assert_eq!(versions[0].tags, vec![Tag::new("team", "nlp").unwrap()]);
    assert_eq!(versions[1].words, words(&["foo", "bar"]));
    assert_eq!(versions[2].words, words(&["qux"]));

    let id = guardrails.id().await.unwrap();
    let arn = guardrails.get(None).await.unwrap().arn;
    assert!(api.calls().contains(&format!("list_tags {arn}:3")));
    assert!(api.calls().contains(&format!("get_guardrail {id} Some(2)")));

    assert_eq!(
        guardrails.get(Some(2)).await.unwrap().description.as_deref(),
        Some("second")
    );
    assert_eq!(
        guardrails.get(Some(1)).await.unwrap().description.as_deref(),
        Some("dummy guardrail")
    );
}

#[tokio::test]
async fn get_and_delete() {
    let api = FakeGuardrails::new();
    let guardrails = manager(&api);

    assert!(matches!(
        guardrails.get(None).await,
        Err(BedrockError::NotFound { kind: ResourceKind::Guardrail, .. })
    ));
    create_blocklist(&guardrails).await;
    assert!(matches!(
        guardrails.get(Some(0)).await,
        Err(BedrockError::InvalidVersion { .. })
    ));
    assert!(guardrails.is_created().await.unwrap());

    guardrails.delete().await.unwrap();
    assert!(!guardrails.is_created().await.unwrap());
}
