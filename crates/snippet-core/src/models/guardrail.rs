use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validate::{self, Validate};

pub const MAX_BLOCKED_WORDS: usize = 10_000;

/// A key/value tag attached to a guardrail or prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, ValidationError> {
        Self {
            key: key.into(),
            value: value.into(),
        }
        .validated()
    }
}

impl Validate for Tag {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::check_chars("tag key", &self.key, 1, 128)?;
        validate::TAG.check("tag key", &self.key)?;
        validate::check_chars("tag value", &self.value, 0, 256)?;
        validate::TAG.check("tag value", &self.value)
    }
}

/// A single word the guardrail blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailWordConfig {
    pub text: String,
}

impl Validate for GuardrailWordConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::check_chars("blocked word", &self.text, 1, 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailWordPolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words_config: Option<Vec<GuardrailWordConfig>>,
}

impl GuardrailWordPolicyConfig {
    /// Build a blocklist policy from plain words.
    pub fn from_words<I, S>(words: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words_config = words
            .into_iter()
            .map(|word| GuardrailWordConfig { text: word.into() })
            .collect();
        Self {
            words_config: Some(words_config),
        }
        .validated()
    }

    pub fn words(&self) -> Vec<&str> {
        self.words_config
            .iter()
            .flatten()
            .map(|word| word.text.as_str())
            .collect()
    }
}

impl Validate for GuardrailWordPolicyConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(words) = &self.words_config {
            validate::check_items("wordsConfig", words, 1, MAX_BLOCKED_WORDS)?;
            words.validate()?;
        }
        Ok(())
    }
}

/// Validate a plain tag map the way [`Tag`] validates a single pair.
pub fn validate_tag_map<'a, I>(tags: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    tags.into_iter().try_for_each(|(key, value)| {
        Tag {
            key: key.clone(),
            value: value.clone(),
        }
        .validate()
    })
}
