//! Conversational content: text blocks, roles, messages, system blocks,
//! input variables, and the Anthropic-native content block used in model
//! invocation bodies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validate::{self, Validate};

/// A text block inside a prompt template message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub text: String,
}

impl ContentBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// System-level instruction text. Structurally identical to
/// [`ContentBlock`] but a separate slot in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemContentBlock {
    pub text: String,
}

impl SystemContentBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Role of a chat message. Parsed case-insensitively, always serialized
/// lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(ValidationError::InvalidRole(value.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role-tagged message. Template messages carry [`ContentBlock`]s;
/// invocation bodies carry [`AnthropicContentBlock`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message<C = ContentBlock> {
    pub role: Role,
    pub content: Vec<C>,
}

/// A message in the model's native request shape.
pub type AnthropicMessage = Message<AnthropicContentBlock>;

impl<C> Message<C> {
    /// Build a message from a free-form role string such as `"USER"`.
    pub fn new(role: &str, content: Vec<C>) -> Result<Self, ValidationError> {
        Ok(Self {
            role: role.parse()?,
            content,
        })
    }

    pub fn user(content: Vec<C>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

impl Message<ContentBlock> {
    /// The text of the first content block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|block| block.text.as_str())
    }
}

/// A named placeholder substituted at invocation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInputVariable {
    pub name: String,
}

impl PromptInputVariable {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self { name: name.into() }.validated()
    }
}

impl Validate for PromptInputVariable {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::NAME.check("inputVariables.name", &self.name)
    }
}

// ── Anthropic-native content ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEncoding {
    #[serde(rename = "base64")]
    Base64,
}

/// Image formats the Anthropic models accept.
///
/// `image/jpg` is accepted on input for compatibility with older payloads;
/// `image/jpeg` is what gets sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMediaType {
    #[serde(rename = "image/jpeg", alias = "image/jpg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
}

impl ImageMediaType {
    /// Map a file extension (without the dot, any case) to a media type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

impl FromStr for ImageMediaType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::Webp),
            "image/gif" => Ok(Self::Gif),
            other => Err(ValidationError::MediaType(other.to_string())),
        }
    }
}

/// Inline base64 image data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub encoding: SourceEncoding,
    pub media_type: ImageMediaType,
    pub data: String,
}

impl ImageSource {
    pub fn base64(media_type: ImageMediaType, data: impl Into<String>) -> Self {
        Self {
            encoding: SourceEncoding::Base64,
            media_type,
            data: data.into(),
        }
    }
}

/// A content block in the Anthropic messages format.
///
/// The pairing of `type` with its payload is enforced on construction and
/// on deserialization: text blocks carry only `text`, image blocks carry
/// only `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContentBlock")]
pub struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ImageSource>,
}

#[derive(Deserialize)]
struct RawContentBlock {
    #[serde(rename = "type")]
    kind: ContentKind,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    source: Option<ImageSource>,
}

impl TryFrom<RawContentBlock> for AnthropicContentBlock {
    type Error = ValidationError;

    fn try_from(raw: RawContentBlock) -> Result<Self, Self::Error> {
        Self::new(raw.kind, raw.text, raw.source)
    }
}

impl AnthropicContentBlock {
    pub fn new(
        kind: ContentKind,
        text: Option<String>,
        source: Option<ImageSource>,
    ) -> Result<Self, ValidationError> {
        let mismatch = |reason| ValidationError::ContentMismatch {
            kind: kind.as_str(),
            reason,
        };
        match kind {
            ContentKind::Text if text.is_none() => return Err(mismatch("requires text")),
            ContentKind::Text if source.is_some() => {
                return Err(mismatch("must not carry an image source"));
            }
            ContentKind::Image if source.is_none() => {
                return Err(mismatch("requires an image source"));
            }
            ContentKind::Image if text.is_some() => return Err(mismatch("must not carry text")),
            _ => {}
        }
        Ok(Self { kind, text, source })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            text: Some(text.into()),
            source: None,
        }
    }

    pub fn from_image(source: ImageSource) -> Self {
        Self {
            kind: ContentKind::Image,
            text: None,
            source: Some(source),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }
}
