//! Chat provider traits and message types.
//!
//! The [`ChatProvider`] trait is the capability every LLM vendor adapter
//! implements. Requests and responses use the `OpenAI` chat message shape,
//! which most vendors accept natively.
//!
//! # Providers
//!
//! - [`OllamaProvider`]: `OpenAI`-compatible `/chat/completions` endpoint, with
//!   optional moderation of the prompt before it is sent

pub mod ollama;

pub use ollama::{OllamaModerator, OllamaProvider};

use crate::error::Result;

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Content of the message (text or multimodal parts).
    #[serde(flatten)]
    pub content: MessageContent,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::text(content),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::text(content),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::text(content),
        }
    }
}

/// Message content - either simple text or multimodal parts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content.
    Text { content: String },
    /// Multimodal content with text and image parts.
    Parts { content: Vec<ContentPart> },
}

impl MessageContent {
    /// Create simple text content.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { content: s.into() }
    }

    /// Create multimodal content from parts.
    #[must_use]
    pub fn parts(parts: Vec<ContentPart>) -> Self {
        Self::Parts { content: parts }
    }

    /// Every text fragment of the content, in order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text { content } => vec![content.as_str()],
            Self::Parts { content } => content
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect(),
        }
    }

    /// Get the text content (first text part or entire string).
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.texts().into_iter().next()
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::text("")
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

/// A content part for multimodal messages.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Image content (URL or base64 data URL).
    ImageUrl {
        /// Image URL configuration.
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Create a text content part.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    /// Create an image URL content part.
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }
}

/// Image URL configuration for multimodal content.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageUrl {
    /// Image URL (can be HTTP URL or base64 data URL).
    pub url: String,
    /// Detail level for image processing: "auto", "low", or "high".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// Request to a chat provider.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Overrides the provider's configured model.
    pub model: Option<String>,
    /// Overrides the provider's configured max-token cap.
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// A single user prompt, optionally preceded by a system prompt.
    pub fn prompt(text: impl Into<String>, system: Option<String>) -> Self {
        let messages = system
            .map(Message::system)
            .into_iter()
            .chain(std::iter::once(Message::user(text)))
            .collect();
        Self {
            messages,
            ..Default::default()
        }
    }
}

/// Token accounting reported by the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// A normalized chat completion.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatCompletion {
    pub generated_text: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
    /// The assistant turn, ready to append to the conversation.
    pub message: Message,
    pub original_response: serde_json::Value,
}

/// Trait for chat providers.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync + std::fmt::Debug {
    /// Run one chat completion.
    ///
    /// # Errors
    ///
    /// [`Error::Provider`](crate::Error::Provider) for vendor failures,
    /// [`Error::Moderation`](crate::Error::Moderation) when the prompt is refused.
    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletion>;

    /// Get the provider name for logging and debugging.
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_serializes_flat() {
        let v = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(v, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_parts_message_serializes() {
        let msg = Message {
            role: MessageRole::User,
            content: MessageContent::parts(vec![
                ContentPart::text("describe"),
                ContentPart::image_url("https://x/y.png"),
            ]),
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["content"][0]["type"], "text");
        assert_eq!(v["content"][1]["image_url"]["url"], "https://x/y.png");
        assert_eq!(msg.content.texts(), vec!["describe"]);
    }

    #[test]
    fn test_prompt_request() {
        let req = ChatRequest::prompt("hello", Some("be brief".to_string()));
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, MessageRole::System);
        assert_eq!(req.messages[1].content.as_text(), Some("hello"));

        let req = ChatRequest::prompt("hello", None);
        assert_eq!(req.messages.len(), 1);
    }
}
