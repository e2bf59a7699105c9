//! Ollama chat and moderation over its `OpenAI`-compatible API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::{ChatCompletion, ChatProvider, ChatRequest, Message, Usage};
use crate::config::OllamaConfig;
use crate::error::Result;
use crate::json_path::{first, path, path_str};
use crate::moderation::{ModerationFanOut, ModerationPayload, Moderator, Verdict};

/// Vendor identifier used by the registry and the keys file.
pub const PROVIDER: &str = "ollama";

/// Authenticated request builder shared by chat and moderation.
#[derive(Debug, Clone)]
struct OllamaHttp {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaHttp {
    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));
        let mut rb = self.client.post(url);
        if let Some(key) = &self.config.api_key {
            rb = rb.bearer_auth(key);
        }
        if let Some(org) = &self.config.org_key {
            rb = rb.header("OpenAI-Organization", org);
        }
        rb
    }
}

/// Moderation checks against `{base_url}/moderations`.
#[derive(Debug, Clone)]
pub struct OllamaModerator {
    http: OllamaHttp,
}

impl OllamaModerator {
    pub fn new(config: OllamaConfig, client: reqwest::Client) -> Self {
        Self {
            http: OllamaHttp { client, config },
        }
    }
}

#[async_trait]
impl Moderator for OllamaModerator {
    async fn check(&self, text: &str) -> Result<Verdict> {
        let response = self
            .http
            .post("moderations")
            .json(&json!({ "input": text }))
            .send()
            .await?;
        let body = crate::http::read_json(PROVIDER, response).await?;
        Ok(parse_verdict(&body))
    }

    fn provider_name(&self) -> &'static str {
        "Ollama"
    }
}

fn parse_verdict(body: &Value) -> Verdict {
    let result = first(body, &["results"]);

    let categories = path(result, &["categories"])
        .and_then(Value::as_object)
        .map(|cats| {
            cats.iter()
                .filter(|(_, flagged)| flagged.as_bool() == Some(true))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default();

    Verdict {
        flagged: path(result, &["flagged"]).and_then(Value::as_bool) == Some(true),
        categories,
    }
}

/// Chat provider backed by an Ollama server.
#[derive(Debug)]
pub struct OllamaProvider {
    http: OllamaHttp,
    moderation: ModerationFanOut,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig, client: reqwest::Client) -> Self {
        let moderator = Arc::new(OllamaModerator::new(config.clone(), client.clone()));
        Self {
            http: OllamaHttp { client, config },
            moderation: ModerationFanOut::new(moderator),
        }
    }

    /// Replace the moderator used to screen prompts.
    #[must_use]
    pub fn with_moderator(mut self, moderator: Arc<dyn Moderator>, timeout: Duration) -> Self {
        self.moderation = ModerationFanOut::new(moderator).with_timeout(timeout);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.http.config.api_key.is_some()
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.http.config.model),
            "messages": request.messages,
            "max_tokens": request.max_tokens.unwrap_or(self.http.config.max_tokens),
        });
        if let Some(t) = request.temperature {
            body["temperature"] = json!(t);
        }
        body
    }

    async fn screen(&self, request: &ChatRequest) -> Result<()> {
        let payload = ModerationPayload {
            texts: request
                .messages
                .iter()
                .flat_map(|m| m.content.texts())
                .map(ToString::to_string)
                .collect(),
            ..Default::default()
        };
        self.moderation
            .run(&payload, &CancellationToken::new())
            .await
            .into_result()
            .map(drop)
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletion> {
        if self.http.config.moderation_enabled {
            self.screen(&request).await?;
        }

        let body = self.request_body(&request);
        tracing::info!(
            provider = PROVIDER,
            model = %body["model"],
            message_count = request.messages.len(),
            max_tokens = %body["max_tokens"],
            "Sending chat request"
        );

        let response = self.http.post("chat/completions").json(&body).send().await?;
        let original_response = crate::http::read_json(PROVIDER, response).await?;
        Ok(parse_completion(original_response))
    }

    fn provider_name(&self) -> &'static str {
        "Ollama"
    }
}

fn parse_completion(original_response: Value) -> ChatCompletion {
    let choice = first(&original_response, &["choices"]);

    let generated_text = path_str(choice, &["message", "content"]).unwrap_or_default();
    let count = |key: &str| path(&original_response, &["usage", key]).and_then(Value::as_u64);

    ChatCompletion {
        finish_reason: path_str(choice, &["finish_reason"]),
        usage: Usage {
            prompt_tokens: count("prompt_tokens"),
            completion_tokens: count("completion_tokens"),
            total_tokens: count("total_tokens"),
        },
        message: Message::assistant(generated_text.as_str()),
        generated_text,
        original_response,
    }
}
