//! Concurrent content moderation over every text field of a request.
//!
//! A request payload may carry text in several places: a plain prompt, an
//! instruction, a list of texts, a conversation history, chat messages with
//! nested content parts. [`ModerationPayload::fields`] discovers each
//! non-blank one and [`ModerationFanOut::run`] checks them all concurrently.
//!
//! The fan-out is best-effort: every field gets its own [`Outcome`], and a
//! failing check never aborts the others. Callers wanting all-or-nothing
//! semantics use [`ModerationReport::into_result`].

use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_MODERATION_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::json_path::{path_array, path_str};

/// A vendor's judgement on one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub flagged: bool,
    /// Policy categories the text was flagged for.
    pub categories: Vec<String>,
}

/// Trait for content moderation endpoints.
#[async_trait]
pub trait Moderator: Send + Sync + fmt::Debug {
    /// Check a single text fragment.
    async fn check(&self, text: &str) -> Result<Verdict>;

    /// Get the provider name for logging and debugging.
    fn provider_name(&self) -> &'static str;
}

/// Where in the payload a checked text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    Text,
    ChatbotGlobalAction,
    Instruction,
    PreviousHistory(usize),
    Texts(usize),
    Message { message: usize, content: usize },
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::ChatbotGlobalAction => f.write_str("chatbot_global_action"),
            Self::Instruction => f.write_str("instruction"),
            Self::PreviousHistory(i) => write!(f, "previous_history[{i}]"),
            Self::Texts(i) => write!(f, "texts[{i}]"),
            Self::Message { message, content } => {
                write!(f, "messages[{message}].content[{content}]")
            }
        }
    }
}

/// Text-bearing fields of a chat or text-generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModerationPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub chatbot_global_action: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    /// Conversation turns, each an object with a `message`.
    #[serde(default)]
    pub previous_history: Vec<Value>,
    #[serde(default)]
    pub texts: Vec<String>,
    /// Chat messages whose `content` is a list of parts carrying `content.text`.
    #[serde(default)]
    pub messages: Vec<Value>,
}

impl ModerationPayload {
    /// Every non-blank text in the payload, in field order.
    pub fn fields(&self) -> Vec<(FieldId, String)> {
        let mut fields = Vec::new();
        let mut push = |id: FieldId, text: Option<&str>| {
            if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
                fields.push((id, text.to_string()));
            }
        };

        push(FieldId::Text, self.text.as_deref());
        push(FieldId::ChatbotGlobalAction, self.chatbot_global_action.as_deref());
        push(FieldId::Instruction, self.instruction.as_deref());

        for (i, item) in self.previous_history.iter().enumerate() {
            push(FieldId::PreviousHistory(i), path_str(item, &["message"]).as_deref());
        }

        for (i, text) in self.texts.iter().enumerate() {
            push(FieldId::Texts(i), Some(text));
        }

        for (message, item) in self.messages.iter().enumerate() {
            for (content, part) in path_array(item, &["content"]).iter().enumerate() {
                push(
                    FieldId::Message { message, content },
                    path_str(part, &["content", "text"]).as_deref(),
                );
            }
        }

        fields
    }
}

/// Result of moderating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Flagged { categories: Vec<String> },
    Failed { error: String },
}

impl From<Result<Verdict>> for Outcome {
    fn from(result: Result<Verdict>) -> Self {
        match result {
            Ok(v) if v.flagged => Self::Flagged {
                categories: v.categories,
            },
            Ok(_) => Self::Clean,
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Per-field outcomes of a fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModerationReport {
    pub outcomes: BTreeMap<FieldId, Outcome>,
}

impl ModerationReport {
    pub fn is_clean(&self) -> bool {
        self.outcomes.values().all(|o| *o == Outcome::Clean)
    }

    pub fn get(&self, field: FieldId) -> Option<&Outcome> {
        self.outcomes.get(&field)
    }

    pub fn flagged(&self) -> impl Iterator<Item = (&FieldId, &Vec<String>)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            Outcome::Flagged { categories } => Some((id, categories)),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&FieldId, &str)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            Outcome::Failed { error } => Some((id, error.as_str())),
            _ => None,
        })
    }

    /// All-or-nothing view: the first flagged or failed field, in field
    /// order, becomes an [`Error::Moderation`].
    pub fn into_result(self) -> Result<Self> {
        let first_problem = self.outcomes.iter().find_map(|(id, o)| match o {
            Outcome::Clean => None,
            Outcome::Flagged { categories } => Some(format!(
                "{id} flagged for: {}",
                if categories.is_empty() {
                    "unspecified policy".to_string()
                } else {
                    categories.join(", ")
                }
            )),
            Outcome::Failed { error } => Some(format!("{id} could not be checked: {error}")),
        });

        match first_problem {
            Some(msg) => Err(Error::Moderation(msg)),
            None => Ok(self),
        }
    }
}

/// Runs one moderation check per payload field, concurrently.
#[derive(Debug, Clone)]
pub struct ModerationFanOut {
    moderator: Arc<dyn Moderator>,
    timeout: Duration,
}

impl ModerationFanOut {
    pub fn new(moderator: Arc<dyn Moderator>) -> Self {
        Self {
            moderator,
            timeout: Duration::from_secs(DEFAULT_MODERATION_TIMEOUT_SECS),
        }
    }

    /// Per-check timeout; a check exceeding it reports [`Outcome::Failed`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check every field and wait for all checks to finish.
    ///
    /// Cancelling `cancel` aborts the checks still in flight; their fields
    /// report [`Outcome::Failed`].
    pub async fn run(
        &self,
        payload: &ModerationPayload,
        cancel: &CancellationToken,
    ) -> ModerationReport {
        let fields = payload.fields();
        let provider = self.moderator.provider_name();

        tracing::info!(
            provider = provider,
            field_count = fields.len(),
            "Starting moderation fan-out"
        );

        let mut tasks = JoinSet::new();
        for (field, text) in fields {
            let moderator = Arc::clone(&self.moderator);
            let cancel = cancel.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let check = AssertUnwindSafe(tokio::time::timeout(timeout, moderator.check(&text)))
                    .catch_unwind();

                let outcome = tokio::select! {
                    () = cancel.cancelled() => Outcome::Failed { error: "cancelled".to_string() },
                    result = check => match result {
                        Ok(Ok(verdict)) => Outcome::from(verdict),
                        Ok(Err(_)) => Outcome::Failed {
                            error: format!("timed out after {}s", timeout.as_secs_f64()),
                        },
                        Err(_) => Outcome::Failed { error: "moderation check panicked".to_string() },
                    },
                };
                (field, outcome)
            });
        }

        let mut report = ModerationReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((field, outcome)) => {
                    match &outcome {
                        Outcome::Clean => tracing::debug!(field = %field, "Field is clean"),
                        Outcome::Flagged { categories } => tracing::warn!(
                            field = %field,
                            categories = ?categories,
                            "Field flagged by moderation"
                        ),
                        Outcome::Failed { error } => tracing::warn!(
                            field = %field,
                            error = %error,
                            "Moderation check failed"
                        ),
                    }
                    report.outcomes.insert(field, outcome);
                }
                Err(e) => tracing::error!(error = %e, "Moderation task did not complete"),
            }
        }

        tracing::info!(
            provider = provider,
            clean = report.is_clean(),
            "Moderation fan-out finished"
        );
        report
    }
}

/// Moderate every field of `payload` with the default per-check timeout.
pub async fn moderate(
    moderator: Arc<dyn Moderator>,
    payload: &ModerationPayload,
    cancel: &CancellationToken,
) -> ModerationReport {
    ModerationFanOut::new(moderator).run(payload, cancel).await
}
