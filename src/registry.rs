//! Vendor registry: maps provider identifiers to adapter instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::llm::{ChatProvider, OllamaModerator, OllamaProvider, ollama};
use crate::moderation::Moderator;
use crate::ocr::{Document, DocumentKind, DocumentParser, KlippaParser, ParseResponse};
use crate::video::{GoogleVideoAnalyzer, VideoAnalyzer, google};

/// Adapters indexed by vendor id (`"klippa"`, `"ollama"`, ...).
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    parsers: HashMap<String, Arc<dyn DocumentParser>>,
    chat: HashMap<String, Arc<dyn ChatProvider>>,
    moderators: HashMap<String, Arc<dyn Moderator>>,
    video: HashMap<String, Arc<dyn VideoAnalyzer>>,
}

impl ProviderRegistry {
    /// Build every adapter the configuration has credentials for.
    ///
    /// Klippa requires a subscription key and Google an access token or a
    /// genai key. Ollama is always registered: self-hosted servers usually
    /// run without authentication.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = crate::http::build_client(Duration::from_secs(config.http.timeout_secs))?;
        let moderation_timeout = Duration::from_secs(config.moderation.timeout_secs);
        let moderation_client = crate::http::build_client(moderation_timeout)?;

        let mut registry = Self::default();

        let klippa = KlippaParser::new(config.klippa.clone(), client.clone());
        if klippa.is_configured() {
            tracing::info!(provider = KlippaParser::PROVIDER, "Registered document parser");
            registry.register_parser(KlippaParser::PROVIDER, Arc::new(klippa));
        } else {
            tracing::debug!(
                provider = KlippaParser::PROVIDER,
                "No subscription key, parser not registered"
            );
        }

        let moderator: Arc<dyn Moderator> = Arc::new(OllamaModerator::new(
            config.ollama.clone(),
            moderation_client,
        ));
        let chat = OllamaProvider::new(config.ollama.clone(), client.clone())
            .with_moderator(Arc::clone(&moderator), moderation_timeout);
        tracing::info!(
            provider = ollama::PROVIDER,
            model = %config.ollama.model,
            authenticated = chat.is_configured(),
            "Registered chat provider"
        );
        registry.register_chat(ollama::PROVIDER, Arc::new(chat));
        registry.register_moderator(ollama::PROVIDER, moderator);

        let video = GoogleVideoAnalyzer::new(config.google.clone(), client);
        if video.is_configured() {
            tracing::info!(provider = google::PROVIDER, "Registered video analyzer");
            registry.register_video(google::PROVIDER, Arc::new(video));
        }

        Ok(registry)
    }

    pub fn register_parser(&mut self, id: &str, parser: Arc<dyn DocumentParser>) {
        self.parsers.insert(id.to_string(), parser);
    }

    pub fn register_chat(&mut self, id: &str, provider: Arc<dyn ChatProvider>) {
        self.chat.insert(id.to_string(), provider);
    }

    pub fn register_moderator(&mut self, id: &str, moderator: Arc<dyn Moderator>) {
        self.moderators.insert(id.to_string(), moderator);
    }

    pub fn register_video(&mut self, id: &str, analyzer: Arc<dyn VideoAnalyzer>) {
        self.video.insert(id.to_string(), analyzer);
    }

    pub fn parser(&self, id: &str) -> Result<Arc<dyn DocumentParser>> {
        lookup(&self.parsers, "document parser", id)
    }

    pub fn chat(&self, id: &str) -> Result<Arc<dyn ChatProvider>> {
        lookup(&self.chat, "chat provider", id)
    }

    pub fn moderator(&self, id: &str) -> Result<Arc<dyn Moderator>> {
        lookup(&self.moderators, "moderator", id)
    }

    pub fn video(&self, id: &str) -> Result<Arc<dyn VideoAnalyzer>> {
        lookup(&self.video, "video analyzer", id)
    }

    /// Registered parser ids, sorted.
    pub fn parser_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Parse with the named provider, rejecting kinds it does not handle.
    pub async fn parse(
        &self,
        provider: &str,
        document: Document,
        kind: DocumentKind,
    ) -> Result<ParseResponse> {
        let parser = self.parser(provider)?;
        if !parser.supports(kind) {
            return Err(Error::Configuration(format!(
                "{} does not support {kind} documents",
                parser.provider_name()
            )));
        }
        parser.parse(document, kind).await
    }
}

fn lookup<T: ?Sized>(map: &HashMap<String, Arc<T>>, what: &str, id: &str) -> Result<Arc<T>> {
    map.get(&id.to_lowercase())
        .cloned()
        .ok_or_else(|| Error::Configuration(format!("Unknown {what}: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        GoogleConfig, HttpConfig, KlippaConfig, ModerationConfig, OllamaConfig, StorageConfig,
    };

    fn config(klippa_key: Option<&str>) -> AppConfig {
        AppConfig {
            http: HttpConfig { timeout_secs: 5 },
            keys_file: None,
            klippa: KlippaConfig {
                api_key: klippa_key.map(ToString::to_string),
                ..Default::default()
            },
            ollama: OllamaConfig::default(),
            google: GoogleConfig::default(),
            moderation: ModerationConfig { timeout_secs: 5 },
            storage: StorageConfig::default(),
        }
    }

    #[test]
    fn test_klippa_requires_key() {
        let registry = ProviderRegistry::from_config(&config(None)).unwrap();
        assert!(registry.parser_ids().is_empty());
        assert!(matches!(
            registry.parser("klippa"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_klippa_registered_with_key() {
        let registry = ProviderRegistry::from_config(&config(Some("key"))).unwrap();
        assert_eq!(registry.parser_ids(), vec!["klippa"]);
        assert_eq!(registry.parser("Klippa").unwrap().provider_name(), "Klippa");
    }

    #[test]
    fn test_ollama_always_registered() {
        let registry = ProviderRegistry::from_config(&config(None)).unwrap();
        assert_eq!(registry.chat("ollama").unwrap().provider_name(), "Ollama");
        assert_eq!(registry.moderator("ollama").unwrap().provider_name(), "Ollama");
        assert!(registry.chat("openai").is_err());
    }

    #[test]
    fn test_google_video_requires_credentials() {
        let registry = ProviderRegistry::from_config(&config(None)).unwrap();
        assert!(matches!(registry.video("google"), Err(Error::Configuration(_))));

        let mut cfg = config(None);
        cfg.google.genai_api_key = Some("genai".to_string());
        let registry = ProviderRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.video("Google").unwrap().provider_name(), "Google");
    }
}
