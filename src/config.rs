use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::keys::ProviderKeys;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Provider keys file (JSON object keyed by provider name)
    #[arg(long, env = "PROVIDER_KEYS_FILE", global = true)]
    pub keys_file: Option<String>,

    /// Vendor request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a document with an OCR provider and print the normalized record
    Parse {
        /// Document to parse
        file: PathBuf,
        /// Document kind: invoice, receipt, identity or resume
        #[arg(long, default_value = "invoice")]
        kind: String,
        /// Provider to use
        #[arg(long, default_value = "klippa")]
        provider: String,
        /// Also print the vendor's original response
        #[arg(long)]
        original: bool,
    },
    /// Send a prompt to a chat provider
    Chat {
        /// Prompt text
        prompt: String,
        /// Provider to use
        #[arg(long, default_value = "ollama")]
        provider: String,
        /// Optional system prompt
        #[arg(long)]
        system: Option<String>,
        /// Override the configured max-token cap
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    /// Run moderation checks over every text field of a JSON payload
    Moderate {
        /// JSON payload file
        payload: PathBuf,
        /// Provider to use
        #[arg(long, default_value = "ollama")]
        provider: String,
    },
    /// Start a video analysis job and print its job id
    VideoLaunch {
        /// Bucket URI of the video (gs://bucket/object)
        input_uri: String,
        /// Feature, e.g. label_detection or shot_change_detection
        #[arg(long)]
        feature: String,
        /// Provider to use
        #[arg(long, default_value = "google")]
        provider: String,
    },
    /// Fetch the state of a video analysis job
    VideoResult {
        /// Job id returned by video-launch
        job_id: String,
        /// Feature the job was launched with
        #[arg(long)]
        feature: String,
        /// Provider to use
        #[arg(long, default_value = "google")]
        provider: String,
    },
    /// Ask a question about a short video
    VideoAsk {
        /// Video file
        file: PathBuf,
        /// Question text
        question: String,
        /// Provider to use
        #[arg(long, default_value = "google")]
        provider: String,
        /// Sampling temperature
        #[arg(long, default_value_t = 0.0)]
        temperature: f64,
        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the provider cost sheet
    Costs,
    /// Upload a file and print a signed URL
    Upload {
        /// File to upload
        file: PathBuf,
        /// Object name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Process class: provider (short-lived URL) or user (long-lived URL)
        #[arg(long, default_value = "provider")]
        class: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub keys_file: Option<String>,
    pub klippa: KlippaConfig,
    pub ollama: OllamaConfig,
    pub google: GoogleConfig,
    pub moderation: ModerationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

/// Klippa OCR configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct KlippaConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for KlippaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_KLIPPA_URL.to_string(),
            api_key: None,
        }
    }
}

/// Ollama (OpenAI-compatible) chat and moderation configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub org_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub moderation_enabled: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            api_key: None,
            org_key: None,
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            moderation_enabled: true,
        }
    }
}

/// Google video analysis configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    pub video_base_url: String,
    pub genai_base_url: String,
    /// OAuth access token for the Video Intelligence API.
    pub access_token: Option<String>,
    pub genai_api_key: Option<String>,
    pub genai_model: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            video_base_url: DEFAULT_GOOGLE_VIDEO_URL.to_string(),
            genai_base_url: DEFAULT_GOOGLE_GENAI_URL.to_string(),
            access_token: None,
            genai_api_key: None,
            genai_model: DEFAULT_GOOGLE_GENAI_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModerationConfig {
    /// Per-check request timeout.
    pub timeout_secs: u64,
}

/// Buckets and signed URL lifetimes per process class.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub provider_bucket: String,
    pub user_bucket: String,
    pub short_lived_secs: u64,
    pub long_lived_secs: u64,
    /// Bucket holding the provider cost sheet.
    pub cost_bucket: String,
    pub cost_object: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider_bucket: String::new(),
            user_bucket: String::new(),
            short_lived_secs: URL_SHORT_PERIOD_SECS,
            long_lived_secs: URL_LONG_PERIOD_SECS,
            cost_bucket: DEFAULT_COST_BUCKET.to_string(),
            cost_object: DEFAULT_COST_OBJECT.to_string(),
        }
    }
}

pub const DEFAULT_KLIPPA_URL: &str = "https://custom-ocr.klippa.com/api/v1";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";
pub const DEFAULT_MAX_TOKENS: u32 = 270;
pub const DEFAULT_GOOGLE_VIDEO_URL: &str = "https://videointelligence.googleapis.com/v1";
pub const DEFAULT_GOOGLE_GENAI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GOOGLE_GENAI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MODERATION_TIMEOUT_SECS: u64 = 30;
pub const URL_SHORT_PERIOD_SECS: u64 = 3600;
pub const URL_LONG_PERIOD_SECS: u64 = 3600 * 24 * 7;
pub const DEFAULT_COST_BUCKET: &str = "providers-cost";
pub const DEFAULT_COST_OBJECT: &str = "providers_cost_master.json";

impl AppConfig {
    /// Load configuration with no explicit file or CLI overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(None, None)
    }

    /// Load configuration for a parsed command line.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut cfg = Self::load_with(cli.config.as_deref(), cli.timeout_secs)?;
        if let Some(keys_file) = &cli.keys_file {
            cfg.keys_file = Some(keys_file.clone());
        }
        Ok(cfg)
    }

    /// Priority: CLI flag > environment (`BRIDGE_` prefix) > config file > defaults.
    pub fn load_with(
        config_file: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("http.timeout_secs", DEFAULT_HTTP_TIMEOUT_SECS)?
            .set_default("klippa.base_url", DEFAULT_KLIPPA_URL)?
            .set_default("ollama.base_url", DEFAULT_OLLAMA_URL)?
            .set_default("ollama.model", DEFAULT_OLLAMA_MODEL)?
            .set_default("ollama.max_tokens", DEFAULT_MAX_TOKENS)?
            .set_default("ollama.moderation_enabled", true)?
            .set_default("google.video_base_url", DEFAULT_GOOGLE_VIDEO_URL)?
            .set_default("google.genai_base_url", DEFAULT_GOOGLE_GENAI_URL)?
            .set_default("google.genai_model", DEFAULT_GOOGLE_GENAI_MODEL)?
            .set_default("moderation.timeout_secs", DEFAULT_MODERATION_TIMEOUT_SECS)?
            .set_default("storage.provider_bucket", "")?
            .set_default("storage.user_bucket", "")?
            .set_default("storage.short_lived_secs", URL_SHORT_PERIOD_SECS)?
            .set_default("storage.long_lived_secs", URL_LONG_PERIOD_SECS)?
            .set_default("storage.cost_bucket", DEFAULT_COST_BUCKET)?
            .set_default("storage.cost_object", DEFAULT_COST_OBJECT)?;

        // 2. Config file: explicit path, else ./config.yaml when present
        match config_file {
            Some(path) => builder = builder.add_source(File::with_name(path)),
            None if Path::new("config.yaml").exists() => {
                builder = builder.add_source(File::with_name("config.yaml"));
            }
            None => {}
        }

        // 3. Environment, e.g. BRIDGE_OLLAMA__MAX_TOKENS=512
        // Values stay strings so keys like "0123" survive; typed fields
        // are converted on deserialization.
        builder = builder.add_source(
            Environment::with_prefix("BRIDGE")
                .prefix_separator("_")
                .separator("__"),
        );

        // 4. CLI overrides
        if let Some(timeout) = timeout_secs {
            builder = builder.set_override("http.timeout_secs", timeout)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Fill in credentials the config does not already carry from a keys file.
    pub fn apply_keys(&mut self, keys: &ProviderKeys) -> crate::Result<()> {
        if self.klippa.api_key.is_none() && keys.contains("klippa") {
            let settings = keys.settings("klippa", &["subscription_key"])?;
            self.klippa.api_key = settings.get("subscription_key").cloned();
        }

        if self.ollama.api_key.is_none() && keys.contains("ollama") {
            let settings = keys.settings("ollama", &["api_key", "org_key"])?;
            self.ollama.api_key = settings.get("api_key").cloned();
            self.ollama.org_key = settings.get("org_key").cloned();
        }

        if self.google.genai_api_key.is_none() && keys.contains("google") {
            let settings = keys.settings("google", &["genai_api_key"])?;
            self.google.genai_api_key = settings.get("genai_api_key").cloned();
            if self.google.access_token.is_none() {
                self.google.access_token = settings.get("access_token").cloned();
            }
        }

        Ok(())
    }
}
