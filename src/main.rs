//! Provider Bridge command line
//!
//! Entry point for parsing documents, chatting, moderating payloads,
//! analysing videos and uploading files through the configured vendors.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use provider_bridge::config::{AppConfig, Cli, Command};
use provider_bridge::keys::ProviderKeys;
use provider_bridge::llm::ChatRequest;
use provider_bridge::moderation::{ModerationFanOut, ModerationPayload, Outcome};
use provider_bridge::ocr::{Document, DocumentKind};
use provider_bridge::storage::{GcsConnector, ProcessClass, SignedUrlUploader, load_provider_costs};
use provider_bridge::video::{VideoFeature, VideoQuestion};
use provider_bridge::ProviderRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = AppConfig::from_cli(&cli).context("Failed to load configuration")?;
    if let Some(path) = config.keys_file.clone() {
        let keys = ProviderKeys::load(&path)?;
        config.apply_keys(&keys)?;
        info!(name: "keys.loaded", path = %path, "Provider keys loaded");
    }

    info!(
        name: "config.loaded",
        klippa_url = %config.klippa.base_url,
        ollama_url = %config.ollama.base_url,
        model = %config.ollama.model,
        "Configuration loaded"
    );

    let registry = ProviderRegistry::from_config(&config)?;

    match cli.command {
        Command::Parse {
            file,
            kind,
            provider,
            original,
        } => {
            let kind: DocumentKind = kind.parse()?;
            let document = Document::from_path(&file).await?;
            let response = registry.parse(&provider, document, kind).await?;
            if original {
                print_json(&response)?;
            } else {
                print_json(&response.standardized_response)?;
            }
        }
        Command::Chat {
            prompt,
            provider,
            system,
            max_tokens,
        } => {
            let chat = registry.chat(&provider)?;
            let request = ChatRequest {
                max_tokens,
                ..ChatRequest::prompt(prompt, system)
            };
            let completion = chat.chat(request).await?;
            print_json(&completion)?;
        }
        Command::Moderate { payload, provider } => {
            let payload = read_payload(&payload).await?;
            let fan_out = ModerationFanOut::new(registry.moderator(&provider)?).with_timeout(
                std::time::Duration::from_secs(config.moderation.timeout_secs),
            );

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            let report = fan_out.run(&payload, &cancel).await;
            let fields: Vec<FieldReport> = report
                .outcomes
                .iter()
                .map(|(field, outcome)| FieldReport::new(field.to_string(), outcome))
                .collect();
            print_json(&fields)?;
        }
        Command::VideoLaunch {
            input_uri,
            feature,
            provider,
        } => {
            let feature: VideoFeature = feature.parse()?;
            let job_id = registry.video(&provider)?.launch_job(&input_uri, feature).await?;
            println!("{job_id}");
        }
        Command::VideoResult {
            job_id,
            feature,
            provider,
        } => {
            let feature: VideoFeature = feature.parse()?;
            let job = registry.video(&provider)?.job_result(&job_id, feature).await?;
            print_json(&job)?;
        }
        Command::VideoAsk {
            file,
            question,
            provider,
            temperature,
            model,
        } => {
            let question = VideoQuestion {
                text: question,
                video: Document::from_path(&file).await?,
                temperature,
                model,
            };
            let answer = registry.video(&provider)?.question_answer(question).await?;
            print_json(&answer)?;
        }
        Command::Costs => {
            let costs = load_provider_costs(&GcsConnector::new(), &config.storage).await?;
            print_json(&costs)?;
        }
        Command::Upload { file, name, class } => {
            let class: ProcessClass = class.parse()?;
            let name = match name {
                Some(n) => n,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("Upload path has no file name")?,
            };
            let uploader = SignedUrlUploader::gcs(config.storage.clone());
            let url = uploader.upload_path(&file, &name, class).await?;
            println!("{url}");
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

async fn read_payload(path: &Path) -> anyhow::Result<ModerationPayload> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).context("Payload is not a valid request body")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line of `moderate` output.
#[derive(Debug, Serialize)]
struct FieldReport {
    field: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FieldReport {
    fn new(field: String, outcome: &Outcome) -> Self {
        let (status, categories, error) = match outcome {
            Outcome::Clean => ("clean", Vec::new(), None),
            Outcome::Flagged { categories } => ("flagged", categories.clone(), None),
            Outcome::Failed { error } => ("failed", Vec::new(), Some(error.clone())),
        };
        Self {
            field,
            status,
            categories,
            error,
        }
    }
}
