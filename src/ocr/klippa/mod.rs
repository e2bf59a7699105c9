//! Klippa custom OCR provider.
//!
//! Every document kind goes to the same `parseDocument` family of endpoints
//! as a multipart upload; identity documents and resumes have their own
//! sub-paths.

pub mod normalize;

use async_trait::async_trait;

use super::provider::{Document, DocumentKind, DocumentParser, ParseResponse};
use crate::config::KlippaConfig;
use crate::error::{Error, Result};
use crate::records::CanonicalRecord;

pub use normalize::{
    join_address, normalize_identity, normalize_invoice, normalize_receipt, normalize_resume,
    split_names,
};

/// Document parser backed by the Klippa OCR API.
#[derive(Debug)]
pub struct KlippaParser {
    client: reqwest::Client,
    config: KlippaConfig,
}

impl KlippaParser {
    /// Vendor identifier used by the registry and the keys file.
    pub const PROVIDER: &'static str = "klippa";

    /// Create a new Klippa parser with the given configuration.
    pub fn new(config: KlippaConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    /// Check if the parser has credentials.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn endpoint(&self, kind: DocumentKind) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match kind {
            DocumentKind::Invoice | DocumentKind::Receipt => format!("{base}/parseDocument"),
            DocumentKind::Identity => format!("{base}/parseDocument/identity"),
            DocumentKind::Resume => format!("{base}/parseDocument/resume"),
        }
    }

    async fn post_document(&self, document: Document, kind: DocumentKind) -> Result<serde_json::Value> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            Error::Configuration("Klippa subscription key not configured".to_string())
        })?;

        let part = reqwest::multipart::Part::bytes(document.bytes)
            .file_name(document.file_name)
            .mime_str(&document.mime_type)?;

        let form = reqwest::multipart::Form::new()
            .part("document", part)
            .text("pdf_text_extraction", "full");

        let response = self
            .client
            .post(self.endpoint(kind))
            .header("X-Auth-Key", api_key)
            .multipart(form)
            .send()
            .await?;

        crate::http::read_json(Self::PROVIDER, response).await
    }
}

#[async_trait]
impl DocumentParser for KlippaParser {
    async fn parse(&self, document: Document, kind: DocumentKind) -> Result<ParseResponse> {
        tracing::info!(
            provider = Self::PROVIDER,
            kind = %kind,
            file_name = %document.file_name,
            size = document.bytes.len(),
            "Parsing document"
        );

        let original_response = self.post_document(document, kind).await?;

        let standardized_response = match kind {
            DocumentKind::Invoice => CanonicalRecord::Invoice(normalize_invoice(&original_response)),
            DocumentKind::Receipt => CanonicalRecord::Receipt(normalize_receipt(&original_response)),
            DocumentKind::Identity => {
                CanonicalRecord::Identity(normalize_identity(&original_response))
            }
            DocumentKind::Resume => CanonicalRecord::Resume(normalize_resume(&original_response)),
        };

        tracing::debug!(provider = Self::PROVIDER, kind = %kind, "Document normalized");

        Ok(ParseResponse {
            original_response,
            standardized_response,
        })
    }

    fn supports(&self, _kind: DocumentKind) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "Klippa"
    }
}
