//! Core trait and types for document parsing providers.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::CanonicalRecord;

/// Kind of document a parser is asked to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Receipt,
    Identity,
    Resume,
}

impl DocumentKind {
    pub const ALL: [Self; 4] = [Self::Invoice, Self::Receipt, Self::Identity, Self::Resume];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::Identity => "identity",
            Self::Resume => "resume",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Configuration(format!("Unknown document kind: {s}")))
    }
}

/// An owned document payload ready to be sent to a vendor.
#[derive(Clone)]
pub struct Document {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// File name reported to the vendor.
    pub file_name: String,
    /// MIME type of the file (e.g., "application/pdf").
    pub mime_type: String,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    /// Build a document from in-memory bytes, guessing the MIME type from
    /// the file name.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            bytes: bytes.into(),
            file_name,
            mime_type,
        }
    }

    /// Read a document from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Self::from_bytes(bytes, file_name))
    }
}

/// The vendor's untouched response next to its normalized form.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub original_response: serde_json::Value,
    pub standardized_response: CanonicalRecord,
}

/// Trait for document parsing providers.
///
/// Implementors send a document to a vendor OCR endpoint and normalize the
/// vendor's JSON into a [`CanonicalRecord`] matching the requested kind.
#[async_trait]
pub trait DocumentParser: Send + Sync + fmt::Debug {
    /// Parse a document of the given kind.
    ///
    /// # Errors
    ///
    /// [`Error::Provider`] when the vendor answers with a non-200 status or
    /// an undecodable body, [`Error::Configuration`] for unsupported kinds.
    async fn parse(&self, document: Document, kind: DocumentKind) -> Result<ParseResponse>;

    /// Check if this parser handles the given document kind.
    fn supports(&self, kind: DocumentKind) -> bool;

    /// Get the provider name for logging and debugging.
    fn provider_name(&self) -> &'static str;
}
