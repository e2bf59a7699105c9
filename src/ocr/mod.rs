//! Document parsing abstraction over vendor OCR APIs.
//!
//! A [`DocumentParser`] sends a file to a vendor endpoint and reshapes the
//! vendor's JSON into one of the canonical [`records`](crate::records).
//!
//! # Providers
//!
//! - [`KlippaParser`] - Klippa custom OCR (invoices, receipts, identity documents, resumes)
//!
//! # Usage
//!
//! ```rust,ignore
//! use provider_bridge::ocr::{Document, DocumentKind, DocumentParser, KlippaParser};
//!
//! let parser = KlippaParser::new(config, http);
//! let document = Document::from_path(Path::new("invoice.pdf")).await?;
//! let response = parser.parse(document, DocumentKind::Invoice).await?;
//! ```

pub mod klippa;
mod provider;

pub use klippa::KlippaParser;
pub use provider::{Document, DocumentKind, DocumentParser, ParseResponse};
