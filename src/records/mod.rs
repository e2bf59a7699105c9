//! Provider-agnostic output schema.
//!
//! Every vendor response is reshaped into one of these records. All fields
//! are optional (or possibly-empty lists) because any vendor may omit any
//! field; a record is produced once per request and handed to the caller.
//!
//! # Records
//!
//! - [`InvoiceRecord`] - customer, merchant, bank, tax and line-item details
//! - [`ReceiptRecord`] - like an invoice, minus bank details, plus payment info
//! - [`IdentityRecord`] - identity document fields with per-field confidence
//! - [`ResumeRecord`] - personal info, education, work experience, interests
//! - [`VideoRecord`] - finished video analysis jobs, one variant per feature

mod country;
mod date;
mod identity;
mod invoice;
mod receipt;
mod resume;
mod video;

pub use country::{CountryInfo, CountryKey, country_info};
pub use date::{DATE_FORMAT, format_date, parse_date};
pub use identity::{IdentityField, IdentityRecord};
pub use invoice::{
    InvoiceBank, InvoiceCustomer, InvoiceItemLine, InvoiceLocale, InvoiceMerchant, InvoiceRecord,
    InvoiceTax,
};
pub use receipt::{
    PaymentInformation, ReceiptCustomer, ReceiptItemLine, ReceiptLocale, ReceiptMerchant,
    ReceiptRecord, ReceiptTax,
};
pub use resume::{
    ResumeEducation, ResumeEducationEntry, ResumeLanguage, ResumeLocation, ResumePersonalInfo,
    ResumePersonalName, ResumeRecord, ResumeSkill, ResumeWorkEntry, ResumeWorkExperience,
};
pub use video::{
    ContentNsfw, FaceAttributes, LabelTimestamp, LogoTrack, ObjectFrame, ObjectTrack,
    QuestionAnswerRecord, ShotFrame, TextFrame, VideoBoundingBox, VideoFace, VideoLabel,
    VideoLogo, VideoRecord, VideoText,
};

use serde::{Deserialize, Serialize};

/// One normalized record, tagged with its document kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalRecord {
    Invoice(InvoiceRecord),
    Receipt(ReceiptRecord),
    Identity(IdentityRecord),
    Resume(ResumeRecord),
}
