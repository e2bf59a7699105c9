//! Canonical identity document record.

use serde::{Deserialize, Serialize};

use super::country::CountryInfo;

/// A single extracted value with the vendor's confidence in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityField {
    pub value: Option<String>,
    pub confidence: Option<f64>,
}

impl IdentityField {
    pub fn new(value: Option<String>, confidence: Option<f64>) -> Self {
        Self { value, confidence }
    }

    /// A value without a confidence score (images, derived fields).
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub last_name: IdentityField,
    pub given_names: Vec<IdentityField>,
    pub birth_place: IdentityField,
    pub birth_date: IdentityField,
    pub issuance_date: IdentityField,
    pub expire_date: IdentityField,
    pub document_id: IdentityField,
    pub issuing_state: IdentityField,
    pub address: IdentityField,
    pub age: IdentityField,
    pub country: Option<CountryInfo>,
    pub document_type: IdentityField,
    pub gender: IdentityField,
    pub image_id: Vec<IdentityField>,
    pub image_signature: Vec<IdentityField>,
    pub mrz: IdentityField,
    pub nationality: IdentityField,
}
