//! Canonical receipt record. Slimmer than an invoice: no bank details, but
//! carries payment information.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub customer_information: ReceiptCustomer,
    pub merchant_information: ReceiptMerchant,
    pub locale: ReceiptLocale,
    pub taxes: Vec<ReceiptTax>,
    pub payment_information: PaymentInformation,
    pub item_lines: Vec<ReceiptItemLine>,
    pub invoice_number: Option<String>,
    pub date: Option<String>,
    pub invoice_total: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptCustomer {
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptMerchant {
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
    pub merchant_phone: Option<String>,
    pub merchant_tax_id: Option<String>,
    pub merchant_siret: Option<String>,
    pub merchant_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLocale {
    pub currency: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptTax {
    pub rate: Option<f64>,
    pub taxes: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInformation {
    pub card_type: Option<String>,
    pub card_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItemLine {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
}
