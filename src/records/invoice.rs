//! Canonical invoice record.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub customer_information: InvoiceCustomer,
    pub merchant_information: InvoiceMerchant,
    pub bank_informations: InvoiceBank,
    pub taxes: Vec<InvoiceTax>,
    pub locale: InvoiceLocale,
    pub item_lines: Vec<InvoiceItemLine>,
    pub invoice_number: Option<String>,
    /// Normalized to `YYYY-MM-DD` when the vendor format is recognized.
    pub invoice_date: Option<String>,
    pub invoice_total: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCustomer {
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_tax_id: Option<String>,
    pub customer_id: Option<String>,
    pub customer_billing_address: Option<String>,
    pub customer_mailing_address: Option<String>,
    pub customer_remittance_address: Option<String>,
    pub customer_service_address: Option<String>,
    pub customer_shipping_address: Option<String>,
    pub abn_number: Option<String>,
    pub vat_number: Option<String>,
    pub gst_number: Option<String>,
    pub pan_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceMerchant {
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
    pub merchant_email: Option<String>,
    pub merchant_phone: Option<String>,
    pub merchant_tax_id: Option<String>,
    pub merchant_id: Option<String>,
    pub merchant_siret: Option<String>,
    pub merchant_siren: Option<String>,
    pub merchant_website: Option<String>,
    pub merchant_fax: Option<String>,
    pub abn_number: Option<String>,
    pub gst_number: Option<String>,
    pub pan_number: Option<String>,
    pub vat_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceBank {
    pub account_number: Option<String>,
    pub iban: Option<String>,
    pub bsb: Option<String>,
    pub sort_code: Option<String>,
    pub vat_number: Option<String>,
    pub routing_number: Option<String>,
    pub swift: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTax {
    pub value: Option<f64>,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLocale {
    pub currency: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItemLine {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub discount: Option<f64>,
    pub amount: Option<f64>,
    pub tax_rate: Option<f64>,
    pub tax_amount: Option<f64>,
    pub product_code: Option<String>,
}
