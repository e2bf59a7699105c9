//! Klippa response normalizers.
//!
//! Pure functions from a Klippa `parseDocument` response to the canonical
//! records. Financial documents keep their fields flat under `data`;
//! identity and resume documents nest each field as
//! `data.parsed.<field>.{value, confidence}`.

use serde_json::Value;

use crate::json_path::{path_array, path_f64, path_obj, path_str};
use crate::records::{
    CountryKey, IdentityField, IdentityRecord, InvoiceBank, InvoiceCustomer, InvoiceItemLine,
    InvoiceLocale, InvoiceMerchant, InvoiceRecord, InvoiceTax, PaymentInformation,
    ReceiptCustomer, ReceiptItemLine, ReceiptLocale, ReceiptMerchant, ReceiptRecord, ReceiptTax,
    ResumeEducation, ResumeEducationEntry, ResumeLocation, ResumePersonalInfo, ResumePersonalName,
    ResumeRecord, ResumeSkill, ResumeWorkEntry, ResumeWorkExperience, country_info, format_date,
};

// ─────────────────────────────────────────────────────────────────────────────
// Financial documents
// ─────────────────────────────────────────────────────────────────────────────

pub fn normalize_invoice(response: &Value) -> InvoiceRecord {
    let data = path_obj(response, &["data"]);
    let s = |key: &str| path_str(data, &[key]);
    let customer_address = s("customer_address");

    let customer_information = InvoiceCustomer {
        customer_name: s("customer_name"),
        customer_billing_address: customer_address.clone(),
        customer_address,
        customer_email: s("customer_email"),
        customer_phone: s("customer_phone"),
        customer_tax_id: s("customer_vat_number"),
        customer_id: s("customer_id"),
        ..Default::default()
    };

    let merchant_information = InvoiceMerchant {
        merchant_name: s("merchant_name"),
        merchant_address: s("merchant_address"),
        merchant_email: s("merchant_email"),
        merchant_phone: s("merchant_phone"),
        merchant_tax_id: s("merchant_vat_number"),
        merchant_id: s("merchant_id"),
        merchant_siret: s("merchant_coc_number"),
        merchant_website: s("merchant_website"),
        ..Default::default()
    };

    let bank_informations = InvoiceBank {
        account_number: s("merchant_bank_account_number"),
        iban: s("merchant_bank_account_number_bic"),
        sort_code: s("merchant_bank_domestic_bank_code"),
        ..Default::default()
    };

    let item_lines = line_items(data)
        .map(|item| InvoiceItemLine {
            description: path_str(item, &["description"]),
            quantity: path_f64(item, &["quantity"]),
            unit_price: path_f64(item, &["amount_each"]),
            discount: path_f64(item, &["discount_amount"]),
            amount: path_f64(item, &["amount"]),
            tax_rate: path_f64(item, &["vat_percentage"]),
            tax_amount: path_f64(item, &["vat_amount"]),
            product_code: path_str(item, &["sku"]),
        })
        .collect();

    InvoiceRecord {
        customer_information,
        merchant_information,
        bank_informations,
        taxes: vec![InvoiceTax {
            value: path_f64(data, &["personal_income_tax_amount"]),
            rate: path_f64(data, &["personal_income_tax_rate"]),
        }],
        locale: InvoiceLocale {
            currency: s("currency"),
            language: s("document_language"),
        },
        item_lines,
        invoice_number: s("invoice_number"),
        invoice_date: document_date(data),
        invoice_total: path_f64(data, &["amount"]),
    }
}

pub fn normalize_receipt(response: &Value) -> ReceiptRecord {
    let data = path_obj(response, &["data"]);
    let s = |key: &str| path_str(data, &[key]);

    let item_lines = line_items(data)
        .map(|item| ReceiptItemLine {
            description: path_str(item, &["description"]),
            quantity: path_f64(item, &["quantity"]),
            unit_price: path_f64(item, &["amount_each"]),
            amount: path_f64(item, &["amount"]),
        })
        .collect();

    ReceiptRecord {
        customer_information: ReceiptCustomer {
            customer_name: s("customer_name"),
        },
        merchant_information: ReceiptMerchant {
            merchant_name: s("merchant_name"),
            merchant_address: s("merchant_address"),
            merchant_phone: s("merchant_phone"),
            merchant_tax_id: s("merchant_vat_number"),
            merchant_siret: s("merchant_coc_number"),
            merchant_url: s("merchant_website"),
        },
        locale: ReceiptLocale {
            currency: s("currency"),
            language: s("document_language"),
            country: s("merchant_country_code"),
        },
        taxes: vec![ReceiptTax {
            rate: path_f64(data, &["personal_income_tax_rate"]),
            taxes: path_f64(data, &["personal_income_tax_amount"]),
        }],
        payment_information: PaymentInformation {
            card_type: s("paymentmethod"),
            card_number: s("payment_card_number"),
        },
        item_lines,
        invoice_number: s("invoice_number"),
        date: document_date(data),
        invoice_total: path_f64(data, &["amount"]),
    }
}

/// Flatten `lines[].lineitems[]`.
fn line_items(data: &Value) -> impl Iterator<Item = &Value> {
    path_array(data, &["lines"])
        .iter()
        .flat_map(|line| path_array(line, &["lineitems"]))
}

/// Invoice dates are normalized when recognized, otherwise kept verbatim.
fn document_date(data: &Value) -> Option<String> {
    path_str(data, &["date"]).map(|raw| format_date(&raw).unwrap_or(raw))
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity documents
// ─────────────────────────────────────────────────────────────────────────────

pub fn normalize_identity(response: &Value) -> IdentityRecord {
    let parsed = path_obj(response, &["data", "parsed"]);

    // Usually an alpha-3 code; some documents spell the country out.
    let country = path_str(parsed, &["issuing_country", "value"])
        .and_then(|value| {
            country_info(CountryKey::Alpha3, &value)
                .or_else(|| country_info(CountryKey::Name, &value))
        })
        .map(|mut info| {
            info.confidence = path_f64(parsed, &["issuing_country", "confidence"]);
            info
        });

    IdentityRecord {
        last_name: field(parsed, "surname"),
        given_names: split_names(&field(parsed, "given_names")),
        birth_place: field(parsed, "place_of_birth"),
        birth_date: date_field(parsed, "date_of_birth"),
        issuance_date: date_field(parsed, "date_of_issue"),
        expire_date: date_field(parsed, "date_of_expiry"),
        document_id: field(parsed, "document_number"),
        issuing_state: field(parsed, "issuing_institution"),
        address: IdentityField::new(identity_address(parsed), None),
        age: field(parsed, "age"),
        country,
        document_type: field(parsed, "document_type"),
        gender: field(parsed, "gender"),
        image_id: identity_images(parsed),
        image_signature: Vec::new(),
        mrz: field(parsed, "mrz"),
        nationality: field(parsed, "nationality"),
    }
}

fn field(parsed: &Value, key: &str) -> IdentityField {
    IdentityField::new(
        path_str(parsed, &[key, "value"]),
        path_f64(parsed, &[key, "confidence"]),
    )
}

fn date_field(parsed: &Value, key: &str) -> IdentityField {
    let mut f = field(parsed, key);
    f.value = f.value.as_deref().and_then(format_date);
    f
}

/// Split a multi-word name field into one token per word, each carrying the
/// original confidence.
pub fn split_names(names: &IdentityField) -> Vec<IdentityField> {
    names
        .value
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(|name| IdentityField::new(Some(name.to_string()), names.confidence))
        .collect()
}

/// Join address segments with `", "`, trimming each and dropping blanks.
///
/// Returns `None` when nothing is left.
pub fn join_address<S: AsRef<str>>(segments: &[S]) -> Option<String> {
    let joined = segments
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}

fn identity_address(parsed: &Value) -> Option<String> {
    let addr = path_obj(parsed, &["address", "value"]);
    let part = |key: &str| path_str(addr, &[key]).unwrap_or_default();

    let street = format!("{} {}", part("house_number").trim(), part("street_name").trim());
    let city = format!("{} {}", part("post_code").trim(), part("city").trim());

    join_address(&[street, city, part("province"), part("country")])
}

fn identity_images(parsed: &Value) -> Vec<IdentityField> {
    let face = path_str(parsed, &["face", "value"]);
    let documents = path_array(parsed, &["identity_document"])
        .iter()
        .filter_map(|doc| path_str(doc, &["image"]));

    face.into_iter()
        .chain(documents)
        .filter(|img| !img.is_empty())
        .map(IdentityField::value)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Resumes
// ─────────────────────────────────────────────────────────────────────────────

pub fn normalize_resume(response: &Value) -> ResumeRecord {
    let parsed = path_obj(response, &["data", "parsed"]);
    let applicant = path_obj(parsed, &["applicant"]);

    let urls = path_array(applicant, &["websites"])
        .iter()
        .filter_map(|site| path_str(site, &["value"]))
        .filter(|url| !url.is_empty())
        .collect();

    let personal_infos = ResumePersonalInfo {
        name: ResumePersonalName {
            raw_name: path_str(applicant, &["name", "value"]),
            ..Default::default()
        },
        address: location(applicant),
        phones: non_empty(path_str(applicant, &["phone_number", "value"])),
        mails: non_empty(path_str(applicant, &["email_address", "value"])),
        urls,
        ..Default::default()
    };

    let education_entries = path_array(parsed, &["education"])
        .iter()
        .map(|edu| ResumeEducationEntry {
            title: path_str(edu, &["program", "value"]),
            start_date: path_str(edu, &["start", "value"]),
            end_date: path_str(edu, &["end", "value"]),
            location: location(edu),
            establishment: path_str(edu, &["institution", "value"]),
            description: path_str(edu, &["program", "value"]),
            ..Default::default()
        })
        .collect();

    let work_entries = path_array(parsed, &["work_experience"])
        .iter()
        .map(|work| ResumeWorkEntry {
            title: path_str(work, &["job_title", "value"]),
            start_date: path_str(work, &["start", "value"]),
            end_date: path_str(work, &["end", "value"]),
            company: path_str(work, &["company_name", "value"]),
            location: location(work),
            ..Default::default()
        })
        .collect();

    let interests = path_array(parsed, &["other_interests"])
        .iter()
        .map(|interest| ResumeSkill {
            name: path_str(interest, &["value"]),
            kind: None,
        })
        .collect();

    ResumeRecord {
        personal_infos,
        education: ResumeEducation {
            total_years_education: None,
            entries: education_entries,
        },
        work_experience: ResumeWorkExperience {
            total_years_experience: None,
            entries: work_entries,
        },
        interests,
        ..Default::default()
    }
}

fn non_empty(value: Option<String>) -> Vec<String> {
    value.into_iter().filter(|s| !s.trim().is_empty()).collect()
}

fn location(entry: &Value) -> ResumeLocation {
    ResumeLocation {
        country: path_str(entry, &["address", "country", "value"]),
        city: path_str(entry, &["address", "city", "value"]),
        ..Default::default()
    }
}
