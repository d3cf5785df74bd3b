//! Extraction merger: collapse many per-document extractions into one view.
//!
//! Multi-valued fields union (names keep first-appearance order, ages sort
//! ascending); scalar fields are last-non-empty-wins so the freshest scan of
//! a slot overrides older ones; `detected_partner_count` is a running max so
//! a weaker later scan can never shrink the partner structure.

use serde::{Deserialize, Serialize};

use crate::models::document::UploadedDocument;
use crate::models::extraction::ExtractionResult;
use crate::text;

pub fn merge_extractions(inputs: &[ExtractionResult]) -> ExtractionResult {
    let mut merged = ExtractionResult::default();

    for input in inputs {
        push_unique_names(&mut merged.beneficiary_names, &input.beneficiary_names);
        push_unique_names(&mut merged.detected_partner_names, &input.detected_partner_names);
        for age in &input.ages {
            if !merged.ages.contains(age) {
                merged.ages.push(*age);
            }
        }

        pick_last(&mut merged.full_name, &input.full_name);
        pick_last(&mut merged.tax_id, &input.tax_id);
        pick_last(&mut merged.national_id, &input.national_id);
        pick_last(&mut merged.other_id, &input.other_id);
        pick_last(&mut merged.identity_doc_kind, &input.identity_doc_kind);
        pick_last(&mut merged.license_number, &input.license_number);
        pick_last(&mut merged.birth_date, &input.birth_date);
        pick_last(&mut merged.issue_date, &input.issue_date);
        pick_last(&mut merged.issuing_authority, &input.issuing_authority);
        pick_last(&mut merged.civil_status, &input.civil_status);
        pick_last(&mut merged.company_tax_id, &input.company_tax_id);
        pick_last(&mut merged.legal_name, &input.legal_name);
        pick_last(&mut merged.trade_name, &input.trade_name);
        pick_last(&mut merged.state_registration, &input.state_registration);
        pick_last(&mut merged.registration_status, &input.registration_status);
        pick_last(&mut merged.opening_date, &input.opening_date);
        pick_last(&mut merged.activity_start_date, &input.activity_start_date);
        pick_last(&mut merged.email, &input.email);
        pick_last(&mut merged.phone, &input.phone);
        pick_last(&mut merged.address, &input.address);
        pick_last(&mut merged.operator_name, &input.operator_name);
        pick_last(&mut merged.plan_type, &input.plan_type);
        pick_last(&mut merged.notes, &input.notes);
        pick_last(&mut merged.confidence, &input.confidence);
        pick_last(&mut merged.text_preview, &input.text_preview);

        if input.current_premium.is_some() {
            merged.current_premium = input.current_premium;
        }
        merged.detected_partner_count = match (merged.detected_partner_count, input.detected_partner_count) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        merged.total_chars += input.total_chars;
    }

    merged.ages.sort_unstable();
    if merged.confidence.is_none() {
        merged.confidence = Some("baixa".to_string());
    }
    merged
}

/// Merge the extractions attached to a document list, oldest first.
pub fn merge_documents(docs: &[UploadedDocument]) -> ExtractionResult {
    let inputs: Vec<ExtractionResult> = docs
        .iter()
        .filter_map(|d| d.extraction.clone())
        .collect();
    merge_extractions(&inputs)
}

/// Walk a document list newest-first and return the first non-empty value of
/// `field`. Backs the partner identity summaries in the payload.
pub fn last_extracted_value<'a, F>(docs: &'a [UploadedDocument], field: F) -> Option<&'a str>
where
    F: Fn(&ExtractionResult) -> Option<&str>,
{
    docs.iter()
        .rev()
        .filter_map(|d| d.extraction.as_ref())
        .filter_map(|e| field(e).map(str::trim).filter(|s| !s.is_empty()))
        .next()
}

fn pick_last(target: &mut Option<String>, candidate: &Option<String>) {
    if let Some(value) = candidate.as_deref() {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *target = Some(trimmed.to_string());
        }
    }
}

fn push_unique_names(target: &mut Vec<String>, incoming: &[String]) {
    for name in incoming {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = text::fold(trimmed);
        if !target.iter().any(|existing| text::fold(existing) == key) {
            target.push(trimmed.to_string());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Per-bucket summaries for the persistence payload
// ═══════════════════════════════════════════════════════════════════════════

/// Company profile fields recovered from contract uploads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_registration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<String>,
}

pub fn contract_summary(docs: &[UploadedDocument]) -> ContractSummary {
    ContractSummary {
        company_tax_id: last_extracted_value(docs, |e| e.company_tax_id.as_deref())
            .map(String::from),
        legal_name: last_extracted_value(docs, |e| e.legal_name.as_deref()).map(String::from),
        state_registration: last_extracted_value(docs, |e| e.state_registration.as_deref())
            .map(String::from),
        opening_date: last_extracted_value(docs, |e| e.opening_date.as_deref()).map(String::from),
    }
}

/// Registry fields recovered from tax-card uploads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxCardSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
}

pub fn tax_card_summary(docs: &[UploadedDocument]) -> TaxCardSummary {
    TaxCardSummary {
        registration_status: last_extracted_value(docs, |e| e.registration_status.as_deref())
            .map(String::from),
        activity_start_date: last_extracted_value(docs, |e| e.activity_start_date.as_deref())
            .map(String::from),
        trade_name: last_extracted_value(docs, |e| e.trade_name.as_deref()).map(String::from),
    }
}
