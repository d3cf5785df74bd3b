//! Extraction oracle output and the per-file context handed to it.
//!
//! Every field of [`ExtractionResult`] is optional: scanned documents carry
//! wildly different subsets, and the oracle fills only what it finds. The
//! merger, classifier and hint propagation all operate on this one type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::{BeneficiaryRole, IdentityDocKind, ProposalCategory};
use crate::text;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    // ── Person identity ─────────────────────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// CPF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// RG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    /// IFP or other registry number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_doc_kind: Option<String>,
    /// CNH.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub civil_status: Option<String>,

    // ── Company ─────────────────────────────────────────────────────────
    /// CNPJ.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_registration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_start_date: Option<String>,

    // ── Contact ─────────────────────────────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    // ── Health plan ─────────────────────────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_premium: Option<f64>,

    // ── Multi-valued ────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beneficiary_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ages: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detected_partner_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_partner_count: Option<u32>,

    // ── Meta ────────────────────────────────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
    #[serde(default)]
    pub total_chars: u64,
}

impl ExtractionResult {
    /// Confidence as a number, when the oracle gave a numeric label
    /// ("87%", "0,92"). Verbal labels ("alta") yield None.
    pub fn confidence_number(&self) -> Option<f64> {
        self.confidence
            .as_deref()
            .and_then(text::parse_confidence_number)
    }

    /// Identity document kind: explicit label first, else inferred from
    /// which number field is present (license → CNH, other id → IFP,
    /// national id → RG).
    pub fn inferred_identity_kind(&self) -> Option<IdentityDocKind> {
        if let Some(kind) = self
            .identity_doc_kind
            .as_deref()
            .and_then(IdentityDocKind::from_extracted)
        {
            return Some(kind);
        }
        if non_empty(&self.license_number) {
            Some(IdentityDocKind::Cnh)
        } else if non_empty(&self.other_id) {
            Some(IdentityDocKind::Ifp)
        } else if non_empty(&self.national_id) {
            Some(IdentityDocKind::Rg)
        } else {
            None
        }
    }

    /// Best person-name hint: full name first, else the first listed
    /// beneficiary name.
    pub fn hinted_person_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.beneficiary_names
                    .iter()
                    .map(|s| s.trim())
                    .find(|s| !s.is_empty())
            })
    }
}

/// True for a present, non-whitespace string field.
pub fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Which entity an upload belongs to, as told to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionScope {
    Company,
    Adhesion,
    Beneficiary,
}

/// Context the oracle receives alongside the file bytes. Lets the caller's
/// extraction prompt specialize per slot without this core knowing how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionContext {
    pub scope: ExtractionScope,
    /// Human label of the slot, or the auto-sort marker when no slot is
    /// known yet.
    pub doc_label: String,
    pub category: ProposalCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_role: Option<BeneficiaryRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_serializes_compact() {
        let json = serde_json::to_value(ExtractionResult::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "total_chars": 0 }));
    }

    #[test]
    fn identity_kind_inference_fallback_order() {
        let explicit = ExtractionResult {
            identity_doc_kind: Some("CNH".into()),
            national_id: Some("12.345.678-9".into()),
            ..Default::default()
        };
        assert_eq!(explicit.inferred_identity_kind(), Some(IdentityDocKind::Cnh));

        let by_license = ExtractionResult {
            license_number: Some("01234567890".into()),
            national_id: Some("12.345.678-9".into()),
            ..Default::default()
        };
        assert_eq!(by_license.inferred_identity_kind(), Some(IdentityDocKind::Cnh));

        let by_rg = ExtractionResult {
            national_id: Some("12.345.678-9".into()),
            ..Default::default()
        };
        assert_eq!(by_rg.inferred_identity_kind(), Some(IdentityDocKind::Rg));

        assert_eq!(ExtractionResult::default().inferred_identity_kind(), None);
    }

    #[test]
    fn hinted_name_prefers_full_name() {
        let r = ExtractionResult {
            full_name: Some(" Ana Silva ".into()),
            beneficiary_names: vec!["Bruno Costa".into()],
            ..Default::default()
        };
        assert_eq!(r.hinted_person_name(), Some("Ana Silva"));

        let fallback = ExtractionResult {
            beneficiary_names: vec!["  ".into(), "Bruno Costa".into()],
            ..Default::default()
        };
        assert_eq!(fallback.hinted_person_name(), Some("Bruno Costa"));
    }
}
