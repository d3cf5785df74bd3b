//! Beneficiaries, company partners and the structural counts that shape them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::{BeneficiaryRole, CivilStatus, IdentityDocKind, MaritalProofMode};
use crate::models::document::{BeneficiaryDocType, UploadedDocument};
use crate::text;

/// One person on the proposal. Form fields default to empty strings so hint
/// propagation can use "fill only when empty" semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: Uuid,
    pub role: BeneficiaryRole,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub tax_id: String,
    pub national_id: String,
    pub birth_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub civil_status: Option<CivilStatus>,
    pub marital_proof_mode: MaritalProofMode,
    pub documents: BTreeMap<BeneficiaryDocType, Vec<UploadedDocument>>,
}

impl Beneficiary {
    pub fn new(role: BeneficiaryRole) -> Self {
        Beneficiary {
            id: Uuid::new_v4(),
            role,
            full_name: String::new(),
            age: None,
            tax_id: String::new(),
            national_id: String::new(),
            birth_date: String::new(),
            civil_status: None,
            marital_proof_mode: MaritalProofMode::default(),
            documents: BTreeMap::new(),
        }
    }

    pub fn is_minor(&self) -> bool {
        self.age.is_some_and(|a| a < 18)
    }

    pub fn docs(&self, doc_type: BeneficiaryDocType) -> &[UploadedDocument] {
        self.documents.get(&doc_type).map_or(&[], Vec::as_slice)
    }

    pub fn has_docs(&self, doc_type: BeneficiaryDocType) -> bool {
        !self.docs(doc_type).is_empty()
    }

    pub fn all_documents(&self) -> impl Iterator<Item = &UploadedDocument> {
        self.documents.values().flatten()
    }

    pub fn document_count(&self) -> usize {
        self.documents.values().map(Vec::len).sum()
    }

    /// Name for display and missing-item messages; falls back to the
    /// 1-based position when the form is still blank.
    pub fn display_name(&self, position: usize) -> String {
        let trimmed = self.full_name.trim();
        if trimmed.is_empty() {
            format!("Beneficiário {position}")
        } else {
            trimmed.to_string()
        }
    }
}

/// A company partner tracked on corporate proposals. Auto-provisioned
/// entries carry a "Sócio N" placeholder name until a contract or identity
/// document supplies the real one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyPartner {
    pub id: Uuid,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_doc_kind: Option<IdentityDocKind>,
    pub tax_id: String,
    pub national_id: String,
    pub other_id: String,
    pub license_number: String,
    pub birth_date: String,
    pub issue_date: String,
    pub issuing_authority: String,
}

impl CompanyPartner {
    /// New partner at 1-based `position`, with a placeholder name.
    pub fn new(position: usize) -> Self {
        CompanyPartner {
            id: Uuid::new_v4(),
            full_name: text::placeholder_partner_name(position),
            identity_doc_kind: None,
            tax_id: String::new(),
            national_id: String::new(),
            other_id: String::new(),
            license_number: String::new(),
            birth_date: String::new(),
            issue_date: String::new(),
            issuing_authority: String::new(),
        }
    }

    pub fn has_placeholder_name(&self) -> bool {
        text::is_placeholder_partner_name(&self.full_name)
    }
}

/// The structural counts the wizard collects before building beneficiaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralCounts {
    pub total_lives: u32,
    pub partner_count: u32,
    pub employee_count: u32,
    pub has_employees: bool,
}

impl Default for StructuralCounts {
    fn default() -> Self {
        StructuralCounts {
            total_lives: 1,
            partner_count: 1,
            employee_count: 0,
            has_employees: false,
        }
    }
}

impl StructuralCounts {
    /// Ceiling for the partner list: lives not taken by employees, never
    /// below 1.
    pub fn max_partners_allowed(&self) -> u32 {
        let employees = if self.has_employees { self.employee_count } else { 0 };
        self.total_lives.saturating_sub(employees).max(1)
    }

    pub fn effective_employee_count(&self) -> u32 {
        if self.has_employees {
            self.employee_count
        } else {
            0
        }
    }
}
