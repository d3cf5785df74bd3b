//! Persistence payload: a serializable snapshot of the whole session.
//!
//! The payload is self-contained — structural counts, profiles, per-document
//! metadata, the checklist state and the extraction rollup — so the sink can
//! persist or forward it without ever reading session state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::merge::{self, ContractSummary, TaxCardSummary};
use crate::engine::oracle::{PersistenceSink, SaveReceipt};
use crate::engine::requirements;
use crate::engine::session::{ExtractionSummary, ProposalSession};
use crate::error::IntakeError;
use crate::models::category::{
    BeneficiaryRole, CivilStatus, DataEntryMode, IdentityDocKind, MaritalProofMode,
    ProposalCategory,
};
use crate::models::document::{CompanyDocType, UploadedDocument};
use crate::models::entity::StructuralCounts;
use crate::models::extraction::ExtractionResult;
use crate::models::requirement::RequirementItem;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentPayload {
    pub id: Uuid,
    pub doc_type: String,
    pub label: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub processed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entity_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
}

impl DocumentPayload {
    fn from_document(doc: &UploadedDocument, doc_type: &str, label: &str) -> Self {
        DocumentPayload {
            id: doc.id,
            doc_type: doc_type.to_string(),
            label: label.to_string(),
            file_name: doc.file_name.clone(),
            mime_type: doc.mime_type.clone(),
            size_bytes: doc.size_bytes,
            processed_at: doc.processed_at,
            linked_entity_id: doc.linked_entity_id,
            extraction: doc.extraction.clone(),
        }
    }
}

/// Partner identity summary: form fields win, linked documents fill gaps.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerPayload {
    pub id: Uuid,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_doc_kind: Option<IdentityDocKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    pub documents_linked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyPayload {
    pub tax_id: String,
    pub legal_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub contract: ContractSummary,
    pub tax_card: TaxCardSummary,
    pub partners: Vec<PartnerPayload>,
    pub documents: Vec<DocumentPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryPayload {
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
    pub documents: Vec<DocumentPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryChecklist {
    pub beneficiary_id: Uuid,
    pub items: Vec<RequirementItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistSnapshot {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub company: Vec<RequirementItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adhesion: Vec<RequirementItem>,
    pub beneficiaries: Vec<BeneficiaryChecklist>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalPayload {
    pub category: ProposalCategory,
    pub entry_mode: DataEntryMode,
    pub counts: StructuralCounts,
    pub dependent_count: u32,
    pub primary_email: String,
    pub primary_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adhesion_documents: Vec<DocumentPayload>,
    pub beneficiaries: Vec<BeneficiaryPayload>,
    pub checklist: ChecklistSnapshot,
    pub extraction_summary: ExtractionSummary,
    pub created_at: DateTime<Utc>,
}

fn field_or_docs(field: &str, docs: &[UploadedDocument], pick: fn(&ExtractionResult) -> Option<&str>) -> Option<String> {
    let trimmed = field.trim();
    if !trimmed.is_empty() {
        return Some(trimmed.to_string());
    }
    merge::last_extracted_value(docs, pick).map(String::from)
}

fn company_payload(session: &ProposalSession) -> CompanyPayload {
    let identity_docs = session.company_slot_docs(CompanyDocType::PartnerIdentity);
    let partners = session
        .partners
        .iter()
        .map(|partner| {
            let linked: Vec<UploadedDocument> = identity_docs
                .iter()
                .filter(|d| d.linked_entity_id == Some(partner.id))
                .cloned()
                .collect();
            PartnerPayload {
                id: partner.id,
                full_name: partner.full_name.clone(),
                identity_doc_kind: partner.identity_doc_kind,
                tax_id: field_or_docs(&partner.tax_id, &linked, |e| e.tax_id.as_deref()),
                national_id: field_or_docs(&partner.national_id, &linked, |e| {
                    e.national_id.as_deref()
                }),
                birth_date: field_or_docs(&partner.birth_date, &linked, |e| {
                    e.birth_date.as_deref()
                }),
                documents_linked: linked.len(),
            }
        })
        .collect();

    let documents = CompanyDocType::ALL
        .iter()
        .flat_map(|doc_type| {
            session
                .company_slot_docs(*doc_type)
                .iter()
                .map(|d| DocumentPayload::from_document(d, doc_type.as_str(), doc_type.label()))
        })
        .collect();

    CompanyPayload {
        tax_id: session.company.tax_id.clone(),
        legal_name: session.company.legal_name.clone(),
        email: session.company.email.clone(),
        phone: session.company.phone.clone(),
        address: session.company.address.clone(),
        contract: merge::contract_summary(session.company_slot_docs(CompanyDocType::Contract)),
        tax_card: merge::tax_card_summary(
            session.company_slot_docs(CompanyDocType::TaxRegistrationCard),
        ),
        partners,
        documents,
    }
}

pub fn build_payload(session: &ProposalSession) -> ProposalPayload {
    let beneficiaries = session
        .beneficiaries
        .iter()
        .map(|b| BeneficiaryPayload {
            id: b.id,
            role: b.role,
            full_name: b.full_name.clone(),
            age: b.age,
            tax_id: b.tax_id.clone(),
            national_id: b.national_id.clone(),
            birth_date: b.birth_date.clone(),
            civil_status: b.civil_status,
            marital_proof_mode: b.marital_proof_mode,
            documents: b
                .documents
                .iter()
                .flat_map(|(doc_type, docs)| {
                    docs.iter().map(|d| {
                        DocumentPayload::from_document(d, doc_type.as_str(), doc_type.label())
                    })
                })
                .collect(),
        })
        .collect();

    let adhesion_documents = session
        .adhesion_docs
        .iter()
        .flat_map(|(doc_type, docs)| {
            docs.iter()
                .map(|d| DocumentPayload::from_document(d, doc_type.as_str(), doc_type.label()))
        })
        .collect();

    let checklist = ChecklistSnapshot {
        company: if session.category.is_corporate() {
            session.company_requirements()
        } else {
            Vec::new()
        },
        adhesion: if session.category == ProposalCategory::Adhesion {
            session.adhesion_requirements()
        } else {
            Vec::new()
        },
        beneficiaries: session
            .beneficiaries
            .iter()
            .map(|b| BeneficiaryChecklist {
                beneficiary_id: b.id,
                items: requirements::beneficiary_requirements(b),
            })
            .collect(),
    };

    ProposalPayload {
        category: session.category,
        entry_mode: session.entry_mode,
        counts: session.counts,
        dependent_count: session
            .beneficiaries
            .iter()
            .filter(|b| b.role == BeneficiaryRole::Dependent)
            .count() as u32,
        primary_email: session.primary_email.clone(),
        primary_phone: session.primary_phone.clone(),
        company: session.category.is_corporate().then(|| company_payload(session)),
        adhesion_documents,
        beneficiaries,
        checklist,
        extraction_summary: session.extraction_summary(),
        created_at: Utc::now(),
    }
}

/// Gate, snapshot and hand off to the sink in one move.
pub async fn save_proposal(
    session: &ProposalSession,
    sink: &dyn PersistenceSink,
) -> Result<SaveReceipt, IntakeError> {
    session.ensure_ready_to_save()?;
    let payload = build_payload(session);
    Ok(sink.save(&payload).await?)
}
