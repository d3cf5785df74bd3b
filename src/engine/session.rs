//! Proposal session: the single mutable state holder for one intake flow.
//!
//! All cascade rules live here as explicit mutators — changing a civil
//! status away from married/union deletes the now-irrelevant marital
//! documents, removing a partner unlinks and deletes their identity
//! documents, and every deletion releases its preview handle. Checklists and
//! summaries are derived on demand, never cached.

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use crate::engine::requirements::{self, CompanyRequirementsInput};
use crate::engine::resolver::{self, PartnerDocStatus};
use crate::engine::structure;
use crate::engine::wizard::Step;
use crate::error::StructureError;
use crate::models::category::{CivilStatus, DataEntryMode, MaritalProofMode, ProposalCategory};
use crate::models::document::{
    AdhesionDocType, BeneficiaryDocType, CompanyDocType, UploadTarget, UploadedDocument,
};
use crate::models::entity::{Beneficiary, CompanyPartner, StructuralCounts};
use crate::models::preview::PreviewRegistry;
use crate::models::requirement::RequirementItem;
use crate::models::ExtractionResult;
use crate::text;

/// Company profile fields with operator-touched flags. Hint propagation only
/// fills fields the operator has not edited.
#[derive(Debug, Clone, Default)]
pub struct CompanyProfile {
    pub tax_id: String,
    pub legal_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub tax_id_touched: bool,
    pub legal_name_touched: bool,
    pub email_touched: bool,
    pub phone_touched: bool,
    pub address_touched: bool,
}

impl CompanyProfile {
    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
        self.email_touched = true;
    }

    pub fn set_phone(&mut self, value: impl Into<String>) {
        self.phone = value.into();
        self.phone_touched = true;
    }

    pub fn set_address(&mut self, value: impl Into<String>) {
        self.address = value.into();
        self.address_touched = true;
    }

    pub fn set_tax_id(&mut self, value: impl Into<String>) {
        self.tax_id = value.into();
        self.tax_id_touched = true;
    }

    pub fn set_legal_name(&mut self, value: impl Into<String>) {
        self.legal_name = value.into();
        self.legal_name_touched = true;
    }
}

/// Proposal-wide rollup of everything the oracle extracted.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ExtractionSummary {
    pub names: Vec<String>,
    pub ages: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_premium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    pub document_count: usize,
    pub total_chars: u64,
}

#[derive(Debug)]
pub struct ProposalSession {
    pub category: ProposalCategory,
    pub counts: StructuralCounts,
    pub entry_mode: DataEntryMode,
    pub amendment_applicable: bool,
    pub primary_email: String,
    pub primary_phone: String,
    pub company: CompanyProfile,
    pub partners: Vec<CompanyPartner>,
    pub beneficiaries: Vec<Beneficiary>,
    pub company_docs: BTreeMap<CompanyDocType, Vec<UploadedDocument>>,
    pub adhesion_docs: BTreeMap<AdhesionDocType, Vec<UploadedDocument>>,
    pub previews: PreviewRegistry,
    /// True once the current counts were materialized into beneficiaries.
    /// Any category or count edit clears it.
    pub structure_ready: bool,
    pub(crate) step_index: usize,
    pub(crate) highlight_step: Option<Step>,
    pub last_selected_beneficiary: Option<Uuid>,
}

impl ProposalSession {
    pub fn new(category: ProposalCategory) -> Self {
        let counts = StructuralCounts::default();
        let partners = if category.is_corporate() {
            structure::reconcile_partners(Vec::new(), counts.partner_count as usize)
        } else {
            Vec::new()
        };
        ProposalSession {
            category,
            counts,
            entry_mode: DataEntryMode::default(),
            amendment_applicable: false,
            primary_email: String::new(),
            primary_phone: String::new(),
            company: CompanyProfile::default(),
            partners,
            beneficiaries: Vec::new(),
            company_docs: BTreeMap::new(),
            adhesion_docs: BTreeMap::new(),
            previews: PreviewRegistry::new(),
            structure_ready: false,
            step_index: 0,
            highlight_step: None,
            last_selected_beneficiary: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Structure edits
    // ═══════════════════════════════════════════════════════════════════

    /// Switching category discards everything built for the old one.
    pub fn set_category(&mut self, category: ProposalCategory) {
        if category == self.category {
            return;
        }
        debug!(from = %self.category, to = %category, "category changed, resetting downstream state");
        let keep_counts = self.counts;
        self.reset();
        self.category = category;
        self.counts = keep_counts;
        self.partners = if category.is_corporate() {
            structure::reconcile_partners(Vec::new(), self.counts.partner_count as usize)
        } else {
            Vec::new()
        };
    }

    pub fn set_counts(&mut self, counts: StructuralCounts) {
        if counts != self.counts {
            self.counts = counts;
            self.structure_ready = false;
        }
    }

    /// Materialize the current counts into the beneficiary and partner
    /// lists. Truncated beneficiaries have their previews released here.
    pub fn rebuild_structure(&mut self) -> Result<(), StructureError> {
        // validate before taking the list so a bad count loses nothing
        structure::validate_counts(self.category, &self.counts)?;
        let existing = std::mem::take(&mut self.beneficiaries);
        let outcome = structure::build_structure(self.category, &self.counts, existing)?;
        self.beneficiaries = outcome.beneficiaries;
        for discarded in &outcome.discarded {
            let handles: Vec<_> = discarded
                .all_documents()
                .filter_map(|d| d.preview.clone())
                .collect();
            for handle in handles {
                self.previews.release(&handle);
            }
        }
        if self.category.is_corporate() {
            let existing = std::mem::take(&mut self.partners);
            self.partners =
                structure::reconcile_partners(existing, self.counts.partner_count as usize);
        }
        self.structure_ready = true;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Partners
    // ═══════════════════════════════════════════════════════════════════

    /// Add a partner if the structural ceiling allows one more.
    pub fn add_partner(&mut self) -> bool {
        if self.partners.len() as u32 >= self.counts.max_partners_allowed() {
            return false;
        }
        self.partners.push(CompanyPartner::new(self.partners.len() + 1));
        self.counts.partner_count = self.partners.len() as u32;
        self.structure_ready = false;
        true
    }

    /// Remove a partner, deleting their linked identity documents. The
    /// partner count never drops below 1.
    pub fn remove_partner(&mut self, partner_id: Uuid) {
        let Some(index) = self.partners.iter().position(|p| p.id == partner_id) else {
            return;
        };
        let removed: Vec<UploadedDocument> = match self.company_docs.get_mut(&CompanyDocType::PartnerIdentity) {
            Some(docs) => {
                let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(docs)
                    .into_iter()
                    .partition(|d| d.linked_entity_id == Some(partner_id));
                *docs = kept;
                gone
            }
            None => Vec::new(),
        };
        self.release_documents(&removed);
        self.partners.remove(index);
        self.counts.partner_count = (self.partners.len() as u32).max(1);
        self.structure_ready = false;
    }

    // ═══════════════════════════════════════════════════════════════════
    // Beneficiary edits with cascades
    // ═══════════════════════════════════════════════════════════════════

    pub fn beneficiary(&self, id: Uuid) -> Option<&Beneficiary> {
        self.beneficiaries.iter().find(|b| b.id == id)
    }

    pub fn beneficiary_mut(&mut self, id: Uuid) -> Option<&mut Beneficiary> {
        self.beneficiaries.iter_mut().find(|b| b.id == id)
    }

    /// Change a civil status. Leaving married/civil-union deletes the
    /// marital-proof documents and resets the proof mode.
    pub fn set_beneficiary_civil_status(&mut self, id: Uuid, status: Option<CivilStatus>) {
        let needs_proof = status.is_some_and(|s| s.requires_marital_proof());
        let mut orphaned = Vec::new();
        if let Some(b) = self.beneficiary_mut(id) {
            b.civil_status = status;
            if !needs_proof {
                b.marital_proof_mode = MaritalProofMode::Certificate;
                for doc_type in [
                    BeneficiaryDocType::MarriageCertificate,
                    BeneficiaryDocType::UnionDeclaration,
                ] {
                    if let Some(docs) = b.documents.remove(&doc_type) {
                        orphaned.extend(docs);
                    }
                }
            }
        }
        self.release_documents(&orphaned);
    }

    /// Change an age. Turning 18 deletes the birth certificate slot.
    pub fn set_beneficiary_age(&mut self, id: Uuid, age: Option<u32>) {
        let mut orphaned = Vec::new();
        if let Some(b) = self.beneficiary_mut(id) {
            b.age = age;
            if !b.is_minor() {
                if let Some(docs) = b.documents.remove(&BeneficiaryDocType::BirthCertificate) {
                    orphaned.extend(docs);
                }
            }
        }
        self.release_documents(&orphaned);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Documents
    // ═══════════════════════════════════════════════════════════════════

    /// Attach a processed document to its slot.
    pub fn attach_document(&mut self, target: &UploadTarget, document: UploadedDocument) {
        match target {
            UploadTarget::Company { doc_type, .. } => {
                self.company_docs.entry(*doc_type).or_default().push(document);
            }
            UploadTarget::Adhesion { doc_type } => {
                self.adhesion_docs.entry(*doc_type).or_default().push(document);
            }
            UploadTarget::Beneficiary { beneficiary_id, doc_type } => {
                let id = *beneficiary_id;
                let doc_type = *doc_type;
                if let Some(b) = self.beneficiary_mut(id) {
                    b.documents.entry(doc_type).or_default().push(document);
                    self.last_selected_beneficiary = Some(id);
                }
            }
        }
    }

    /// Remove one document from a slot, releasing its preview.
    pub fn remove_document(&mut self, target: &UploadTarget, document_id: Uuid) {
        let removed = match target {
            UploadTarget::Company { doc_type, .. } => {
                extract_doc(self.company_docs.get_mut(doc_type), document_id)
            }
            UploadTarget::Adhesion { doc_type } => {
                extract_doc(self.adhesion_docs.get_mut(doc_type), document_id)
            }
            UploadTarget::Beneficiary { beneficiary_id, doc_type } => {
                let (id, doc_type) = (*beneficiary_id, *doc_type);
                self.beneficiary_mut(id)
                    .and_then(|b| extract_doc(b.documents.get_mut(&doc_type), document_id))
            }
        };
        if let Some(doc) = removed {
            self.release_documents(std::slice::from_ref(&doc));
        }
    }

    pub fn company_slot_docs(&self, doc_type: CompanyDocType) -> &[UploadedDocument] {
        self.company_docs.get(&doc_type).map_or(&[], Vec::as_slice)
    }

    pub fn all_documents(&self) -> impl Iterator<Item = &UploadedDocument> {
        self.company_docs
            .values()
            .flatten()
            .chain(self.adhesion_docs.values().flatten())
            .chain(self.beneficiaries.iter().flat_map(Beneficiary::all_documents))
    }

    pub fn document_count(&self) -> usize {
        self.all_documents().count()
    }

    fn release_documents(&mut self, documents: &[UploadedDocument]) {
        for doc in documents {
            if let Some(handle) = &doc.preview {
                self.previews.release(handle);
            }
        }
    }

    /// Drop all session state, releasing every preview.
    pub fn reset(&mut self) {
        let handles: Vec<_> = self
            .all_documents()
            .filter_map(|d| d.preview.clone())
            .collect();
        for handle in handles {
            self.previews.release(&handle);
        }
        *self = ProposalSession::new(self.category);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Derived views
    // ═══════════════════════════════════════════════════════════════════

    pub fn partner_statuses(&self) -> Vec<PartnerDocStatus> {
        resolver::partner_doc_statuses(
            &self.partners,
            self.company_slot_docs(CompanyDocType::PartnerIdentity),
        )
    }

    pub fn company_requirements(&self) -> Vec<RequirementItem> {
        requirements::company_requirements(&CompanyRequirementsInput {
            counts: &self.counts,
            entry_mode: self.entry_mode,
            amendment_applicable: self.amendment_applicable,
            email: &self.company.email,
            phone: &self.company.phone,
            address: &self.company.address,
            company_docs: &self.company_docs,
            partners: &self.partners,
        })
    }

    pub fn adhesion_requirements(&self) -> Vec<RequirementItem> {
        requirements::adhesion_requirements(&self.adhesion_docs)
    }

    /// Rollup of every extraction on the session for the summary screen.
    pub fn extraction_summary(&self) -> ExtractionSummary {
        let mut summary = ExtractionSummary::default();
        let mut confidences = Vec::new();

        for doc in self.all_documents() {
            summary.document_count += 1;
            let Some(extraction) = &doc.extraction else { continue };
            summary.total_chars += extraction.total_chars;
            push_summary_names(&mut summary.names, extraction);
            for age in &extraction.ages {
                if !summary.ages.contains(age) {
                    summary.ages.push(*age);
                }
            }
            if summary.operator_name.is_none() {
                summary.operator_name = trimmed(&extraction.operator_name);
            }
            if summary.plan_type.is_none() {
                summary.plan_type = trimmed(&extraction.plan_type);
            }
            if summary.current_premium.is_none() {
                summary.current_premium = extraction.current_premium;
            }
            if let Some(value) = extraction.confidence_number() {
                confidences.push(value);
            }
        }

        summary.ages.sort_unstable();
        if !confidences.is_empty() {
            summary.average_confidence =
                Some(confidences.iter().sum::<f64>() / confidences.len() as f64);
        }
        summary
    }
}

fn extract_doc(
    docs: Option<&mut Vec<UploadedDocument>>,
    document_id: Uuid,
) -> Option<UploadedDocument> {
    let docs = docs?;
    let index = docs.iter().position(|d| d.id == document_id)?;
    Some(docs.remove(index))
}

fn trimmed(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn push_summary_names(names: &mut Vec<String>, extraction: &ExtractionResult) {
    let candidates = extraction
        .full_name
        .iter()
        .chain(extraction.beneficiary_names.iter());
    for name in candidates {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let key = text::fold(name);
        if !names.iter().any(|n| text::fold(n) == key) {
            names.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::FileInput;

    fn session_with_structure(total: u32) -> ProposalSession {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        session.set_counts(StructuralCounts {
            total_lives: total,
            partner_count: 1,
            employee_count: 0,
            has_employees: false,
        });
        session.rebuild_structure().unwrap();
        session
    }

    fn attach_with_preview(
        session: &mut ProposalSession,
        target: &UploadTarget,
        extraction: Option<ExtractionResult>,
    ) -> Uuid {
        let file = FileInput::new("doc.pdf", "application/pdf", vec![1]);
        let preview = session.previews.allocate();
        let doc = UploadedDocument::new(&file, extraction, Some(preview), None);
        let id = doc.id;
        session.attach_document(target, doc);
        id
    }

    #[test]
    fn count_edit_invalidates_structure() {
        let mut session = session_with_structure(2);
        assert!(session.structure_ready);
        session.set_counts(StructuralCounts {
            total_lives: 3,
            ..session.counts
        });
        assert!(!session.structure_ready);
        session.rebuild_structure().unwrap();
        assert!(session.structure_ready);
        assert_eq!(session.beneficiaries.len(), 3);
    }

    #[test]
    fn truncation_releases_previews() {
        let mut session = session_with_structure(3);
        let target = UploadTarget::Beneficiary {
            beneficiary_id: session.beneficiaries[2].id,
            doc_type: BeneficiaryDocType::Identity,
        };
        attach_with_preview(&mut session, &target, None);
        assert_eq!(session.previews.live(), 1);

        session.set_counts(StructuralCounts {
            total_lives: 1,
            ..session.counts
        });
        session.rebuild_structure().unwrap();
        assert_eq!(session.beneficiaries.len(), 1);
        assert_eq!(session.previews.live(), 0);
    }

    #[test]
    fn civil_status_change_orphans_marital_docs() {
        let mut session = session_with_structure(1);
        let id = session.beneficiaries[0].id;
        session.set_beneficiary_civil_status(id, Some(CivilStatus::Married));
        let target = UploadTarget::Beneficiary {
            beneficiary_id: id,
            doc_type: BeneficiaryDocType::MarriageCertificate,
        };
        attach_with_preview(&mut session, &target, None);
        session.beneficiary_mut(id).unwrap().marital_proof_mode = MaritalProofMode::Declaration;
        assert_eq!(session.previews.live(), 1);

        session.set_beneficiary_civil_status(id, Some(CivilStatus::Single));
        let b = session.beneficiary(id).unwrap();
        assert!(!b.has_docs(BeneficiaryDocType::MarriageCertificate));
        assert!(!b.has_docs(BeneficiaryDocType::UnionDeclaration));
        assert_eq!(b.marital_proof_mode, MaritalProofMode::Certificate);
        assert_eq!(session.previews.live(), 0);
    }

    #[test]
    fn turning_adult_orphans_birth_certificate() {
        let mut session = session_with_structure(1);
        let id = session.beneficiaries[0].id;
        session.set_beneficiary_age(id, Some(10));
        let target = UploadTarget::Beneficiary {
            beneficiary_id: id,
            doc_type: BeneficiaryDocType::BirthCertificate,
        };
        attach_with_preview(&mut session, &target, None);

        session.set_beneficiary_age(id, Some(21));
        assert!(!session.beneficiary(id).unwrap().has_docs(BeneficiaryDocType::BirthCertificate));
        assert_eq!(session.previews.live(), 0);
    }

    #[test]
    fn partner_removal_cascades_to_linked_docs() {
        let mut session = ProposalSession::new(ProposalCategory::Corporate);
        session.set_counts(StructuralCounts {
            total_lives: 3,
            partner_count: 2,
            employee_count: 0,
            has_employees: false,
        });
        session.rebuild_structure().unwrap();
        assert_eq!(session.partners.len(), 2);

        let partner_id = session.partners[1].id;
        let file = FileInput::new("rg_socio2.pdf", "application/pdf", vec![]);
        let preview = session.previews.allocate();
        let doc = UploadedDocument::new(&file, None, Some(preview), Some(partner_id));
        let target = UploadTarget::Company {
            doc_type: CompanyDocType::PartnerIdentity,
            partner_id: Some(partner_id),
        };
        session.attach_document(&target, doc);

        session.remove_partner(partner_id);
        assert_eq!(session.partners.len(), 1);
        assert_eq!(session.counts.partner_count, 1);
        assert!(session.company_slot_docs(CompanyDocType::PartnerIdentity).is_empty());
        assert_eq!(session.previews.live(), 0);
        assert!(!session.structure_ready);
    }

    #[test]
    fn add_partner_respects_ceiling() {
        let mut session = ProposalSession::new(ProposalCategory::Corporate);
        session.set_counts(StructuralCounts {
            total_lives: 3,
            partner_count: 1,
            employee_count: 1,
            has_employees: true,
        });
        session.rebuild_structure().unwrap();
        assert!(session.add_partner());
        assert_eq!(session.counts.partner_count, 2);
        // ceiling: 3 lives - 1 employee = 2 partners
        assert!(!session.add_partner());
    }

    #[test]
    fn reset_releases_every_preview() {
        let mut session = session_with_structure(2);
        let t0 = UploadTarget::Beneficiary {
            beneficiary_id: session.beneficiaries[0].id,
            doc_type: BeneficiaryDocType::Identity,
        };
        let t1 = UploadTarget::Beneficiary {
            beneficiary_id: session.beneficiaries[1].id,
            doc_type: BeneficiaryDocType::ResidenceProof,
        };
        attach_with_preview(&mut session, &t0, None);
        attach_with_preview(&mut session, &t1, None);
        assert_eq!(session.previews.live(), 2);

        session.reset();
        assert_eq!(session.previews.live(), 0);
        assert!(session.beneficiaries.is_empty());
        assert_eq!(session.document_count(), 0);
    }

    #[test]
    fn remove_document_releases_its_preview() {
        let mut session = session_with_structure(1);
        let target = UploadTarget::Beneficiary {
            beneficiary_id: session.beneficiaries[0].id,
            doc_type: BeneficiaryDocType::Identity,
        };
        let doc_id = attach_with_preview(&mut session, &target, None);
        assert_eq!(session.previews.live(), 1);

        session.remove_document(&target, doc_id);
        assert_eq!(session.previews.live(), 0);
        assert_eq!(session.document_count(), 0);
    }

    #[test]
    fn extraction_summary_rolls_up_documents() {
        let mut session = session_with_structure(2);
        let t0 = UploadTarget::Beneficiary {
            beneficiary_id: session.beneficiaries[0].id,
            doc_type: BeneficiaryDocType::PlanCard,
        };
        attach_with_preview(
            &mut session,
            &t0,
            Some(ExtractionResult {
                full_name: Some("Ana Silva".into()),
                operator_name: Some("Unimed".into()),
                current_premium: Some(450.0),
                ages: vec![34, 7],
                confidence: Some("80%".into()),
                total_chars: 1200,
                ..Default::default()
            }),
        );
        let t1 = UploadTarget::Beneficiary {
            beneficiary_id: session.beneficiaries[1].id,
            doc_type: BeneficiaryDocType::Identity,
        };
        attach_with_preview(
            &mut session,
            &t1,
            Some(ExtractionResult {
                beneficiary_names: vec!["ana silva".into(), "Bruno Costa".into()],
                confidence: Some("60%".into()),
                total_chars: 300,
                ..Default::default()
            }),
        );

        let summary = session.extraction_summary();
        assert_eq!(summary.names, vec!["Ana Silva", "Bruno Costa"]);
        assert_eq!(summary.ages, vec![7, 34]);
        assert_eq!(summary.operator_name.as_deref(), Some("Unimed"));
        assert_eq!(summary.current_premium, Some(450.0));
        assert_eq!(summary.average_confidence, Some(70.0));
        assert_eq!(summary.document_count, 2);
        assert_eq!(summary.total_chars, 1500);
    }
}
