//! Cross-entity hint propagation.
//!
//! Extractions never overwrite operator input: scalar hints fill only
//! fields that are still empty (and untouched, for company contact). Two
//! exceptions: partner names on contract uploads — the contract is the
//! source of truth for the partner roster, so its names replace placeholders
//! and stale manual entries alike — and the untouched company address, which
//! upgrades whenever a better-scored candidate shows up in the company
//! documents.

use tracing::debug;
use uuid::Uuid;

use crate::engine::merge;
use crate::engine::session::ProposalSession;
use crate::models::category::CivilStatus;
use crate::models::document::CompanyDocType;
use crate::models::entity::CompanyPartner;
use crate::models::extraction::ExtractionResult;
use crate::text;

fn fill_if_empty(field: &mut String, value: Option<&str>) {
    if field.trim().is_empty() {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            *field = value.to_string();
        }
    }
}

/// Fill empty, untouched company profile fields from a company-scoped
/// upload. A phone with fewer than 10 digits counts as incomplete and may
/// still be replaced. The address takes the best-scored candidate across
/// every company document, so an address-proof scan can upgrade the vague
/// line a contract offered.
pub fn apply_company_hints(session: &mut ProposalSession, extraction: &ExtractionResult) {
    let best_address = {
        let doc_addresses = session
            .company_docs
            .values()
            .flatten()
            .filter_map(|d| d.extraction.as_ref())
            .filter_map(|e| e.address.as_deref());
        text::best_address_candidate(extraction.address.as_deref().into_iter().chain(doc_addresses))
            .map(String::from)
    };

    let company = &mut session.company;
    if !company.tax_id_touched {
        fill_if_empty(&mut company.tax_id, extraction.company_tax_id.as_deref());
    }
    if !company.legal_name_touched {
        fill_if_empty(&mut company.legal_name, extraction.legal_name.as_deref());
    }
    if !company.email_touched {
        fill_if_empty(&mut company.email, extraction.email.as_deref());
    }
    if !company.phone_touched && text::digit_count(&company.phone) < 10 {
        if let Some(phone) = extraction.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            company.phone = phone.to_string();
        }
    }
    if !company.address_touched {
        if let Some(best) = best_address {
            if company.address.trim().is_empty()
                || text::score_address_candidate(&best)
                    > text::score_address_candidate(&company.address)
            {
                debug!(address = %best, "company address set to best-scored candidate");
                company.address = best;
            }
        }
    }
}

/// Fill one partner's identity fields from an identity-document upload.
/// Existing values win; the name is only replaced while it is still a
/// placeholder and no contract has claimed the roster.
pub fn apply_partner_identity_hints(
    session: &mut ProposalSession,
    partner_id: Uuid,
    extraction: &ExtractionResult,
) {
    let has_contract = !session.company_slot_docs(CompanyDocType::Contract).is_empty();
    let Some(partner) = session.partners.iter_mut().find(|p| p.id == partner_id) else {
        return;
    };

    if partner.identity_doc_kind.is_none() {
        partner.identity_doc_kind = extraction.inferred_identity_kind();
    }
    fill_if_empty(&mut partner.tax_id, extraction.tax_id.as_deref());
    fill_if_empty(&mut partner.national_id, extraction.national_id.as_deref());
    fill_if_empty(&mut partner.other_id, extraction.other_id.as_deref());
    fill_if_empty(&mut partner.license_number, extraction.license_number.as_deref());
    fill_if_empty(&mut partner.birth_date, extraction.birth_date.as_deref());
    fill_if_empty(&mut partner.issue_date, extraction.issue_date.as_deref());
    fill_if_empty(&mut partner.issuing_authority, extraction.issuing_authority.as_deref());

    if partner.has_placeholder_name() && !has_contract {
        if let Some(name) = extraction.hinted_person_name() {
            debug!(partner_id = %partner_id, name, "partner named from identity document");
            partner.full_name = name.to_string();
        }
    }

    sync_partners_to_beneficiaries(session);
}

/// Re-derive the partner roster from the merged contract extractions:
/// contract names override whatever the list currently shows, and the list
/// grows (never shrinks) to the detected count. Ids and identity fields are
/// preserved by index.
pub fn apply_contract_hints(session: &mut ProposalSession) {
    let contract_docs = session.company_slot_docs(CompanyDocType::Contract);
    if contract_docs.is_empty() {
        return;
    }
    let merged = merge::merge_documents(contract_docs);

    let mut inferred_names: Vec<String> = Vec::new();
    for name in merged
        .detected_partner_names
        .iter()
        .chain(merged.beneficiary_names.iter())
    {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let key = text::fold(name);
        if !inferred_names.iter().any(|n| text::fold(n) == key) {
            inferred_names.push(name.to_string());
        }
    }

    let inferred_total = match merged.detected_partner_count {
        Some(count) if count > 0 => count as usize,
        _ => inferred_names.len(),
    };
    if inferred_total == 0 && inferred_names.is_empty() {
        return;
    }

    let target_len = session.partners.len().max(inferred_total);
    let mut partners = std::mem::take(&mut session.partners);
    for index in 0..target_len {
        if index >= partners.len() {
            partners.push(CompanyPartner::new(index + 1));
        }
        if let Some(name) = inferred_names.get(index) {
            partners[index].full_name = name.clone();
        }
    }
    debug!(
        partners = partners.len(),
        named = inferred_names.len(),
        "partner roster derived from contract"
    );
    session.partners = partners;
    if session.counts.partner_count != session.partners.len() as u32 {
        session.counts.partner_count = session.partners.len() as u32;
        session.structure_ready = false;
    }

    apply_company_hints(session, &merged);
    sync_partners_to_beneficiaries(session);
}

/// Mirror partner profiles onto partner-role beneficiaries, in order. Names
/// only replace blanks and placeholders; identity fields fill blanks.
pub fn sync_partners_to_beneficiaries(session: &mut ProposalSession) {
    let partners = session.partners.clone();
    let mut partner_iter = partners.iter();
    for beneficiary in session
        .beneficiaries
        .iter_mut()
        .filter(|b| b.role == crate::models::BeneficiaryRole::Partner)
    {
        let Some(partner) = partner_iter.next() else { break };
        let name_is_open = beneficiary.full_name.trim().is_empty()
            || text::is_placeholder_partner_name(&beneficiary.full_name);
        if name_is_open && !partner.has_placeholder_name() {
            beneficiary.full_name = partner.full_name.clone();
        }
        fill_if_empty(&mut beneficiary.tax_id, Some(&partner.tax_id));
        fill_if_empty(&mut beneficiary.national_id, Some(&partner.national_id));
        fill_if_empty(&mut beneficiary.birth_date, Some(&partner.birth_date));
        if beneficiary.age.is_none() && !partner.birth_date.trim().is_empty() {
            beneficiary.age = text::infer_age_from_birth_date(&partner.birth_date);
        }
    }
}

/// Fill empty beneficiary form fields from a beneficiary-scoped upload.
pub fn apply_beneficiary_hints(
    session: &mut ProposalSession,
    beneficiary_id: Uuid,
    extraction: &ExtractionResult,
) {
    let civil_status = extraction
        .civil_status
        .as_deref()
        .and_then(CivilStatus::from_extracted);
    let hinted_age = extraction
        .birth_date
        .as_deref()
        .and_then(text::infer_age_from_birth_date)
        .or_else(|| extraction.ages.first().copied());

    let Some(beneficiary) = session.beneficiary_mut(beneficiary_id) else {
        return;
    };
    fill_if_empty(
        &mut beneficiary.full_name,
        extraction.hinted_person_name(),
    );
    fill_if_empty(&mut beneficiary.tax_id, extraction.tax_id.as_deref());
    fill_if_empty(&mut beneficiary.national_id, extraction.national_id.as_deref());
    fill_if_empty(&mut beneficiary.birth_date, extraction.birth_date.as_deref());
    if beneficiary.age.is_none() {
        beneficiary.age = hinted_age;
    }
    if beneficiary.civil_status.is_none() {
        beneficiary.civil_status = civil_status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::{BeneficiaryRole, ProposalCategory};
    use crate::models::document::{FileInput, UploadTarget, UploadedDocument};
    use crate::models::entity::StructuralCounts;
    use crate::models::IdentityDocKind;

    fn corporate_session(total: u32, partners: u32) -> ProposalSession {
        let mut session = ProposalSession::new(ProposalCategory::Corporate);
        session.set_counts(StructuralCounts {
            total_lives: total,
            partner_count: partners,
            employee_count: 0,
            has_employees: false,
        });
        session.rebuild_structure().unwrap();
        session
    }

    fn attach_contract(session: &mut ProposalSession, extraction: ExtractionResult) {
        let file = FileInput::new("contrato_social.pdf", "application/pdf", vec![]);
        let doc = UploadedDocument::new(&file, Some(extraction), None, None);
        let target = UploadTarget::Company {
            doc_type: CompanyDocType::Contract,
            partner_id: None,
        };
        session.attach_document(&target, doc);
    }

    #[test]
    fn company_hints_respect_touched_fields() {
        let mut session = corporate_session(2, 1);
        session.company.set_email("fixo@empresa.com");
        let extraction = ExtractionResult {
            company_tax_id: Some("12.345.678/0001-90".into()),
            email: Some("extraido@empresa.com".into()),
            phone: Some("(11) 98765-4321".into()),
            ..Default::default()
        };
        apply_company_hints(&mut session, &extraction);
        assert_eq!(session.company.tax_id, "12.345.678/0001-90");
        assert_eq!(session.company.email, "fixo@empresa.com");
        assert_eq!(session.company.phone, "(11) 98765-4321");
    }

    #[test]
    fn incomplete_phone_is_still_replaceable() {
        let mut session = corporate_session(2, 1);
        session.company.phone = "1198".into(); // came from an earlier bad scan
        let extraction = ExtractionResult {
            phone: Some("(11) 98765-4321".into()),
            ..Default::default()
        };
        apply_company_hints(&mut session, &extraction);
        assert_eq!(session.company.phone, "(11) 98765-4321");
    }

    #[test]
    fn company_address_upgrades_to_best_scored_candidate() {
        let mut session = corporate_session(2, 1);
        apply_company_hints(
            &mut session,
            &ExtractionResult {
                address: Some("Rua das Flores".into()),
                ..Default::default()
            },
        );
        assert_eq!(session.company.address, "Rua das Flores");

        // an address-proof scan carries the full address with CEP and number
        let file = FileInput::new("sede_empresa.pdf", "application/pdf", vec![]);
        let doc = UploadedDocument::new(
            &file,
            Some(ExtractionResult {
                address: Some("Rua das Flores, 123 - São Paulo SP, 01310-100".into()),
                ..Default::default()
            }),
            None,
            None,
        );
        let target = UploadTarget::Company {
            doc_type: CompanyDocType::CompanyAddressProof,
            partner_id: None,
        };
        session.attach_document(&target, doc);
        apply_company_hints(&mut session, &ExtractionResult::default());
        assert_eq!(
            session.company.address,
            "Rua das Flores, 123 - São Paulo SP, 01310-100"
        );

        // operator input is final
        session.company.set_address("Av. Paulista, 1000");
        apply_company_hints(
            &mut session,
            &ExtractionResult {
                address: Some("Rua das Flores, 123 - São Paulo SP, 01310-100".into()),
                ..Default::default()
            },
        );
        assert_eq!(session.company.address, "Av. Paulista, 1000");
    }

    #[test]
    fn contract_names_partners_and_grows_roster() {
        let mut session = corporate_session(5, 2);
        let kept_id = session.partners[0].id;
        attach_contract(
            &mut session,
            ExtractionResult {
                detected_partner_names: vec!["Ana Silva".into(), "Bruno Costa".into()],
                beneficiary_names: vec!["Carla Souza".into()],
                detected_partner_count: Some(3),
                ..Default::default()
            },
        );
        apply_contract_hints(&mut session);

        assert_eq!(session.partners.len(), 3);
        assert_eq!(session.partners[0].id, kept_id);
        assert_eq!(session.partners[0].full_name, "Ana Silva");
        assert_eq!(session.partners[1].full_name, "Bruno Costa");
        assert_eq!(session.partners[2].full_name, "Carla Souza");
        assert_eq!(session.counts.partner_count, 3);
        assert!(!session.structure_ready);
    }

    #[test]
    fn contract_roster_never_shrinks() {
        let mut session = corporate_session(5, 3);
        attach_contract(
            &mut session,
            ExtractionResult {
                detected_partner_names: vec!["Ana Silva".into()],
                ..Default::default()
            },
        );
        apply_contract_hints(&mut session);
        assert_eq!(session.partners.len(), 3);
        assert_eq!(session.partners[0].full_name, "Ana Silva");
        assert_eq!(session.partners[1].full_name, "Sócio 2");
    }

    #[test]
    fn partner_sync_fills_partner_role_beneficiaries() {
        let mut session = corporate_session(3, 2);
        session.partners[0].full_name = "Ana Silva".into();
        session.partners[0].tax_id = "123.456.789-00".into();
        session.partners[0].birth_date = "15/03/1990".into();

        sync_partners_to_beneficiaries(&mut session);

        let first = &session.beneficiaries[0];
        assert_eq!(first.role, BeneficiaryRole::Partner);
        assert_eq!(first.full_name, "Ana Silva");
        assert_eq!(first.tax_id, "123.456.789-00");
        assert!(first.age.is_some());

        // second partner still a placeholder: beneficiary stays blank
        assert!(session.beneficiaries[1].full_name.is_empty());
    }

    #[test]
    fn identity_hints_fill_partner_without_renaming_after_contract() {
        let mut session = corporate_session(3, 1);
        let partner_id = session.partners[0].id;
        attach_contract(
            &mut session,
            ExtractionResult {
                detected_partner_names: vec!["Ana Silva".into()],
                ..Default::default()
            },
        );
        apply_contract_hints(&mut session);

        let extraction = ExtractionResult {
            full_name: Some("Ana Maria Silva".into()),
            national_id: Some("12.345.678-9".into()),
            license_number: Some("01234567890".into()),
            ..Default::default()
        };
        apply_partner_identity_hints(&mut session, partner_id, &extraction);

        let partner = &session.partners[0];
        // contract owns the name
        assert_eq!(partner.full_name, "Ana Silva");
        assert_eq!(partner.national_id, "12.345.678-9");
        assert_eq!(partner.identity_doc_kind, Some(IdentityDocKind::Cnh));
    }

    #[test]
    fn identity_hints_name_placeholder_partner_when_no_contract() {
        let mut session = corporate_session(3, 1);
        let partner_id = session.partners[0].id;
        let extraction = ExtractionResult {
            full_name: Some("Bruno Costa".into()),
            national_id: Some("12.345.678-9".into()),
            ..Default::default()
        };
        apply_partner_identity_hints(&mut session, partner_id, &extraction);
        assert_eq!(session.partners[0].full_name, "Bruno Costa");
        assert_eq!(session.partners[0].identity_doc_kind, Some(IdentityDocKind::Rg));
    }

    #[test]
    fn beneficiary_hints_fill_blanks_only() {
        let mut session = corporate_session(2, 1);
        let id = session.beneficiaries[1].id;
        session.beneficiary_mut(id).unwrap().full_name = "Nome Digitado".into();

        let extraction = ExtractionResult {
            full_name: Some("Nome Extraído".into()),
            tax_id: Some("123.456.789-00".into()),
            birth_date: Some("15/03/1990".into()),
            civil_status: Some("casada".into()),
            ..Default::default()
        };
        apply_beneficiary_hints(&mut session, id, &extraction);

        let b = session.beneficiary(id).unwrap();
        assert_eq!(b.full_name, "Nome Digitado");
        assert_eq!(b.tax_id, "123.456.789-00");
        assert_eq!(b.birth_date, "15/03/1990");
        assert!(b.age.is_some());
        assert_eq!(b.civil_status, Some(CivilStatus::Married));
    }
}
