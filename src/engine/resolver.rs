//! Entity resolver: decide which partner or beneficiary an extracted
//! document belongs to.
//!
//! Resolution is heuristic but deterministic: extracted-name match first,
//! then filename match (beneficiaries), then the first entity still missing
//! a document (partners), then positional fallbacks. Same inputs always
//! resolve the same way.

use tracing::debug;
use uuid::Uuid;

use crate::models::document::UploadedDocument;
use crate::models::entity::{Beneficiary, CompanyPartner};
use crate::models::extraction::ExtractionResult;
use crate::text;

/// Per-partner identity-document coverage. Unlinked identity documents are
/// consumed in partner order: one unlinked file satisfies one pending
/// partner, so two anonymous uploads cover two partners instead of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerDocStatus {
    pub partner_id: Uuid,
    pub done: bool,
    pub files_count: usize,
}

pub fn partner_doc_statuses(
    partners: &[CompanyPartner],
    identity_docs: &[UploadedDocument],
) -> Vec<PartnerDocStatus> {
    let mut unlinked = identity_docs
        .iter()
        .filter(|d| d.linked_entity_id.is_none())
        .count();

    partners
        .iter()
        .map(|partner| {
            let linked = identity_docs
                .iter()
                .filter(|d| d.linked_entity_id == Some(partner.id))
                .count();
            if linked > 0 {
                PartnerDocStatus { partner_id: partner.id, done: true, files_count: linked }
            } else if unlinked > 0 {
                unlinked -= 1;
                PartnerDocStatus { partner_id: partner.id, done: true, files_count: 1 }
            } else {
                PartnerDocStatus { partner_id: partner.id, done: false, files_count: 0 }
            }
        })
        .collect()
}

/// Pick the partner an identity document belongs to: extracted-name match,
/// else the first partner still pending a document, else the first partner.
pub fn resolve_partner(
    extraction: &ExtractionResult,
    partners: &[CompanyPartner],
    statuses: &[PartnerDocStatus],
) -> Option<Uuid> {
    if partners.is_empty() {
        return None;
    }

    if let Some(hinted) = extraction.hinted_person_name() {
        if let Some(partner) = partners
            .iter()
            .find(|p| !p.has_placeholder_name() && text::is_likely_same_person(&p.full_name, hinted))
        {
            debug!(partner = %partner.full_name, "partner resolved by extracted name");
            return Some(partner.id);
        }
    }

    if let Some(pending) = statuses.iter().find(|s| !s.done) {
        debug!(partner_id = %pending.partner_id, "partner resolved as first pending");
        return Some(pending.partner_id);
    }

    partners.first().map(|p| p.id)
}

/// Pick the beneficiary a document belongs to: extracted-name match, else a
/// filename that mentions a beneficiary, else the caller's last selection if
/// it still exists, else the first beneficiary.
pub fn resolve_beneficiary(
    file_name: &str,
    extraction: &ExtractionResult,
    beneficiaries: &[Beneficiary],
    last_selected: Option<Uuid>,
) -> Option<Uuid> {
    if beneficiaries.is_empty() {
        return None;
    }

    if let Some(hinted) = extraction.hinted_person_name() {
        if let Some(b) = beneficiaries
            .iter()
            .filter(|b| !b.full_name.trim().is_empty())
            .find(|b| text::is_likely_same_person(&b.full_name, hinted))
        {
            debug!(beneficiary = %b.full_name, "beneficiary resolved by extracted name");
            return Some(b.id);
        }
    }

    let folded_file = text::fold_loose(file_name);
    if let Some(b) = beneficiaries.iter().find(|b| {
        let folded_name = text::fold_loose(&b.full_name);
        !folded_name.is_empty() && folded_file.contains(&folded_name)
    }) {
        debug!(beneficiary = %b.full_name, file = file_name, "beneficiary resolved by filename");
        return Some(b.id);
    }

    if let Some(id) = last_selected {
        if beneficiaries.iter().any(|b| b.id == id) {
            return Some(id);
        }
    }

    beneficiaries.first().map(|b| b.id)
}
