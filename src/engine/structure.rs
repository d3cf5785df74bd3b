//! Structure builder: turn validated counts into a beneficiary list.
//!
//! Rebuilds preserve identity: a beneficiary that keeps its index keeps its
//! id, form fields and documents, only the role is reassigned. Truncated
//! entries are returned to the caller, which must release their previews.

use tracing::debug;

use crate::error::StructureError;
use crate::models::category::{BeneficiaryRole, ProposalCategory};
use crate::models::entity::{Beneficiary, CompanyPartner, StructuralCounts};

#[derive(Debug)]
pub struct StructureOutcome {
    pub beneficiaries: Vec<Beneficiary>,
    /// Entries cut off by a shrinking total; their documents still hold
    /// preview handles.
    pub discarded: Vec<Beneficiary>,
}

pub fn validate_counts(
    category: ProposalCategory,
    counts: &StructuralCounts,
) -> Result<(), StructureError> {
    if counts.total_lives == 0 {
        return Err(StructureError::TotalLivesZero);
    }
    if category.is_corporate() {
        if counts.partner_count == 0 || counts.partner_count > counts.total_lives {
            return Err(StructureError::PartnerCountOutOfRange {
                partner_count: counts.partner_count,
                total_lives: counts.total_lives,
            });
        }
        if counts.has_employees && counts.employee_count == 0 {
            return Err(StructureError::EmployeesEnabledButZero);
        }
        let employees = counts.effective_employee_count();
        if counts.partner_count + employees > counts.total_lives {
            return Err(StructureError::CountsExceedTotal {
                partner_count: counts.partner_count,
                employee_count: employees,
                total_lives: counts.total_lives,
            });
        }
    }
    Ok(())
}

/// Role for the beneficiary at `index`: corporate proposals slot partners
/// first, then employees, then dependents; other categories have one holder
/// and dependents.
pub fn role_for_index(
    category: ProposalCategory,
    counts: &StructuralCounts,
    index: usize,
) -> BeneficiaryRole {
    if category.is_corporate() {
        let partners = counts.partner_count as usize;
        let employees = counts.effective_employee_count() as usize;
        if index < partners {
            BeneficiaryRole::Partner
        } else if index < partners + employees {
            BeneficiaryRole::Employee
        } else {
            BeneficiaryRole::Dependent
        }
    } else if index == 0 {
        BeneficiaryRole::Holder
    } else {
        BeneficiaryRole::Dependent
    }
}

pub fn build_structure(
    category: ProposalCategory,
    counts: &StructuralCounts,
    existing: Vec<Beneficiary>,
) -> Result<StructureOutcome, StructureError> {
    validate_counts(category, counts)?;

    let total = counts.total_lives as usize;
    let mut beneficiaries = Vec::with_capacity(total);
    let mut existing = existing.into_iter();

    for index in 0..total {
        let mut beneficiary = existing
            .next()
            .unwrap_or_else(|| Beneficiary::new(BeneficiaryRole::Dependent));
        beneficiary.role = role_for_index(category, counts, index);
        beneficiaries.push(beneficiary);
    }

    let discarded: Vec<Beneficiary> = existing.collect();
    if !discarded.is_empty() {
        debug!(count = discarded.len(), "structure rebuild truncated beneficiaries");
    }
    Ok(StructureOutcome { beneficiaries, discarded })
}

/// Resize the partner list to `count`, reusing entries by index and
/// provisioning placeholders for new positions.
pub fn reconcile_partners(existing: Vec<CompanyPartner>, count: usize) -> Vec<CompanyPartner> {
    let mut partners = existing;
    partners.truncate(count);
    while partners.len() < count {
        partners.push(CompanyPartner::new(partners.len() + 1));
    }
    partners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{BeneficiaryDocType, FileInput, UploadedDocument};

    fn counts(total: u32, partners: u32, employees: u32, has_employees: bool) -> StructuralCounts {
        StructuralCounts {
            total_lives: total,
            partner_count: partners,
            employee_count: employees,
            has_employees,
        }
    }

    #[test]
    fn count_validation_errors_are_named() {
        assert_eq!(
            validate_counts(ProposalCategory::Individual, &counts(0, 1, 0, false)),
            Err(StructureError::TotalLivesZero)
        );
        assert_eq!(
            validate_counts(ProposalCategory::Corporate, &counts(3, 4, 0, false)),
            Err(StructureError::PartnerCountOutOfRange { partner_count: 4, total_lives: 3 })
        );
        assert_eq!(
            validate_counts(ProposalCategory::Corporate, &counts(3, 1, 0, true)),
            Err(StructureError::EmployeesEnabledButZero)
        );
        assert_eq!(
            validate_counts(ProposalCategory::Corporate, &counts(4, 2, 3, true)),
            Err(StructureError::CountsExceedTotal {
                partner_count: 2,
                employee_count: 3,
                total_lives: 4,
            })
        );
        assert!(validate_counts(ProposalCategory::Corporate, &counts(5, 2, 2, true)).is_ok());
    }

    #[test]
    fn corporate_roles_by_index() {
        let c = counts(5, 2, 2, true);
        let built = build_structure(ProposalCategory::Corporate, &c, Vec::new()).unwrap();
        let roles: Vec<BeneficiaryRole> = built.beneficiaries.iter().map(|b| b.role).collect();
        assert_eq!(
            roles,
            vec![
                BeneficiaryRole::Partner,
                BeneficiaryRole::Partner,
                BeneficiaryRole::Employee,
                BeneficiaryRole::Employee,
                BeneficiaryRole::Dependent,
            ]
        );
    }

    #[test]
    fn individual_has_holder_then_dependents() {
        let c = counts(3, 1, 0, false);
        let built = build_structure(ProposalCategory::Individual, &c, Vec::new()).unwrap();
        let roles: Vec<BeneficiaryRole> = built.beneficiaries.iter().map(|b| b.role).collect();
        assert_eq!(
            roles,
            vec![
                BeneficiaryRole::Holder,
                BeneficiaryRole::Dependent,
                BeneficiaryRole::Dependent,
            ]
        );
    }

    #[test]
    fn rebuild_preserves_ids_fields_and_documents() {
        let c = counts(2, 1, 0, false);
        let built = build_structure(ProposalCategory::Corporate, &c, Vec::new()).unwrap();
        let mut list = built.beneficiaries;
        list[0].full_name = "Ana Silva".into();
        let file = FileInput::new("rg.pdf", "application/pdf", vec![]);
        list[0]
            .documents
            .entry(BeneficiaryDocType::Identity)
            .or_default()
            .push(UploadedDocument::new(&file, None, None, None));
        let kept_id = list[0].id;

        let grown = counts(4, 2, 0, false);
        let rebuilt = build_structure(ProposalCategory::Corporate, &grown, list).unwrap();
        assert_eq!(rebuilt.beneficiaries.len(), 4);
        assert!(rebuilt.discarded.is_empty());
        assert_eq!(rebuilt.beneficiaries[0].id, kept_id);
        assert_eq!(rebuilt.beneficiaries[0].full_name, "Ana Silva");
        assert_eq!(rebuilt.beneficiaries[0].document_count(), 1);
        assert_eq!(rebuilt.beneficiaries[0].role, BeneficiaryRole::Partner);
        assert_eq!(rebuilt.beneficiaries[1].role, BeneficiaryRole::Partner);
    }

    #[test]
    fn shrink_returns_discarded_entries() {
        let c = counts(3, 1, 0, false);
        let built = build_structure(ProposalCategory::Individual, &c, Vec::new()).unwrap();
        let mut list = built.beneficiaries;
        list[2].full_name = "Carla Souza".into();

        let shrunk = counts(1, 1, 0, false);
        let rebuilt = build_structure(ProposalCategory::Individual, &shrunk, list).unwrap();
        assert_eq!(rebuilt.beneficiaries.len(), 1);
        assert_eq!(rebuilt.discarded.len(), 2);
        assert_eq!(rebuilt.discarded[1].full_name, "Carla Souza");
    }

    #[test]
    fn partner_reconciliation_reuses_by_index() {
        let partners = reconcile_partners(Vec::new(), 2);
        assert_eq!(partners.len(), 2);
        assert_eq!(partners[1].full_name, "Sócio 2");

        let mut named = partners.clone();
        named[0].full_name = "Ana Silva".into();
        let ids: Vec<_> = named.iter().map(|p| p.id).collect();

        let grown = reconcile_partners(named, 3);
        assert_eq!(grown.len(), 3);
        assert_eq!(grown[0].id, ids[0]);
        assert_eq!(grown[0].full_name, "Ana Silva");
        assert_eq!(grown[1].id, ids[1]);
        assert_eq!(grown[2].full_name, "Sócio 3");

        let shrunk = reconcile_partners(grown, 1);
        assert_eq!(shrunk.len(), 1);
        assert_eq!(shrunk[0].id, ids[0]);
    }
}
