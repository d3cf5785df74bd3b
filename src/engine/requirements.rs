//! Requirement engine: derive checklists from session state.
//!
//! Checklists are pure functions of their inputs — nothing here mutates the
//! session, so recomputing after any edit always yields a consistent view.
//! Conditional items (amendment, roster, marital proof, birth certificate)
//! appear or disappear as the controlling fields change.

use std::collections::BTreeMap;

use crate::engine::resolver;
use crate::models::category::DataEntryMode;
use crate::models::document::{
    AdhesionDocType, BeneficiaryDocType, CompanyDocType, UploadedDocument,
};
use crate::models::entity::{Beneficiary, CompanyPartner, StructuralCounts};
use crate::models::requirement::RequirementItem;
use crate::models::MaritalProofMode;

pub struct CompanyRequirementsInput<'a> {
    pub counts: &'a StructuralCounts,
    pub entry_mode: DataEntryMode,
    pub amendment_applicable: bool,
    pub email: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub company_docs: &'a BTreeMap<CompanyDocType, Vec<UploadedDocument>>,
    pub partners: &'a [CompanyPartner],
}

fn doc_count(docs: &BTreeMap<CompanyDocType, Vec<UploadedDocument>>, t: CompanyDocType) -> usize {
    docs.get(&t).map_or(0, Vec::len)
}

/// Corporate checklist: contact and address fields plus one item per company
/// document slot.
pub fn company_requirements(input: &CompanyRequirementsInput<'_>) -> Vec<RequirementItem> {
    let mut items = Vec::new();

    items.push(RequirementItem::new(
        "company-contato",
        "Contato da empresa (e-mail e telefone)",
        true,
        !input.email.trim().is_empty() && !input.phone.trim().is_empty(),
    ));

    let manual = input.entry_mode == DataEntryMode::Manual;
    items.push(
        RequirementItem::new(
            "company-endereco",
            "Endereço da empresa",
            manual,
            !input.address.trim().is_empty(),
        )
        .with_helper(if manual {
            "Obrigatório no modo de digitação manual"
        } else {
            "Preenchido automaticamente pelos documentos"
        }),
    );

    items.push(RequirementItem::new(
        "company-contrato",
        CompanyDocType::Contract.label(),
        true,
        doc_count(input.company_docs, CompanyDocType::Contract) > 0,
    ));
    items.push(RequirementItem::new(
        "company-cartao-cnpj",
        CompanyDocType::TaxRegistrationCard.label(),
        true,
        doc_count(input.company_docs, CompanyDocType::TaxRegistrationCard) > 0,
    ));
    items.push(RequirementItem::new(
        "company-endereco-empresa",
        CompanyDocType::CompanyAddressProof.label(),
        true,
        doc_count(input.company_docs, CompanyDocType::CompanyAddressProof) > 0,
    ));

    items.push(
        RequirementItem::new(
            "company-alteracao",
            CompanyDocType::Amendment.label(),
            input.amendment_applicable,
            doc_count(input.company_docs, CompanyDocType::Amendment) > 0,
        )
        .with_helper(if input.amendment_applicable {
            "Marcada como aplicável a esta empresa"
        } else {
            "Apenas se houver alteração contratual"
        }),
    );

    let identity_docs = input
        .company_docs
        .get(&CompanyDocType::PartnerIdentity)
        .map_or(&[][..], Vec::as_slice);
    let statuses = resolver::partner_doc_statuses(input.partners, identity_docs);
    let done_partners = statuses.iter().filter(|s| s.done).count();
    let total_partners = input.partners.len();
    let identity_done = if total_partners > 0 {
        done_partners >= total_partners
    } else {
        !identity_docs.is_empty()
    };
    items.push(
        RequirementItem::new(
            "company-identidade-socios",
            CompanyDocType::PartnerIdentity.label(),
            true,
            identity_done,
        )
        .with_helper(format!(
            "{done_partners}/{total_partners} sócio(s) com documento vinculado"
        )),
    );

    items.push(
        RequirementItem::new(
            "company-funcionarios",
            CompanyDocType::EmployeeRoster.label(),
            input.counts.has_employees,
            doc_count(input.company_docs, CompanyDocType::EmployeeRoster) > 0,
        )
        .with_helper(if input.counts.has_employees {
            "Obrigatória quando há funcionários no plano"
        } else {
            "Apenas quando houver funcionários"
        }),
    );

    items
}

/// Per-beneficiary checklist: form fields, document slots, and the
/// conditional marital-proof and birth-certificate items.
pub fn beneficiary_requirements(beneficiary: &Beneficiary) -> Vec<RequirementItem> {
    let id = beneficiary.id;
    let mut items = Vec::new();

    items.push(RequirementItem::new(
        format!("{id}-nome"),
        "Nome completo",
        true,
        !beneficiary.full_name.trim().is_empty(),
    ));
    items.push(RequirementItem::new(
        format!("{id}-idade"),
        "Idade",
        true,
        beneficiary.age.is_some(),
    ));
    items.push(RequirementItem::new(
        format!("{id}-estado-civil"),
        "Estado civil",
        true,
        beneficiary.civil_status.is_some(),
    ));

    let doc_items = [
        ("identidade", BeneficiaryDocType::Identity),
        ("residencia", BeneficiaryDocType::ResidenceProof),
        ("carteirinha", BeneficiaryDocType::PlanCard),
        ("permanencia", BeneficiaryDocType::PermanenceLetter),
    ];
    for (suffix, doc_type) in doc_items {
        items.push(RequirementItem::new(
            format!("{id}-{suffix}"),
            doc_type.label(),
            true,
            beneficiary.has_docs(doc_type),
        ));
    }

    if beneficiary
        .civil_status
        .is_some_and(|s| s.requires_marital_proof())
    {
        let (suffix, doc_type) = match beneficiary.marital_proof_mode {
            MaritalProofMode::Certificate => ("casamento", BeneficiaryDocType::MarriageCertificate),
            MaritalProofMode::Declaration => ("uniao", BeneficiaryDocType::UnionDeclaration),
        };
        items.push(RequirementItem::new(
            format!("{id}-{suffix}"),
            doc_type.label(),
            true,
            beneficiary.has_docs(doc_type),
        ));
    }

    if beneficiary.is_minor() {
        items.push(
            RequirementItem::new(
                format!("{id}-nascimento"),
                BeneficiaryDocType::BirthCertificate.label(),
                true,
                beneficiary.has_docs(BeneficiaryDocType::BirthCertificate),
            )
            .with_helper("Obrigatória para menores de 18 anos"),
        );
    }

    items.push(
        RequirementItem::new(
            format!("{id}-selfie"),
            BeneficiaryDocType::Selfie.label(),
            false,
            beneficiary.has_docs(BeneficiaryDocType::Selfie),
        )
        .with_helper("Opcional para validação facial"),
    );

    items
}

/// Adhesion checklist: both slots required.
pub fn adhesion_requirements(
    adhesion_docs: &BTreeMap<AdhesionDocType, Vec<UploadedDocument>>,
) -> Vec<RequirementItem> {
    AdhesionDocType::ALL
        .iter()
        .map(|doc_type| {
            RequirementItem::new(
                format!("adesao-{}", doc_type.as_str()),
                doc_type.label(),
                true,
                adhesion_docs.get(doc_type).is_some_and(|d| !d.is_empty()),
            )
        })
        .collect()
}
