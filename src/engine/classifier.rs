//! Document classifier for auto-sort batches.
//!
//! Classification is a pure cascade over two kinds of evidence: keyword hits
//! on the folded filename and signal predicates over the extraction. The
//! rules live in declarative tables, ordered most-specific-first; the driver
//! walks them and resolves the owning entity (partner or beneficiary) only
//! once a rule fires. Ambiguity is a value, never an error: a file that no
//! rule claims comes back with `target: None` and a reason.

use uuid::Uuid;

use crate::engine::resolver::{self, PartnerDocStatus};
use crate::models::category::ProposalCategory;
use crate::models::document::{
    AdhesionDocType, BeneficiaryDocType, CompanyDocType, UploadTarget,
};
use crate::models::entity::{Beneficiary, CompanyPartner};
use crate::models::extraction::{non_empty, ExtractionResult};
use crate::text;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub target: Option<UploadTarget>,
    pub reason: String,
}

/// Everything the cascade needs to place one file.
pub struct ClassifyInput<'a> {
    pub file_name: &'a str,
    pub extraction: &'a ExtractionResult,
    pub category: ProposalCategory,
    pub partners: &'a [CompanyPartner],
    pub partner_statuses: &'a [PartnerDocStatus],
    pub beneficiaries: &'a [Beneficiary],
    pub last_selected_beneficiary: Option<Uuid>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Keyword lexicons (folded, Portuguese-inclusive)
// ═══════════════════════════════════════════════════════════════════════════

const CONTRACT_KW: &[&str] = &["contrato", "social", "qsa", "socios", "socio"];
const TAX_CARD_KW: &[&str] =
    &["cartao cnpj", "comprovante de inscricao", "receita", "cnpj"];
const COMPANY_ADDRESS_KW: &[&str] =
    &["endereco empresa", "comprovante endereco empresa", "sede"];
const AMENDMENT_KW: &[&str] = &["alteracao contratual", "aditivo"];
const ROSTER_KW: &[&str] = &["gfip", "funcionarios", "funcionario", "folha"];
const ELIGIBILITY_KW: &[&str] = &["elegibilidade", "vinculo", "associacao"];
const ASSOCIATION_KW: &[&str] = &["associacao", "filiacao"];
const PLAN_CARD_KW: &[&str] = &["carteirinha", "cartao plano", "cartao do plano"];
const PERMANENCE_KW: &[&str] = &["carta permanencia", "permanencia"];
const MARRIAGE_KW: &[&str] = &["certidao casamento", "casamento"];
const UNION_KW: &[&str] = &["uniao estavel", "declaracao marital"];
const BIRTH_KW: &[&str] = &["certidao nascimento", "nascimento"];
const SELFIE_KW: &[&str] = &["selfie", "rosto", "face", "foto rosto", "foto face"];
const RESIDENCE_KW: &[&str] = &[
    "comprovante residencia", "residencia", "endereco", "conta luz", "conta agua",
];
const IDENTITY_KW: &[&str] = &["rg", "identidade", "cnh", "habilitacao", "ifp", "cpf"];

// ═══════════════════════════════════════════════════════════════════════════
// Signals
// ═══════════════════════════════════════════════════════════════════════════

/// Precomputed evidence: one keyword flag per lexicon plus extraction-shape
/// predicates. Rules are plain functions over this view.
#[derive(Debug, Clone, Copy)]
struct Signals {
    contract_kw: bool,
    tax_card_kw: bool,
    company_address_kw: bool,
    amendment_kw: bool,
    roster_kw: bool,
    eligibility_kw: bool,
    association_kw: bool,
    plan_card_kw: bool,
    permanence_kw: bool,
    marriage_kw: bool,
    union_kw: bool,
    birth_kw: bool,
    selfie_kw: bool,
    residence_kw: bool,
    identity_kw: bool,

    has_identity: bool,
    has_company: bool,
    has_company_registration: bool,
    has_company_ids: bool,
    has_address: bool,
    has_health_plan: bool,
    has_partner_names: bool,
}

impl Signals {
    fn compute(file_name: &str, e: &ExtractionResult) -> Self {
        let folded = text::fold_loose(file_name);
        let kw = |lexicon: &[&str]| text::contains_any(&folded, lexicon);

        Signals {
            contract_kw: kw(CONTRACT_KW),
            tax_card_kw: kw(TAX_CARD_KW),
            company_address_kw: kw(COMPANY_ADDRESS_KW),
            amendment_kw: kw(AMENDMENT_KW),
            roster_kw: kw(ROSTER_KW),
            eligibility_kw: kw(ELIGIBILITY_KW),
            association_kw: kw(ASSOCIATION_KW),
            plan_card_kw: kw(PLAN_CARD_KW),
            permanence_kw: kw(PERMANENCE_KW),
            marriage_kw: kw(MARRIAGE_KW),
            union_kw: kw(UNION_KW),
            birth_kw: kw(BIRTH_KW),
            selfie_kw: kw(SELFIE_KW),
            residence_kw: kw(RESIDENCE_KW),
            identity_kw: kw(IDENTITY_KW),

            has_identity: non_empty(&e.tax_id)
                || non_empty(&e.national_id)
                || non_empty(&e.other_id)
                || non_empty(&e.license_number)
                || non_empty(&e.birth_date)
                || non_empty(&e.identity_doc_kind),
            has_company: non_empty(&e.company_tax_id)
                || non_empty(&e.legal_name)
                || non_empty(&e.state_registration)
                || !e.detected_partner_names.is_empty(),
            has_company_registration: non_empty(&e.company_tax_id)
                || non_empty(&e.legal_name)
                || non_empty(&e.state_registration)
                || non_empty(&e.trade_name),
            has_company_ids: non_empty(&e.company_tax_id) && non_empty(&e.legal_name),
            has_address: non_empty(&e.address),
            has_health_plan: non_empty(&e.operator_name)
                || non_empty(&e.plan_type)
                || e.current_premium.is_some()
                || !e.ages.is_empty(),
            has_partner_names: !e.detected_partner_names.is_empty(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rule tables
// ═══════════════════════════════════════════════════════════════════════════

struct CompanyRule {
    applies: fn(&Signals) -> bool,
    doc_type: CompanyDocType,
    reason: &'static str,
}

/// Corporate slots, most specific first. Partner identity goes last: identity
/// signals are common on every personal document.
const COMPANY_RULES: &[CompanyRule] = &[
    CompanyRule {
        applies: |s| s.contract_kw || (s.has_partner_names && s.has_company),
        doc_type: CompanyDocType::Contract,
        reason: "contract keywords or partner roster in extraction",
    },
    CompanyRule {
        applies: |s| s.amendment_kw,
        doc_type: CompanyDocType::Amendment,
        reason: "amendment keywords in filename",
    },
    CompanyRule {
        applies: |s| s.roster_kw,
        doc_type: CompanyDocType::EmployeeRoster,
        reason: "employee roster keywords in filename",
    },
    CompanyRule {
        applies: |s| s.tax_card_kw || (s.has_company_ids && !s.contract_kw),
        doc_type: CompanyDocType::TaxRegistrationCard,
        reason: "tax card keywords or company registry ids",
    },
    CompanyRule {
        applies: |s| {
            s.company_address_kw
                || (s.has_address
                    && (s.has_company_registration
                        || (!s.has_identity && !s.has_health_plan && !s.residence_kw)))
        },
        doc_type: CompanyDocType::CompanyAddressProof,
        reason: "company address keywords or address with company context",
    },
];

struct BeneficiaryRule {
    applies: fn(&Signals) -> bool,
    doc_type: BeneficiaryDocType,
    reason: &'static str,
}

const BENEFICIARY_RULES: &[BeneficiaryRule] = &[
    BeneficiaryRule {
        applies: |s| s.plan_card_kw || s.has_health_plan,
        doc_type: BeneficiaryDocType::PlanCard,
        reason: "plan card keywords or health plan data",
    },
    BeneficiaryRule {
        applies: |s| s.permanence_kw,
        doc_type: BeneficiaryDocType::PermanenceLetter,
        reason: "permanence letter keywords",
    },
    BeneficiaryRule {
        applies: |s| s.marriage_kw,
        doc_type: BeneficiaryDocType::MarriageCertificate,
        reason: "marriage certificate keywords",
    },
    BeneficiaryRule {
        applies: |s| s.union_kw,
        doc_type: BeneficiaryDocType::UnionDeclaration,
        reason: "civil union declaration keywords",
    },
    BeneficiaryRule {
        applies: |s| s.birth_kw,
        doc_type: BeneficiaryDocType::BirthCertificate,
        reason: "birth certificate keywords",
    },
    BeneficiaryRule {
        applies: |s| s.selfie_kw,
        doc_type: BeneficiaryDocType::Selfie,
        reason: "selfie keywords",
    },
    BeneficiaryRule {
        applies: |s| s.residence_kw || s.has_address,
        doc_type: BeneficiaryDocType::ResidenceProof,
        reason: "residence keywords or extracted address",
    },
    BeneficiaryRule {
        applies: |s| s.identity_kw || s.has_identity,
        doc_type: BeneficiaryDocType::Identity,
        reason: "identity keywords or identity data",
    },
];

// ═══════════════════════════════════════════════════════════════════════════
// Driver
// ═══════════════════════════════════════════════════════════════════════════

pub fn classify(input: &ClassifyInput<'_>) -> Classification {
    let signals = Signals::compute(input.file_name, input.extraction);

    if input.category.is_corporate() {
        for rule in COMPANY_RULES {
            if (rule.applies)(&signals) {
                return company_hit(rule.doc_type, None, rule.reason);
            }
        }
        if signals.identity_kw || signals.has_identity {
            let partner_id = resolver::resolve_partner(
                input.extraction,
                input.partners,
                input.partner_statuses,
            );
            return company_hit(
                CompanyDocType::PartnerIdentity,
                partner_id,
                "identity keywords or identity data",
            );
        }
    }

    if input.category == ProposalCategory::Adhesion {
        if signals.eligibility_kw {
            return adhesion_hit(AdhesionDocType::Eligibility, "eligibility keywords");
        }
        if signals.association_kw {
            return adhesion_hit(AdhesionDocType::AssociationForm, "association keywords");
        }
    }

    let beneficiary_id = resolver::resolve_beneficiary(
        input.file_name,
        input.extraction,
        input.beneficiaries,
        input.last_selected_beneficiary,
    );
    if let Some(beneficiary_id) = beneficiary_id {
        for rule in BENEFICIARY_RULES {
            if (rule.applies)(&signals) {
                // A residence-looking file that also carries company registry
                // data belongs to the company on corporate proposals.
                if rule.doc_type == BeneficiaryDocType::ResidenceProof
                    && input.category.is_corporate()
                    && signals.has_company_registration
                {
                    return company_hit(
                        CompanyDocType::CompanyAddressProof,
                        None,
                        "address with company registry data",
                    );
                }
                return Classification {
                    target: Some(UploadTarget::Beneficiary {
                        beneficiary_id,
                        doc_type: rule.doc_type,
                    }),
                    reason: rule.reason.to_string(),
                };
            }
        }
    }

    if input.category.is_corporate() {
        if signals.has_company {
            return company_hit(
                CompanyDocType::Contract,
                None,
                "company data without a stronger match",
            );
        }
        if signals.has_address {
            return company_hit(
                CompanyDocType::CompanyAddressProof,
                None,
                "extracted address without a stronger match",
            );
        }
    }

    Classification {
        target: None,
        reason: "no confident classification".to_string(),
    }
}

fn company_hit(
    doc_type: CompanyDocType,
    partner_id: Option<Uuid>,
    reason: &str,
) -> Classification {
    Classification {
        target: Some(UploadTarget::Company { doc_type, partner_id }),
        reason: reason.to_string(),
    }
}

fn adhesion_hit(doc_type: AdhesionDocType, reason: &str) -> Classification {
    Classification {
        target: Some(UploadTarget::Adhesion { doc_type }),
        reason: reason.to_string(),
    }
}
