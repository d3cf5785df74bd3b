//! Document slots, upload targets and the uploaded-document record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::models::extraction::ExtractionResult;
use crate::models::preview::PreviewHandle;

// ═══════════════════════════════════════════════════════════════════════════
// Document slots
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyDocType {
    Contract,
    TaxRegistrationCard,
    CompanyAddressProof,
    Amendment,
    PartnerIdentity,
    EmployeeRoster,
}

impl CompanyDocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyDocType::Contract => "contract",
            CompanyDocType::TaxRegistrationCard => "tax_registration_card",
            CompanyDocType::CompanyAddressProof => "company_address_proof",
            CompanyDocType::Amendment => "amendment",
            CompanyDocType::PartnerIdentity => "partner_identity",
            CompanyDocType::EmployeeRoster => "employee_roster",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompanyDocType::Contract => "Contrato social",
            CompanyDocType::TaxRegistrationCard => "Cartão CNPJ",
            CompanyDocType::CompanyAddressProof => "Comprovante de endereço da empresa",
            CompanyDocType::Amendment => "Alteração contratual",
            CompanyDocType::PartnerIdentity => "Documento de identidade do sócio",
            CompanyDocType::EmployeeRoster => "Relação de funcionários (GFIP)",
        }
    }

    pub const ALL: [CompanyDocType; 6] = [
        CompanyDocType::Contract,
        CompanyDocType::TaxRegistrationCard,
        CompanyDocType::CompanyAddressProof,
        CompanyDocType::Amendment,
        CompanyDocType::PartnerIdentity,
        CompanyDocType::EmployeeRoster,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdhesionDocType {
    Eligibility,
    AssociationForm,
}

impl AdhesionDocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdhesionDocType::Eligibility => "eligibility",
            AdhesionDocType::AssociationForm => "association_form",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdhesionDocType::Eligibility => "Comprovante de elegibilidade",
            AdhesionDocType::AssociationForm => "Ficha de associação",
        }
    }

    pub const ALL: [AdhesionDocType; 2] =
        [AdhesionDocType::Eligibility, AdhesionDocType::AssociationForm];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryDocType {
    Identity,
    ResidenceProof,
    PlanCard,
    PermanenceLetter,
    MarriageCertificate,
    UnionDeclaration,
    BirthCertificate,
    Selfie,
}

impl BeneficiaryDocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeneficiaryDocType::Identity => "identity",
            BeneficiaryDocType::ResidenceProof => "residence_proof",
            BeneficiaryDocType::PlanCard => "plan_card",
            BeneficiaryDocType::PermanenceLetter => "permanence_letter",
            BeneficiaryDocType::MarriageCertificate => "marriage_certificate",
            BeneficiaryDocType::UnionDeclaration => "union_declaration",
            BeneficiaryDocType::BirthCertificate => "birth_certificate",
            BeneficiaryDocType::Selfie => "selfie",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BeneficiaryDocType::Identity => "Documento de identidade",
            BeneficiaryDocType::ResidenceProof => "Comprovante de residência",
            BeneficiaryDocType::PlanCard => "Carteirinha do plano",
            BeneficiaryDocType::PermanenceLetter => "Carta de permanência",
            BeneficiaryDocType::MarriageCertificate => "Certidão de casamento",
            BeneficiaryDocType::UnionDeclaration => "Declaração de união estável",
            BeneficiaryDocType::BirthCertificate => "Certidão de nascimento",
            BeneficiaryDocType::Selfie => "Selfie",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Upload target
// ═══════════════════════════════════════════════════════════════════════════

/// Where an uploaded file should land: a company slot (optionally pinned to a
/// specific partner for identity documents), an adhesion slot, or a
/// beneficiary slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum UploadTarget {
    Company {
        doc_type: CompanyDocType,
        #[serde(skip_serializing_if = "Option::is_none")]
        partner_id: Option<Uuid>,
    },
    Adhesion {
        doc_type: AdhesionDocType,
    },
    Beneficiary {
        beneficiary_id: Uuid,
        doc_type: BeneficiaryDocType,
    },
}

impl UploadTarget {
    /// Human label for the slot this target points at.
    pub fn doc_label(&self) -> &'static str {
        match self {
            UploadTarget::Company { doc_type, .. } => doc_type.label(),
            UploadTarget::Adhesion { doc_type } => doc_type.label(),
            UploadTarget::Beneficiary { doc_type, .. } => doc_type.label(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Files and uploaded records
// ═══════════════════════════════════════════════════════════════════════════

/// An in-memory file handed to the batch loop by the caller.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        FileInput {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Lowercased extension without the dot, empty if none.
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// The declared MIME type, or one inferred from the extension when the
    /// caller passed nothing useful.
    pub fn effective_mime(&self) -> String {
        let declared = self.mime_type.trim();
        if declared.is_empty() || declared == "application/octet-stream" {
            config::mime_for_extension(&self.extension()).to_string()
        } else {
            declared.to_string()
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A processed upload attached to a document slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub processed_at: DateTime<Utc>,
    /// Partner id for partner-scoped company documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entity_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    #[serde(skip)]
    pub preview: Option<PreviewHandle>,
}

impl UploadedDocument {
    pub fn new(
        file: &FileInput,
        extraction: Option<ExtractionResult>,
        preview: Option<PreviewHandle>,
        linked_entity_id: Option<Uuid>,
    ) -> Self {
        UploadedDocument {
            id: Uuid::new_v4(),
            file_name: file.name.clone(),
            mime_type: file.effective_mime(),
            size_bytes: file.size_bytes(),
            processed_at: Utc::now(),
            linked_entity_id,
            extraction,
            preview,
        }
    }
}
