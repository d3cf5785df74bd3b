//! Core categorical enums for the proposal flow.

use serde::{Deserialize, Serialize};

use crate::text;

/// Which kind of enrollment proposal is being assembled. Drives the visible
/// wizard steps and which requirement checklists apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalCategory {
    Adhesion,
    Individual,
    Corporate,
}

impl ProposalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalCategory::Adhesion => "adhesion",
            ProposalCategory::Individual => "individual",
            ProposalCategory::Corporate => "corporate",
        }
    }

    pub fn is_corporate(&self) -> bool {
        matches!(self, ProposalCategory::Corporate)
    }
}

impl std::fmt::Display for ProposalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CivilStatus {
    Single,
    Married,
    CivilUnion,
    Divorced,
    Widowed,
}

impl CivilStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CivilStatus::Single => "single",
            CivilStatus::Married => "married",
            CivilStatus::CivilUnion => "civil_union",
            CivilStatus::Divorced => "divorced",
            CivilStatus::Widowed => "widowed",
        }
    }

    /// True when the status requires a marital proof document.
    pub fn requires_marital_proof(&self) -> bool {
        matches!(self, CivilStatus::Married | CivilStatus::CivilUnion)
    }

    /// Normalize a free-text extracted civil status. The oracle returns
    /// Portuguese labels in unpredictable casing and inflection, so this
    /// matches on folded stems ("casado"/"casada" → married).
    pub fn from_extracted(raw: &str) -> Option<Self> {
        let folded = text::fold(raw);
        if folded.is_empty() {
            return None;
        }
        if folded.contains("solteir") {
            Some(CivilStatus::Single)
        } else if folded.contains("casad") {
            Some(CivilStatus::Married)
        } else if folded.contains("uniao") {
            Some(CivilStatus::CivilUnion)
        } else if folded.contains("divorc") {
            Some(CivilStatus::Divorced)
        } else if folded.contains("viuv") {
            Some(CivilStatus::Widowed)
        } else {
            None
        }
    }
}

impl std::fmt::Display for CivilStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a married / civil-union beneficiary proves the relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalProofMode {
    Certificate,
    Declaration,
}

impl Default for MaritalProofMode {
    fn default() -> Self {
        MaritalProofMode::Certificate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryRole {
    Holder,
    Partner,
    Employee,
    Dependent,
}

impl BeneficiaryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeneficiaryRole::Holder => "holder",
            BeneficiaryRole::Partner => "partner",
            BeneficiaryRole::Employee => "employee",
            BeneficiaryRole::Dependent => "dependent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BeneficiaryRole::Holder => "Titular",
            BeneficiaryRole::Partner => "Sócio",
            BeneficiaryRole::Employee => "Funcionário",
            BeneficiaryRole::Dependent => "Dependente",
        }
    }
}

impl std::fmt::Display for BeneficiaryRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which identity document a person presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityDocKind {
    Rg,
    Cnh,
    Ifp,
    Other,
}

impl IdentityDocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityDocKind::Rg => "rg",
            IdentityDocKind::Cnh => "cnh",
            IdentityDocKind::Ifp => "ifp",
            IdentityDocKind::Other => "other",
        }
    }

    /// Resolve an explicit kind string from the oracle ("CNH", "carteira de
    /// habilitação", ...). Non-empty but unrecognized strings map to Other.
    pub fn from_extracted(raw: &str) -> Option<Self> {
        let folded = text::fold(raw);
        if folded.is_empty() {
            return None;
        }
        if folded.contains("cnh") || folded.contains("habilit") {
            Some(IdentityDocKind::Cnh)
        } else if folded.contains("ifp") {
            Some(IdentityDocKind::Ifp)
        } else if folded.contains("rg") || folded.contains("identidade") {
            Some(IdentityDocKind::Rg)
        } else {
            Some(IdentityDocKind::Other)
        }
    }
}

/// How company data enters the flow: scanned per slot, auto-sorted in bulk,
/// or typed by hand. Manual entry adds an explicit address requirement since
/// no document will carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataEntryMode {
    Scanner,
    AutoSort,
    Manual,
}

impl Default for DataEntryMode {
    fn default() -> Self {
        DataEntryMode::Scanner
    }
}
