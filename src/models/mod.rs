//! Plain data types shared across the engine.

pub mod category;
pub mod document;
pub mod entity;
pub mod extraction;
pub mod preview;
pub mod requirement;

pub use category::{
    BeneficiaryRole, CivilStatus, DataEntryMode, IdentityDocKind, MaritalProofMode,
    ProposalCategory,
};
pub use document::{
    AdhesionDocType, BeneficiaryDocType, CompanyDocType, FileInput, UploadTarget, UploadedDocument,
};
pub use entity::{Beneficiary, CompanyPartner, StructuralCounts};
pub use extraction::{ExtractionContext, ExtractionResult, ExtractionScope};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use requirement::RequirementItem;
