//! Error taxonomy for the intake engine.
//!
//! Each concern gets its own enum; `IntakeError` is the umbrella that the
//! batch loop and wizard surface to callers. Ambiguous classification is
//! deliberately NOT an error — it is a value (`Classification` with no
//! target) so auto-sort batches can report it per file without aborting.

use thiserror::Error;

/// Named violations of the structural-count constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("total lives must be at least 1")]
    TotalLivesZero,

    #[error("partner count must be between 1 and total lives (got {partner_count} of {total_lives})")]
    PartnerCountOutOfRange {
        partner_count: u32,
        total_lives: u32,
    },

    #[error("employee roster enabled but employee count is 0")]
    EmployeesEnabledButZero,

    #[error("partners ({partner_count}) plus employees ({employee_count}) exceed total lives ({total_lives})")]
    CountsExceedTotal {
        partner_count: u32,
        employee_count: u32,
        total_lives: u32,
    },
}

/// A forward navigation was blocked because the current step has unmet
/// requirements. Carries human-readable labels for the missing items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step '{step}' incomplete: {}", missing.join("; "))]
pub struct StepIncompleteError {
    pub step: String,
    pub missing: Vec<String>,
}

/// Extraction oracle failures (network, model, parse — opaque to this core).
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Persistence sink failures.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("save failed: {0}")]
    Save(String),
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    StepIncomplete(#[from] StepIncompleteError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("file '{file_name}' rejected: {reason}")]
    FileRejected { file_name: String, reason: String },

    #[error("proposal not ready to save: {0}")]
    NotReadyToSave(String),
}
