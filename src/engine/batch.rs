//! Sequential batch upload loop.
//!
//! Files are processed strictly one at a time — later files must see the
//! session state earlier files produced, otherwise partner resolution and
//! the unlinked-document heuristics stop being deterministic. A failing file
//! is recorded and the loop moves on; one bad scan never sinks the batch.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config;
use crate::engine::classifier::{self, ClassifyInput};
use crate::engine::hints;
use crate::engine::oracle::ExtractionOracle;
use crate::engine::session::ProposalSession;
use crate::models::document::{CompanyDocType, FileInput, UploadTarget, UploadedDocument};
use crate::models::extraction::{ExtractionContext, ExtractionScope};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    Started { total: usize },
    Progress { index: usize, total: usize, file_name: String },
    Completed { succeeded: usize, failed: usize },
}

pub type ProgressFn<'a> = Option<&'a (dyn Fn(BatchEvent) + Send + Sync)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: Vec<FileFailure>,
    /// Auto-sort files no rule claimed. Not attached anywhere.
    pub unclassified: Vec<FileFailure>,
    /// Auto-sort placements per slot label.
    pub distributed: BTreeMap<String, usize>,
}

fn validate_file(file: &FileInput) -> Result<(), String> {
    let extension = file.extension();
    if !config::is_allowed_extension(&extension) {
        return Err(format!("extensão .{extension} não suportada"));
    }
    if file.size_bytes() > config::MAX_FILE_SIZE_BYTES {
        return Err(format!(
            "arquivo excede o limite de {} MB",
            config::MAX_FILE_SIZE_BYTES / (1024 * 1024)
        ));
    }
    Ok(())
}

fn emit(progress: ProgressFn<'_>, event: BatchEvent) {
    if let Some(callback) = progress {
        callback(event);
    }
}

fn context_for_target(session: &ProposalSession, target: &UploadTarget) -> ExtractionContext {
    let mut context = ExtractionContext {
        scope: ExtractionScope::Company,
        doc_label: target.doc_label().to_string(),
        category: session.category,
        beneficiary_id: None,
        beneficiary_name: None,
        beneficiary_role: None,
        partner_id: None,
    };
    match target {
        UploadTarget::Company { partner_id, .. } => {
            context.partner_id = *partner_id;
        }
        UploadTarget::Adhesion { .. } => {
            context.scope = ExtractionScope::Adhesion;
        }
        UploadTarget::Beneficiary { beneficiary_id, .. } => {
            context.scope = ExtractionScope::Beneficiary;
            context.beneficiary_id = Some(*beneficiary_id);
            if let Some(b) = session.beneficiary(*beneficiary_id) {
                let name = b.full_name.trim();
                if !name.is_empty() {
                    context.beneficiary_name = Some(name.to_string());
                }
                context.beneficiary_role = Some(b.role);
            }
        }
    }
    context
}

/// Attach one extracted document and run the hint propagation its scope
/// calls for. Returns whether a contract slot was touched.
fn place_document(
    session: &mut ProposalSession,
    target: &UploadTarget,
    file: &FileInput,
    extraction: crate::models::ExtractionResult,
) -> bool {
    let preview = session.previews.allocate();
    let linked_entity_id = match target {
        UploadTarget::Company { doc_type: CompanyDocType::PartnerIdentity, partner_id } => {
            *partner_id
        }
        _ => None,
    };
    let document = UploadedDocument::new(file, Some(extraction.clone()), Some(preview), linked_entity_id);
    session.attach_document(target, document);

    match target {
        UploadTarget::Company { doc_type: CompanyDocType::PartnerIdentity, partner_id } => {
            if let Some(partner_id) = partner_id {
                hints::apply_partner_identity_hints(session, *partner_id, &extraction);
            }
            false
        }
        UploadTarget::Company { doc_type, .. } => {
            hints::apply_company_hints(session, &extraction);
            *doc_type == CompanyDocType::Contract
        }
        UploadTarget::Adhesion { .. } => false,
        UploadTarget::Beneficiary { beneficiary_id, .. } => {
            hints::apply_beneficiary_hints(session, *beneficiary_id, &extraction);
            false
        }
    }
}

/// Process a batch aimed at one explicit slot.
pub async fn run_batch(
    session: &mut ProposalSession,
    oracle: &dyn ExtractionOracle,
    files: &[FileInput],
    target: &UploadTarget,
    progress: ProgressFn<'_>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let total = files.len();
    emit(progress, BatchEvent::Started { total });
    let mut contract_touched = false;

    for (index, file) in files.iter().enumerate() {
        emit(progress, BatchEvent::Progress {
            index: index + 1,
            total,
            file_name: file.name.clone(),
        });
        if let Err(reason) = validate_file(file) {
            warn!(file = %file.name, %reason, "file rejected");
            outcome.failed.push(FileFailure { file_name: file.name.clone(), reason });
            continue;
        }
        let context = context_for_target(session, target);
        match oracle.extract(file, &context).await {
            Ok(extraction) => {
                contract_touched |= place_document(session, target, file, extraction);
                outcome.succeeded += 1;
            }
            Err(err) => {
                warn!(file = %file.name, error = %err, "extraction failed");
                outcome.failed.push(FileFailure {
                    file_name: file.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if contract_touched {
        hints::apply_contract_hints(session);
    }
    emit(progress, BatchEvent::Completed {
        succeeded: outcome.succeeded,
        failed: outcome.failed.len(),
    });
    outcome
}

/// Process a mixed batch, classifying each file into a slot. Files no rule
/// claims are reported as unclassified and left unattached.
pub async fn run_auto_sort(
    session: &mut ProposalSession,
    oracle: &dyn ExtractionOracle,
    files: &[FileInput],
    progress: ProgressFn<'_>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let total = files.len();
    emit(progress, BatchEvent::Started { total });
    let mut contract_touched = false;

    for (index, file) in files.iter().enumerate() {
        emit(progress, BatchEvent::Progress {
            index: index + 1,
            total,
            file_name: file.name.clone(),
        });
        if let Err(reason) = validate_file(file) {
            warn!(file = %file.name, %reason, "file rejected");
            outcome.failed.push(FileFailure { file_name: file.name.clone(), reason });
            continue;
        }
        let context = ExtractionContext {
            scope: ExtractionScope::Company,
            doc_label: config::AUTO_SORT_DOC_LABEL.to_string(),
            category: session.category,
            beneficiary_id: None,
            beneficiary_name: None,
            beneficiary_role: None,
            partner_id: None,
        };
        let extraction = match oracle.extract(file, &context).await {
            Ok(extraction) => extraction,
            Err(err) => {
                warn!(file = %file.name, error = %err, "extraction failed");
                outcome.failed.push(FileFailure {
                    file_name: file.name.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let statuses = session.partner_statuses();
        let classification = classifier::classify(&ClassifyInput {
            file_name: &file.name,
            extraction: &extraction,
            category: session.category,
            partners: &session.partners,
            partner_statuses: &statuses,
            beneficiaries: &session.beneficiaries,
            last_selected_beneficiary: session.last_selected_beneficiary,
        });
        match classification.target {
            Some(target) => {
                debug!(file = %file.name, slot = target.doc_label(), reason = %classification.reason,
                    "auto-sort placed file");
                contract_touched |= place_document(session, &target, file, extraction);
                *outcome.distributed.entry(target.doc_label().to_string()).or_insert(0) += 1;
                outcome.succeeded += 1;
            }
            None => {
                outcome.unclassified.push(FileFailure {
                    file_name: file.name.clone(),
                    reason: classification.reason,
                });
            }
        }
    }

    if contract_touched {
        hints::apply_contract_hints(session);
    }
    emit(progress, BatchEvent::Completed {
        succeeded: outcome.succeeded,
        failed: outcome.failed.len(),
    });
    outcome
}
