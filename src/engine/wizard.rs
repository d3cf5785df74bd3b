//! Wizard state machine: step sequencing, gating and missing-item messages.
//!
//! Backward navigation is always free; forward navigation demands the
//! current step's checklist be clear, and leaving the structure step is what
//! materializes the counts into beneficiaries. Jumping ahead requires every
//! prior step to be complete.

use serde::{Deserialize, Serialize};

use crate::config::MISSING_PREVIEW_CAP;
use crate::engine::requirements;
use crate::engine::session::ProposalSession;
use crate::error::{IntakeError, StepIncompleteError};
use crate::models::category::ProposalCategory;
use crate::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Modality,
    Structure,
    Company,
    Beneficiaries,
    Summary,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::Modality => "Modalidade",
            Step::Structure => "Estrutura",
            Step::Company => "Empresa",
            Step::Beneficiaries => "Beneficiários",
            Step::Summary => "Resumo",
        }
    }
}

const CORPORATE_STEPS: &[Step] = &[
    Step::Modality,
    Step::Structure,
    Step::Company,
    Step::Beneficiaries,
    Step::Summary,
];
const DEFAULT_STEPS: &[Step] = &[
    Step::Modality,
    Step::Structure,
    Step::Beneficiaries,
    Step::Summary,
];

pub fn visible_steps(category: ProposalCategory) -> &'static [Step] {
    if category.is_corporate() {
        CORPORATE_STEPS
    } else {
        DEFAULT_STEPS
    }
}

/// Join missing-item messages, collapsing anything past the preview cap.
pub fn format_missing_summary(missing: &[String]) -> String {
    if missing.len() <= MISSING_PREVIEW_CAP {
        return missing.join(" · ");
    }
    let shown = missing[..MISSING_PREVIEW_CAP].join(" · ");
    format!("{shown} · +{} itens", missing.len() - MISSING_PREVIEW_CAP)
}

impl ProposalSession {
    pub fn steps(&self) -> &'static [Step] {
        visible_steps(self.category)
    }

    pub fn current_step(&self) -> Step {
        let steps = self.steps();
        steps[self.step_index.min(steps.len() - 1)]
    }

    /// Step the UI should draw attention to after a blocked advance.
    pub fn highlighted_step(&self) -> Option<Step> {
        self.highlight_step
    }

    pub fn step_complete(&self, step: Step) -> bool {
        self.missing_for_step(step).is_empty()
    }

    /// Human-readable blockers for one step. Empty means the step is clear.
    pub fn missing_for_step(&self, step: Step) -> Vec<String> {
        let mut missing = Vec::new();
        match step {
            Step::Modality | Step::Summary => {}
            Step::Structure => {
                if self.counts.total_lives == 0 {
                    missing.push("Total de vidas deve ser ao menos 1".to_string());
                }
                if !self.structure_ready
                    || self.beneficiaries.len() != self.counts.total_lives as usize
                {
                    missing.push("Estrutura de beneficiários não confirmada".to_string());
                }
                if self.primary_email.trim().is_empty() {
                    missing.push("E-mail principal".to_string());
                }
                if text::digit_count(&self.primary_phone) < 10 {
                    missing.push("Telefone principal completo".to_string());
                }
            }
            Step::Company => {
                for item in self.company_requirements() {
                    if item.is_blocking() {
                        missing.push(format!("Empresa: {}", item.label));
                    }
                }
            }
            Step::Beneficiaries => {
                for (index, beneficiary) in self.beneficiaries.iter().enumerate() {
                    let who = beneficiary.display_name(index + 1);
                    for item in requirements::beneficiary_requirements(beneficiary) {
                        if item.is_blocking() {
                            missing.push(format!("{who}: {}", item.label));
                        }
                    }
                }
                if self.category == ProposalCategory::Adhesion {
                    for item in self.adhesion_requirements() {
                        if item.is_blocking() {
                            missing.push(format!("Adesão: {}", item.label));
                        }
                    }
                }
            }
        }
        missing
    }

    /// Move forward one step. Leaving the structure step rebuilds the
    /// beneficiary list from the counts first.
    pub fn advance(&mut self) -> Result<(), IntakeError> {
        let step = self.current_step();
        if step == Step::Structure {
            self.rebuild_structure()?;
        }
        let missing = self.missing_for_step(step);
        if !missing.is_empty() {
            self.highlight_step = Some(step);
            return Err(StepIncompleteError {
                step: step.label().to_string(),
                missing,
            }
            .into());
        }
        let last = self.steps().len() - 1;
        if self.step_index < last {
            self.step_index += 1;
        }
        self.highlight_step = None;
        Ok(())
    }

    /// Move back one step. Always allowed; clears any highlight.
    pub fn back(&mut self) {
        self.step_index = self.step_index.saturating_sub(1);
        self.highlight_step = None;
    }

    /// Jump directly to a step, allowed only when every prior step is clear.
    pub fn jump_to(&mut self, index: usize) -> Result<(), StepIncompleteError> {
        let steps = self.steps();
        let index = index.min(steps.len() - 1);
        for prior in &steps[..index] {
            let missing = self.missing_for_step(*prior);
            if !missing.is_empty() {
                self.highlight_step = Some(*prior);
                return Err(StepIncompleteError {
                    step: prior.label().to_string(),
                    missing,
                });
            }
        }
        self.step_index = index;
        self.highlight_step = None;
        Ok(())
    }

    /// Every blocker across all steps, in step order.
    pub fn missing_checklist(&self) -> Vec<String> {
        self.steps()
            .iter()
            .flat_map(|step| self.missing_for_step(*step))
            .collect()
    }

    pub fn save_enabled(&self) -> bool {
        self.missing_checklist().is_empty() && self.document_count() > 0
    }

    pub fn ensure_ready_to_save(&self) -> Result<(), IntakeError> {
        let missing = self.missing_checklist();
        if !missing.is_empty() {
            return Err(IntakeError::NotReadyToSave(format_missing_summary(&missing)));
        }
        if self.document_count() == 0 {
            return Err(IntakeError::NotReadyToSave(
                "nenhum documento anexado".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::models::category::CivilStatus;
    use crate::models::document::{
        BeneficiaryDocType, FileInput, UploadTarget, UploadedDocument,
    };
    use crate::models::entity::StructuralCounts;

    fn counts(total: u32) -> StructuralCounts {
        StructuralCounts {
            total_lives: total,
            partner_count: 1,
            employee_count: 0,
            has_employees: false,
        }
    }

    fn attach(session: &mut ProposalSession, beneficiary_id: Uuid, doc_type: BeneficiaryDocType) {
        let file = FileInput::new("doc.pdf", "application/pdf", vec![]);
        let doc = UploadedDocument::new(&file, None, None, None);
        let target = UploadTarget::Beneficiary { beneficiary_id, doc_type };
        session.attach_document(&target, doc);
    }

    #[test]
    fn corporate_flow_shows_company_step() {
        let corporate = ProposalSession::new(ProposalCategory::Corporate);
        assert!(corporate.steps().contains(&Step::Company));
        let individual = ProposalSession::new(ProposalCategory::Individual);
        assert!(!individual.steps().contains(&Step::Company));
    }

    #[test]
    fn advance_blocked_with_labels_and_highlight() {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        session.advance().unwrap(); // modality is always clear
        assert_eq!(session.current_step(), Step::Structure);

        let err = session.advance().unwrap_err();
        match err {
            IntakeError::StepIncomplete(err) => {
                assert_eq!(err.step, "Estrutura");
                assert!(err.missing.iter().any(|m| m.contains("E-mail")));
                assert!(err.missing.iter().any(|m| m.contains("Telefone")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.highlighted_step(), Some(Step::Structure));
        // blocked advance does not move
        assert_eq!(session.current_step(), Step::Structure);
    }

    #[test]
    fn leaving_structure_builds_beneficiaries() {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        session.set_counts(counts(2));
        session.primary_email = "ana@exemplo.com".into();
        session.primary_phone = "(11) 98765-4321".into();
        session.advance().unwrap();
        assert!(session.beneficiaries.is_empty());

        session.advance().unwrap();
        assert_eq!(session.beneficiaries.len(), 2);
        assert!(session.structure_ready);
        assert_eq!(session.current_step(), Step::Beneficiaries);
    }

    #[test]
    fn beneficiaries_step_blocks_until_identity_document_arrives() {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        session.set_counts(counts(1));
        session.primary_email = "ana@exemplo.com".into();
        session.primary_phone = "(11) 98765-4321".into();
        session.advance().unwrap();
        session.advance().unwrap();
        assert_eq!(session.current_step(), Step::Beneficiaries);

        let id = session.beneficiaries[0].id;
        session.beneficiary_mut(id).unwrap().full_name = "Ana Silva".into();
        session.set_beneficiary_age(id, Some(30));
        session.set_beneficiary_civil_status(id, Some(CivilStatus::Single));
        for doc_type in [
            BeneficiaryDocType::ResidenceProof,
            BeneficiaryDocType::PlanCard,
            BeneficiaryDocType::PermanenceLetter,
        ] {
            attach(&mut session, id, doc_type);
        }

        let err = session.advance().unwrap_err();
        match err {
            IntakeError::StepIncomplete(err) => {
                assert_eq!(err.step, "Beneficiários");
                assert_eq!(err.missing, vec!["Ana Silva: Documento de identidade".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.current_step(), Step::Beneficiaries);

        attach(&mut session, id, BeneficiaryDocType::Identity);
        session.advance().unwrap();
        assert_eq!(session.current_step(), Step::Summary);
    }

    #[test]
    fn blank_beneficiary_blockers_name_the_position() {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        session.set_counts(counts(2));
        session.rebuild_structure().unwrap();

        let missing = session.missing_for_step(Step::Beneficiaries);
        assert!(missing.iter().any(|m| m.starts_with("Beneficiário 1:")));
        assert!(missing.iter().any(|m| m.starts_with("Beneficiário 2:")));
    }

    #[test]
    fn back_always_allowed_and_clears_highlight() {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        session.advance().unwrap();
        let _ = session.advance(); // blocked, sets highlight
        assert!(session.highlighted_step().is_some());

        session.back();
        assert_eq!(session.current_step(), Step::Modality);
        assert!(session.highlighted_step().is_none());

        session.back(); // already at the first step
        assert_eq!(session.current_step(), Step::Modality);
    }

    #[test]
    fn jump_ahead_requires_prior_steps_complete() {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        let summary_index = session.steps().len() - 1;
        let err = session.jump_to(summary_index).unwrap_err();
        assert_eq!(err.step, "Estrutura");
        assert_eq!(session.current_step(), Step::Modality);

        // jumping to the structure step itself only needs modality
        session.jump_to(1).unwrap();
        assert_eq!(session.current_step(), Step::Structure);
    }

    #[test]
    fn save_gate_needs_documents_too() {
        let mut session = ProposalSession::new(ProposalCategory::Individual);
        session.set_counts(counts(1));
        session.primary_email = "ana@exemplo.com".into();
        session.primary_phone = "(11) 98765-4321".into();
        session.rebuild_structure().unwrap();
        // checklist still has beneficiary blockers
        assert!(!session.save_enabled());
        let err = session.ensure_ready_to_save().unwrap_err();
        assert!(matches!(err, IntakeError::NotReadyToSave(_)));
    }

    #[test]
    fn missing_summary_caps_at_four() {
        let missing: Vec<String> = (1..=6).map(|i| format!("Item {i}")).collect();
        let formatted = format_missing_summary(&missing);
        assert!(formatted.contains("Item 4"));
        assert!(!formatted.contains("Item 5"));
        assert!(formatted.ends_with("+2 itens"));

        let short: Vec<String> = vec!["Item 1".into()];
        assert_eq!(format_missing_summary(&short), "Item 1");
    }
}
