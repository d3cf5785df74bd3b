//! Trait seams for the two external collaborators: the extraction oracle
//! (OCR/LLM pipeline) and the persistence sink. Both stay behind object-safe
//! async traits so the engine never learns how extraction or storage work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::payload::ProposalPayload;
use crate::error::{OracleError, SinkError};
use crate::models::document::FileInput;
use crate::models::extraction::{ExtractionContext, ExtractionResult};

#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Extract structured fields from one file. The context tells the
    /// oracle which slot and entity the file is meant for.
    async fn extract(
        &self,
        file: &FileInput,
        context: &ExtractionContext,
    ) -> Result<ExtractionResult, OracleError>;
}

#[derive(Debug, Clone)]
pub struct SaveReceipt {
    pub proposal_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn save(&self, payload: &ProposalPayload) -> Result<SaveReceipt, SinkError>;
}
