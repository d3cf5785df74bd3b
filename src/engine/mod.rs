//! Pipeline stages: from raw files to a saved proposal.

pub mod batch;
pub mod classifier;
pub mod hints;
pub mod merge;
pub mod oracle;
pub mod payload;
pub mod requirements;
pub mod resolver;
pub mod session;
pub mod structure;
pub mod wizard;

pub use batch::{run_auto_sort, run_batch, BatchEvent, BatchOutcome, FileFailure};
pub use classifier::{classify, Classification, ClassifyInput};
pub use merge::merge_extractions;
pub use oracle::{ExtractionOracle, PersistenceSink, SaveReceipt};
pub use payload::{build_payload, save_proposal, ProposalPayload};
pub use session::{ExtractionSummary, ProposalSession};
pub use wizard::{visible_steps, Step};
