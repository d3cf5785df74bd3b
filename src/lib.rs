//! Document-intake and checklist-resolution engine for insurance-enrollment
//! proposals.
//!
//! A proposal is assembled from heterogeneous scanned documents: the
//! extraction oracle (behind [`engine::ExtractionOracle`]) reads each file,
//! the classifier routes auto-sort batches to their slots, hint propagation
//! fills forms across entities, and the requirement engine derives the
//! checklists that gate the wizard. Persistence happens through
//! [`engine::PersistenceSink`] once every checklist is clear.
//!
//! The crate owns no I/O surface — files arrive as in-memory
//! [`models::FileInput`]s and previews are tracked as opaque handles the
//! caller must release when told to.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod text;

pub use engine::{ExtractionOracle, PersistenceSink, ProposalSession};
pub use error::IntakeError;
