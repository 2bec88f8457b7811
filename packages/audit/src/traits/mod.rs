//! Capability traits the pipeline depends on but does not implement.
//!
//! Each stage talks to exactly one of these seams. Concrete adapters live
//! in [`crate::services`]; mocks for testing live in [`crate::testing`].

pub mod ingestion;
pub mod reasoner;
pub mod retriever;

pub use ingestion::{IngestOutput, IngestionService};
pub use reasoner::ClaimReasoner;
pub use retriever::RuleRetriever;
