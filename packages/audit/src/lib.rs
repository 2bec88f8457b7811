//! Brand-Compliance Video Audit Pipeline
//!
//! Audits a submitted video against brand-compliance rules through a
//! fixed four-stage pipeline: ingest the video into machine-readable
//! signals (speech transcript, on-screen text), retrieve the applicable
//! rules, reason over the content against those rules with an LLM, and
//! assemble a terminal pass/fail report.
//!
//! # Design
//!
//! - One [`AuditState`] per run, exclusively owned by the orchestrator;
//!   stages return partial [`StateUpdate`]s merged under fixed per-field
//!   rules (append-only findings and errors, last-write-wins the rest).
//! - Stages are total: expected external failures become recorded
//!   errors, never a crashed run. A run with failures still yields a
//!   structured report.
//! - A failed ingestion short-circuits straight to reporting; a failed
//!   retrieval or reasoning step still lets the rest of the pipeline
//!   produce a partial report.
//! - Unbounded-latency external processing is awaited through the
//!   bounded long-poll supervisor in [`poll`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use audit::{Pipeline, services::{IndexerClient, OpenAiReasoner, SearchRetriever}};
//!
//! let pipeline = Pipeline::new(indexer, retriever, reasoner);
//! let terminal = pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;
//! println!("{}", terminal.final_report);
//! ```
//!
//! # Modules
//!
//! - [`state`] - State container, merge engine, domain values
//! - [`pipeline`] - Stage contracts and the orchestrator
//! - [`traits`] - Capability seams (ingestion, retrieval, reasoning)
//! - [`services`] - Reference HTTP/LLM adapters
//! - [`poll`] - Long-poll supervisor for asynchronous external jobs
//! - [`staging`] - Scoped staged-file cleanup
//! - [`testing`] - Mock capabilities for tests

pub mod error;
pub mod pipeline;
pub mod poll;
pub mod services;
pub mod staging;
pub mod state;
pub mod testing;
pub mod traits;

pub use error::{AuditError, PollError, Result};
pub use pipeline::{Pipeline, Stage};
pub use state::{AuditState, ComplianceIssue, FinalStatus, Rule, Severity, StateUpdate};
pub use traits::{ClaimReasoner, IngestOutput, IngestionService, RuleRetriever};
