//! Reference adapters for the capability traits.
//!
//! - [`indexer`] - HTTP client for a video-indexing backend (ingestion)
//! - [`search`] - HTTP client for the rule search service (retrieval)
//! - [`openai`] - chat-completions client for claim reasoning

pub mod indexer;
pub mod openai;
pub mod search;

pub use indexer::IndexerClient;
pub use openai::OpenAiReasoner;
pub use search::SearchRetriever;
