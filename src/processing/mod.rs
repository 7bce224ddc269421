//! Summarization pipeline: chunking, map requests, combination, and the mode-specific reduce.

pub mod chunking;
mod service;
pub mod summarize;
pub mod types;

pub use service::{SummarizeApi, Summarizer};
pub use summarize::{ParseSummaryModeError, SummaryMode};
pub use types::{SummarizeError, SummarizerSettings, SummaryOutcome, UNSUPPORTED_OR_EMPTY};
