//! Core data types and error definitions for the summarization pipeline.

use crate::config::Config;
use crate::llm::ChatClientError;
use thiserror::Error;

use super::chunking::DEFAULT_CHUNK_SIZE;
use super::summarize::{DEFAULT_MAX_CHUNKS, SummaryMode};

/// Message shown to users when nothing could be extracted from an upload.
pub const UNSUPPORTED_OR_EMPTY: &str = "Unsupported or empty file.";

/// Errors emitted by a summarization run.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The filename extension does not map to a known document format.
    #[error("Unsupported or empty file.")]
    UnsupportedFormat {
        /// Name of the rejected upload.
        file_name: String,
    },
    /// Extraction failed or produced only whitespace.
    #[error("Unsupported or empty file.")]
    EmptyExtraction,
    /// A map or reduce request to the language model failed.
    #[error("Summary generation failed: {0}")]
    Capability(#[from] ChatClientError),
}

impl SummarizeError {
    /// Whether the error stems from the upload itself rather than the language model.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::EmptyExtraction
        )
    }
}

/// Tunables for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizerSettings {
    /// Model identifier sent with each request.
    pub model: String,
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Number of leading chunks that are summarized.
    pub max_chunks: usize,
    /// Maximum map requests in flight.
    pub map_concurrency: usize,
}

impl SummarizerSettings {
    /// Derive settings from the process configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            chunk_size: config.chunk_size,
            max_chunks: config.max_chunks,
            map_concurrency: config.map_concurrency,
        }
    }
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunks: DEFAULT_MAX_CHUNKS,
            map_concurrency: 1,
        }
    }
}

/// Result of a completed run produced by [`crate::processing::Summarizer::summarize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    /// Final summary text, trimmed.
    pub summary: String,
    /// Mode that shaped the reduce request.
    pub mode: SummaryMode,
    /// Number of chunks the extracted text was split into.
    pub chunk_count: usize,
    /// Number of chunks that went through the map stage.
    pub chunks_summarized: usize,
}

impl SummaryOutcome {
    /// True when trailing chunks were left out of the summary.
    pub fn truncated(&self) -> bool {
        self.chunks_summarized < self.chunk_count
    }

    /// Number of chunks that never reached the language model.
    pub fn chunks_dropped(&self) -> usize {
        self.chunk_count.saturating_sub(self.chunks_summarized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_share_user_message() {
        let unsupported = SummarizeError::UnsupportedFormat {
            file_name: "archive.zip".into(),
        };
        assert_eq!(unsupported.to_string(), UNSUPPORTED_OR_EMPTY);
        assert_eq!(SummarizeError::EmptyExtraction.to_string(), UNSUPPORTED_OR_EMPTY);
        assert!(unsupported.is_input_error());
        assert!(!SummarizeError::from(ChatClientError::MissingCredential).is_input_error());
    }

    #[test]
    fn outcome_reports_truncation() {
        let outcome = SummaryOutcome {
            summary: "text".into(),
            mode: SummaryMode::Short,
            chunk_count: 10,
            chunks_summarized: 6,
        };
        assert!(outcome.truncated());
        assert_eq!(outcome.chunks_dropped(), 4);
    }
}
