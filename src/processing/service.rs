//! Summarizer service coordinating extraction, chunking, and the map/reduce requests.

use crate::{
    config::Config,
    extract::{Document, Extractor},
    llm::{ChatClient, ChatClientError, build_chat_client},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        chunking::chunk_text,
        summarize::{SummaryMode, combine_partials, map_chunks, reduce_summary},
        types::{SummarizeError, SummarizerSettings, SummaryOutcome},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

/// Runs one upload through the full pipeline: extract, chunk, map, combine, reduce.
///
/// The language-model client is injected so tests can substitute canned responses. Construct
/// the service once near process start and share it through an `Arc`.
pub struct Summarizer {
    client: Arc<dyn ChatClient>,
    extractor: Extractor,
    settings: SummarizerSettings,
    metrics: Arc<SummaryMetrics>,
}

/// Abstraction over the summarizer used by external surfaces (CLI, HTTP).
#[async_trait]
pub trait SummarizeApi: Send + Sync {
    /// Summarize one uploaded file in the requested mode.
    async fn summarize(
        &self,
        file_name: String,
        bytes: Vec<u8>,
        mode: SummaryMode,
    ) -> Result<SummaryOutcome, SummarizeError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl Summarizer {
    /// Build a summarizer from explicit collaborators.
    pub fn new(
        client: Arc<dyn ChatClient>,
        extractor: Extractor,
        settings: SummarizerSettings,
    ) -> Self {
        Self {
            client,
            extractor,
            settings,
            metrics: Arc::new(SummaryMetrics::new()),
        }
    }

    /// Build the production summarizer from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ChatClientError> {
        tracing::info!(model = %config.model, "Initializing language model client");
        let client = build_chat_client(config)?;
        if config.groq_api_key.is_none() {
            tracing::warn!("GROQ_API_KEY is not set; summary requests will fail");
        }
        Ok(Self::new(
            client,
            Extractor::from_config(config),
            SummarizerSettings::from_config(config),
        ))
    }

    /// Summarize one upload.
    pub async fn summarize(
        &self,
        file_name: String,
        bytes: Vec<u8>,
        mode: SummaryMode,
    ) -> Result<SummaryOutcome, SummarizeError> {
        tracing::info!(file = %file_name, mode = mode.slug(), bytes = bytes.len(), "Summarizing document");

        let Some(document) = Document::new(file_name.clone(), bytes) else {
            tracing::warn!(file = %file_name, "Rejected upload with unsupported extension");
            return Err(SummarizeError::UnsupportedFormat { file_name });
        };

        let text = self.extract(document).await;
        let Some(text) = text.filter(|text| !text.trim().is_empty()) else {
            tracing::warn!(file = %file_name, "No text extracted from upload");
            return Err(SummarizeError::EmptyExtraction);
        };

        let chunks = chunk_text(&text, self.settings.chunk_size);
        let chunk_count = chunks.len();
        tracing::debug!(
            chunk_count,
            chunk_size = self.settings.chunk_size,
            chars = text.chars().count(),
            "Chunked document"
        );

        let partials = map_chunks(
            self.client.as_ref(),
            &self.settings.model,
            &chunks,
            self.settings.max_chunks,
            self.settings.map_concurrency,
        )
        .await?;
        let chunks_summarized = partials.len();
        if chunks_summarized < chunk_count {
            tracing::warn!(
                file = %file_name,
                chunk_count,
                chunks_summarized,
                "Document exceeds the chunk cap; trailing content is not part of the summary"
            );
        }

        let combined = combine_partials(&partials);
        let summary = reduce_summary(self.client.as_ref(), &self.settings.model, &combined, mode)
            .await?;

        let outcome = SummaryOutcome {
            summary,
            mode,
            chunk_count,
            chunks_summarized,
        };
        self.metrics
            .record_run(chunks_summarized as u64, outcome.chunks_dropped() as u64);
        tracing::info!(
            file = %file_name,
            mode = mode.slug(),
            chunk_count,
            chunks_summarized,
            "Summary generated"
        );

        Ok(outcome)
    }

    /// Run the blocking extractors off the async runtime. A panicking parser counts as absent text.
    async fn extract(&self, document: Document) -> Option<String> {
        let extractor = self.extractor.clone();
        match tokio::task::spawn_blocking(move || extractor.extract(&document)).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(error = %error, "Extractor task failed");
                None
            }
        }
    }
}

#[async_trait]
impl SummarizeApi for Summarizer {
    async fn summarize(
        &self,
        file_name: String,
        bytes: Vec<u8>,
        mode: SummaryMode,
    ) -> Result<SummaryOutcome, SummarizeError> {
        Summarizer::summarize(self, file_name, bytes, mode).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatRequest;

    struct FixedClient;

    #[async_trait]
    impl ChatClient for FixedClient {
        async fn complete(&self, request: ChatRequest) -> Result<String, ChatClientError> {
            Ok(format!("  reply within {} tokens\n", request.max_tokens))
        }
    }

    fn assert_send<T: Send>(_: &T) {}

    fn summarizer() -> Summarizer {
        Summarizer::new(
            Arc::new(FixedClient),
            Extractor::default(),
            SummarizerSettings::default(),
        )
    }

    #[tokio::test]
    async fn summarize_future_is_send() {
        let summarizer = summarizer();
        let future = summarizer.summarize("a.txt".into(), b"text".to_vec(), SummaryMode::Short);
        assert_send(&future);
        let outcome = future.await.expect("summary");
        assert_eq!(outcome.summary, "reply within 170 tokens");
    }

    #[tokio::test]
    async fn runs_behind_a_shared_trait_object() {
        let service: Arc<dyn SummarizeApi> = Arc::new(summarizer());
        let handle = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .summarize("notes.txt".into(), b"Hello world.".to_vec(), SummaryMode::BulletPoint)
                    .await
            }
        });
        let outcome = handle.await.expect("task").expect("summary");

        assert_eq!(outcome.summary, "reply within 300 tokens");
        assert_eq!(outcome.chunks_summarized, 1);
        assert_eq!(service.metrics_snapshot().documents_summarized, 1);
    }
}
