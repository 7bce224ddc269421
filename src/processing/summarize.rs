//! Map, combine, and reduce stages of the summarization pipeline.
//!
//! The map stage asks the model for the key ideas of each leading chunk, the combiner joins those
//! partial summaries line by line, and the reduce stage rewrites the result in the selected
//! [`SummaryMode`]. Any request failure aborts the run; nothing partial is returned.

mod mode;

pub use mode::{ParseSummaryModeError, SummaryMode};

use crate::llm::{ChatClient, ChatClientError, ChatRequest};
use futures_util::stream::{self, StreamExt, TryStreamExt};

/// Number of leading chunks that go through the map stage.
pub const DEFAULT_MAX_CHUNKS: usize = 6;
/// System instruction for every map request.
pub const MAP_SYSTEM_PROMPT: &str = "Extract only key ideas. No explanations.";
/// Output budget for every map request.
pub const MAP_MAX_TOKENS: u32 = 120;

/// Summarize the first `max_chunks` chunks, returning trimmed partial summaries in chunk order.
///
/// With `concurrency` of one, requests are issued strictly one after another. Larger values keep
/// up to that many requests in flight; results are still yielded in chunk order. The first error
/// stops the stage and is returned.
pub async fn map_chunks(
    client: &dyn ChatClient,
    model: &str,
    chunks: &[String],
    max_chunks: usize,
    concurrency: usize,
) -> Result<Vec<String>, ChatClientError> {
    let selected = &chunks[..chunks.len().min(max_chunks)];
    let total = selected.len();

    stream::iter(selected.iter().cloned().enumerate())
        .map(|(index, chunk): (usize, String)| async move {
            tracing::debug!(
                chunk = index + 1,
                total,
                chars = chunk.chars().count(),
                "Summarizing chunk"
            );
            let response = client
                .complete(ChatRequest::system_and_user(
                    model,
                    MAP_SYSTEM_PROMPT,
                    chunk,
                    MAP_MAX_TOKENS,
                ))
                .await?;
            Ok::<_, ChatClientError>(response.trim().to_string())
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

/// Join partial summaries with newlines, preserving order.
pub fn combine_partials(partials: &[String]) -> String {
    partials.join("\n")
}

/// Issue the single reduce request for `mode` and return the trimmed response.
pub async fn reduce_summary(
    client: &dyn ChatClient,
    model: &str,
    combined: &str,
    mode: SummaryMode,
) -> Result<String, ChatClientError> {
    tracing::debug!(
        mode = mode.slug(),
        max_tokens = mode.max_tokens(),
        chars = combined.chars().count(),
        "Generating final summary"
    );
    let response = client
        .complete(ChatRequest::system_and_user(
            model,
            mode.system_prompt(),
            combined,
            mode.max_tokens(),
        ))
        .await?;
    Ok(response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Echoes the user message back, optionally failing on a given call.
    #[derive(Clone, Default)]
    struct RecordingClient {
        requests: Arc<Mutex<Vec<ChatRequest>>>,
        fail_on_call: Option<usize>,
        stagger: bool,
    }

    impl RecordingClient {
        async fn recorded(&self) -> Vec<ChatRequest> {
            self.requests.lock().await.clone()
        }
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn complete(&self, request: ChatRequest) -> Result<String, ChatClientError> {
            let user = request.messages[1].content.clone();
            let call = {
                let mut guard = self.requests.lock().await;
                guard.push(request);
                guard.len()
            };
            if self.fail_on_call == Some(call) {
                return Err(ChatClientError::GenerationFailed("boom".into()));
            }
            if self.stagger {
                // Earlier calls finish later.
                let delay = 40u64.saturating_sub(call as u64 * 10);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Ok(format!(" key ideas of {user} "))
        }
    }

    fn chunks(count: usize) -> Vec<String> {
        (1..=count).map(|index| format!("chunk-{index}")).collect()
    }

    #[tokio::test]
    async fn map_processes_at_most_six_chunks_in_order() {
        let client = RecordingClient::default();
        let partials = map_chunks(&client, "llama", &chunks(10), DEFAULT_MAX_CHUNKS, 1)
            .await
            .expect("map");

        let requests = client.recorded().await;
        assert_eq!(requests.len(), 6);
        for (index, request) in requests.iter().enumerate() {
            assert_eq!(request.messages[0].content, MAP_SYSTEM_PROMPT);
            assert_eq!(request.messages[1].content, format!("chunk-{}", index + 1));
            assert_eq!(request.max_tokens, MAP_MAX_TOKENS);
            assert_eq!(request.model, "llama");
        }
        assert_eq!(partials.len(), 6);
        assert_eq!(partials[5], "key ideas of chunk-6");
    }

    #[tokio::test]
    async fn map_processes_all_chunks_when_fewer_than_cap() {
        let client = RecordingClient::default();
        let partials = map_chunks(&client, "llama", &chunks(3), DEFAULT_MAX_CHUNKS, 1)
            .await
            .expect("map");
        assert_eq!(partials.len(), 3);
        assert_eq!(client.recorded().await.len(), 3);
    }

    #[tokio::test]
    async fn map_stops_at_first_failure() {
        let client = RecordingClient {
            fail_on_call: Some(2),
            ..RecordingClient::default()
        };
        let error = map_chunks(&client, "llama", &chunks(5), DEFAULT_MAX_CHUNKS, 1)
            .await
            .unwrap_err();

        assert!(matches!(error, ChatClientError::GenerationFailed(_)));
        assert_eq!(client.recorded().await.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_map_keeps_chunk_order() {
        let client = RecordingClient {
            stagger: true,
            ..RecordingClient::default()
        };
        let partials = map_chunks(&client, "llama", &chunks(4), DEFAULT_MAX_CHUNKS, 4)
            .await
            .expect("map");

        let expected: Vec<String> = (1..=4)
            .map(|index| format!("key ideas of chunk-{index}"))
            .collect();
        assert_eq!(partials, expected);
    }

    #[test]
    fn combine_joins_with_newlines() {
        assert_eq!(combine_partials(&[]), "");
        let partials = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(combine_partials(&partials), "a\nb\nc");
    }

    #[tokio::test]
    async fn reduce_uses_mode_prompt_and_budget() {
        for mode in SummaryMode::ALL {
            let client = RecordingClient::default();
            let summary = reduce_summary(&client, "llama", "a\nb", mode)
                .await
                .expect("reduce");

            let requests = client.recorded().await;
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].messages[0].content, mode.system_prompt());
            assert_eq!(requests[0].messages[1].content, "a\nb");
            assert_eq!(requests[0].max_tokens, mode.max_tokens());
            assert_eq!(summary, "key ideas of a\nb");
        }
    }
}
