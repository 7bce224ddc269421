#![deny(missing_docs)]

//! Core library for docsum, a document summarizer backed by a hosted language model.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Format detection and text extraction for uploaded documents.
pub mod extract;
/// Chat-completion client abstraction and the Groq adapter.
pub mod llm;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Chunking, map/reduce summarization, and the service tying them together.
pub mod processing;
