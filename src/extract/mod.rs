//! Best-effort text extraction for uploaded documents.
//!
//! Each upload is tagged with a [`DocumentFormat`] derived from its filename extension, and
//! [`Extractor::extract`] dispatches on that tag with an exhaustive `match`. Failures never
//! escape this module: a broken page, slide, sheet, or row contributes nothing, and a document
//! that cannot be opened at all yields `None` after a warning is logged.

mod html;
mod image;
mod ooxml;
mod pdf;
mod spreadsheet;

use crate::config::{Config, DEFAULT_TESSERACT_CMD};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised inside a single format extractor.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The upload is not a readable ZIP container (DOCX, PPTX).
    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// XML inside an office document could not be parsed.
    #[error("invalid XML: {0}")]
    Xml(String),
    /// The PDF could not be loaded.
    #[error("invalid PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    /// The workbook could not be opened.
    #[error("invalid spreadsheet: {0}")]
    Spreadsheet(String),
    /// The OCR program failed or could not be started.
    #[error("OCR failed: {0}")]
    Ocr(String),
    /// Reading from the upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Word-processor document.
    Docx,
    /// Plain UTF-8 text.
    Text,
    /// Comma-separated values.
    Csv,
    /// Legacy Excel workbook.
    Xls,
    /// Office Open XML workbook.
    Xlsx,
    /// Presentation slides.
    Pptx,
    /// Hypertext markup.
    Html,
    /// Raster image read through OCR.
    Image,
}

impl DocumentFormat {
    /// Extension table, lower case.
    pub const EXTENSIONS: [(&'static str, DocumentFormat); 12] = [
        ("pdf", Self::Pdf),
        ("docx", Self::Docx),
        ("txt", Self::Text),
        ("csv", Self::Csv),
        ("xls", Self::Xls),
        ("xlsx", Self::Xlsx),
        ("pptx", Self::Pptx),
        ("html", Self::Html),
        ("htm", Self::Html),
        ("png", Self::Image),
        ("jpg", Self::Image),
        ("jpeg", Self::Image),
    ];

    /// Map a filename extension (any case, without the dot) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let normalized = extension.to_ascii_lowercase();
        Self::EXTENSIONS
            .iter()
            .find(|(candidate, _)| *candidate == normalized)
            .map(|(_, format)| *format)
    }

    /// Derive the format from an uploaded file name.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
            Self::Html => "html",
            Self::Image => "image",
        };
        f.write_str(name)
    }
}

/// Uploaded file paired with its format tag.
#[derive(Debug, Clone)]
pub struct Document {
    file_name: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

impl Document {
    /// Tag an upload by extension; `None` when the extension is not supported.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Option<Self> {
        let file_name = file_name.into();
        let format = DocumentFormat::from_file_name(&file_name)?;
        Some(Self {
            file_name,
            format,
            bytes,
        })
    }

    /// Original file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Format derived from the file name.
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Raw upload contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Dispatches documents to the format-specific readers.
#[derive(Debug, Clone)]
pub struct Extractor {
    tesseract_command: String,
}

impl Extractor {
    /// Build an extractor that runs `tesseract_command` for images.
    pub fn new(tesseract_command: impl Into<String>) -> Self {
        Self {
            tesseract_command: tesseract_command.into(),
        }
    }

    /// Build an extractor from the process configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tesseract_command.clone())
    }

    /// Extract plain text, or `None` when the document cannot be read.
    pub fn extract(&self, document: &Document) -> Option<String> {
        let bytes = document.bytes();
        let result = match document.format() {
            DocumentFormat::Pdf => pdf::extract_text(bytes),
            DocumentFormat::Docx => ooxml::extract_docx(bytes),
            DocumentFormat::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
            DocumentFormat::Csv => Ok(spreadsheet::extract_csv(bytes)),
            DocumentFormat::Xls => spreadsheet::extract_xls(bytes),
            DocumentFormat::Xlsx => spreadsheet::extract_xlsx(bytes),
            DocumentFormat::Pptx => ooxml::extract_pptx(bytes),
            DocumentFormat::Html => Ok(html::extract_text(bytes)),
            DocumentFormat::Image => image::extract_text(bytes, &self.tesseract_command),
        };

        match result {
            Ok(text) => {
                tracing::debug!(
                    file = document.file_name(),
                    format = %document.format(),
                    chars = text.chars().count(),
                    "Extracted text"
                );
                Some(text)
            }
            Err(error) => {
                tracing::warn!(
                    file = document.file_name(),
                    format = %document.format(),
                    error = %error,
                    "Text extraction failed"
                );
                None
            }
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT_CMD)
    }
}

/// Join per-unit texts (pages, slides) with a space; failed units contribute an empty string.
pub(crate) fn join_units<E: fmt::Display>(
    unit: &str,
    results: impl IntoIterator<Item = Result<String, E>>,
) -> String {
    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.unwrap_or_else(|error| {
                tracing::debug!(unit, index = index + 1, error = %error, "Skipping unreadable unit");
                String::new()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_extension_is_recognized() {
        for extension in [
            "pdf", "docx", "txt", "csv", "xls", "xlsx", "pptx", "html", "htm", "png", "jpg", "jpeg",
        ] {
            assert!(
                DocumentFormat::from_extension(extension).is_some(),
                "{extension} should be supported"
            );
        }
    }

    #[test]
    fn file_names_map_case_insensitively() {
        assert_eq!(
            DocumentFormat::from_file_name("Report.PDF"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_file_name("page.htm"),
            Some(DocumentFormat::Html)
        );
        assert_eq!(
            DocumentFormat::from_file_name("scan.jpeg"),
            Some(DocumentFormat::Image)
        );
        assert_eq!(DocumentFormat::from_file_name("archive.zip"), None);
        assert_eq!(DocumentFormat::from_file_name("README"), None);
    }

    #[test]
    fn document_rejects_unknown_extension() {
        assert!(Document::new("bundle.zip", b"PK".to_vec()).is_none());
        let document = Document::new("notes.txt", b"hi".to_vec()).expect("text document");
        assert_eq!(document.format(), DocumentFormat::Text);
        assert_eq!(document.file_name(), "notes.txt");
    }

    #[test]
    fn plain_text_is_decoded_lossily() {
        let extractor = Extractor::default();
        let document = Document::new("notes.txt", b"Hello world.".to_vec()).expect("doc");
        assert_eq!(extractor.extract(&document).as_deref(), Some("Hello world."));

        let invalid = Document::new("bad.txt", vec![b'o', b'k', 0xff]).expect("doc");
        assert_eq!(extractor.extract(&invalid).as_deref(), Some("ok\u{fffd}"));
    }

    #[test]
    fn corrupt_documents_yield_none() {
        let extractor = Extractor::default();
        for name in ["broken.pdf", "broken.docx", "broken.pptx", "broken.xlsx"] {
            let document = Document::new(name, b"not a real document".to_vec()).expect("doc");
            assert_eq!(extractor.extract(&document), None, "{name}");
        }
    }

    #[test]
    fn failed_units_degrade_to_empty_text() {
        let units: Vec<Result<String, String>> = vec![
            Ok("first page".into()),
            Err("unreadable".into()),
            Ok("third page".into()),
        ];
        assert_eq!(join_units("page", units), "first page  third page");
    }
}
