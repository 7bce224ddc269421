//! DOCX and PPTX readers. Both formats are ZIP containers holding XML parts whose text lives in
//! run elements (`w:t` for documents, `a:t` for slides) grouped into paragraphs.

use quick_xml::{Reader as XmlReader, events::Event};
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::{ExtractionError, join_units};

const DOCX_BODY: &str = "word/document.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Paragraph texts of the document body, joined by a space.
pub(super) fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_part(&mut archive, DOCX_BODY)?;
    Ok(paragraphs(&xml, b"w:p", b"w:t")?.join(" "))
}

/// Slide texts in slide order, joined by a space; unreadable slides contribute nothing.
pub(super) fn extract_pptx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let slides = slide_part_names(archive.file_names());
    tracing::debug!(slides = slides.len(), "Opened presentation");

    let texts: Vec<Result<String, ExtractionError>> = slides
        .iter()
        .map(|name| -> Result<String, ExtractionError> {
            let xml = read_part(&mut archive, name)?;
            Ok(paragraphs(&xml, b"a:p", b"a:t")?.join(" "))
        })
        .collect();
    Ok(join_units("slide", texts))
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<String, ExtractionError> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// `ppt/slides/slideN.xml` entries sorted by `N`.
fn slide_part_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = names
        .filter_map(|name| {
            let number = name
                .strip_prefix(SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);
    slides.into_iter().map(|(_, name)| name).collect()
}

/// Collect the non-empty paragraphs of an XML part.
fn paragraphs(
    xml: &str,
    paragraph_tag: &[u8],
    text_tag: &[u8],
) -> Result<Vec<String>, ExtractionError> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = Vec::new();
    let mut current = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                if name.as_ref() == text_tag {
                    in_text_node = true;
                } else if name.as_ref() == paragraph_tag {
                    current.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e
                        .unescape()
                        .map_err(|err| ExtractionError::Xml(err.to_string()))?;
                    current.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                if name.as_ref() == text_tag {
                    in_text_node = false;
                } else if name.as_ref() == paragraph_tag {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        output.push(paragraph.to_string());
                    }
                    current.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ExtractionError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(output)
}
