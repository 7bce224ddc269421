use scraper::Html;

/// Text content of an HTML page, leaving out script and style bodies.
pub(super) fn extract_text(bytes: &[u8]) -> String {
    let source = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&source);

    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|element| element.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
            if hidden { None } else { Some(&**text) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_visible_text() {
        let html = br#"<!DOCTYPE html>
<html><head><title>Report</title><style>body { color: red; }</style></head>
<body><h1>Quarterly</h1><p>Revenue <b>grew</b>.</p><script>var x = 1;</script></body></html>"#;

        let text = extract_text(html);
        assert!(text.contains("Report"));
        assert!(text.contains("Quarterly"));
        assert!(text.contains("Revenue grew."));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn plain_fragment_passes_through() {
        assert_eq!(extract_text(b"just words"), "just words");
    }
}
