//! Detection of the `max-image-preview:large` meta-robots directive
//!
//! The check is advisory: it tolerates casing and spacing variation, falls
//! back to a raw substring search over the serialized document when no meta
//! element qualifies, and reports `false` instead of propagating any parse
//! problem.

use log::debug;
use scraper::{Html, Selector};

/// The directive, in normalized form.
pub const DIRECTIVE: &str = "max-image-preview:large";

/// Lowercase a content value and collapse the spacing variants of the colon
/// so `"MAX-IMAGE-PREVIEW : LARGE"` and friends all normalize to the same
/// token list.
fn normalize_content(content: &str) -> String {
    let joined = content
        .to_lowercase()
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",");
    joined
        .replace(" : ", ":")
        .replace(": ", ":")
        .replace(" :", ":")
}

/// Search a parsed document for the directive.
pub fn document_has_directive(document: &Html) -> bool {
    let meta_selector = match Selector::parse("meta") {
        Ok(s) => s,
        Err(_) => return false,
    };

    for meta in document.select(&meta_selector) {
        let name = meta.value().attr("name").unwrap_or("");
        let content = meta.value().attr("content").unwrap_or("");

        let is_robots = name.eq_ignore_ascii_case("robots");
        let mentions_directive = content.to_lowercase().contains("max-image-preview");
        if !is_robots && !mentions_directive {
            continue;
        }

        if normalize_content(content).contains(DIRECTIVE) {
            return true;
        }
    }

    // Last resort: directives delivered via non-standard markup still count.
    let serialized = document.root_element().html();
    if normalize_content(&serialized).contains(DIRECTIVE) {
        debug!("directive found only via raw document search");
        return true;
    }

    false
}

/// Parse raw markup and search it for the directive.
///
/// Never fails: malformed HTML simply yields `false`.
pub fn html_has_directive(html: &str) -> bool {
    let document = Html::parse_document(html);
    document_has_directive(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_exact_directive() {
        let html = r#"<html><head><meta name="robots" content="max-image-preview:large"></head></html>"#;
        assert!(html_has_directive(html));
    }

    #[test]
    fn test_detects_casing_and_spacing_variants() {
        for content in [
            "MAX-IMAGE-PREVIEW : LARGE",
            "max-image-preview : large",
            "max-image-preview: large",
            "max-image-preview :large",
            "index, follow , max-image-preview:large",
        ] {
            let html = format!(r#"<meta name="ROBOTS" content="{}">"#, content);
            assert!(html_has_directive(&html), "expected detection for {:?}", content);
        }
    }

    #[test]
    fn test_rejects_other_preview_values() {
        let html = r#"<meta name="robots" content="max-image-preview:none">"#;
        assert!(!html_has_directive(html));
        let html = r#"<meta name="robots" content="max-image-preview:standard">"#;
        assert!(!html_has_directive(html));
    }

    #[test]
    fn test_detects_directive_on_non_robots_meta() {
        // name differs, but content carries the directive
        let html = r#"<meta name="googlebot" content="max-image-preview:large">"#;
        assert!(html_has_directive(html));
    }

    #[test]
    fn test_raw_fallback_for_non_standard_markup() {
        // Not a meta element at all; the serialized-document search catches it.
        let html = "<html><body><!-- robots: max-image-preview:large --></body></html>";
        assert!(html_has_directive(html));
    }

    #[test]
    fn test_absent_directive() {
        let html = r#"<html><head><meta name="robots" content="index, follow"></head></html>"#;
        assert!(!html_has_directive(html));
    }

    #[test]
    fn test_malformed_markup_yields_false() {
        assert!(!html_has_directive("<<<>><meta name=robots"));
        assert!(!html_has_directive(""));
    }
}
