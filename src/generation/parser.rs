//! Provider response parsing.
//!
//! Providers return structured JSON, HTML documents, or freeform text
//! depending on the prompt. Parsing is a defined grammar of three
//! discrete attempts: structured-object extraction, heading-tag
//! extraction, and first-line-as-title.

use regex::Regex;
use serde_json::Value;

/// Title/body/excerpt recovered from a raw completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContent {
    pub title: String,
    pub body: String,
    pub excerpt: String,
}

/// Parse a provider response, trying each grammar in order.
pub fn parse_response(raw: &str, html_expected: bool) -> Option<ParsedContent> {
    if let Some(parsed) = parse_structured(raw) {
        return Some(parsed);
    }
    if html_expected {
        if let Some(parsed) = parse_html_document(raw) {
            return Some(parsed);
        }
    }
    parse_plain_text(raw)
}

/// Attempt 1: locate and parse an embedded JSON object with `title` and
/// `body`/`content` fields, stripping surrounding code fences.
pub fn parse_structured(raw: &str) -> Option<ParsedContent> {
    let stripped = strip_code_fences(raw);

    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }

    let value: Value = serde_json::from_str(&stripped[start..=end]).ok()?;
    let obj = value.as_object()?;

    let title = obj.get("title")?.as_str()?.trim().to_string();
    let body = obj
        .get("body")
        .or_else(|| obj.get("content"))?
        .as_str()?
        .trim()
        .to_string();
    if title.is_empty() || body.is_empty() {
        return None;
    }

    let excerpt = obj
        .get("excerpt")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default_excerpt(&body));

    Some(ParsedContent {
        title,
        body,
        excerpt,
    })
}

/// Attempt 2: treat the response as an HTML document; a leading heading
/// tag is the title, the remainder (wrapper tags stripped) is the body.
pub fn parse_html_document(raw: &str) -> Option<ParsedContent> {
    let heading_re = Regex::new(r"(?is)<h([1-3])[^>]*>(.*?)</h[1-3]>").expect("static regex");
    let captures = heading_re.captures(raw)?;
    let title = strip_tags(captures.get(2)?.as_str());
    if title.is_empty() {
        return None;
    }

    // Body: everything after the matched heading, minus document wrappers.
    let heading_end = captures.get(0)?.end();
    let body = strip_document_wrappers(&raw[heading_end..]);
    if body.trim().is_empty() {
        return None;
    }

    let excerpt = default_excerpt(&strip_tags(&body));
    Some(ParsedContent {
        title,
        body: body.trim().to_string(),
        excerpt,
    })
}

/// Attempt 3: first non-trivial line is the title, the rest is the body.
pub fn parse_plain_text(raw: &str) -> Option<ParsedContent> {
    let text = strip_code_fences(raw);
    let mut lines = text.lines();

    let mut title = String::new();
    let mut consumed = 0usize;
    for line in lines.by_ref() {
        consumed += line.len() + 1;
        let candidate = line
            .trim()
            .trim_start_matches('#')
            .trim_start_matches('*')
            .trim()
            .trim_start_matches("Title:")
            .trim();
        if candidate.len() > 3 {
            title = candidate.to_string();
            break;
        }
    }
    if title.is_empty() {
        return None;
    }

    let body = text[consumed.min(text.len())..].trim().to_string();
    if body.is_empty() {
        return None;
    }

    let excerpt = default_excerpt(&body);
    Some(ParsedContent {
        title,
        body,
        excerpt,
    })
}

/// Remove ``` fences (with optional language tags) around a response.
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let without_open = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return trimmed.to_string(),
    };
    without_open
        .trim_end()
        .trim_end_matches("```")
        .trim()
        .to_string()
}

/// Remove html/head/body/doctype wrappers, keeping inner markup.
fn strip_document_wrappers(html: &str) -> String {
    let re = Regex::new(r"(?is)</?(!doctype|html|head|body)[^>]*>|<head>.*?</head>")
        .expect("static regex");
    re.replace_all(html, "").trim().to_string()
}

fn strip_tags(html: &str) -> String {
    let re = Regex::new(r"<[^>]+>").expect("static regex");
    re.replace_all(html, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn default_excerpt(body: &str) -> String {
    let first: &str = body
        .split(['\n', '.'])
        .find(|s| s.trim().len() > 10)
        .unwrap_or(body);
    let trimmed = first.trim();
    if trimmed.chars().count() <= 160 {
        format!("{}.", trimmed.trim_end_matches('.'))
    } else {
        let cut: String = trimmed.chars().take(160).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_plain_json() {
        let raw = r#"{"title": "Five Rebate Programs", "body": "Rebates can cut install costs.", "excerpt": "Rebate overview."}"#;
        let parsed = parse_structured(raw).unwrap();
        assert_eq!(parsed.title, "Five Rebate Programs");
        assert_eq!(parsed.body, "Rebates can cut install costs.");
        assert_eq!(parsed.excerpt, "Rebate overview.");
    }

    #[test]
    fn test_structured_with_code_fences_and_chatter() {
        let raw = "```json\n{\"title\": \"T\", \"content\": \"Body text here.\"}\n```";
        let parsed = parse_structured(raw).unwrap();
        assert_eq!(parsed.title, "T");
        assert_eq!(parsed.body, "Body text here.");
        assert!(!parsed.excerpt.is_empty());
    }

    #[test]
    fn test_structured_rejects_missing_fields() {
        assert!(parse_structured(r#"{"headline": "x"}"#).is_none());
        assert!(parse_structured("no json here").is_none());
        assert!(parse_structured(r#"{"title": "", "body": "b"}"#).is_none());
    }

    #[test]
    fn test_html_document_heading_title() {
        let raw = "<!DOCTYPE html><html><body><h1>Heat Pump Basics</h1>\
                   <p>They move heat instead of making it.</p></body></html>";
        let parsed = parse_html_document(raw).unwrap();
        assert_eq!(parsed.title, "Heat Pump Basics");
        assert!(parsed.body.contains("<p>They move heat"));
        assert!(!parsed.body.contains("</html>"));
    }

    #[test]
    fn test_html_document_requires_heading() {
        assert!(parse_html_document("<p>no heading</p>").is_none());
    }

    #[test]
    fn test_plain_text_first_line_title() {
        let raw = "Title: Winter-Proof Your Home\n\nStart with the attic. \
                   Insulation pays for itself within a few seasons.";
        let parsed = parse_plain_text(raw).unwrap();
        assert_eq!(parsed.title, "Winter-Proof Your Home");
        assert!(parsed.body.starts_with("Start with the attic."));
    }

    #[test]
    fn test_plain_text_skips_markdown_heading_markers() {
        let raw = "## A Markdown Title\nBody follows on the next line with enough text.";
        let parsed = parse_plain_text(raw).unwrap();
        assert_eq!(parsed.title, "A Markdown Title");
    }

    #[test]
    fn test_plain_text_rejects_empty_body() {
        assert!(parse_plain_text("Only a title line").is_none());
        assert!(parse_plain_text("").is_none());
    }

    #[test]
    fn test_parse_response_order() {
        // JSON wins even when HTML is expected.
        let json = r#"{"title": "J", "body": "json body"}"#;
        assert_eq!(parse_response(json, true).unwrap().title, "J");

        // HTML grammar only applies when expected.
        let html = "<h2>H</h2><p>html body</p>";
        assert_eq!(parse_response(html, true).unwrap().title, "H");

        // Freeform text lands on the plain-text grammar.
        let plain = parse_response("A plain title\nAnd a body line.", false).unwrap();
        assert_eq!(plain.title, "A plain title");
    }

    #[test]
    fn test_default_excerpt_truncates() {
        let body = "word ".repeat(100);
        let excerpt = default_excerpt(&body);
        assert!(excerpt.chars().count() <= 164);
        assert!(excerpt.ends_with("..."));
    }
}
