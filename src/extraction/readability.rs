//! Readability-style article extraction from raw HTML.
//!
//! Finds the densest content container, harvests its paragraphs, and pulls
//! page metadata (title, description, author, publish date, images, lang).
//! Works on both statically fetched and browser-rendered HTML.

use scraper::{Html, Selector};

/// Candidate containers likely to hold the article body, tried in order of
/// specificity. The densest match wins.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".article-body",
    ".story-body",
    ".post-body",
    "#content",
    "#main-content",
];

/// Paragraphs shorter than this are treated as boilerplate (bylines,
/// timestamps, share prompts) and skipped.
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Cleaned document produced by readability extraction.
#[derive(Debug, Clone, Default)]
pub struct ReadableDocument {
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    /// `lang` attribute on the root element, if present.
    pub html_lang: Option<String>,
    /// Raw image URLs found inside the chosen content container.
    pub image_urls: Vec<String>,
}

/// Run readability extraction over an HTML document.
pub fn extract_readable(html: &str) -> ReadableDocument {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let description = meta_content(&document, "meta[name='description']")
        .or_else(|| meta_content(&document, "meta[property='og:description']"));
    let author = meta_content(&document, "meta[name='author']")
        .or_else(|| first_text(&document, "[rel='author']"));
    let published_at = meta_content(&document, "meta[property='article:published_time']")
        .or_else(|| first_attr(&document, "time[datetime]", "datetime"));
    let html_lang = first_attr(&document, "html", "lang");

    let (body, image_urls) = extract_body_and_images(&document);

    let excerpt = description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| leading_excerpt(&body));

    ReadableDocument {
        title,
        body,
        excerpt,
        description,
        author,
        published_at,
        html_lang,
        image_urls,
    }
}

fn extract_title(document: &Html) -> String {
    if let Some(og) = meta_content(document, "meta[property='og:title']") {
        if !og.trim().is_empty() {
            return og.trim().to_string();
        }
    }
    if let Some(title) = first_text(document, "title") {
        let cleaned = strip_site_suffix(&title);
        if !cleaned.is_empty() {
            return cleaned;
        }
    }
    first_text(document, "h1")
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Drop " | Site Name" / " - Site Name" suffixes common in title tags.
fn strip_site_suffix(title: &str) -> String {
    let trimmed = title.trim();
    for sep in [" | ", " — ", " – ", " - "] {
        if let Some(idx) = trimmed.rfind(sep) {
            // Only strip when the prefix still looks like a headline.
            if idx >= 20 {
                return trimmed[..idx].trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Pick the densest content container and harvest paragraphs and images.
fn extract_body_and_images(document: &Html) -> (String, Vec<String>) {
    let p_selector = Selector::parse("p").expect("static selector");
    let img_selector = Selector::parse("img").expect("static selector");

    let mut best: Option<(String, Vec<String>)> = None;
    let mut best_len = 0usize;

    for selector_str in CONTENT_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };

        for container in document.select(&selector) {
            let paragraphs: Vec<String> = container
                .select(&p_selector)
                .map(|p| normalize_whitespace(&p.text().collect::<String>()))
                .filter(|t| t.len() >= MIN_PARAGRAPH_CHARS)
                .collect();

            let total: usize = paragraphs.iter().map(|p| p.len()).sum();
            if total > best_len {
                let images: Vec<String> = container
                    .select(&img_selector)
                    .filter_map(|img| {
                        img.value()
                            .attr("src")
                            .or_else(|| img.value().attr("data-src"))
                    })
                    .map(|s| s.to_string())
                    .collect();
                best_len = total;
                best = Some((paragraphs.join("\n\n"), images));
            }
        }
    }

    if let Some(found) = best {
        return found;
    }

    // No recognized container: fall back to every paragraph on the page.
    let paragraphs: Vec<String> = document
        .select(&p_selector)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|t| t.len() >= MIN_PARAGRAPH_CHARS)
        .collect();
    let images: Vec<String> = document
        .select(&img_selector)
        .filter_map(|img| img.value().attr("src"))
        .map(|s| s.to_string())
        .collect();

    (paragraphs.join("\n\n"), images)
}

fn leading_excerpt(body: &str) -> String {
    let first = body.split("\n\n").next().unwrap_or("").trim();
    if first.chars().count() <= 200 {
        return first.to_string();
    }
    let cut: String = first.chars().take(200).collect();
    format!("{}...", cut.trim_end())
}

fn meta_content(document: &Html, selector_str: &str) -> Option<String> {
    first_attr(document, selector_str, "content")
}

fn first_attr(document: &Html, selector_str: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn first_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
        <html lang="en">
        <head>
            <title>How Solar Panels Work | Energy Weekly</title>
            <meta name="description" content="A plain-language look at photovoltaic cells.">
            <meta name="author" content="Dana Reyes">
            <meta property="article:published_time" content="2025-03-14T09:00:00Z">
        </head>
        <body>
            <nav><p>Home News Sports Weather and more links here</p></nav>
            <article>
                <h1>How Solar Panels Work</h1>
                <p>Photovoltaic cells convert sunlight directly into electricity through the photovoltaic effect.</p>
                <p>When photons strike the silicon wafer, they knock electrons loose and create a flow of current.</p>
                <img src="/images/panel-diagram.jpg">
                <p>Modern panels reach efficiencies above twenty percent under standard test conditions.</p>
            </article>
            <footer><p>Copyright 2025 Energy Weekly. All rights reserved here.</p></footer>
        </body>
        </html>"#;

    #[test]
    fn test_extracts_article_body_not_nav() {
        let doc = extract_readable(ARTICLE_HTML);
        assert!(doc.body.contains("photovoltaic effect"));
        assert!(doc.body.contains("silicon wafer"));
        assert!(!doc.body.contains("Sports Weather"));
        assert!(!doc.body.contains("All rights reserved"));
    }

    #[test]
    fn test_metadata_fields() {
        let doc = extract_readable(ARTICLE_HTML);
        assert_eq!(doc.title, "How Solar Panels Work");
        assert_eq!(doc.author.as_deref(), Some("Dana Reyes"));
        assert_eq!(
            doc.published_at.as_deref(),
            Some("2025-03-14T09:00:00Z")
        );
        assert_eq!(doc.html_lang.as_deref(), Some("en"));
        assert_eq!(
            doc.excerpt,
            "A plain-language look at photovoltaic cells."
        );
    }

    #[test]
    fn test_images_scoped_to_content_container() {
        let doc = extract_readable(ARTICLE_HTML);
        assert_eq!(doc.image_urls, vec!["/images/panel-diagram.jpg"]);
    }

    #[test]
    fn test_title_site_suffix_stripped() {
        assert_eq!(
            strip_site_suffix("How Solar Panels Really Work | Energy Weekly"),
            "How Solar Panels Really Work"
        );
        // Short prefixes are left alone; the separator may be part of the headline.
        assert_eq!(strip_site_suffix("Q&A - March"), "Q&A - March");
    }

    #[test]
    fn test_no_container_falls_back_to_paragraphs() {
        let html = "<html><body><p>Just one paragraph of content that is plenty long enough.</p></body></html>";
        let doc = extract_readable(html);
        assert!(doc.body.contains("plenty long enough"));
    }

    #[test]
    fn test_excerpt_truncates_long_first_paragraph() {
        let long_para = "word ".repeat(100);
        let html = format!("<html><body><article><p>{}</p></article></body></html>", long_para);
        let doc = extract_readable(&html);
        assert!(doc.excerpt.chars().count() <= 204);
        assert!(doc.excerpt.ends_with("..."));
    }
}
