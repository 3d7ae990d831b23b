//! Content-image filtering.
//!
//! Raw `<img>` URLs from a page are mostly chrome: navigation sprites, ad
//! slots, avatars, share buttons, tracking pixels. This module keeps only
//! plausible article imagery, resolved to absolute URLs and capped.

use url::Url;

/// Maximum images carried on an extraction result.
pub const MAX_IMAGES: usize = 8;

/// URL substrings that mark non-content imagery.
const REJECT_PATTERNS: &[&str] = &[
    "sprite", "icon", "logo", "avatar", "banner", "pixel", "tracking", "spacer", "blank",
    "button", "social", "share", "badge", "emoji", "captcha", "placeholder", "thumb-nav",
    "/ads/", "/ad/", "advert",
];

/// Filter, absolutize, dedupe, and cap image URLs found in a page.
pub fn filter_image_urls(raw_urls: &[String], page_url: &str) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    let mut seen = Vec::new();

    for raw in raw_urls {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with("data:") {
            continue;
        }

        let absolute = match resolve(raw, base.as_ref()) {
            Some(u) => u,
            None => continue,
        };

        if !is_content_image(&absolute) {
            continue;
        }
        if seen.contains(&absolute) {
            continue;
        }

        seen.push(absolute);
        if seen.len() >= MAX_IMAGES {
            break;
        }
    }

    seen
}

fn resolve(raw: &str, base: Option<&Url>) -> Option<String> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    base.and_then(|b| b.join(raw).ok()).map(|u| u.to_string())
}

/// Heuristic: does this URL plausibly point at article imagery?
fn is_content_image(url: &str) -> bool {
    let lower = url.to_lowercase();

    if REJECT_PATTERNS.iter().any(|p| lower.contains(p)) {
        return false;
    }
    // SVGs are nearly always interface assets on article pages.
    if lower.ends_with(".svg") {
        return false;
    }
    // Tiny dimension hints in the filename (16x16 ... 64x64).
    if has_tiny_dimensions(&lower) {
        return false;
    }

    true
}

fn has_tiny_dimensions(url: &str) -> bool {
    for size in [16, 24, 32, 48, 64] {
        if url.contains(&format!("{}x{}", size, size)) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rejects_interface_assets() {
        let urls = owned(&[
            "https://example.com/assets/logo.png",
            "https://example.com/img/share-icon.png",
            "https://cdn.example.com/avatars/u123.jpg",
            "https://example.com/static/sprite.png",
            "https://example.com/photos/eclipse-2025.jpg",
        ]);
        let kept = filter_image_urls(&urls, "https://example.com/article");
        assert_eq!(kept, vec!["https://example.com/photos/eclipse-2025.jpg"]);
    }

    #[test]
    fn test_resolves_relative_and_protocol_relative() {
        let urls = owned(&["/media/chart.png", "//cdn.example.com/hero.jpg"]);
        let kept = filter_image_urls(&urls, "https://example.com/news/story");
        assert_eq!(
            kept,
            vec![
                "https://example.com/media/chart.png",
                "https://cdn.example.com/hero.jpg",
            ]
        );
    }

    #[test]
    fn test_drops_data_uris_and_svg() {
        let urls = owned(&[
            "data:image/png;base64,iVBORw0KGgo=",
            "https://example.com/diagram.svg",
        ]);
        assert!(filter_image_urls(&urls, "https://example.com/").is_empty());
    }

    #[test]
    fn test_drops_tiny_images() {
        let urls = owned(&["https://example.com/favicon-32x32.png"]);
        assert!(filter_image_urls(&urls, "https://example.com/").is_empty());
    }

    #[test]
    fn test_dedupes_and_caps() {
        let mut urls = Vec::new();
        for i in 0..20 {
            urls.push(format!("https://example.com/photos/{}.jpg", i));
        }
        urls.push("https://example.com/photos/0.jpg".to_string());
        let kept = filter_image_urls(&urls, "https://example.com/");
        assert_eq!(kept.len(), MAX_IMAGES);
        assert_eq!(kept[0], "https://example.com/photos/0.jpg");
    }
}
