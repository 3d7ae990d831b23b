//! Post-generation quality metrics.
//!
//! Three independent 0-100 scores computed over the generated text:
//! SEO (keyword coverage and structure), readability (Flesch-style,
//! clamped to a practical band), and engagement (hooks, CTAs, lists).

/// SEO score: keyword coverage + title-length band + content-length band
/// + presence of headings, capped at 100.
pub fn seo_score(title: &str, body: &str, keywords: &[String]) -> u8 {
    let mut score: u32 = 0;
    let haystack = format!("{}\n{}", title, body).to_lowercase();

    if !keywords.is_empty() {
        let hits = keywords
            .iter()
            .filter(|k| haystack.contains(&k.to_lowercase()))
            .count();
        score += ((hits as f64 / keywords.len() as f64) * 40.0).round() as u32;
    } else {
        // No keywords requested; coverage cannot be held against the copy.
        score += 20;
    }

    let title_len = title.chars().count();
    if (40..=60).contains(&title_len) {
        score += 20;
    } else if (30..=70).contains(&title_len) {
        score += 10;
    }

    let words = body.split_whitespace().count();
    if words >= 1000 {
        score += 25;
    } else if words >= 500 {
        score += 20;
    } else if words >= 300 {
        score += 12;
    } else if words >= 100 {
        score += 5;
    }

    if has_headings(body) {
        score += 15;
    }

    score.min(100) as u8
}

/// Readability: Flesch-Reading-Ease-style formula over words, sentences,
/// and syllables, clamped to a practical 30-90 band.
pub fn readability_score(body: &str) -> u8 {
    let text = strip_markup(body);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 30;
    }

    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| s.trim().len() > 2)
        .count()
        .max(1);
    let syllables: usize = words.iter().map(|w| syllable_count(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    let flesch = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    flesch.clamp(30.0, 90.0).round() as u8
}

/// Engagement: base 50, plus questions, call-to-action vocabulary,
/// emotional vocabulary, and list structure; capped at 100.
pub fn engagement_score(body: &str) -> u8 {
    const CTA_WORDS: &[&str] = &[
        "subscribe", "discover", "learn more", "get started", "try", "buy", "sign up",
        "download", "contact", "join", "start today",
    ];
    const EMOTIONAL_WORDS: &[&str] = &[
        "amazing", "incredible", "essential", "proven", "exclusive", "powerful",
        "transform", "effortless", "remarkable", "surprising", "love",
    ];

    let mut score: u32 = 50;
    let lower = body.to_lowercase();

    if lower.contains('?') {
        score += 10;
    }
    if CTA_WORDS.iter().any(|w| lower.contains(w)) {
        score += 15;
    }
    if EMOTIONAL_WORDS.iter().any(|w| lower.contains(w)) {
        score += 15;
    }
    if has_list_structure(body) {
        score += 10;
    }

    score.min(100) as u8
}

fn has_headings(body: &str) -> bool {
    body.contains("<h2") || body.contains("<h3") || body.lines().any(|l| {
        let t = l.trim_start();
        t.starts_with("## ") || t.starts_with("### ")
    })
}

fn has_list_structure(body: &str) -> bool {
    body.contains("<li>")
        || body.lines().any(|l| {
            let t = l.trim_start();
            t.starts_with("- ")
                || t.starts_with("* ")
                || t.starts_with("1.")
                || t.starts_with("2.")
        })
}

/// Count syllables by vowel groups with a silent-e adjustment. Rough, but
/// stable enough for a relative score.
fn syllable_count(word: &str) -> usize {
    let lower: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if lower.is_empty() {
        return 0;
    }

    let vowels = ['a', 'e', 'i', 'o', 'u', 'y'];
    let mut count = 0;
    let mut prev_was_vowel = false;
    for c in lower.chars() {
        let is_vowel = vowels.contains(&c);
        if is_vowel && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = is_vowel;
    }

    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }

    count.max(1)
}

fn strip_markup(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_tag = false;
    for c in body.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seo_full_keyword_coverage() {
        let keywords = vec!["solar".to_string(), "rebate".to_string()];
        let score = seo_score(
            "Solar Rebate Guide for First-Time Buyers Today",
            &"solar rebate details ".repeat(60),
            &keywords,
        );
        // 40 coverage + 20 title band + 5 length + 0 headings.
        assert!(score >= 60);
    }

    #[test]
    fn test_seo_headings_bonus() {
        let flat = seo_score("T", "plain body", &[]);
        let structured = seo_score("T", "## Section\nplain body", &[]);
        assert_eq!(structured - flat, 15);
    }

    #[test]
    fn test_seo_capped_at_100() {
        let keywords = vec!["a".to_string()];
        let body = format!("## H\n{}", "a word ".repeat(900));
        let score = seo_score(&"t".repeat(50), &body, &keywords);
        assert_eq!(score, 100);
    }

    #[test]
    fn test_readability_band() {
        let simple = readability_score("The cat sat. The dog ran. We all left.");
        assert!(simple >= 70, "simple text scored {}", simple);

        let dense = readability_score(
            "Notwithstanding considerable organizational heterogeneity, interdepartmental \
             coordination necessitates comprehensive institutionalization of multifaceted \
             communication infrastructures administered by professionalized intermediaries.",
        );
        assert_eq!(dense, 30);

        assert_eq!(readability_score(""), 30);
    }

    #[test]
    fn test_engagement_base_and_bonuses() {
        assert_eq!(engagement_score("A flat statement of fact."), 50);

        let engaging = "Ready to cut your bill? Discover our proven approach:\n- step one\n- step two";
        assert_eq!(engagement_score(engaging), 100);
    }

    #[test]
    fn test_syllable_counting() {
        assert_eq!(syllable_count("cat"), 1);
        assert_eq!(syllable_count("water"), 2);
        assert_eq!(syllable_count("capable"), 3);
        // Silent e.
        assert_eq!(syllable_count("make"), 1);
        assert_eq!(syllable_count("a"), 1);
    }
}
