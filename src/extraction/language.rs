//! Lightweight language detection for extracted articles.
//!
//! Two-tier heuristic: lexical matching against common-word lists plus a
//! diacritic check, falling back to the domain TLD, then the HTML `lang`
//! attribute, then English.

use std::collections::HashMap;

/// Common words per supported language. Function words are the most
/// frequent tokens in running text, so a handful is enough to separate
/// these languages at article length.
const LEXICONS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "for", "with", "that", "this", "from", "have", "are", "was", "not",
            "but", "you", "they", "will",
        ],
    ),
    (
        "es",
        &[
            "que", "los", "las", "una", "por", "con", "para", "del", "como", "más", "pero",
            "este", "esta", "son", "fue",
        ],
    ),
    (
        "fr",
        &[
            "les", "des", "une", "est", "dans", "pour", "qui", "sur", "avec", "pas", "sont",
            "mais", "plus", "aux", "cette",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "von", "mit", "den", "für", "auf", "nicht",
            "ein", "eine", "sich", "auch",
        ],
    ),
    (
        "pt",
        &[
            "que", "não", "uma", "com", "por", "para", "dos", "mais", "como", "foi", "são",
            "mas", "este", "seu", "sua",
        ],
    ),
];

/// Diacritics that favor one language over the others.
const DIACRITIC_HINTS: &[(&str, &[char])] = &[
    ("es", &['ñ', '¿', '¡']),
    ("de", &['ß', 'ä', 'ö', 'ü']),
    ("fr", &['è', 'ê', 'ç', 'œ', 'à']),
    ("pt", &['ã', 'õ', 'ç']),
];

/// TLD to language, used when the text itself is inconclusive.
const TLD_LANGUAGES: &[(&str, &str)] = &[
    ("es", "es"),
    ("mx", "es"),
    ("ar", "es"),
    ("fr", "fr"),
    ("de", "de"),
    ("at", "de"),
    ("ch", "de"),
    ("pt", "pt"),
    ("br", "pt"),
    ("uk", "en"),
    ("us", "en"),
    ("au", "en"),
    ("ca", "en"),
];

/// Minimum lexicon hits for a confident lexical detection.
const MIN_LEXICAL_HITS: usize = 4;

/// Result of language detection: ISO 639-1 code plus a confidence
/// contribution for the quality score (0-10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLanguage {
    pub code: String,
    pub confidence: u8,
}

/// Detect the language of an article.
pub fn detect_language(text: &str, domain: &str, html_lang: Option<&str>) -> DetectedLanguage {
    // Tier 1: lexical + diacritic scoring over the text itself.
    if let Some(code) = lexical_detect(text) {
        return DetectedLanguage {
            code,
            confidence: 10,
        };
    }

    // Tier 2a: country TLD.
    if let Some(tld) = domain.rsplit('.').next() {
        for (candidate_tld, lang) in TLD_LANGUAGES {
            if tld.eq_ignore_ascii_case(candidate_tld) {
                return DetectedLanguage {
                    code: lang.to_string(),
                    confidence: 6,
                };
            }
        }
    }

    // Tier 2b: HTML lang attribute ("en-US" -> "en").
    if let Some(lang) = html_lang {
        let code = lang.split(['-', '_']).next().unwrap_or("").to_lowercase();
        if code.len() == 2 {
            return DetectedLanguage {
                code,
                confidence: 4,
            };
        }
    }

    DetectedLanguage {
        code: "en".to_string(),
        confidence: 2,
    }
}

fn lexical_detect(text: &str) -> Option<String> {
    let sample: String = text.chars().take(4000).collect();
    let lower = sample.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();

    if words.len() < 20 {
        return None;
    }

    let mut scores: HashMap<&str, usize> = HashMap::new();
    for (lang, lexicon) in LEXICONS {
        let hits = words.iter().filter(|w| lexicon.contains(*w)).count();
        scores.insert(lang, hits);
    }

    // Diacritic density acts as a tiebreaker boost.
    for (lang, chars) in DIACRITIC_HINTS {
        let count = lower.chars().filter(|c| chars.contains(c)).count();
        if count > 0 {
            *scores.entry(lang).or_insert(0) += count.min(10);
        }
    }

    let (best_lang, best_score) = scores.iter().max_by_key(|(_, s)| **s)?;
    if *best_score >= MIN_LEXICAL_HITS {
        Some(best_lang.to_string())
    } else {
        None
    }
}
