//! Heuristic quality scoring for extracted content.
//!
//! Additive 0-100 score: title length (0-20), word count (0-40),
//! paragraph structure (0-20), TLD reputation (0-10), and language
//! detection confidence (0-10).

/// Score an extraction result.
///
/// `language_confidence` comes from [`crate::extraction::language`] and is
/// already in the 0-10 band.
pub fn score_extraction(
    title: &str,
    body: &str,
    domain: &str,
    language_confidence: u8,
) -> u8 {
    let score = title_score(title)
        + word_count_score(body)
        + paragraph_score(body)
        + tld_score(domain)
        + u32::from(language_confidence.min(10));
    score.min(100) as u8
}

fn title_score(title: &str) -> u32 {
    let len = title.trim().chars().count();
    if len >= 40 {
        20
    } else if len >= 15 {
        15
    } else if len >= 5 {
        8
    } else {
        0
    }
}

/// Staircase thresholds at 50/200/500/1000 words.
fn word_count_score(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    if words >= 1000 {
        40
    } else if words >= 500 {
        30
    } else if words >= 200 {
        20
    } else if words >= 50 {
        10
    } else {
        0
    }
}

fn paragraph_score(body: &str) -> u32 {
    let paragraphs = body
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count();
    if paragraphs >= 8 {
        20
    } else if paragraphs >= 4 {
        14
    } else if paragraphs >= 2 {
        8
    } else {
        0
    }
}

fn tld_score(domain: &str) -> u32 {
    let tld = domain.rsplit('.').next().unwrap_or("");
    match tld {
        "gov" | "edu" => 10,
        "org" => 8,
        "com" | "net" | "io" | "co" => 6,
        "" => 0,
        _ => 3,
    }
}
