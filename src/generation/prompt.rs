//! Prompt construction for generation requests.
//!
//! Callers that need provider-specific control (HTML-formatted long-form
//! articles, social posts with strict hook/CTA/hashtag rules) embed a
//! complete instruction block in the request context; it is then used
//! verbatim. Everything else gets a synthesized generic prompt.

use crate::models::{ContentType, GenerationRequest};

/// Marker announcing a fully-specified instruction block in the request
/// context. When present, the context is the prompt.
pub const INSTRUCTION_MARKER: &str = "=== CONTENT INSTRUCTIONS ===";

/// Whether the request carries its own complete prompt.
pub fn has_instruction_block(request: &GenerationRequest) -> bool {
    request.context.contains(INSTRUCTION_MARKER)
}

/// Build the prompt for a request.
pub fn build_prompt(request: &GenerationRequest) -> String {
    if has_instruction_block(request) {
        return request.context.clone();
    }
    synthesize_prompt(request)
}

fn synthesize_prompt(request: &GenerationRequest) -> String {
    let voice = &request.brand_voice;
    let word_target = voice.length.word_target();

    let mut prompt = format!(
        "Write a {} about \"{}\" for {}.\n\n",
        describe_content_type(request.content_type),
        request.topic,
        request.audience,
    );

    prompt.push_str(&format!(
        "Tone: {}. Style: {}. Vocabulary: {:?}. Target length: about {} words.\n",
        voice.tone, voice.style, voice.vocabulary, word_target
    ));

    if let Some(ref brand) = voice.brand_name {
        prompt.push_str(&format!("Write on behalf of the brand \"{}\".\n", brand));
    }

    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            "Naturally include these keywords: {}.\n",
            request.keywords.join(", ")
        ));
    }

    if request.language != "en" {
        prompt.push_str(&format!("Write in language code \"{}\".\n", request.language));
    }

    if !request.context.trim().is_empty() {
        prompt.push_str(&format!(
            "\nSource material to rewrite (do not copy verbatim):\n{}\n",
            request.context.trim()
        ));
    }

    prompt.push_str(
        "\nRespond with a JSON object: {\"title\": ..., \"body\": ..., \"excerpt\": ...}. \
         The excerpt is a 1-2 sentence summary.",
    );

    prompt
}

fn describe_content_type(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::BlogPost => "blog post",
        ContentType::SocialPost => "short social media post",
        ContentType::ProductDescription => "product description",
        ContentType::NewsletterSection => "newsletter section",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrandVoice, ProviderChoice};

    fn base_request() -> GenerationRequest {
        GenerationRequest {
            content_type: ContentType::BlogPost,
            topic: "heat pumps".to_string(),
            context: String::new(),
            audience: "homeowners".to_string(),
            keywords: vec!["efficiency".to_string(), "rebates".to_string()],
            brand_voice: BrandVoice {
                brand_name: Some("WarmCo".to_string()),
                ..Default::default()
            },
            language: "en".to_string(),
            include_images: false,
            preferred_provider: ProviderChoice::Auto,
        }
    }

    #[test]
    fn test_synthesized_prompt_includes_fields() {
        let prompt = build_prompt(&base_request());
        assert!(prompt.contains("blog post"));
        assert!(prompt.contains("heat pumps"));
        assert!(prompt.contains("homeowners"));
        assert!(prompt.contains("efficiency, rebates"));
        assert!(prompt.contains("WarmCo"));
        assert!(prompt.contains("JSON object"));
    }

    #[test]
    fn test_instruction_block_used_verbatim() {
        let mut request = base_request();
        request.context = format!(
            "{}\nProduce HTML with <h2> sections and a closing CTA.",
            INSTRUCTION_MARKER
        );
        let prompt = build_prompt(&request);
        assert_eq!(prompt, request.context);
        assert!(!prompt.contains("homeowners"));
    }

    #[test]
    fn test_non_english_language_requested() {
        let mut request = base_request();
        request.language = "es".to_string();
        assert!(build_prompt(&request).contains("\"es\""));
    }

    #[test]
    fn test_source_material_embedded() {
        let mut request = base_request();
        request.context = "Original article text about heat pumps.".to_string();
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Source material"));
        assert!(prompt.contains("Original article text"));
    }
}
