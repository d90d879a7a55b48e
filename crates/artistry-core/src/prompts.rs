//! Provider request templates and response parsers for each operation.

use serde::Deserialize;

use artistry_types::error::ProviderError;
use artistry_types::output::{PromptAnalysis, RewrittenPrompt};
use artistry_types::provider::{ProviderOutput, ProviderRequest};
use artistry_types::request::{
    ArtistInfo, AspectRatio, BioLength, ImageRequest, PromptOptions, PromptRequest,
};

use crate::synth::{VARIATION_MODIFIERS, audience_descriptor, complexity_descriptor};

const BIO_SYSTEM: &str = "You write biographies for AI-generated music artists. \
Respond with the biography text only, no headings or markdown.";

const REWRITE_SYSTEM: &str = "You improve prompts for AI image and music generation. \
Respond with JSON only: {\"rewritten_prompt\": string, \"analysis\": string, \"improvements\": [string]}.";

const ANALYSIS_SYSTEM: &str = "You review prompts for AI image and music generation. \
Respond with JSON only: {\"quality_score\": integer 0-100, \"strengths\": [string], \
\"weaknesses\": [string], \"recommendations\": [string]}.";

const VARIATION_SYSTEM: &str = "You write alternative versions of prompts for AI generation. \
Respond with the new prompt text only.";

pub fn bio_request(info: &ArtistInfo, length: BioLength) -> ProviderRequest {
    let mut prompt = format!(
        "Write a biography of about {words} words for the AI music artist below.\n\
         Name: {name}\nGenre: {genre}\nPersonality traits: {traits}\n\
         Visual style: {style}\nSpeaking style: {voice}",
        words = length.target_words(),
        name = info.name.trim(),
        genre = info.genre.trim(),
        traits = info.personality_traits.join(", "),
        style = info.visual_style.trim(),
        voice = info.speaking_style.trim(),
    );
    if let Some(background) = info.background.as_deref().filter(|b| !b.trim().is_empty()) {
        prompt.push_str(&format!("\nBackground: {}", background.trim()));
    }

    ProviderRequest::text(prompt)
        .with_system(BIO_SYSTEM)
        .with_max_tokens(length.target_words() * 3)
        .with_temperature(0.8)
}

/// Image prompt; `variant` is set for members of a variation batch.
pub fn image_request(request: &ImageRequest, aspect: AspectRatio, variant: Option<u32>) -> ProviderRequest {
    let mut prompt = format!(
        "Portrait of {}, an AI music artist. Visual style: {}.",
        request.name.trim(),
        request.visual_style.trim()
    );
    if let Some(genre) = non_blank(&request.genre) {
        prompt.push_str(&format!(" Genre: {genre}."));
    }
    if let Some(mood) = non_blank(&request.mood) {
        prompt.push_str(&format!(" Mood: {mood}."));
    }
    if let Some(description) = non_blank(&request.description) {
        prompt.push_str(&format!(" {description}"));
    }
    if let Some(index) = variant {
        prompt.push_str(&format!(
            " Variation {}: use a distinct composition and pose.",
            index + 1
        ));
    }

    ProviderRequest::image(prompt, aspect.size())
}

pub fn rewrite_request(request: &PromptRequest, options: &PromptOptions) -> ProviderRequest {
    let mut prompt = format!(
        "Rewrite this prompt.\nOriginal: {}\nComplexity: {} ({})\nTarget audience: {} ({})",
        request.original_prompt.trim(),
        options.complexity,
        complexity_descriptor(options.complexity),
        options.target_audience,
        audience_descriptor(options.target_audience),
    );
    if let Some(style) = non_blank(&request.style) {
        prompt.push_str(&format!("\nStyle: {style}"));
    }
    if let Some(context) = non_blank(&request.context) {
        prompt.push_str(&format!("\nContext: {context}"));
    }

    ProviderRequest::text(prompt)
        .with_system(REWRITE_SYSTEM)
        .with_max_tokens(800)
        .with_temperature(0.7)
}

pub fn analysis_request(prompt: &str, options: &PromptOptions) -> ProviderRequest {
    ProviderRequest::text(format!(
        "Analyze this prompt for a {} audience.\nPrompt: {}",
        options.target_audience,
        prompt.trim()
    ))
    .with_system(ANALYSIS_SYSTEM)
    .with_max_tokens(600)
    .with_temperature(0.2)
}

pub fn variation_request(base: &str, options: &PromptOptions, index: u32) -> ProviderRequest {
    let modifier = VARIATION_MODIFIERS[index as usize % VARIATION_MODIFIERS.len()];
    ProviderRequest::text(format!(
        "Write variation {} of this prompt, keeping its subject but changing its angle ({modifier}).\n\
         Complexity: {}\nPrompt: {}",
        index + 1,
        options.complexity,
        base.trim()
    ))
    .with_system(VARIATION_SYSTEM)
    .with_max_tokens(300)
    .with_temperature(0.9)
}

/// Plain text output, trimmed and unquoted.
pub fn parse_text(output: &ProviderOutput) -> Result<String, ProviderError> {
    let text = output.content.trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .trim();
    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// An `http(s)` or `data:image/` URL.
pub fn parse_image_url(output: &ProviderOutput) -> Result<String, ProviderError> {
    let url = output.content.trim();
    if url.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    if url.starts_with("https://") || url.starts_with("http://") || url.starts_with("data:image/") {
        Ok(url.to_string())
    } else {
        Err(ProviderError::Deserialization(format!(
            "expected an image URL, got '{}'",
            url.chars().take(40).collect::<String>()
        )))
    }
}

#[derive(Deserialize)]
struct RewriteWire {
    #[serde(alias = "rewrittenPrompt")]
    rewritten_prompt: String,
    #[serde(default)]
    analysis: String,
    #[serde(default)]
    improvements: Vec<String>,
}

/// JSON rewrite payload, or the whole reply as the rewritten prompt when
/// the model answered in plain text.
pub fn parse_rewrite(output: &ProviderOutput) -> Result<RewrittenPrompt, ProviderError> {
    let body = strip_code_fence(&output.content);
    if body.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    match serde_json::from_str::<RewriteWire>(body) {
        Ok(wire) if !wire.rewritten_prompt.trim().is_empty() => Ok(RewrittenPrompt {
            rewritten_prompt: wire.rewritten_prompt.trim().to_string(),
            analysis: wire.analysis,
            improvements: wire.improvements,
        }),
        Ok(_) => Err(ProviderError::EmptyResponse),
        Err(err) if body.starts_with('{') => Err(ProviderError::Deserialization(err.to_string())),
        Err(_) => Ok(RewrittenPrompt {
            rewritten_prompt: body.to_string(),
            analysis: String::new(),
            improvements: Vec::new(),
        }),
    }
}

#[derive(Deserialize)]
struct AnalysisWire {
    #[serde(alias = "qualityScore", alias = "score")]
    quality_score: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

pub fn parse_analysis(output: &ProviderOutput) -> Result<PromptAnalysis, ProviderError> {
    let body = strip_code_fence(&output.content);
    if body.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    let wire: AnalysisWire =
        serde_json::from_str(body).map_err(|e| ProviderError::Deserialization(e.to_string()))?;

    Ok(PromptAnalysis {
        quality_score: wire.quality_score.round().clamp(0.0, 100.0) as u8,
        strengths: wire.strengths,
        weaknesses: wire.weaknesses,
        recommendations: wire.recommendations,
    })
}

/// Drop a surrounding markdown code fence (```json ... ```), if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistry_types::request::Complexity;

    fn output(content: &str) -> ProviderOutput {
        ProviderOutput {
            content: content.to_string(),
            model: "test".to_string(),
        }
    }

    #[test]
    fn test_bio_request_includes_fields() {
        let info = ArtistInfo {
            name: "Nova".to_string(),
            genre: "electronic".to_string(),
            personality_traits: vec!["curious".to_string(), "bold".to_string()],
            visual_style: "neon".to_string(),
            speaking_style: "poetic".to_string(),
            background: None,
        };
        let req = bio_request(&info, BioLength::Short);
        assert!(req.prompt.contains("about 80 words"));
        assert!(req.prompt.contains("curious, bold"));
        assert!(!req.prompt.contains("Background"));
        assert_eq!(req.max_tokens, Some(240));
        assert!(req.system.is_some());
    }

    #[test]
    fn test_image_request_variant_and_size() {
        let req = ImageRequest {
            name: "Nova".to_string(),
            visual_style: "neon".to_string(),
            mood: Some("  ".to_string()),
            ..Default::default()
        };
        let single = image_request(&req, AspectRatio::Landscape, None);
        assert_eq!(single.size.as_deref(), Some("1024x768"));
        assert!(!single.prompt.contains("Mood"));
        assert!(!single.prompt.contains("Variation"));

        let variant = image_request(&req, AspectRatio::Square, Some(2));
        assert!(variant.prompt.contains("Variation 3"));
    }

    #[test]
    fn test_variation_requests_differ_by_index() {
        let options = PromptOptions {
            complexity: Complexity::Detailed,
            ..Default::default()
        };
        let a = variation_request("a neon skyline", &options, 0);
        let b = variation_request("a neon skyline", &options, 1);
        assert_ne!(a.prompt, b.prompt);
        assert!(a.prompt.contains("detailed"));
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text(&output("  \"hello\" \n")).unwrap(), "hello");
        assert_eq!(parse_text(&output("   ")), Err(ProviderError::EmptyResponse));
    }

    #[test]
    fn test_parse_image_url() {
        assert!(parse_image_url(&output("https://cdn.example.com/a.png")).is_ok());
        assert!(parse_image_url(&output("data:image/png;base64,AAAA")).is_ok());
        assert!(matches!(
            parse_image_url(&output("sorry, I cannot draw")),
            Err(ProviderError::Deserialization(_))
        ));
    }

    #[test]
    fn test_parse_rewrite_json_in_code_fence() {
        let content = "```json\n{\"rewrittenPrompt\": \"A neon skyline at dusk\", \"analysis\": \"added time\", \"improvements\": [\"time of day\"]}\n```";
        let parsed = parse_rewrite(&output(content)).unwrap();
        assert_eq!(parsed.rewritten_prompt, "A neon skyline at dusk");
        assert_eq!(parsed.improvements, vec!["time of day"]);
    }

    #[test]
    fn test_parse_rewrite_plain_text_and_broken_json() {
        let parsed = parse_rewrite(&output("A neon skyline at dusk, cinematic")).unwrap();
        assert_eq!(parsed.rewritten_prompt, "A neon skyline at dusk, cinematic");
        assert!(parsed.analysis.is_empty());

        assert!(matches!(
            parse_rewrite(&output("{\"rewritten_prompt\": ")),
            Err(ProviderError::Deserialization(_))
        ));
    }

    #[test]
    fn test_parse_analysis_clamps_score() {
        let parsed = parse_analysis(&output(
            r#"{"qualityScore": 130.4, "strengths": ["clear subject"]}"#,
        ))
        .unwrap();
        assert_eq!(parsed.quality_score, 100);
        assert_eq!(parsed.strengths, vec!["clear subject"]);
        assert!(parsed.weaknesses.is_empty());

        assert!(parse_analysis(&output("looks good to me")).is_err());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
        assert_eq!(strip_code_fence("```"), "");
    }
}
