//! Deterministic local results used when every provider fails.
//!
//! Every function here is pure: identical inputs always give identical
//! output, so a degraded response is stable across retries by the caller.

use sha2::{Digest, Sha256};

use artistry_types::output::{PromptAnalysis, RewrittenPrompt};
use artistry_types::request::{ArtistInfo, BioLength, Complexity, PromptOptions, PromptRequest, TargetAudience};

use crate::cache::hex;

/// Style modifiers cycled through by prompt variations.
pub const VARIATION_MODIFIERS: [&str; 10] = [
    "with a cinematic, widescreen feel",
    "in a minimalist style",
    "with vibrant, saturated colors",
    "in a moody, low-key palette",
    "from a dramatic low angle",
    "as a vintage film photograph",
    "with surreal, dreamlike elements",
    "in a bold graphic poster style",
    "bathed in soft golden-hour light",
    "with an energetic, high-contrast look",
];

const STYLE_CUES: &[&str] = &[
    "style", "aesthetic", "inspired", "painting", "photograph", "illustration", "render", "cinematic",
];
const LIGHTING_CUES: &[&str] = &["light", "lighting", "glow", "shadow", "sunset", "neon", "backlit"];
const COMPOSITION_CUES: &[&str] = &[
    "composition", "close-up", "portrait", "wide", "angle", "framing", "background", "foreground",
];
const MOOD_CUES: &[&str] = &["mood", "atmosphere", "vibrant", "dark", "moody", "serene", "dramatic"];

pub fn fallback_bio(info: &ArtistInfo, length: BioLength) -> String {
    let name = info.name.trim();
    let genre = info.genre.trim();
    let traits = join_list(&info.personality_traits);

    let mut bio = format!(
        "{name} is an innovative AI artist who masters {genre} with a {traits} personality. \
         Known for a {style} visual identity, {name} speaks in a {voice} voice that draws listeners in.",
        style = info.visual_style.trim(),
        voice = info.speaking_style.trim(),
    );

    if length != BioLength::Short {
        bio.push_str(&format!(
            " Every release pushes {genre} into new territory, blending bold ideas with a sound that is unmistakably {name}."
        ));
    }
    if length == BioLength::Long {
        if let Some(background) = info.background.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            bio.push_str(&format!(" {background}"));
            if !background.ends_with('.') {
                bio.push('.');
            }
        }
        bio.push_str(&format!(
            " With a growing catalogue and a devoted community, {name} continues to redefine what an artist can be."
        ));
    }

    bio
}

/// Placeholder image URL seeded by name, style and variant.
pub fn fallback_image_url(name: &str, visual_style: &str, variant: u32, (width, height): (u32, u32)) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{variant}", name.trim(), visual_style.trim()).as_bytes());
    let digest = hex(&hasher.finalize());
    format!("https://picsum.photos/seed/{}/{width}/{height}", &digest[..16])
}

pub fn fallback_rewrite(request: &PromptRequest, options: &PromptOptions) -> RewrittenPrompt {
    let original = request.original_prompt.trim().trim_end_matches(['.', ',']);
    let mut parts = vec![original.to_string()];
    let mut improvements = Vec::new();

    if let Some(style) = request.style.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(format!("in a {style} style"));
        improvements.push(format!("Applied the requested {style} style"));
    }
    if let Some(context) = request.context.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(context.to_string());
        improvements.push("Folded the provided context into the prompt".to_string());
    }

    parts.push(complexity_descriptor(options.complexity).to_string());
    improvements.push(format!("Added {} level detail", options.complexity));
    parts.push(audience_descriptor(options.target_audience).to_string());
    improvements.push(format!("Tuned tone for a {} audience", options.target_audience));

    RewrittenPrompt {
        rewritten_prompt: parts.join(", "),
        analysis: format!(
            "Expanded the original prompt with {} detail for a {} audience.",
            options.complexity, options.target_audience
        ),
        improvements,
    }
}

/// Heuristic quality score from length and descriptive vocabulary.
pub fn fallback_analysis(prompt: &str) -> PromptAnalysis {
    let lower = prompt.to_lowercase();
    let words = lower.split_whitespace().count();
    let mentions = |cues: &[&str]| cues.iter().any(|cue| lower.contains(cue));

    let mut score: u32 = 30;
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    if words >= 8 {
        score += 15;
        strengths.push("Gives enough detail to guide generation".to_string());
    } else {
        weaknesses.push("Prompt is very short".to_string());
        recommendations.push("Describe the subject, setting and mood in more detail".to_string());
    }
    if words >= 25 {
        score += 10;
        strengths.push("Rich, descriptive wording".to_string());
    }

    let checks = [
        (STYLE_CUES, 15, "Names an artistic style", "No artistic style given", "Name an artistic style or medium"),
        (LIGHTING_CUES, 10, "Specifies lighting", "Lighting is unspecified", "Specify the lighting"),
        (COMPOSITION_CUES, 10, "Describes composition", "Composition is unspecified", "Describe framing or camera angle"),
        (MOOD_CUES, 10, "Sets a mood", "No mood or atmosphere", "Set a mood or atmosphere"),
    ];
    for (cues, points, strength, weakness, recommendation) in checks {
        if mentions(cues) {
            score += points;
            strengths.push(strength.to_string());
        } else {
            weaknesses.push(weakness.to_string());
            recommendations.push(recommendation.to_string());
        }
    }

    PromptAnalysis {
        quality_score: score.min(100) as u8,
        strengths,
        weaknesses,
        recommendations,
    }
}

pub fn fallback_prompt_variation(base: &str, index: u32) -> String {
    let modifier = VARIATION_MODIFIERS[index as usize % VARIATION_MODIFIERS.len()];
    format!("{} {modifier}", base.trim().trim_end_matches('.'))
}

pub(crate) fn complexity_descriptor(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Simple => "clean composition",
        Complexity::Standard => "balanced composition, natural lighting",
        Complexity::Detailed => "intricate details, dramatic lighting, rich textures",
        Complexity::Professional => {
            "professional studio quality, cinematic lighting, high dynamic range, sharp focus"
        }
    }
}

pub(crate) fn audience_descriptor(audience: TargetAudience) -> &'static str {
    match audience {
        TargetAudience::General => "broadly appealing",
        TargetAudience::Industry => "polished for industry presentation",
        TargetAudience::Fans => "emotionally engaging for devoted fans",
        TargetAudience::Academic => "conceptually precise",
    }
}

fn join_list(items: &[String]) -> String {
    let items: Vec<&str> = items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    match items.as_slice() {
        [] => "distinctive".to_string(),
        [one] => one.to_string(),
        [rest @ .., last] => format!("{} and {last}", rest.join(", ")),
    }
}
