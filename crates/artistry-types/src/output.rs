//! Payloads and caller-facing output shapes.
//!
//! Payload types (`RewrittenPrompt`, `PromptAnalysis`) are what gets cached;
//! the `*Output` types add the provenance fields returned to callers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::{GenerationResult, ProviderAttemptError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BioOutput {
    pub bio: String,
    pub provider: String,
    pub generation_id: Uuid,
}

impl From<GenerationResult<String>> for BioOutput {
    fn from(result: GenerationResult<String>) -> Self {
        Self {
            bio: result.output,
            provider: result.provider,
            generation_id: result.generation_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOutput {
    pub image_url: String,
    pub provider: String,
    pub generation_id: Uuid,
    pub errors: Vec<ProviderAttemptError>,
}

impl From<GenerationResult<String>> for ImageOutput {
    fn from(result: GenerationResult<String>) -> Self {
        Self {
            image_url: result.output,
            provider: result.provider,
            generation_id: result.generation_id,
            errors: result.errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariation {
    pub image_url: String,
    pub provider: String,
    pub generation_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariationsOutput {
    /// Id of the batch (and of its audit record).
    pub generation_id: Uuid,
    pub variations: Vec<ImageVariation>,
    pub errors: Vec<ProviderAttemptError>,
    /// True only when no variation degraded to a fallback image.
    pub success: bool,
}

/// Cached payload of a prompt rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewrittenPrompt {
    pub rewritten_prompt: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutput {
    pub rewritten_prompt: String,
    pub analysis: String,
    pub improvements: Vec<String>,
    pub provider: String,
    pub generation_id: Uuid,
}

impl From<GenerationResult<RewrittenPrompt>> for RewriteOutput {
    fn from(result: GenerationResult<RewrittenPrompt>) -> Self {
        Self {
            rewritten_prompt: result.output.rewritten_prompt,
            analysis: result.output.analysis,
            improvements: result.output.improvements,
            provider: result.provider,
            generation_id: result.generation_id,
        }
    }
}

/// Cached payload of a prompt analysis. `quality_score` is 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptAnalysis {
    pub quality_score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    pub quality_score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub provider: String,
    pub generation_id: Uuid,
}

impl From<GenerationResult<PromptAnalysis>> for AnalysisOutput {
    fn from(result: GenerationResult<PromptAnalysis>) -> Self {
        Self {
            quality_score: result.output.quality_score,
            strengths: result.output.strengths,
            weaknesses: result.output.weaknesses,
            recommendations: result.output.recommendations,
            provider: result.provider,
            generation_id: result.generation_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariation {
    pub prompt: String,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariationsOutput {
    /// Id of the batch (and of its audit record).
    pub generation_id: Uuid,
    pub variations: Vec<PromptVariation>,
    pub errors: Vec<ProviderAttemptError>,
    /// True only when no variation degraded to a fallback prompt.
    pub success: bool,
}
