//! Typed request and option shapes for each operation facade.
//!
//! Options enumerate every recognised field with its default, so an empty
//! options value (`Default::default()` or `{}` in JSON) is always valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subject of a bio request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub name: String,
    pub genre: String,
    #[serde(default)]
    pub personality_traits: Vec<String>,
    pub visual_style: String,
    pub speaking_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Target length of a generated bio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BioLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl BioLength {
    /// Approximate word budget handed to the model.
    pub fn target_words(&self) -> u32 {
        match self {
            BioLength::Short => 80,
            BioLength::Medium => 150,
            BioLength::Long => 300,
        }
    }
}

impl fmt::Display for BioLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BioLength::Short => write!(f, "short"),
            BioLength::Medium => write!(f, "medium"),
            BioLength::Long => write!(f, "long"),
        }
    }
}

impl FromStr for BioLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(BioLength::Short),
            "medium" => Ok(BioLength::Medium),
            "long" => Ok(BioLength::Long),
            other => Err(format!("invalid bio length: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BioOptions {
    /// Ordered provider list replacing the configured routing for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
    pub length: BioLength,
}

/// Subject of an image request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRequest {
    pub name: String,
    pub visual_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered provider list replacing the configured routing for this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    #[default]
    Square,
    Portrait,
    Landscape,
}

impl AspectRatio {
    /// Pixel dimensions `(width, height)` requested from image backends.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Portrait => (768, 1024),
            AspectRatio::Landscape => (1024, 768),
        }
    }

    /// `"WIDTHxHEIGHT"` form used by image APIs.
    pub fn size(&self) -> String {
        let (w, h) = self.dimensions();
        format!("{w}x{h}")
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Square => write!(f, "square"),
            AspectRatio::Portrait => write!(f, "portrait"),
            AspectRatio::Landscape => write!(f, "landscape"),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "square" => Ok(AspectRatio::Square),
            "portrait" => Ok(AspectRatio::Portrait),
            "landscape" => Ok(AspectRatio::Landscape),
            other => Err(format!("invalid aspect ratio: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub aspect_ratio: AspectRatio,
}

/// Subject of a prompt rewrite request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest {
    pub original_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Standard,
    Detailed,
    Professional,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Standard => write!(f, "standard"),
            Complexity::Detailed => write!(f, "detailed"),
            Complexity::Professional => write!(f, "professional"),
        }
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Complexity::Simple),
            "standard" => Ok(Complexity::Standard),
            "detailed" => Ok(Complexity::Detailed),
            "professional" => Ok(Complexity::Professional),
            other => Err(format!("invalid complexity: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetAudience {
    #[default]
    General,
    Industry,
    Fans,
    Academic,
}

impl fmt::Display for TargetAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAudience::General => write!(f, "general"),
            TargetAudience::Industry => write!(f, "industry"),
            TargetAudience::Fans => write!(f, "fans"),
            TargetAudience::Academic => write!(f, "academic"),
        }
    }
}

impl FromStr for TargetAudience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(TargetAudience::General),
            "industry" => Ok(TargetAudience::Industry),
            "fans" => Ok(TargetAudience::Fans),
            "academic" => Ok(TargetAudience::Academic),
            other => Err(format!("invalid target audience: '{other}'")),
        }
    }
}

/// Options shared by prompt rewrite, analysis and variations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptOptions {
    pub complexity: Complexity,
    pub target_audience: TargetAudience,
    /// Ordered provider list replacing the configured routing for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
}
