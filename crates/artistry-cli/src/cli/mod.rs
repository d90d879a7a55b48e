//! CLI command definitions for the `artistry` binary.

pub mod artist;
pub mod history;
pub mod prompt;
pub mod status;

use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use artistry_observe::tracing_setup::TracingOptions;

use artistry_types::generation::{FALLBACK_PROVIDER, OperationKind, ProviderAttemptError};
use artistry_types::request::{
    AspectRatio, BioLength, Complexity, ImageRequest, PromptOptions, TargetAudience,
};

/// Generate artist bios, images and prompts across AI providers.
#[derive(Parser)]
#[command(name = "artistry", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Write diagnostic logs to stderr as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Subscriber options for the global logging flags.
    pub fn tracing_options(&self) -> TracingOptions {
        TracingOptions {
            json: self.log_json,
            enable_otel: self.otel,
            ..TracingOptions::from_verbosity(self.verbose, self.quiet)
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an artist bio.
    Bio {
        #[command(flatten)]
        caller: CallerArgs,

        /// Artist name.
        #[arg(long)]
        name: String,

        #[arg(long)]
        genre: String,

        /// Personality trait (repeatable).
        #[arg(long = "trait", value_name = "TRAIT", required = true)]
        traits: Vec<String>,

        #[arg(long)]
        visual_style: String,

        #[arg(long)]
        speaking_style: String,

        #[arg(long)]
        background: Option<String>,

        /// short, medium or long.
        #[arg(long, default_value = "medium")]
        length: BioLength,
    },

    /// Generate an artist image.
    Image {
        #[command(flatten)]
        caller: CallerArgs,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Generate several image variations in one call.
    #[command(name = "image-variations")]
    ImageVariations {
        #[command(flatten)]
        caller: CallerArgs,

        #[command(flatten)]
        image: ImageArgs,

        /// Number of variations (1-10).
        #[arg(long, default_value = "3")]
        count: u32,
    },

    /// Rewrite a prompt for better generation results.
    Rewrite {
        #[command(flatten)]
        caller: CallerArgs,

        /// The prompt to rewrite.
        prompt: String,

        #[arg(long)]
        context: Option<String>,

        #[arg(long)]
        style: Option<String>,

        #[command(flatten)]
        options: PromptArgs,
    },

    /// Score a prompt and list strengths, weaknesses and recommendations.
    Analyze {
        #[command(flatten)]
        caller: CallerArgs,

        prompt: String,

        #[command(flatten)]
        options: PromptArgs,
    },

    /// Generate alternative phrasings of a prompt.
    #[command(name = "prompt-variations")]
    PromptVariations {
        #[command(flatten)]
        caller: CallerArgs,

        prompt: String,

        /// Number of variations (1-10).
        #[arg(long, default_value = "3")]
        count: u32,

        #[command(flatten)]
        options: PromptArgs,
    },

    /// Provider availability and health.
    Status,

    /// Local rate-limit quotas per provider.
    Quotas,

    /// Response cache statistics per operation.
    #[command(name = "cache-stats")]
    CacheStats,

    /// Query the persisted generation history.
    History {
        #[arg(long)]
        user: Option<String>,

        /// Operation kind (bio, image, image-variations, prompt-rewrite, ...).
        #[arg(long)]
        operation: Option<OperationKind>,

        #[arg(long)]
        provider: Option<String>,

        /// Only failed (degraded) generations.
        #[arg(long, conflicts_with = "succeeded")]
        failed: bool,

        /// Only successful generations.
        #[arg(long)]
        succeeded: bool,

        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Who is calling and which providers to try.
#[derive(Args, Clone)]
pub struct CallerArgs {
    /// User id recorded in the generation history.
    #[arg(long, default_value = "local", env = "ARTISTRY_USER")]
    pub user: String,

    /// Provider to try, in order (repeatable). Overrides configured routing.
    #[arg(long = "provider", value_name = "NAME")]
    pub providers: Vec<String>,
}

impl CallerArgs {
    pub fn provider_override(&self) -> Option<Vec<String>> {
        (!self.providers.is_empty()).then(|| self.providers.clone())
    }
}

#[derive(Args, Clone)]
pub struct ImageArgs {
    /// Artist name.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub visual_style: String,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub mood: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// square, portrait or landscape.
    #[arg(long, default_value = "square")]
    pub aspect_ratio: AspectRatio,
}

impl ImageArgs {
    pub fn to_request(&self, caller: &CallerArgs) -> ImageRequest {
        ImageRequest {
            name: self.name.clone(),
            visual_style: self.visual_style.clone(),
            genre: self.genre.clone(),
            mood: self.mood.clone(),
            description: self.description.clone(),
            providers: caller.provider_override(),
        }
    }
}

#[derive(Args, Clone)]
pub struct PromptArgs {
    /// simple, standard, detailed or professional.
    #[arg(long, default_value = "standard")]
    pub complexity: Complexity,

    /// general, industry, fans or academic.
    #[arg(long, default_value = "general")]
    pub audience: TargetAudience,
}

impl PromptArgs {
    pub fn to_options(&self, caller: &CallerArgs) -> PromptOptions {
        PromptOptions {
            complexity: self.complexity,
            target_audience: self.audience,
            providers: caller.provider_override(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

pub fn styled_provider(provider: &str) -> String {
    if provider == FALLBACK_PROVIDER {
        format!("{}", style(provider).yellow())
    } else {
        format!("{}", style(provider).cyan())
    }
}

/// List provider failures collected on the way to the result.
pub fn print_attempt_errors(errors: &[ProviderAttemptError]) {
    if errors.is_empty() {
        return;
    }
    println!("  {}", style("── Provider attempts ──").dim());
    for error in errors {
        println!(
            "  {} {} {}",
            style("✗").red(),
            style(&error.provider).bold(),
            style(&error.message).dim()
        );
    }
    println!();
}
