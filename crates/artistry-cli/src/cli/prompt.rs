//! Prompt commands: rewrite, analyze, prompt-variations.

use anyhow::Result;
use console::style;

use artistry_types::request::{PromptOptions, PromptRequest};

use super::{CallerArgs, print_attempt_errors, print_json, spinner, styled_provider};
use crate::state::AppState;

pub async fn rewrite(
    state: &AppState,
    caller: &CallerArgs,
    request: PromptRequest,
    options: &PromptOptions,
    json: bool,
) -> Result<()> {
    let progress = spinner("Rewriting prompt...")?;
    let output = state.service.rewrite_prompt(&caller.user, &request, options).await;
    progress.finish_and_clear();
    let output = output?;

    if json {
        return print_json(&output);
    }

    println!();
    println!(
        "  {} Rewritten via {}",
        style("✓").green().bold(),
        styled_provider(&output.provider)
    );
    println!();
    println!("  {}", style(&output.rewritten_prompt).bold());
    println!();
    if !output.analysis.is_empty() {
        println!("  {}", style(&output.analysis).dim());
        println!();
    }
    if !output.improvements.is_empty() {
        println!("  {}", style("── Improvements ──").dim());
        for improvement in &output.improvements {
            println!("  • {improvement}");
        }
        println!();
    }
    Ok(())
}

pub async fn analyze(
    state: &AppState,
    caller: &CallerArgs,
    prompt: &str,
    options: &PromptOptions,
    json: bool,
) -> Result<()> {
    let progress = spinner("Analyzing prompt...")?;
    let output = state.service.analyze_prompt(&caller.user, prompt, options).await;
    progress.finish_and_clear();
    let output = output?;

    if json {
        return print_json(&output);
    }

    let score = match output.quality_score {
        75.. => style(output.quality_score).green().bold(),
        50..=74 => style(output.quality_score).yellow().bold(),
        _ => style(output.quality_score).red().bold(),
    };
    println!();
    println!(
        "  Quality score: {}/100 via {}",
        score,
        styled_provider(&output.provider)
    );
    println!();
    print_section("Strengths", &output.strengths);
    print_section("Weaknesses", &output.weaknesses);
    print_section("Recommendations", &output.recommendations);
    Ok(())
}

pub async fn variations(
    state: &AppState,
    caller: &CallerArgs,
    prompt: &str,
    options: &PromptOptions,
    count: u32,
    json: bool,
) -> Result<()> {
    let progress = spinner(&format!("Generating {count} prompt variations..."))?;
    let output = state
        .service
        .generate_prompt_variations(&caller.user, prompt, options, count)
        .await;
    progress.finish_and_clear();
    let output = output?;

    if json {
        return print_json(&output);
    }

    println!();
    for (index, variation) in output.variations.iter().enumerate() {
        println!(
            "  {}. [{}] {}",
            index + 1,
            styled_provider(&variation.provider),
            variation.prompt
        );
    }
    println!();
    print_attempt_errors(&output.errors);
    Ok(())
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}", style(format!("── {title} ──")).dim());
    for item in items {
        println!("  • {item}");
    }
    println!();
}
