//! Artist commands: bio, image, image-variations.

use anyhow::Result;
use console::style;

use artistry_types::request::{ArtistInfo, BioLength, BioOptions, ImageOptions};

use super::{CallerArgs, ImageArgs, print_attempt_errors, print_json, spinner, styled_provider};
use crate::state::AppState;

pub struct BioArgs {
    pub name: String,
    pub genre: String,
    pub traits: Vec<String>,
    pub visual_style: String,
    pub speaking_style: String,
    pub background: Option<String>,
    pub length: BioLength,
}

pub async fn bio(state: &AppState, caller: &CallerArgs, args: BioArgs, json: bool) -> Result<()> {
    let artist = ArtistInfo {
        name: args.name,
        genre: args.genre,
        personality_traits: args.traits,
        visual_style: args.visual_style,
        speaking_style: args.speaking_style,
        background: args.background,
    };
    let options = BioOptions {
        providers: caller.provider_override(),
        length: args.length,
    };

    let progress = spinner("Writing bio...")?;
    let output = state.service.generate_bio(&caller.user, &artist, &options).await;
    progress.finish_and_clear();
    let output = output?;

    if json {
        return print_json(&output);
    }

    println!();
    println!(
        "  {} Bio for {} via {}",
        style("✓").green().bold(),
        style(&artist.name).bold(),
        styled_provider(&output.provider)
    );
    println!();
    for line in output.bio.lines() {
        println!("  {line}");
    }
    println!();
    println!("  {}", style(format!("id {}", output.generation_id)).dim());
    println!();
    Ok(())
}

pub async fn image(state: &AppState, caller: &CallerArgs, args: &ImageArgs, json: bool) -> Result<()> {
    let request = args.to_request(caller);
    let options = ImageOptions {
        aspect_ratio: args.aspect_ratio,
    };

    let progress = spinner("Generating image...")?;
    let output = state.service.generate_image(&caller.user, &request, &options).await;
    progress.finish_and_clear();
    let output = output?;

    if json {
        return print_json(&output);
    }

    println!();
    println!(
        "  {} Image for {} via {}",
        style("✓").green().bold(),
        style(&request.name).bold(),
        styled_provider(&output.provider)
    );
    println!();
    println!("  {}", display_url(&output.image_url));
    println!();
    print_attempt_errors(&output.errors);
    Ok(())
}

pub async fn image_variations(
    state: &AppState,
    caller: &CallerArgs,
    args: &ImageArgs,
    count: u32,
    json: bool,
) -> Result<()> {
    let request = args.to_request(caller);
    let options = ImageOptions {
        aspect_ratio: args.aspect_ratio,
    };

    let progress = spinner(&format!("Generating {count} variations..."))?;
    let output = state
        .service
        .generate_image_variations(&caller.user, &request, count, &options)
        .await;
    progress.finish_and_clear();
    let output = output?;

    if json {
        return print_json(&output);
    }

    let mark = if output.success {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    println!();
    println!(
        "  {} {} variations for {}",
        mark,
        output.variations.len(),
        style(&request.name).bold()
    );
    println!();
    for (index, variation) in output.variations.iter().enumerate() {
        println!(
            "  {}. [{}] {}",
            index + 1,
            styled_provider(&variation.provider),
            display_url(&variation.image_url)
        );
    }
    println!();
    print_attempt_errors(&output.errors);
    Ok(())
}

/// Inline `data:` images are shortened for the terminal.
fn display_url(url: &str) -> String {
    if url.starts_with("data:") && url.len() > 64 {
        format!("{}... ({} bytes)", &url[..48], url.len())
    } else {
        url.to_string()
    }
}
