//! Artistry CLI entry point.
//!
//! Binary name: `artistry`
//!
//! Parses CLI arguments, initializes tracing, storage and the generation
//! service, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::{Shell, generate};

use artistry_observe::tracing_setup::{init_tracing, shutdown_tracing};
use cli::artist::BioArgs;
use cli::history::HistoryFilter;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.tracing_options())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        print_completions(*shell);
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = dispatch(&state, cli.command, cli.json).await;

    // Audit entries are written in the background; drain them before exit.
    state.service.flush_logs().await;
    shutdown_tracing();
    result
}

async fn dispatch(state: &AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Bio {
            caller,
            name,
            genre,
            traits,
            visual_style,
            speaking_style,
            background,
            length,
        } => {
            let args = BioArgs {
                name,
                genre,
                traits,
                visual_style,
                speaking_style,
                background,
                length,
            };
            cli::artist::bio(state, &caller, args, json).await
        }

        Commands::Image { caller, image } => cli::artist::image(state, &caller, &image, json).await,

        Commands::ImageVariations {
            caller,
            image,
            count,
        } => cli::artist::image_variations(state, &caller, &image, count, json).await,

        Commands::Rewrite {
            caller,
            prompt,
            context,
            style,
            options,
        } => {
            let request = artistry_types::request::PromptRequest {
                original_prompt: prompt,
                context,
                style,
            };
            cli::prompt::rewrite(state, &caller, request, &options.to_options(&caller), json).await
        }

        Commands::Analyze {
            caller,
            prompt,
            options,
        } => cli::prompt::analyze(state, &caller, &prompt, &options.to_options(&caller), json).await,

        Commands::PromptVariations {
            caller,
            prompt,
            count,
            options,
        } => {
            cli::prompt::variations(
                state,
                &caller,
                &prompt,
                &options.to_options(&caller),
                count,
                json,
            )
            .await
        }

        Commands::Status => cli::status::status(state, json).await,

        Commands::Quotas => cli::status::quotas(state, json),

        Commands::CacheStats => cli::status::cache_stats(state, json),

        Commands::History {
            user,
            operation,
            provider,
            failed,
            succeeded,
            limit,
        } => {
            let filter = HistoryFilter {
                user,
                operation,
                provider,
                failed,
                succeeded,
                limit,
            };
            cli::history::history(state, filter, json).await
        }

        Commands::Completions { shell } => {
            print_completions(shell);
            Ok(())
        }
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = <Cli as clap::CommandFactory>::command();
    generate(shell, &mut cmd, "artistry", &mut std::io::stdout());
}
