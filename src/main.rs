//! minute-ninja - Meeting minutes from transcripts
//!
//! Entry point for the minute-ninja CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use minute_ninja::cli::commands::CleanView;
use minute_ninja::cli::{Cli, Commands};
use minute_ninja::config::Settings;

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            minute_ninja::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            let level = if cli.verbose {
                "debug"
            } else {
                settings.general.log_level.as_str()
            };
            init_logging(level);

            match command {
                Commands::Summarize(args) => {
                    minute_ninja::cli::commands::summarize_transcript(&settings, args).await?;
                }
                Commands::Clean {
                    file,
                    chunks,
                    essentials,
                    chunk_size,
                } => {
                    let view = if essentials {
                        CleanView::Essentials
                    } else if chunks {
                        CleanView::Chunks(chunk_size)
                    } else {
                        CleanView::Text
                    };
                    minute_ninja::cli::commands::clean_transcript(&settings, &file, view)?;
                }
                Commands::Languages => {
                    minute_ninja::cli::commands::list_languages(&settings)?;
                }
                Commands::Config(config_cmd) => {
                    minute_ninja::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
