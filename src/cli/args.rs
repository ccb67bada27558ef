//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// minute-ninja - Generate meeting minutes from transcripts with an LLM
#[derive(Parser, Debug)]
#[command(name = "minute-ninja")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate meeting minutes from a transcript file
    Summarize(SummarizeArgs),

    /// Print the cleaned transcript without calling a model
    Clean {
        /// Transcript file (WebVTT, SRT or plain text)
        file: PathBuf,

        /// Print one line per chunk with its word count instead
        #[arg(long, conflicts_with = "essentials")]
        chunks: bool,

        /// Print decisions, actions and conclusions found by cue phrases
        #[arg(long)]
        essentials: bool,

        /// Words per chunk (used with --chunks)
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// List languages with dedicated prompts
    Languages,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct SummarizeArgs {
    /// Transcript file (WebVTT, SRT or plain text)
    pub file: PathBuf,

    /// Model to use (default: llm.model or LLM_CHAT)
    #[arg(short, long)]
    pub model: Option<String>,

    /// API base URL (default: llm.api_base or OPENAI_API_BASE)
    #[arg(long)]
    pub api_base: Option<String>,

    /// API key (default: llm.api_key or OPENAI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Language of the minutes (english, portuguese, spanish, french, german, ...)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Words per transcript chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Nucleus sampling for the consolidation call
    #[arg(long)]
    pub top_p: Option<f64>,

    /// Output token cap for the consolidation call
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Meeting title (inferred by the model when omitted)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Meeting date (inferred by the model when omitted)
    #[arg(short, long, conflicts_with = "today")]
    pub date: Option<String>,

    /// Use today's date as the meeting date
    #[arg(long)]
    pub today: bool,

    /// Output file (default: <transcript>_summary_<language>.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Chunk summaries requested at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
