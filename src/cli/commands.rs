//! CLI command implementations

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::args::{ConfigCommand, SummarizeArgs};
use crate::config::Settings;
use crate::llm::{build_provider, PromptCatalog};
use crate::summary::{ModelParams, Phase, Summarizer, SummaryRequest};
use crate::transcript::{chunk_words, estimate_tokens, extract_essentials, prepare, Essentials};

/// Generate minutes for a transcript file and write them next to it.
pub async fn summarize_transcript(settings: &Settings, args: SummarizeArgs) -> Result<()> {
    let started = Instant::now();
    let settings = with_cli_overrides(settings, &args);

    validate_summarize(&settings, &args.file)?;

    tracing::info!(
        "Settings: provider={}, model={}, language={}, api={}",
        settings.llm.provider,
        settings.llm.model,
        settings.summary.language,
        settings.llm.api_base
    );

    let transcript = read_transcript(&args.file)?;
    let prompts = load_prompts(&settings)?;
    let provider = build_provider(&settings)?;

    let params = ModelParams {
        model: settings.llm.model.clone(),
        temperature: settings.llm.temperature as f32,
        top_p: settings.llm.top_p as f32,
        max_tokens: settings.llm.max_tokens,
    };

    let date = if args.today {
        Some(Local::now().format("%Y-%m-%d").to_string())
    } else {
        args.date.clone()
    };

    let summarizer = Summarizer::new(provider.as_ref(), &prompts)
        .with_concurrency(settings.summary.concurrency)
        .with_progress(Box::new(|phase: Phase| match phase {
            Phase::Idle | Phase::Done | Phase::Failed => {}
            phase => tracing::info!("{}", phase),
        }));

    let minutes = summarizer
        .summarize(SummaryRequest {
            transcript: &transcript,
            language: &settings.summary.language,
            chunk_size: settings.summary.chunk_size,
            params: &params,
            title: args.title.as_deref(),
            date: date.as_deref(),
        })
        .await?;

    let output = match args.output {
        Some(path) => path,
        None => default_output_path(
            &args.file,
            &settings.summary.language,
            settings.output.dir.as_deref(),
        ),
    };
    write_minutes(&output, &minutes)?;

    println!("Minutes saved to: {}", output.display());
    tracing::info!(
        "Minutes generated in {:.2}s",
        started.elapsed().as_secs_f64()
    );

    Ok(())
}

/// What `clean` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanView {
    /// The normalised transcript
    Text,
    /// One row per chunk, with an optional chunk size override
    Chunks(Option<usize>),
    /// Cue-phrase decisions, actions and conclusions
    Essentials,
}

/// Print the cleaned transcript, its chunk layout or its essentials.
pub fn clean_transcript(settings: &Settings, file: &Path, view: CleanView) -> Result<()> {
    let transcript = read_transcript(file)?;
    let text = prepare(&transcript);

    let chunk_size = match view {
        CleanView::Text => {
            println!("{}", text);
            return Ok(());
        }
        CleanView::Essentials => {
            print!("{}", format_essentials(&extract_essentials(&text)));
            return Ok(());
        }
        CleanView::Chunks(size) => size,
    };

    let size = chunk_size.unwrap_or(settings.summary.chunk_size);
    if size == 0 {
        anyhow::bail!("Chunk size must be at least 1");
    }

    let chunks = chunk_words(&text, size);
    if chunks.is_empty() {
        println!("No text left after cleaning");
        return Ok(());
    }

    println!("{:<6} {:>8} {:>8}", "Chunk", "Words", "~Tokens");
    println!("{}", "-".repeat(24));
    for (i, chunk) in chunks.iter().enumerate() {
        println!(
            "{:<6} {:>8} {:>8}",
            i + 1,
            chunk.split_whitespace().count(),
            estimate_tokens(chunk)
        );
    }

    Ok(())
}

/// List languages with dedicated prompts
pub fn list_languages(settings: &Settings) -> Result<()> {
    let prompts = load_prompts(settings)?;
    for language in prompts.languages() {
        println!("{}", language);
    }
    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

// Helper functions

fn with_cli_overrides(settings: &Settings, args: &SummarizeArgs) -> Settings {
    let mut settings = settings.clone();

    if let Some(model) = &args.model {
        settings.llm.model = model.clone();
    }
    if let Some(api_base) = &args.api_base {
        settings.llm.api_base = api_base.clone();
    }
    if let Some(api_key) = &args.api_key {
        settings.llm.api_key = api_key.clone();
    }
    if let Some(temperature) = args.temperature {
        settings.llm.temperature = temperature;
    }
    if let Some(top_p) = args.top_p {
        settings.llm.top_p = top_p;
    }
    if args.max_tokens.is_some() {
        settings.llm.max_tokens = args.max_tokens;
    }
    if let Some(language) = &args.language {
        settings.summary.language = language.clone();
    }
    if let Some(chunk_size) = args.chunk_size {
        settings.summary.chunk_size = chunk_size;
    }
    if let Some(concurrency) = args.concurrency {
        settings.summary.concurrency = concurrency;
    }

    settings
}

fn validate_summarize(settings: &Settings, file: &Path) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("File not found: {}", file.display());
    }
    if settings.llm.model.trim().is_empty() {
        anyhow::bail!(
            "Model not specified. Provide a model via --model or set the LLM_CHAT environment variable."
        );
    }
    if settings.summary.chunk_size == 0 {
        anyhow::bail!("Chunk size must be at least 1");
    }
    if !(0.0..=2.0).contains(&settings.llm.temperature) {
        anyhow::bail!(
            "Temperature must be between 0 and 2, got {}",
            settings.llm.temperature
        );
    }
    if !(settings.llm.top_p > 0.0 && settings.llm.top_p <= 1.0) {
        anyhow::bail!(
            "top-p must be in (0, 1], got {}",
            settings.llm.top_p
        );
    }
    if settings.summary.concurrency == 0 {
        anyhow::bail!("Concurrency must be at least 1");
    }
    Ok(())
}

fn read_transcript(path: &Path) -> Result<String> {
    tracing::info!("Reading transcript file: {}", path.display());
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript: {}", path.display()))
}

fn load_prompts(settings: &Settings) -> Result<PromptCatalog> {
    match &settings.summary.prompts_file {
        Some(path) => PromptCatalog::with_overrides_file(path),
        None => Ok(PromptCatalog::builtin()),
    }
}

fn write_minutes(path: &Path, minutes: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, minutes)
        .with_context(|| format!("Failed to write minutes: {}", path.display()))
}

fn format_essentials(found: &Essentials) -> String {
    if found.is_empty() {
        return "No decisions, actions or conclusions found\n".to_string();
    }

    let mut out = String::new();
    for (heading, items) in [
        ("Decisions", &found.decisions),
        ("Actions", &found.actions),
        ("Conclusions", &found.conclusions),
    ] {
        if items.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(heading);
        out.push_str(":\n");
        for item in items {
            out.push_str("- ");
            out.push_str(item);
            out.push('\n');
        }
    }
    out
}

/// `<dir>/<stem>_summary_<language>.txt`, where `dir` defaults to the
/// transcript's directory.
fn default_output_path(input: &Path, language: &str, dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = sanitize_component(&stem, "transcript");
    let language = sanitize_component(&language.trim().to_lowercase(), "english");

    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    dir.join(format!("{}_summary_{}.txt", stem, language))
}

/// Keep `[A-Za-z0-9_-]`; every run of other characters becomes one `_`.
fn sanitize_component(raw: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut replaced = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            replaced = false;
        } else if !replaced {
            out.push('_');
            replaced = true;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
