mod config;
mod extract;
mod format;
mod input;
mod lesson;
mod workflows;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigOverrides};
use crate::extract::CountingMode;
use crate::format::OutputFormat;
use crate::workflows::{ConvertRequest, RunContext, run_convert, run_inspect};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Convert scraped Minna no Nihongo vocabulary lists into lesson data"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a lesson vocabulary file into an object literal or JSON document
    Convert(ConvertArgs),
    /// Read back a previously generated object literal and summarize it
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Lesson number; selects the input file through the file template
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    lesson: u32,

    /// Read this file instead of the templated lesson file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output representation
    #[arg(long, value_enum, default_value_t = OutputFormat::Literal)]
    format: OutputFormat,

    /// Optional path to a configuration TOML file overriding defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to count lines that lack a [word] or /meaning/ pair
    #[arg(long)]
    counting: Option<CountingMode>,

    /// Override the course name written into the lesson
    #[arg(long)]
    course: Option<String>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Path to a generated lesson literal
    path: PathBuf,

    /// Re-emit the lesson as JSON instead of printing a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG may come from .env, so load it before the subscriber reads it.
    let dotenv_result = dotenvy::dotenv();

    init_tracing(cli.verbose)?;

    if let Err(err) = dotenv_result {
        if !err.not_found() {
            tracing::warn!("Failed to load .env file: {}", err);
        }
    }

    match cli.command {
        Command::Convert(args) => {
            let overrides = ConfigOverrides {
                course: args.course,
                counting: args.counting,
            };
            let config = Config::load(args.config, overrides)?;
            let run_ctx = RunContext { config: &config };

            run_convert(
                ConvertRequest {
                    lesson_id: args.lesson,
                    input: args.input,
                    output: args.output,
                    format: args.format,
                },
                &run_ctx,
            )?;
        }
        Command::Inspect(args) => {
            run_inspect(&args.path, args.json)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| anyhow::anyhow!("Failed to set tracing subscriber: {err}"))
}

/// INFO (or DEBUG with `--verbose`) unless `RUST_LOG` directives say otherwise.
fn env_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives.unwrap_or_default())
}
