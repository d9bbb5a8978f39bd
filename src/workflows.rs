use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::extract::{ExtractStats, extract_lesson};
use crate::format::{self, OutputFormat};
use crate::input;
use crate::lesson::Lesson;

pub struct RunContext<'a> {
    pub config: &'a Config,
}

pub struct ConvertRequest {
    pub lesson_id: u32,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

pub fn run_convert(request: ConvertRequest, ctx: &RunContext<'_>) -> Result<ExtractStats> {
    if request.lesson_id == 0 {
        anyhow::bail!("lesson id must be 1 or greater");
    }

    let path = request.input.unwrap_or_else(|| {
        input::lesson_file_path(
            &ctx.config.input_dir,
            &ctx.config.file_template,
            request.lesson_id,
        )
    });

    tracing::info!("Reading lesson {} from {}", request.lesson_id, path.display());
    let lines = input::read_lesson_lines(&path)?;

    let extraction = extract_lesson(
        request.lesson_id,
        &ctx.config.course,
        lines.iter().map(String::as_str),
        ctx.config.counting,
    )
    .with_context(|| format!("failed to extract vocabulary from {}", path.display()))?;

    let stats = extraction.stats;
    tracing::info!(
        "Lesson {}: {} records, {} comments, {} malformed",
        request.lesson_id,
        stats.records,
        stats.comments,
        stats.malformed
    );

    let rendered = format::render(&extraction.lesson, request.format)?;
    emit(&rendered, request.output.as_deref())?;

    Ok(stats)
}

pub fn run_inspect(path: &Path, as_json: bool) -> Result<Lesson> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read lesson literal at {}", path.display()))?;
    let lesson = format::parse_object_literal(&raw)
        .with_context(|| format!("failed to parse lesson literal at {}", path.display()))?;

    if as_json {
        emit(&format::to_json(&lesson)?, None)?;
    } else {
        print_summary(&lesson);
    }

    Ok(lesson)
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write output to {}", path.display()))?;
            tracing::info!("Wrote lesson to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").context("failed to write lesson to stdout")?;
        }
    }
    Ok(())
}

fn print_summary(lesson: &Lesson) {
    println!("[{}] {} ({})", lesson.lesson_id, lesson.name, lesson.course);
    println!("  Vocab size: {}", lesson.vocab_size());
    for record in &lesson.vocab {
        println!("  {:>3}. {} : {}", record.id, record.word, record.meaning);
    }
}
