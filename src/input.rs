use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const LESSON_PLACEHOLDER: &str = "{lesson}";

/// Expand a file name template such as `minna{lesson}.txt` inside `dir`.
pub fn lesson_file_path(dir: &Path, template: &str, lesson_id: u32) -> PathBuf {
    dir.join(template.replace(LESSON_PLACEHOLDER, &lesson_id.to_string()))
}

pub fn read_lesson_lines(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read lesson file at {}", path.display()))?;

    Ok(raw.lines().map(str::to_string).collect())
}
