use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::extract::CountingMode;
use crate::input::LESSON_PLACEHOLDER;
use crate::lesson::DEFAULT_COURSE;

const DEFAULT_FILE_TEMPLATE: &str = "minna{lesson}.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub course: String,
    pub counting: CountingMode,
    pub input_dir: PathBuf,
    pub file_template: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    course: Option<String>,
    counting: Option<CountingMode>,
    input_dir: Option<PathBuf>,
    file_template: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub course: Option<String>,
    pub counting: Option<CountingMode>,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> Result<Self> {
        Self::load_with_env(config_path, overrides, |key| env::var(key).ok())
    }

    /// Same as [`Config::load`], reading environment variables through `lookup`.
    pub fn load_with_env<F>(
        config_path: Option<PathBuf>,
        overrides: ConfigOverrides,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_config = load_file_config(config_path.as_ref())?;

        let course = overrides
            .course
            .or(file_config.course)
            .or_else(|| lookup("MINNA_COURSE"))
            .map(|course| course.trim().to_string())
            .filter(|course| !course.is_empty())
            .unwrap_or_else(|| DEFAULT_COURSE.to_string());

        let counting = match overrides.counting.or(file_config.counting) {
            Some(mode) => mode,
            None => match lookup("MINNA_COUNTING") {
                Some(raw) => raw
                    .parse()
                    .map_err(|err| anyhow::anyhow!("invalid MINNA_COUNTING value: {err}"))?,
                None => CountingMode::default(),
            },
        };

        let input_dir = file_config
            .input_dir
            .or_else(|| lookup("MINNA_INPUT_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let file_template = file_config
            .file_template
            .unwrap_or_else(|| DEFAULT_FILE_TEMPLATE.to_string());

        if !file_template.contains(LESSON_PLACEHOLDER) {
            anyhow::bail!(
                "file_template {:?} must contain the {} placeholder",
                file_template,
                LESSON_PLACEHOLDER
            );
        }

        tracing::debug!(
            "Loaded config: course={:?}, counting={:?}, input_dir={}",
            course,
            counting,
            input_dir.display()
        );

        Ok(Self {
            course,
            counting,
            input_dir,
            file_template,
        })
    }
}

fn load_file_config(path: Option<&PathBuf>) -> Result<FileConfig> {
    if let Some(path) = path {
        if path.exists() {
            return read_config_from_path(path);
        }
        anyhow::bail!("config path {:?} does not exist", path);
    }

    if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            return read_config_from_path(&default_path);
        }
    }

    Ok(FileConfig::default())
}

fn read_config_from_path(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "minna-vocab", "minna-vocab")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
