//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use gaze_core::{ContainsMode, MatchMode, MicrosaccadeConfig, Region, RegionQuery};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub messages: Vec<MessageQueryConfig>,
    #[serde(default)]
    pub regions: Vec<RegionQueryConfig>,
    pub microsaccade: Option<MicrosaccadeConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub files: Vec<PathBuf>,
    /// Only report these recordings of each file (default: all)
    pub recordings: Option<Vec<usize>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write one report per input file here instead of stdout
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageQueryConfig {
    pub pattern: String,
    #[serde(default)]
    pub regex: bool,
}

impl MessageQueryConfig {
    pub fn match_mode(&self) -> MatchMode {
        if self.regex {
            MatchMode::Regex
        } else {
            MatchMode::Literal
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegionQueryConfig {
    pub name: String,
    pub region: Region,
    pub period: Option<[f64; 2]>,
    #[serde(default)]
    pub mode: ContainsMode,
}

impl RegionQueryConfig {
    pub fn query(&self) -> RegionQuery {
        let query = RegionQuery::new(self.region).with_mode(self.mode);
        match self.period {
            Some([t0, t1]) => query.with_period(t0, t1),
            None => query,
        }
    }
}

/// Queries shared by the simple (flag) mode and the config mode
#[derive(Debug, Clone, Default)]
pub struct QuerySet {
    pub messages: Vec<MessageQueryConfig>,
    pub regions: Vec<RegionQueryConfig>,
    pub microsaccade: Option<MicrosaccadeConfig>,
}

impl From<&AppConfig> for QuerySet {
    fn from(config: &AppConfig) -> Self {
        Self {
            messages: config.messages.clone(),
            regions: config.regions.clone(),
            microsaccade: config.microsaccade.clone(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.input.files.is_empty() {
        bail!("Config lists no input files");
    }
    for region in &config.regions {
        if let Some([t0, t1]) = region.period {
            if t0 > t1 {
                bail!("Region '{}' has an inverted period [{}, {}]", region.name, t0, t1);
            }
        }
    }
    if let Some(ms) = &config.microsaccade {
        ms.validate().context("Invalid [microsaccade] section")?;
    }
    Ok(())
}
