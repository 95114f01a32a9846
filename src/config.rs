//! Ingestion configuration.
//!
//! A YAML file lists the store root, the target tables one input batch fans
//! out to, and the optional play-text annotation step:
//!
//! ```yaml
//! store: ./data
//! targets:
//!   - table: player_game_stats
//!     mode: flat
//!     unique_key: [playerId, gameId]
//!   - table: player_game_stats_raw
//! play_text:
//!   text_field: playText
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::flatten::RecordShape;

pub const DEFAULT_STORE_DIR: &str = "./data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordMode {
    /// Keep top-level fields; nested values become JSON text
    #[default]
    Raw,
    /// Lift nested objects into `parent.child` columns
    Flat,
}

fn default_separator() -> String {
    ".".to_string()
}

fn default_max_depth() -> usize {
    2
}

fn default_store() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_DIR)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub table: String,
    #[serde(default)]
    pub mode: RecordMode,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Fields joined with `-` into a derived `unique_key` column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_key: Vec<String>,
}

impl TargetConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            mode: RecordMode::default(),
            separator: default_separator(),
            max_depth: default_max_depth(),
            unique_key: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: RecordMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn shape(&self) -> RecordShape {
        match self.mode {
            RecordMode::Raw => RecordShape::Raw,
            RecordMode::Flat => RecordShape::Flat {
                separator: self.separator.clone(),
                max_depth: self.max_depth,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayTextConfig {
    #[serde(default = "PlayTextConfig::default_text_field")]
    pub text_field: String,
    #[serde(default = "PlayTextConfig::default_shooting_field")]
    pub shooting_field: String,
    #[serde(default = "PlayTextConfig::default_type_column")]
    pub type_column: String,
    #[serde(default = "PlayTextConfig::default_player_column")]
    pub player_column: String,
}

impl PlayTextConfig {
    fn default_text_field() -> String {
        "playText".to_string()
    }

    fn default_shooting_field() -> String {
        "shootingPlay".to_string()
    }

    fn default_type_column() -> String {
        "play_type".to_string()
    }

    fn default_player_column() -> String {
        "player".to_string()
    }
}

impl Default for PlayTextConfig {
    fn default() -> Self {
        Self {
            text_field: Self::default_text_field(),
            shooting_field: Self::default_shooting_field(),
            type_column: Self::default_type_column(),
            player_column: Self::default_player_column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_store")]
    pub store: PathBuf,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_text: Option<PlayTextConfig>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            targets: Vec::new(),
            play_text: None,
        }
    }
}

impl IngestConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Reading configuration from {path:?}"))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Parsing configuration {path:?}"))?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: IngestConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            bail!("Configuration must list at least one target table");
        }
        for target in &self.targets {
            if target.table.trim().is_empty() {
                bail!("Target table names must not be empty");
            }
            if target.mode == RecordMode::Flat && target.separator.is_empty() {
                bail!("Target '{}' uses flat mode with an empty separator", target.table);
            }
        }
        Ok(())
    }
}
