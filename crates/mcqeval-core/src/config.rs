//! Threshold configuration and config file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::levels::Cuts;

/// Difficulty cut points in percent: `(0, low]` is hard, `(low, high]` is
/// medium and `(high, 100]` is easy. Exactly 0 gets no level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyThresholds {
    #[serde(default = "default_difficulty_low")]
    pub low: u32,
    #[serde(default = "default_difficulty_high")]
    pub high: u32,
}

/// Discrimination cut points: `(-1, fair]` is poor, `(fair, good]` is fair
/// and `(good, 1]` is good. Exactly -1 gets no level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscriminationThresholds {
    #[serde(default = "default_discrimination_fair")]
    pub fair: f64,
    #[serde(default = "default_discrimination_good")]
    pub good: f64,
}

fn default_difficulty_low() -> u32 {
    20
}
fn default_difficulty_high() -> u32 {
    70
}
fn default_discrimination_fair() -> f64 {
    0.2
}
fn default_discrimination_good() -> f64 {
    0.4
}

impl Default for DifficultyThresholds {
    fn default() -> Self {
        Self {
            low: default_difficulty_low(),
            high: default_difficulty_high(),
        }
    }
}

impl Default for DiscriminationThresholds {
    fn default() -> Self {
        Self {
            fair: default_discrimination_fair(),
            good: default_discrimination_good(),
        }
    }
}

impl DifficultyThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (5..=95).contains(&self.low) && (5..=95).contains(&self.high) && self.low < self.high {
            Ok(())
        } else {
            Err(ConfigError::InvalidDifficulty {
                low: self.low,
                high: self.high,
            })
        }
    }

    pub fn cuts(&self) -> Cuts {
        Cuts::new(0.0, self.low as f64, self.high as f64)
    }
}

impl DiscriminationThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (0.1..=0.9).contains(&self.fair) && (0.1..=0.9).contains(&self.good) && self.fair < self.good
        {
            Ok(())
        } else {
            Err(ConfigError::InvalidDiscrimination {
                fair: self.fair,
                good: self.good,
            })
        }
    }

    pub fn cuts(&self) -> Cuts {
        Cuts::new(-1.0, self.fair, self.good)
    }
}

/// Settings for one analysis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub difficulty: DifficultyThresholds,
    #[serde(default)]
    pub discrimination: DiscriminationThresholds,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.difficulty.validate()?;
        self.discrimination.validate()
    }
}

/// Parse `"low,high"` difficulty thresholds.
pub fn parse_difficulty(s: &str) -> Result<DifficultyThresholds> {
    let (low, high) = split_pair(s)?;
    Ok(DifficultyThresholds {
        low: low
            .parse()
            .with_context(|| format!("invalid difficulty threshold: '{low}'"))?,
        high: high
            .parse()
            .with_context(|| format!("invalid difficulty threshold: '{high}'"))?,
    })
}

/// Parse `"fair,good"` discrimination thresholds.
pub fn parse_discrimination(s: &str) -> Result<DiscriminationThresholds> {
    let (fair, good) = split_pair(s)?;
    Ok(DiscriminationThresholds {
        fair: fair
            .parse()
            .with_context(|| format!("invalid discrimination threshold: '{fair}'"))?,
        good: good
            .parse()
            .with_context(|| format!("invalid discrimination threshold: '{good}'"))?,
    })
}

fn split_pair(s: &str) -> Result<(&str, &str)> {
    s.split_once(',')
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| anyhow::anyhow!("expected two comma-separated values, got '{s}'"))
}

/// Load config from an explicit path, or search the default locations:
/// 1. `mcqeval.toml` in the current directory
/// 2. `~/.config/mcqeval/config.toml`
///
/// Environment variable overrides: `MCQEVAL_DIFFICULTY`, `MCQEVAL_DISCRIMINATION`.
pub fn load_config_from(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mcqeval.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<AnalysisConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    if let Ok(value) = std::env::var("MCQEVAL_DIFFICULTY") {
        config.difficulty = parse_difficulty(&value).context("MCQEVAL_DIFFICULTY")?;
    }
    if let Ok(value) = std::env::var("MCQEVAL_DISCRIMINATION") {
        config.discrimination = parse_discrimination(&value).context("MCQEVAL_DISCRIMINATION")?;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mcqeval"))
}
