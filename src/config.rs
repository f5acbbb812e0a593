//! Configuration management
//!
//! Manages where expert state lives, the trust weight of each expert and the
//! tunables of the stress and curiosity experts.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coordinator::{
    Coordinator, CURIOSITY_WEIGHT, FLOW_WEIGHT, HABIT_WEIGHT, STRESS_WEIGHT,
};
use crate::experts::{curiosity, stress, CuriosityExpert, FlowExpert, HabitExpert, StressExpert};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding expert state files (defaults to the data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    /// Trust weight per expert
    #[serde(default)]
    pub weights: WeightsConfig,
    /// Curiosity expert settings
    #[serde(default)]
    pub curiosity: CuriosityConfig,
    /// Stress expert settings
    #[serde(default)]
    pub stress: StressConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_habit_weight")]
    pub habit: f64,
    #[serde(default = "default_stress_weight")]
    pub stress: f64,
    #[serde(default = "default_curiosity_weight")]
    pub curiosity: f64,
    #[serde(default = "default_flow_weight")]
    pub flow: f64,
}

fn default_habit_weight() -> f64 {
    HABIT_WEIGHT
}

fn default_stress_weight() -> f64 {
    STRESS_WEIGHT
}

fn default_curiosity_weight() -> f64 {
    CURIOSITY_WEIGHT
}

fn default_flow_weight() -> f64 {
    FLOW_WEIGHT
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            habit: default_habit_weight(),
            stress: default_stress_weight(),
            curiosity: default_curiosity_weight(),
            flow: default_flow_weight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuriosityConfig {
    /// Fixed sampling seed; unset means OS entropy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Bonus for curiosity/novelty tagged strategies
    #[serde(default = "default_bonus")]
    pub bonus: f64,
}

fn default_bonus() -> f64 {
    curiosity::DEFAULT_BONUS
}

impl Default for CuriosityConfig {
    fn default() -> Self {
        Self {
            seed: None,
            bonus: default_bonus(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressConfig {
    /// Stress scalar above which the expert treats stress as acute
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    stress::DEFAULT_THRESHOLD
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, writing defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().context("Config path has no parent")?;

        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolved state directory
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("state")),
        }
    }

    /// Reject weights and tunables the coordinator cannot rank with
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("habit", self.weights.habit),
            ("stress", self.weights.stress),
            ("curiosity", self.weights.curiosity),
            ("flow", self.weights.flow),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                anyhow::bail!(
                    "weights.{} must be a finite, non-negative number (got {})",
                    name,
                    weight
                );
            }
        }
        if !self.stress.threshold.is_finite() {
            anyhow::bail!("stress.threshold must be finite (got {})", self.stress.threshold);
        }
        if !self.curiosity.bonus.is_finite() {
            anyhow::bail!("curiosity.bonus must be finite (got {})", self.curiosity.bonus);
        }
        Ok(())
    }

    /// Build the standard roster with this configuration's weights and tunables
    pub fn coordinator(&self) -> Result<Coordinator> {
        self.validate()?;
        let state_dir = self.state_dir()?;
        let rng = match self.curiosity.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Coordinator::new()
            .with_expert(HabitExpert::new(Some(&state_dir)), self.weights.habit)
            .with_expert(
                StressExpert::with_threshold(self.stress.threshold),
                self.weights.stress,
            )
            .with_expert(
                CuriosityExpert::new(Some(&state_dir), rng).with_bonus(self.curiosity.bonus),
                self.weights.curiosity,
            )
            .with_expert(FlowExpert::new(), self.weights.flow))
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "intervention-council", "intervention-council")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "intervention-council", "intervention-council")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}
