//! Shared types used across modules
//!
//! Strategy records, raw user context and the per-expert score map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transient mapping of strategy name to score, produced by one `score` call
pub type ScoreMap = HashMap<String, f64>;

/// Difficulty label of a strategy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    VeryLow,
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
    /// Unrecognized label, kept verbatim so catalogs round-trip
    Unknown(String),
}

impl Difficulty {
    /// Parse a label case-insensitively
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "very low" => Difficulty::VeryLow,
            "low" => Difficulty::Low,
            "medium" => Difficulty::Medium,
            "high" => Difficulty::High,
            "very high" => Difficulty::VeryHigh,
            _ => Difficulty::Unknown(label.to_string()),
        }
    }

    /// Scalar effort level in (0, 1]; unknown labels sit at the midpoint
    pub fn scalar(&self) -> f64 {
        match self {
            Difficulty::VeryLow => 0.1,
            Difficulty::Low => 0.3,
            Difficulty::Medium => 0.5,
            Difficulty::High => 0.8,
            Difficulty::VeryHigh => 1.0,
            Difficulty::Unknown(_) => 0.5,
        }
    }
}

impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        Difficulty::parse(&label)
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        d.to_string()
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::VeryLow => write!(f, "Very Low"),
            Difficulty::Low => write!(f, "Low"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::High => write!(f, "High"),
            Difficulty::VeryHigh => write!(f, "Very High"),
            Difficulty::Unknown(label) => write!(f, "{}", label),
        }
    }
}

/// Where a strategy came from in the research catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategySource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One intervention strategy from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Unique within a catalog; join key for persisted expert state
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Free-text description of how the strategy works
    #[serde(default)]
    pub logic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<StrategySource>,
}

impl Strategy {
    pub fn new(name: impl Into<String>, tags: &[&str], difficulty: Difficulty) -> Self {
        Self {
            name: name.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            difficulty,
            logic: String::new(),
            source: None,
        }
    }

    /// Case-insensitive check whether any tag is in `wanted`
    pub fn has_any_tag(&self, wanted: &[&str]) -> bool {
        self.tags
            .iter()
            .any(|t| wanted.iter().any(|w| t.eq_ignore_ascii_case(w)))
    }
}

/// Raw labeled context as reported by the user
///
/// Labels are expected to be `low`, `medium` or `high`; anything else,
/// including a missing field, is read as `medium`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContext {
    #[serde(default)]
    pub energy: Option<String>,
    #[serde(default)]
    pub stress: Option<String>,
}

impl RawContext {
    pub fn new(energy: impl Into<String>, stress: impl Into<String>) -> Self {
        Self {
            energy: Some(energy.into()),
            stress: Some(stress.into()),
        }
    }
}
