//! Stress expert
//!
//! Rule-based safety net. Under acute stress it pushes regulation strategies
//! and penalizes everything effortful; otherwise it scores flat and lets the
//! other experts decide.

use super::{Expert, ExpertKind};
use crate::context::ContextVector;
use crate::types::{ScoreMap, Strategy};

/// Tags that mark a strategy as emotionally regulating
pub const REGULATION_TAGS: &[&str] = &["retention", "emotion", "reflection", "self-compassion"];

pub const DEFAULT_THRESHOLD: f64 = 0.7;

const REGULATING_SCORE: f64 = 0.9;
const PENALTY_SCORE: f64 = 0.1;
const NEUTRAL_SCORE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct StressExpert {
    threshold: f64,
}

impl StressExpert {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD)
    }

    /// Stress above `threshold` counts as acute
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for StressExpert {
    fn default() -> Self {
        Self::new()
    }
}

impl Expert for StressExpert {
    fn kind(&self) -> ExpertKind {
        ExpertKind::Stress
    }

    fn score(&self, context: &ContextVector, catalog: &[Strategy]) -> ScoreMap {
        let acute = context.stress() > self.threshold;
        catalog
            .iter()
            .map(|s| {
                let score = match (acute, s.has_any_tag(REGULATION_TAGS)) {
                    (false, _) => NEUTRAL_SCORE,
                    (true, true) => REGULATING_SCORE,
                    (true, false) => PENALTY_SCORE,
                };
                (s.name.clone(), score)
            })
            .collect()
    }
}
