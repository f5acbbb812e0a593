//! Scoring experts
//!
//! Every expert scores the whole catalog for a context vector. Experts that
//! learn from outcomes also expose a [`Learner`], which the coordinator uses
//! to route feedback. Experts without one are rule-based and never mutate.

pub mod store;
pub mod habit;
pub mod stress;
pub mod flow;
pub mod curiosity;

pub use store::StateFile;
pub use habit::HabitExpert;
pub use stress::StressExpert;
pub use flow::FlowExpert;
pub use curiosity::{BetaParams, CuriosityExpert};

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::context::ContextVector;
use crate::error::Result;
use crate::types::{ScoreMap, Strategy};

/// Identity of an expert in the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertKind {
    Habit,
    Stress,
    Flow,
    Curiosity,
}

impl ExpertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertKind::Habit => "habit",
            ExpertKind::Stress => "stress",
            ExpertKind::Flow => "flow",
            ExpertKind::Curiosity => "curiosity",
        }
    }

    /// State file for this expert inside `dir`
    pub fn state_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", self.as_str()))
    }
}

impl std::fmt::Display for ExpertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoring capability shared by all experts
pub trait Expert: Send + Sync {
    fn kind(&self) -> ExpertKind;

    /// Score every strategy in `catalog`. The returned map has exactly one
    /// entry per catalog name. Must not mutate learned state.
    fn score(&self, context: &ContextVector, catalog: &[Strategy]) -> ScoreMap;

    /// Learning capability, if this expert has one
    fn learner(&self) -> Option<&dyn Learner> {
        None
    }
}

/// Outcome-driven learning capability
pub trait Learner: Send + Sync {
    /// Update and persist state for `strategy` after an observed outcome.
    /// The in-memory update happens even if persisting fails.
    fn learn(&self, strategy: &str, success: bool) -> Result<()>;
}

/// Open an expert's state file under `dir`, or keep it in memory when no
/// directory is configured
pub(crate) fn open_state<T>(kind: ExpertKind, dir: Option<&Path>) -> StateFile<T>
where
    T: Default + Serialize + serde::de::DeserializeOwned,
{
    match dir {
        Some(dir) => StateFile::open(kind.as_str(), kind.state_path(dir)),
        None => StateFile::in_memory(kind.as_str()),
    }
}
