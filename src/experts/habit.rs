//! Habit expert
//!
//! Favors strategies the user keeps completing, to build automaticity through
//! repetition. A miss decrements the streak instead of clearing it: one lapse
//! does not undo an established habit.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::{open_state, Expert, ExpertKind, Learner, StateFile};
use crate::context::ContextVector;
use crate::error::{CouncilError, Result};
use crate::types::{ScoreMap, Strategy};

const BASE_SCORE: f64 = 0.1;
const STREAK_STEP: f64 = 0.1;
const MAX_STREAK_BONUS: f64 = 0.8;

type Streaks = HashMap<String, u32>;

/// Streak-tracking expert
#[derive(Debug)]
pub struct HabitExpert {
    state: Mutex<StateFile<Streaks>>,
}

impl HabitExpert {
    /// Load streaks from `state_dir`, or keep them in memory when `None`
    pub fn new(state_dir: Option<&Path>) -> Self {
        Self {
            state: Mutex::new(open_state(ExpertKind::Habit, state_dir)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Current streak for a strategy, 0 when never seen
    pub fn streak(&self, strategy: &str) -> u32 {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.get().get(strategy).copied().unwrap_or(0)
    }

    /// All recorded streaks, sorted by strategy name
    pub fn streaks(&self) -> BTreeMap<String, u32> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.get().iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    fn score_for(streak: u32) -> f64 {
        BASE_SCORE + (streak as f64 * STREAK_STEP).min(MAX_STREAK_BONUS)
    }
}

impl Expert for HabitExpert {
    fn kind(&self) -> ExpertKind {
        ExpertKind::Habit
    }

    fn score(&self, _context: &ContextVector, catalog: &[Strategy]) -> ScoreMap {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        catalog
            .iter()
            .map(|s| {
                let streak = state.get().get(&s.name).copied().unwrap_or(0);
                (s.name.clone(), Self::score_for(streak))
            })
            .collect()
    }

    fn learner(&self) -> Option<&dyn Learner> {
        Some(self)
    }
}

impl Learner for HabitExpert {
    fn learn(&self, strategy: &str, success: bool) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CouncilError::StateLock(ExpertKind::Habit.to_string()))?;

        let streak = state.get_mut().entry(strategy.to_string()).or_insert(0);
        *streak = if success {
            streak.saturating_add(1)
        } else {
            streak.saturating_sub(1)
        };
        debug!("[habit] '{}' streak now {}", strategy, streak);

        state.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextVector, TimeBin};
    use crate::types::Difficulty;

    fn ctx() -> ContextVector {
        ContextVector::new(TimeBin::Morning, 0.5, 0.5)
    }

    fn catalog() -> Vec<Strategy> {
        vec![
            Strategy::new("Visual Timer", &["scaffolding"], Difficulty::Low),
            Strategy::new("Deep Work Session", &["productivity"], Difficulty::High),
        ]
    }

    #[test]
    fn test_unseen_strategies_score_baseline() {
        let expert = HabitExpert::in_memory();
        let scores = expert.score(&ctx(), &catalog());
        assert_eq!(scores.len(), 2);
        assert!((scores["Visual Timer"] - 0.1).abs() < 1e-9);
        assert!((scores["Deep Work Session"] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_first_success_starts_streak_at_one() {
        let expert = HabitExpert::in_memory();
        expert.learn("X", true).unwrap();
        assert_eq!(expert.streak("X"), 1);
        expert.learn("X", true).unwrap();
        assert_eq!(expert.streak("X"), 2);
    }

    #[test]
    fn test_failure_decrements_without_reset() {
        let expert = HabitExpert::in_memory();
        for _ in 0..4 {
            expert.learn("X", true).unwrap();
        }
        expert.learn("X", false).unwrap();
        assert_eq!(expert.streak("X"), 3);
    }

    #[test]
    fn test_streak_never_negative() {
        let expert = HabitExpert::in_memory();
        let outcomes = [false, false, true, false, false, false, true, true, false];
        for success in outcomes {
            expert.learn("X", success).unwrap();
        }
        assert_eq!(expert.streak("X"), 1);
        expert.learn("Y", false).unwrap();
        assert_eq!(expert.streak("Y"), 0);
    }

    #[test]
    fn test_score_bonus_is_capped() {
        let expert = HabitExpert::in_memory();
        for _ in 0..20 {
            expert.learn("Visual Timer", true).unwrap();
        }
        let scores = expert.score(&ctx(), &catalog());
        assert!((scores["Visual Timer"] - 0.9).abs() < 1e-9);
        assert!((scores["Deep Work Session"] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_score_does_not_create_state() {
        let expert = HabitExpert::in_memory();
        expert.score(&ctx(), &catalog());
        assert!(expert.streaks().is_empty());
    }

    #[test]
    fn test_streaks_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let expert = HabitExpert::new(Some(dir.path()));
            expert.learn("Visual Timer", true).unwrap();
            expert.learn("Visual Timer", true).unwrap();
        }
        let reloaded = HabitExpert::new(Some(dir.path()));
        assert_eq!(reloaded.streak("Visual Timer"), 2);
    }
}
