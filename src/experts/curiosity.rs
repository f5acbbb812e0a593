//! Curiosity expert
//!
//! Thompson sampling per strategy: each one keeps a Beta(alpha, beta) belief
//! over its success probability, and its score is a fresh draw from that
//! belief. Strategies tagged for curiosity or novelty get a flat bonus on top.
//! This is the only expert whose scores vary between calls for fixed state,
//! so the random source is injected and can be seeded.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error};

use super::{open_state, Expert, ExpertKind, Learner, StateFile};
use crate::context::ContextVector;
use crate::error::{CouncilError, Result};
use crate::types::{ScoreMap, Strategy};

/// Tags that earn the novelty bonus
pub const NOVELTY_TAGS: &[&str] = &["curiosity", "novelty"];

pub const DEFAULT_BONUS: f64 = 0.2;

/// Beta distribution parameters; `(1, 1)` is the uniform prior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetaParams {
    pub alpha: u32,
    pub beta: u32,
}

impl Default for BetaParams {
    fn default() -> Self {
        Self { alpha: 1, beta: 1 }
    }
}

impl BetaParams {
    /// Posterior mean of the success probability
    pub fn mean(&self) -> f64 {
        self.alpha as f64 / (self.alpha as f64 + self.beta as f64)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match Beta::new(self.alpha as f64, self.beta as f64) {
            Ok(dist) => dist.sample(rng),
            Err(e) => {
                // Only reachable with hand-edited state holding a zero count
                error!(
                    alpha = self.alpha,
                    beta = self.beta,
                    error = %e,
                    "invalid Beta parameters, using posterior mean"
                );
                self.mean()
            }
        }
    }
}

type Beliefs = HashMap<String, BetaParams>;

/// Thompson-sampling expert
#[derive(Debug)]
pub struct CuriosityExpert {
    state: Mutex<StateFile<Beliefs>>,
    rng: Mutex<StdRng>,
    bonus: f64,
}

impl CuriosityExpert {
    /// Load beliefs from `state_dir` and draw samples from `rng`
    pub fn new(state_dir: Option<&Path>, rng: StdRng) -> Self {
        Self {
            state: Mutex::new(open_state(ExpertKind::Curiosity, state_dir)),
            rng: Mutex::new(rng),
            bonus: DEFAULT_BONUS,
        }
    }

    /// Reproducible sampling from a fixed seed
    pub fn seeded(state_dir: Option<&Path>, seed: u64) -> Self {
        Self::new(state_dir, StdRng::seed_from_u64(seed))
    }

    /// Sampling seeded from OS entropy
    pub fn from_entropy(state_dir: Option<&Path>) -> Self {
        Self::new(state_dir, StdRng::from_os_rng())
    }

    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.bonus = bonus;
        self
    }

    /// Current belief for a strategy, the uniform prior when never seen
    pub fn params(&self, strategy: &str) -> BetaParams {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.get().get(strategy).copied().unwrap_or_default()
    }

    /// All recorded beliefs, sorted by strategy name
    pub fn all_params(&self) -> BTreeMap<String, BetaParams> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.get().iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl Expert for CuriosityExpert {
    fn kind(&self) -> ExpertKind {
        ExpertKind::Curiosity
    }

    fn score(&self, _context: &ContextVector, catalog: &[Strategy]) -> ScoreMap {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        catalog
            .iter()
            .map(|s| {
                let params = state.get().get(&s.name).copied().unwrap_or_default();
                let mut score = params.sample(&mut *rng);
                if s.has_any_tag(NOVELTY_TAGS) {
                    score += self.bonus;
                }
                (s.name.clone(), score)
            })
            .collect()
    }

    fn learner(&self) -> Option<&dyn Learner> {
        Some(self)
    }
}

impl Learner for CuriosityExpert {
    fn learn(&self, strategy: &str, success: bool) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CouncilError::StateLock(ExpertKind::Curiosity.to_string()))?;

        let params = state.get_mut().entry(strategy.to_string()).or_default();
        if success {
            params.alpha = params.alpha.saturating_add(1);
        } else {
            params.beta = params.beta.saturating_add(1);
        }
        debug!(
            "[curiosity] '{}' now Beta({}, {})",
            strategy, params.alpha, params.beta
        );

        state.persist()
    }
}
