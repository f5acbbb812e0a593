//! Coordinator
//!
//! Owns the expert roster and each expert's trust weight. A decision
//! normalizes the context, collects every expert's ballot, sums the weighted
//! scores per strategy and returns the best one. Outcome feedback fans out to
//! every expert that can learn, each isolated from the others' failures.

use chrono::Timelike;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::context::{normalize, ContextVector};
use crate::error::{CouncilError, Result};
use crate::experts::{CuriosityExpert, Expert, ExpertKind, FlowExpert, HabitExpert, StressExpert};
use crate::types::{RawContext, ScoreMap, Strategy};

/// Default trust weights. Stress is trusted most so regulation wins under
/// acute stress.
pub const HABIT_WEIGHT: f64 = 1.0;
pub const STRESS_WEIGHT: f64 = 1.5;
pub const CURIOSITY_WEIGHT: f64 = 1.0;
pub const FLOW_WEIGHT: f64 = 1.2;

struct Member {
    expert: Box<dyn Expert>,
    weight: f64,
}

/// One expert's raw scores and the weight they were counted with
#[derive(Debug, Clone, Serialize)]
pub struct ExpertBallot {
    pub expert: ExpertKind,
    pub weight: f64,
    pub votes: ScoreMap,
}

impl ExpertBallot {
    /// Highest-scoring strategies, best first
    pub fn top(&self, n: usize) -> Vec<(&str, f64)> {
        let mut votes: Vec<(&str, f64)> =
            self.votes.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        votes.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        votes.truncate(n);
        votes
    }
}

/// Outcome of a deliberation, borrowed from the catalog it was made over
#[derive(Debug, Clone)]
pub struct Decision<'a> {
    pub strategy: &'a Strategy,
    /// Weighted total of the winning strategy
    pub score: f64,
    pub context: ContextVector,
    pub totals: ScoreMap,
    pub ballots: Vec<ExpertBallot>,
}

/// Which learners took a feedback event and which failed to persist it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackReport {
    pub updated: Vec<ExpertKind>,
    pub failed: Vec<(ExpertKind, String)>,
}

impl FeedbackReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Weighted ensemble of scoring experts
#[derive(Default)]
pub struct Coordinator {
    roster: Vec<Member>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.roster.iter().map(|m| (m.expert.kind(), m.weight)))
            .finish()
    }
}

impl Coordinator {
    /// Empty roster; add experts with [`Coordinator::with_expert`]
    pub fn new() -> Self {
        Self::default()
    }

    /// The four standard experts with default weights, in roster order
    /// habit, stress, curiosity, flow
    pub fn standard(state_dir: Option<&Path>, rng: StdRng) -> Self {
        Self::new()
            .with_expert(HabitExpert::new(state_dir), HABIT_WEIGHT)
            .with_expert(StressExpert::new(), STRESS_WEIGHT)
            .with_expert(CuriosityExpert::new(state_dir, rng), CURIOSITY_WEIGHT)
            .with_expert(FlowExpert::new(), FLOW_WEIGHT)
    }

    pub fn with_expert(mut self, expert: impl Expert + 'static, weight: f64) -> Self {
        self.add_expert(Box::new(expert), weight);
        self
    }

    pub fn add_expert(&mut self, expert: Box<dyn Expert>, weight: f64) {
        debug!("Adding expert {} with weight {}", expert.kind(), weight);
        self.roster.push(Member { expert, weight });
    }

    /// Roster in order, with weights
    pub fn experts(&self) -> impl Iterator<Item = (&dyn Expert, f64)> {
        self.roster.iter().map(|m| (m.expert.as_ref(), m.weight))
    }

    /// Trust weight of the first roster member of `kind`
    pub fn weight(&self, kind: ExpertKind) -> Option<f64> {
        self.roster
            .iter()
            .find(|m| m.expert.kind() == kind)
            .map(|m| m.weight)
    }

    /// Pick the best strategy for this context
    pub fn select<'a, T: Timelike>(
        &self,
        raw: &RawContext,
        now: &T,
        catalog: &'a [Strategy],
    ) -> Result<&'a Strategy> {
        self.deliberate(raw, now, catalog).map(|d| d.strategy)
    }

    /// Pick the best strategy and keep every ballot that led to it.
    ///
    /// Ties go to the strategy that appears first in `catalog`.
    pub fn deliberate<'a, T: Timelike>(
        &self,
        raw: &RawContext,
        now: &T,
        catalog: &'a [Strategy],
    ) -> Result<Decision<'a>> {
        if catalog.is_empty() {
            return Err(CouncilError::NoCandidate);
        }

        let context = normalize(raw, now);
        let mut totals: ScoreMap = catalog.iter().map(|s| (s.name.clone(), 0.0)).collect();
        let mut ballots = Vec::with_capacity(self.roster.len());

        for member in &self.roster {
            let kind = member.expert.kind();
            let votes = member.expert.score(&context, catalog);

            for (name, total) in totals.iter_mut() {
                match votes.get(name) {
                    Some(score) => *total += member.weight * score,
                    None => warn!("[{}] returned no score for '{}', counting 0", kind, name),
                }
            }

            let ballot = ExpertBallot {
                expert: kind,
                weight: member.weight,
                votes,
            };
            debug!(
                "[{}] (weight {}) top votes: {:?}",
                kind,
                member.weight,
                ballot.top(2)
            );
            ballots.push(ballot);
        }

        let mut best = &catalog[0];
        let mut best_score = totals[&best.name];
        for strategy in &catalog[1..] {
            let score = totals[&strategy.name];
            if rank(score) > rank(best_score) {
                best = strategy;
                best_score = score;
            }
        }

        info!("Decision: '{}' (score {:.2})", best.name, best_score);
        Ok(Decision {
            strategy: best,
            score: best_score,
            context,
            totals,
            ballots,
        })
    }

    /// Route an observed outcome to every learning expert, in roster order.
    ///
    /// A learner that fails to persist is logged and skipped; the rest still
    /// learn.
    pub fn feedback(&self, strategy: &str, success: bool) -> FeedbackReport {
        info!(
            "Feedback: '{}' {}",
            strategy,
            if success { "completed" } else { "failed" }
        );

        let mut report = FeedbackReport::default();
        for member in &self.roster {
            let Some(learner) = member.expert.learner() else {
                continue;
            };
            let kind = member.expert.kind();
            match learner.learn(strategy, success) {
                Ok(()) => report.updated.push(kind),
                Err(e) => {
                    warn!("[{}] failed to record outcome for '{}': {}", kind, strategy, e);
                    report.failed.push((kind, e.to_string()));
                }
            }
        }
        report
    }
}

/// NaN totals sort below every real total, so they win only when nothing
/// else is comparable.
fn rank(total: f64) -> f64 {
    if total.is_nan() {
        f64::NEG_INFINITY
    } else {
        total
    }
}
