//! Flow expert
//!
//! Challenge/skill matching: current energy stands in for capacity, and a
//! strategy scores highest when its difficulty matches it.

use super::{Expert, ExpertKind};
use crate::context::ContextVector;
use crate::types::{ScoreMap, Strategy};

#[derive(Debug, Clone, Default)]
pub struct FlowExpert;

impl FlowExpert {
    pub fn new() -> Self {
        Self
    }
}

impl Expert for FlowExpert {
    fn kind(&self) -> ExpertKind {
        ExpertKind::Flow
    }

    fn score(&self, context: &ContextVector, catalog: &[Strategy]) -> ScoreMap {
        let energy = context.energy();
        catalog
            .iter()
            .map(|s| (s.name.clone(), 1.0 - (energy - s.difficulty.scalar()).abs()))
            .collect()
    }
}
