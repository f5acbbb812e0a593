//! Intervention Council - adaptive strategy recommender
//!
//! A small ensemble of behavioral-science experts that:
//! - normalizes a labeled user context into a numeric vector
//! - scores every catalog strategy per expert (habit, stress, flow, curiosity)
//! - combines scores by fixed trust weights and picks the best strategy
//! - routes success/failure feedback to the experts that learn, persisting
//!   their state between runs
//!
//! # Example
//!
//! ```no_run
//! use chrono::Local;
//! use intervention_council::{Coordinator, Difficulty, RawContext, Strategy};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let coordinator = Coordinator::standard(None, StdRng::seed_from_u64(7));
//! let catalog = vec![
//!     Strategy::new("Neutral Reflection", &["retention", "emotion"], Difficulty::Low),
//!     Strategy::new("Deep Work Session", &["productivity"], Difficulty::High),
//! ];
//!
//! let chosen = coordinator.select(&RawContext::new("low", "high"), &Local::now(), &catalog)?;
//! coordinator.feedback(&chosen.name, true);
//! # Ok::<(), intervention_council::CouncilError>(())
//! ```

// Core
pub mod types;
pub mod error;
pub mod context;
pub mod experts;
pub mod coordinator;

// Application layer
pub mod config;
pub mod catalog;
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{Difficulty, RawContext, ScoreMap, Strategy, StrategySource};
pub use error::{CouncilError, Result};
pub use context::{normalize, ContextVector, TimeBin};
pub use experts::{
    BetaParams, CuriosityExpert, Expert, ExpertKind, FlowExpert, HabitExpert, Learner,
    StressExpert,
};
pub use coordinator::{Coordinator, Decision, ExpertBallot, FeedbackReport};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
