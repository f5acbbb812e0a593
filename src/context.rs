//! Context normalization
//!
//! Turns a raw labeled context plus the current moment into the fixed-shape
//! vector every expert reads: `[morning, afternoon, evening, night, energy, stress]`.

use chrono::Timelike;
use serde::Serialize;

use crate::types::RawContext;

/// Time-of-day bucket derived from the hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeBin {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeBin {
    /// `[5,12)` morning, `[12,17)` afternoon, `[17,22)` evening, else night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeBin::Morning,
            12..=16 => TimeBin::Afternoon,
            17..=21 => TimeBin::Evening,
            _ => TimeBin::Night,
        }
    }

    fn index(self) -> usize {
        match self {
            TimeBin::Morning => 0,
            TimeBin::Afternoon => 1,
            TimeBin::Evening => 2,
            TimeBin::Night => 3,
        }
    }
}

impl std::fmt::Display for TimeBin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBin::Morning => write!(f, "morning"),
            TimeBin::Afternoon => write!(f, "afternoon"),
            TimeBin::Evening => write!(f, "evening"),
            TimeBin::Night => write!(f, "night"),
        }
    }
}

/// Numeric context: one-hot time bin followed by energy and stress scalars
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextVector([f64; ContextVector::LEN]);

impl ContextVector {
    pub const LEN: usize = 6;

    pub fn new(bin: TimeBin, energy: f64, stress: f64) -> Self {
        let mut v = [0.0; Self::LEN];
        v[bin.index()] = 1.0;
        v[4] = energy;
        v[5] = stress;
        Self(v)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn time_bin(&self) -> TimeBin {
        match self.0.iter().position(|&bit| bit == 1.0) {
            Some(0) => TimeBin::Morning,
            Some(1) => TimeBin::Afternoon,
            Some(2) => TimeBin::Evening,
            _ => TimeBin::Night,
        }
    }

    /// Energy scalar, second-to-last component
    pub fn energy(&self) -> f64 {
        self.0[Self::LEN - 2]
    }

    /// Stress scalar, last component
    pub fn stress(&self) -> f64 {
        self.0[Self::LEN - 1]
    }
}

/// Map a `low`/`medium`/`high` label to `0.0`/`0.5`/`1.0`.
/// Labels match exactly; missing and unrecognized labels (including `High`
/// or padded ones) read as `medium`.
pub fn level_scalar(label: Option<&str>) -> f64 {
    match label {
        Some("low") => 0.0,
        Some("high") => 1.0,
        _ => 0.5,
    }
}

/// Normalize a raw context against an injected clock reading
pub fn normalize<T: Timelike>(raw: &RawContext, now: &T) -> ContextVector {
    ContextVector::new(
        TimeBin::from_hour(now.hour()),
        level_scalar(raw.energy.as_deref()),
        level_scalar(raw.stress.as_deref()),
    )
}
