//! Feature vectors for one match-prediction instance.
//!
//! Two distinct shapes exist and must never mix inside a single trained
//! model's schema: historical rows carry the actual full-time goals (known
//! only after the match), forecast rows substitute each side's historical
//! scoring average because the real goals are unknown before kickoff. Both
//! lower to the same 3-column row layout, so a model trained on one shape
//! accepts standardized rows of the other only through the typed pipeline
//! entry points.

use serde::{Deserialize, Serialize};

/// Number of columns in every feature row
pub const NUM_FEATURES: usize = 3;

/// Features of a finished match, used for offline training and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalFeatures {
    pub home_goals: f64,
    pub away_goals: f64,
    pub matchday: f64,
}

impl HistoricalFeatures {
    pub fn to_row(self) -> [f64; NUM_FEATURES] {
        [self.home_goals, self.away_goals, self.matchday]
    }
}

/// Features of an unplayed fixture, built from aggregated team history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastFeatures {
    pub home_avg_scored: f64,
    pub away_avg_scored: f64,
    pub matchday: f64,
}

impl ForecastFeatures {
    pub fn to_row(self) -> [f64; NUM_FEATURES] {
        [self.home_avg_scored, self.away_avg_scored, self.matchday]
    }
}
