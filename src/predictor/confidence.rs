//! Confidence scoring for upcoming-fixture predictions.
//!
//! The underlying classifier exposes only hard class predictions, not
//! calibrated probabilities, so confidence is derived from relative team
//! strength instead: a weighted combination of win rate and goal
//! differential. It measures how far apart the two sides are, not how
//! certain the model is.

use super::team_stats::TeamStats;

/// Weight on win rate in the strength score
const WIN_RATE_WEIGHT: f64 = 0.4;
/// Weight on average goals scored
const SCORED_WEIGHT: f64 = 0.3;
/// Weight on average goals conceded (subtracted)
const CONCEDED_WEIGHT: f64 = 0.3;

/// Slope mapping strength divergence to confidence points
const DIVERGENCE_SCALE: f64 = 50.0;
/// Confidence floor for any prediction
pub const MIN_CONFIDENCE: f64 = 50.0;
/// Confidence ceiling, evenly matched or not
pub const MAX_CONFIDENCE: f64 = 90.0;

/// Composite strength score for one team:
/// `win_rate·0.4 + avg_scored·0.3 − avg_conceded·0.3`
pub fn strength(stats: &TeamStats) -> f64 {
    stats.win_rate * WIN_RATE_WEIGHT + stats.avg_goals_scored * SCORED_WEIGHT
        - stats.avg_goals_conceded * CONCEDED_WEIGHT
}

/// Confidence in [50, 90] from the absolute strength divergence between
/// the two sides. Evenly matched teams bottom out at 50; a gap of 0.8
/// strength points or more saturates at 90.
pub fn confidence_score(home: &TeamStats, away: &TeamStats) -> f64 {
    let divergence = (strength(home) - strength(away)).abs();
    (divergence * DIVERGENCE_SCALE + MIN_CONFIDENCE).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
