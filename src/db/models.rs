use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::predictor::Outcome;

/// Lifecycle status of a match as reported by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Scheduled,
    InPlay,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::InPlay => "IN_PLAY",
            MatchStatus::Finished => "FINISHED",
        }
    }

    pub fn parse(s: &str) -> MatchStatus {
        match s.to_uppercase().as_str() {
            "FINISHED" | "FT" | "AWARDED" => MatchStatus::Finished,
            "IN_PLAY" | "LIVE" | "PAUSED" => MatchStatus::InPlay,
            _ => MatchStatus::Scheduled,
        }
    }
}

/// One match as stored in the repository. Goal counts are `None` until the
/// match has finished; rows used for training must have both present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Option<i64>,
    pub home_team: String,
    pub away_team: String,
    /// Full-time goals for the home side; `None` while unfinished
    pub home_goals: Option<u32>,
    /// Full-time goals for the away side; `None` while unfinished
    pub away_goals: Option<u32>,
    /// Round number within the competition; 0 when the feed omits it
    pub matchday: u32,
    pub date: DateTime<Utc>,
    pub competition: String,
    pub season: String,
    pub status: MatchStatus,
    /// Home-relative result, derived from the full-time score at ingest;
    /// `None` while the match is unfinished
    pub outcome: Option<Outcome>,
    pub fetched_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Whether this record can be used for training or evaluation:
    /// finished with both full-time goal counts present.
    pub fn has_full_score(&self) -> bool {
        self.status == MatchStatus::Finished
            && self.home_goals.is_some()
            && self.away_goals.is_some()
    }
}
