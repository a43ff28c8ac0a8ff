pub mod football_data;

pub use football_data::FootballData;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::models::MatchRecord;
use crate::db::Database;

/// Trait every upstream match feed must implement.
#[async_trait]
pub trait MatchFeed: Send + Sync {
    /// Fetch finished matches from the last `days_back` days.
    async fn fetch_finished(&self, days_back: u32) -> Result<Vec<MatchRecord>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Whether a fetched match passes the configured competition filter.
/// No filter means every competition is kept.
fn competition_matches(m: &MatchRecord, filter: Option<&str>) -> bool {
    match filter {
        Some(name) => m.competition.eq_ignore_ascii_case(name.trim()),
        None => true,
    }
}

/// Spawns a background task that fetches finished matches from the feed at
/// the configured interval and upserts them into the repository, keeping
/// only matches from the configured competition when a filter is set.
///
/// Feed or storage errors are logged and the next tick retries; the task
/// never exits on its own.
pub fn start_ingest_job(
    feed: Arc<dyn MatchFeed>,
    db: Database,
    interval: Duration,
    days_back: u32,
    competition: Option<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Ingest job started (feed={}, interval={:?}, window={} days, competition={})",
            feed.name(),
            interval,
            days_back,
            competition.as_deref().unwrap_or("all")
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match feed.fetch_finished(days_back).await {
                Ok(matches) => {
                    let fetched = matches.len();
                    let mut stored = 0usize;
                    for m in matches
                        .iter()
                        .filter(|m| competition_matches(m, competition.as_deref()))
                    {
                        match db.upsert_match(m) {
                            Ok(()) => stored += 1,
                            Err(e) => warn!(
                                "Failed to store match {} vs {}: {}",
                                m.home_team, m.away_team, e
                            ),
                        }
                    }
                    info!("Ingested {} of {} fetched matches", stored, fetched);
                }
                Err(e) => warn!("Feed '{}' failed: {}", feed.name(), e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MatchStatus;
    use chrono::Utc;

    fn in_competition(competition: &str) -> MatchRecord {
        MatchRecord {
            id: None,
            home_team: "A".into(),
            away_team: "B".into(),
            home_goals: Some(1),
            away_goals: Some(0),
            matchday: 1,
            date: Utc::now(),
            competition: competition.into(),
            season: "2026".into(),
            status: MatchStatus::Finished,
            outcome: Some(crate::predictor::Outcome::Win),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn no_filter_keeps_everything() {
        assert!(competition_matches(&in_competition("Premier League"), None));
        assert!(competition_matches(&in_competition("La Liga"), None));
    }

    #[test]
    fn filter_keeps_only_the_named_competition() {
        let filter = Some("Premier League");
        assert!(competition_matches(&in_competition("Premier League"), filter));
        assert!(!competition_matches(&in_competition("La Liga"), filter));
    }

    #[test]
    fn filter_is_case_and_whitespace_tolerant() {
        let m = in_competition("Premier League");
        assert!(competition_matches(&m, Some("premier league")));
        assert!(competition_matches(&m, Some("  Premier League  ")));
    }
}
