use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tracing::debug;

use crate::db::models::{MatchRecord, MatchStatus};
use crate::predictor::Outcome;
use super::MatchFeed;

/// Match feed backed by the football-data.org v4 API.
/// Docs: <https://www.football-data.org/documentation/quickstart>
pub struct FootballData {
    http: Client,
    api_key: String,
    /// Base URL for overriding in tests
    base_url: String,
}

impl FootballData {
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FootballData {
            http,
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or("https://api.football-data.org/v4")
                .to_string(),
        })
    }
}

#[async_trait]
impl MatchFeed for FootballData {
    fn name(&self) -> &str {
        "football-data.org"
    }

    async fn fetch_finished(&self, days_back: u32) -> Result<Vec<MatchRecord>> {
        let date_to = Utc::now().date_naive();
        let date_from = (Utc::now() - Duration::days(days_back as i64)).date_naive();
        let url = format!("{}/matches", self.base_url);
        debug!("Fetching finished matches from {} ({} to {})", url, date_from, date_to);

        let resp = self
            .http
            .get(&url)
            .header("X-Auth-Token", &self.api_key)
            .query(&[
                ("dateFrom", date_from.to_string()),
                ("dateTo", date_to.to_string()),
                ("status", "FINISHED".to_string()),
            ])
            .send()
            .await
            .context("football-data.org request failed")?;

        if resp.status() == reqwest::StatusCode::FORBIDDEN {
            anyhow::bail!("football-data.org access forbidden: check API key and subscription");
        }
        if !resp.status().is_success() {
            anyhow::bail!("football-data.org error: {}", resp.status());
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse football-data.org response")?;

        parse_matches_response(&raw)
    }
}

/// Parse the v4 `/matches` payload into match records. Entries missing a
/// team name or date are skipped rather than failing the whole batch.
fn parse_matches_response(raw: &serde_json::Value) -> Result<Vec<MatchRecord>> {
    let entries = match raw["matches"].as_array() {
        Some(a) => a,
        None => return Ok(vec![]),
    };

    let now = Utc::now();
    let matches = entries
        .iter()
        .filter_map(|m| {
            let home_team = m["homeTeam"]["name"].as_str()?.to_string();
            let away_team = m["awayTeam"]["name"].as_str()?.to_string();
            let date: DateTime<Utc> = m["utcDate"]
                .as_str()
                .and_then(|s| s.parse().ok())?;

            let home_goals = m["score"]["fullTime"]["home"].as_u64().map(|g| g as u32);
            let away_goals = m["score"]["fullTime"]["away"].as_u64().map(|g| g as u32);
            let outcome = home_goals
                .zip(away_goals)
                .map(|(h, a)| Outcome::label(h, a));
            let matchday = m["matchday"].as_u64().unwrap_or(0) as u32;
            let status = MatchStatus::parse(m["status"].as_str().unwrap_or("SCHEDULED"));

            let competition = m["competition"]["name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string();
            let season = m["season"]["id"]
                .as_u64()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string());

            Some(MatchRecord {
                id: None,
                home_team,
                away_team,
                home_goals,
                away_goals,
                matchday,
                date,
                competition,
                season,
                status,
                outcome,
                fetched_at: now,
            })
        })
        .collect();

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "matches": [
                {
                    "utcDate": "2026-08-22T14:00:00Z",
                    "status": "FINISHED",
                    "matchday": 2,
                    "homeTeam": { "name": "Arsenal FC" },
                    "awayTeam": { "name": "Chelsea FC" },
                    "score": { "fullTime": { "home": 2, "away": 1 } },
                    "competition": { "name": "Premier League" },
                    "season": { "id": 2403 }
                },
                {
                    "utcDate": "2026-08-23T16:30:00Z",
                    "status": "TIMED",
                    "matchday": 2,
                    "homeTeam": { "name": "Liverpool FC" },
                    "awayTeam": { "name": "Everton FC" },
                    "score": { "fullTime": { "home": null, "away": null } },
                    "competition": { "name": "Premier League" },
                    "season": { "id": 2403 }
                }
            ]
        })
    }

    #[test]
    fn parses_finished_match() {
        let matches = parse_matches_response(&payload()).unwrap();
        assert_eq!(matches.len(), 2);
        let m = &matches[0];
        assert_eq!(m.home_team, "Arsenal FC");
        assert_eq!(m.away_team, "Chelsea FC");
        assert_eq!(m.home_goals, Some(2));
        assert_eq!(m.away_goals, Some(1));
        assert_eq!(m.matchday, 2);
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.competition, "Premier League");
        assert_eq!(m.season, "2403");
        assert_eq!(m.outcome, Some(Outcome::Win));
        assert!(m.has_full_score());
    }

    #[test]
    fn unplayed_match_has_no_score() {
        let matches = parse_matches_response(&payload()).unwrap();
        let m = &matches[1];
        assert_eq!(m.home_goals, None);
        assert_eq!(m.away_goals, None);
        assert_eq!(m.outcome, None);
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert!(!m.has_full_score());
    }

    #[test]
    fn missing_matches_key_is_empty() {
        let matches = parse_matches_response(&json!({"error": "rate limited"})).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn entries_without_team_names_are_skipped() {
        let raw = json!({
            "matches": [
                { "utcDate": "2026-08-22T14:00:00Z", "awayTeam": { "name": "B" } }
            ]
        });
        let matches = parse_matches_response(&raw).unwrap();
        assert!(matches.is_empty());
    }
}
