//! Team-strength aggregation over historical match results.

use serde::{Deserialize, Serialize};

use crate::db::models::MatchRecord;

/// Aggregate performance summary for one team, recomputed on demand from
/// the full historical match set. Not cached and not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub matches_played: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub avg_goals_scored: f64,
    pub avg_goals_conceded: f64,
    /// wins / matches_played; 0 when the team has no finished matches
    pub win_rate: f64,
}

/// Aggregate the given team's record over all finished matches it appears
/// in, as either the home or the away side.
///
/// Goals scored are always the team's own goals regardless of venue. That
/// is deliberately different from [`Outcome`](super::Outcome) labels, which
/// are always home-relative. A team with no finished matches gets all-zero
/// stats; this never fails.
pub fn compute_stats(team: &str, matches: &[MatchRecord]) -> TeamStats {
    let mut stats = TeamStats::default();
    let mut goals_scored = 0u64;
    let mut goals_conceded = 0u64;

    for m in matches {
        if !m.has_full_score() {
            continue;
        }
        let is_home = m.home_team == team;
        let is_away = m.away_team == team;
        if !is_home && !is_away {
            continue;
        }
        // has_full_score guarantees both goal counts are present
        let (home, away) = match (m.home_goals, m.away_goals) {
            (Some(h), Some(a)) => (h, a),
            _ => continue,
        };
        let (scored, conceded) = if is_home { (home, away) } else { (away, home) };

        stats.matches_played += 1;
        goals_scored += scored as u64;
        goals_conceded += conceded as u64;

        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => stats.wins += 1,
            std::cmp::Ordering::Less => stats.losses += 1,
            std::cmp::Ordering::Equal => stats.draws += 1,
        }
    }

    if stats.matches_played > 0 {
        let n = stats.matches_played as f64;
        stats.avg_goals_scored = goals_scored as f64 / n;
        stats.avg_goals_conceded = goals_conceded as f64 / n;
        stats.win_rate = stats.wins as f64 / n;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MatchStatus;
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn finished(home: &str, away: &str, hg: u32, ag: u32) -> MatchRecord {
        MatchRecord {
            id: None,
            home_team: home.into(),
            away_team: away.into(),
            home_goals: Some(hg),
            away_goals: Some(ag),
            matchday: 1,
            date: Utc::now(),
            competition: "Test League".into(),
            season: "2026".into(),
            status: MatchStatus::Finished,
            outcome: Some(crate::predictor::Outcome::label(hg, ag)),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn no_matches_yields_zeroed_stats() {
        let stats = compute_stats("Arsenal", &[]);
        assert_eq!(stats, TeamStats::default());
        assert_relative_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn aggregates_both_home_and_away_appearances() {
        let matches = vec![
            finished("Arsenal", "Chelsea", 3, 1),   // home win, 3 for / 1 against
            finished("Liverpool", "Arsenal", 0, 2), // away win, 2 for / 0 against
            finished("Arsenal", "Spurs", 1, 1),     // draw, 1 for / 1 against
            finished("Chelsea", "Liverpool", 2, 0), // not Arsenal's match
        ];
        let stats = compute_stats("Arsenal", &matches);
        assert_eq!(stats.matches_played, 3);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 0);
        assert_eq!(stats.draws, 1);
        assert_relative_eq!(stats.avg_goals_scored, 2.0, epsilon = 1e-12);
        assert_relative_eq!(stats.avg_goals_conceded, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(stats.win_rate, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn away_loss_counts_from_team_perspective() {
        // The home side won, so the home-relative Outcome is "win", but for
        // the away team this is a loss.
        let matches = vec![finished("Chelsea", "Arsenal", 2, 0)];
        let stats = compute_stats("Arsenal", &matches);
        assert_eq!(stats.losses, 1);
        assert_relative_eq!(stats.avg_goals_scored, 0.0);
        assert_relative_eq!(stats.avg_goals_conceded, 2.0);
    }

    #[test]
    fn unfinished_matches_are_ignored() {
        let mut pending = finished("Arsenal", "Chelsea", 0, 0);
        pending.status = MatchStatus::Scheduled;
        pending.home_goals = None;
        pending.away_goals = None;
        pending.outcome = None;
        let stats = compute_stats("Arsenal", &[pending]);
        assert_eq!(stats.matches_played, 0);
    }
}
