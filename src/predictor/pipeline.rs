//! Pipeline orchestration: preprocessing, training cycles, and serving
//! predictions from the currently published model.
//!
//! One logical model is shared between all inference callers and the
//! periodic retrainer. A training cycle builds the scaler and classifier
//! in a private working copy and publishes the finished [`TrainedModel`]
//! with a single swap behind the lock, so readers always observe either
//! the fully-old or the fully-new generation. A failed retrain leaves the
//! previous model untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::db::models::MatchRecord;

use super::confidence::confidence_score;
use super::features::{ForecastFeatures, HistoricalFeatures};
use super::model::{Evaluation, SoftmaxClassifier};
use super::outcome::Outcome;
use super::scaler::{self, ScalerParams};
use super::team_stats::{self, TeamStats};
use super::PredictError;

/// Summary of one completed training cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Held-out accuracy in [0, 1]
    pub accuracy: f64,
    /// Usable rows after preprocessing
    pub trained_rows: usize,
    pub evaluation: Evaluation,
    pub trained_at: DateTime<Utc>,
}

/// Response payload for an upcoming-fixture prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPrediction {
    pub outcome: Outcome,
    /// Team-strength divergence score in [50, 90]
    pub confidence: f64,
    pub home_stats: TeamStats,
    pub away_stats: TeamStats,
}

/// Scaler params and classifier weights from one training generation.
/// Immutable once published; retraining replaces the whole value.
struct TrainedModel {
    scaler: ScalerParams,
    classifier: SoftmaxClassifier,
    report: TrainingReport,
}

/// Shared prediction pipeline. Starts uninitialized; becomes ready after
/// the first successful [`train_and_evaluate`](Self::train_and_evaluate).
pub struct PredictionPipeline {
    model: RwLock<Option<Arc<TrainedModel>>>,
}

impl Default for PredictionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionPipeline {
    pub fn new() -> Self {
        PredictionPipeline {
            model: RwLock::new(None),
        }
    }

    /// Whether a trained model is currently published
    pub fn is_ready(&self) -> bool {
        self.model.read().unwrap().is_some()
    }

    /// Report from the most recent successful training cycle
    pub fn current_report(&self) -> Option<TrainingReport> {
        self.model
            .read()
            .unwrap()
            .as_ref()
            .map(|m| m.report.clone())
    }

    /// Keep only matches with complete full-time scores and turn them into
    /// labeled historical feature rows.
    pub fn preprocess(
        raw: &[MatchRecord],
    ) -> Result<Vec<(HistoricalFeatures, Outcome)>, PredictError> {
        let rows: Vec<_> = raw
            .iter()
            .filter_map(|m| {
                if !m.has_full_score() {
                    return None;
                }
                let (home, away) = (m.home_goals?, m.away_goals?);
                let features = HistoricalFeatures {
                    home_goals: home as f64,
                    away_goals: away as f64,
                    matchday: m.matchday as f64,
                };
                Some((features, Outcome::label(home, away)))
            })
            .collect();

        if rows.is_empty() {
            return Err(PredictError::NoValidData);
        }
        Ok(rows)
    }

    /// Run a full training cycle over raw matches (which must be in
    /// chronological order) and atomically publish the new model.
    ///
    /// On any error the previously published model, if one exists, keeps
    /// serving unchanged.
    pub fn train_and_evaluate(&self, raw: &[MatchRecord]) -> Result<TrainingReport, PredictError> {
        let labeled = Self::preprocess(raw)?;

        let rows: Vec<Vec<f64>> = labeled.iter().map(|(f, _)| f.to_row().to_vec()).collect();
        let labels: Vec<usize> = labeled.iter().map(|(_, o)| o.class_index()).collect();

        // Working copy: nothing below touches the published model until
        // the final swap.
        let params = scaler::fit(&rows)?;
        let scaled = scaler::transform(&rows, &params);

        let mut classifier = SoftmaxClassifier::new();
        let evaluation = classifier.train(&scaled, &labels)?;

        let report = TrainingReport {
            accuracy: evaluation.accuracy,
            trained_rows: labeled.len(),
            evaluation,
            trained_at: Utc::now(),
        };
        info!(
            "Model trained on {} matches, held-out accuracy {:.3}",
            report.trained_rows, report.accuracy
        );

        *self.model.write().unwrap() = Some(Arc::new(TrainedModel {
            scaler: params,
            classifier,
            report: report.clone(),
        }));
        Ok(report)
    }

    /// Classify a finished-match feature row (historical variant)
    pub fn predict_historical(&self, features: HistoricalFeatures) -> Result<Outcome, PredictError> {
        let model = self.current_model()?;
        model.classify(&features.to_row())
    }

    /// Predict an unplayed fixture between two teams.
    ///
    /// Both teams' stats are aggregated from the given historical matches,
    /// turned into a forecast feature row, standardized with the current
    /// model's scaler params and classified; confidence comes from the
    /// strength heuristic, not from the classifier.
    pub fn predict_upcoming(
        &self,
        home_team: &str,
        away_team: &str,
        matchday: u32,
        historical: &[MatchRecord],
    ) -> Result<UpcomingPrediction, PredictError> {
        let model = self.current_model()?;

        let home_stats = team_stats::compute_stats(home_team, historical);
        let away_stats = team_stats::compute_stats(away_team, historical);

        let features = ForecastFeatures {
            home_avg_scored: home_stats.avg_goals_scored,
            away_avg_scored: away_stats.avg_goals_scored,
            matchday: matchday as f64,
        };
        let outcome = model.classify(&features.to_row())?;

        Ok(UpcomingPrediction {
            outcome,
            confidence: confidence_score(&home_stats, &away_stats),
            home_stats,
            away_stats,
        })
    }

    fn current_model(&self) -> Result<Arc<TrainedModel>, PredictError> {
        self.model
            .read()
            .unwrap()
            .clone()
            .ok_or(PredictError::ModelNotReady)
    }
}

impl TrainedModel {
    fn classify(&self, row: &[f64; super::features::NUM_FEATURES]) -> Result<Outcome, PredictError> {
        let scaled = scaler::transform_row(row, &self.scaler);
        let class = self.classifier.predict(&scaled)?;
        Outcome::from_class_index(class).ok_or_else(|| {
            PredictError::InvalidInput(format!("classifier produced unknown class {class}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MatchStatus;
    use chrono::TimeZone;

    fn finished(home: &str, away: &str, hg: u32, ag: u32, day: u32) -> MatchRecord {
        MatchRecord {
            id: None,
            home_team: home.into(),
            away_team: away.into(),
            home_goals: Some(hg),
            away_goals: Some(ag),
            matchday: day,
            date: Utc.with_ymd_and_hms(2026, 2, day + 1, 15, 0, 0).unwrap(),
            competition: "Test League".into(),
            season: "2026".into(),
            status: MatchStatus::Finished,
            outcome: Some(Outcome::label(hg, ag)),
            fetched_at: Utc::now(),
        }
    }

    /// 12 matches with a mix of wins, losses, and draws
    fn sample_matches() -> Vec<MatchRecord> {
        vec![
            finished("A", "B", 3, 0, 1),
            finished("C", "D", 0, 2, 1),
            finished("B", "C", 1, 1, 2),
            finished("D", "A", 0, 1, 2),
            finished("A", "C", 2, 2, 3),
            finished("B", "D", 4, 1, 3),
            finished("C", "A", 0, 3, 4),
            finished("D", "B", 1, 2, 4),
            finished("A", "D", 2, 0, 5),
            finished("B", "A", 0, 0, 5),
            finished("C", "B", 1, 3, 6),
            finished("D", "C", 2, 1, 6),
        ]
    }

    #[test]
    fn preprocess_drops_incomplete_matches() {
        let mut matches = sample_matches();
        let mut pending = finished("E", "F", 0, 0, 7);
        pending.status = MatchStatus::Scheduled;
        pending.home_goals = None;
        pending.away_goals = None;
        pending.outcome = None;
        matches.push(pending);

        let rows = PredictionPipeline::preprocess(&matches).unwrap();
        assert_eq!(rows.len(), 12);
    }

    #[test]
    fn preprocess_of_empty_batch_is_no_valid_data() {
        assert_eq!(
            PredictionPipeline::preprocess(&[]).unwrap_err(),
            PredictError::NoValidData
        );
    }

    #[test]
    fn end_to_end_train_then_predict_upcoming() {
        let matches = sample_matches();
        let pipeline = PredictionPipeline::new();
        assert!(!pipeline.is_ready());

        let report = pipeline.train_and_evaluate(&matches).unwrap();
        assert!(pipeline.is_ready());
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert_eq!(report.trained_rows, 12);

        let pred = pipeline.predict_upcoming("A", "B", 5, &matches).unwrap();
        assert!(matches!(
            pred.outcome,
            Outcome::Win | Outcome::Loss | Outcome::Draw
        ));
        assert!((50.0..=90.0).contains(&pred.confidence));
        assert!(pred.home_stats.matches_played > 0);
        assert!(pred.away_stats.matches_played > 0);
    }

    #[test]
    fn predictions_are_idempotent() {
        let matches = sample_matches();
        let pipeline = PredictionPipeline::new();
        pipeline.train_and_evaluate(&matches).unwrap();

        let first = pipeline.predict_upcoming("A", "B", 5, &matches).unwrap();
        let second = pipeline.predict_upcoming("A", "B", 5, &matches).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn predict_before_training_is_not_ready() {
        let pipeline = PredictionPipeline::new();
        let err = pipeline
            .predict_upcoming("A", "B", 1, &sample_matches())
            .unwrap_err();
        assert_eq!(err, PredictError::ModelNotReady);

        let err = pipeline
            .predict_historical(HistoricalFeatures {
                home_goals: 1.0,
                away_goals: 0.0,
                matchday: 1.0,
            })
            .unwrap_err();
        assert_eq!(err, PredictError::ModelNotReady);
    }

    #[test]
    fn failed_retrain_keeps_previous_model_serving() {
        let matches = sample_matches();
        let pipeline = PredictionPipeline::new();
        pipeline.train_and_evaluate(&matches).unwrap();
        let before = pipeline.predict_upcoming("A", "B", 5, &matches).unwrap();

        // Empty retrain batch must fail without touching published state
        assert_eq!(
            pipeline.train_and_evaluate(&[]).unwrap_err(),
            PredictError::NoValidData
        );
        assert!(pipeline.is_ready());

        let after = pipeline.predict_upcoming("A", "B", 5, &matches).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn failed_first_train_stays_uninitialized() {
        let pipeline = PredictionPipeline::new();
        // Too few rows for training
        let few: Vec<_> = sample_matches().into_iter().take(4).collect();
        assert!(matches!(
            pipeline.train_and_evaluate(&few).unwrap_err(),
            PredictError::InsufficientData { .. }
        ));
        assert!(!pipeline.is_ready());
        assert!(pipeline.current_report().is_none());
    }

    #[test]
    fn historical_prediction_returns_an_outcome() {
        let matches = sample_matches();
        let pipeline = PredictionPipeline::new();
        pipeline.train_and_evaluate(&matches).unwrap();
        let outcome = pipeline
            .predict_historical(HistoricalFeatures {
                home_goals: 3.0,
                away_goals: 0.0,
                matchday: 4.0,
            })
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Win | Outcome::Loss | Outcome::Draw
        ));
    }
}
