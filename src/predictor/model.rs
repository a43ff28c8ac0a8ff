//! Multinomial (softmax) logistic regression over the 3-class outcome
//! space, fit by batch gradient descent.
//!
//! The evaluation split is a fixed chronological 80/20 cut with no
//! shuffling: input rows arrive in match-date order and the held-out test
//! set is always the most recent 20%. Randomized splitting would change
//! what the reported accuracy means, so the temporal cut is kept on
//! purpose even though it makes accuracy sensitive to arrival order.

use serde::{Deserialize, Serialize};

use super::features::NUM_FEATURES;
use super::outcome::NUM_CLASSES;
use super::PredictError;

/// Minimum number of usable rows before training is attempted
pub const MIN_TRAINING_ROWS: usize = 10;

/// Gradient-descent steps
const TRAIN_STEPS: usize = 1000;
/// Learning rate
const LEARNING_RATE: f64 = 0.1;
/// Fraction of rows used for training; the rest is held out
const TRAIN_SPLIT: f64 = 0.8;

/// Held-out evaluation result: exact-match accuracy plus a confusion
/// matrix (rows = true class, columns = predicted class).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub confusion: [[usize; NUM_CLASSES]; NUM_CLASSES],
    pub test_rows: usize,
}

impl Evaluation {
    fn empty() -> Self {
        Evaluation {
            accuracy: 0.0,
            confusion: [[0; NUM_CLASSES]; NUM_CLASSES],
            test_rows: 0,
        }
    }
}

/// Softmax classifier. Holds nothing beyond its fitted parameters;
/// untrained until the first successful [`train`](Self::train).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoftmaxClassifier {
    /// One weight row per class: `NUM_FEATURES` coefficients plus a bias
    /// term at the last position. `None` until trained.
    weights: Option<Vec<[f64; NUM_FEATURES + 1]>>,
}

impl SoftmaxClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.weights.is_some()
    }

    /// Train on standardized feature rows with integer class labels and
    /// return the held-out evaluation.
    ///
    /// Rows must already be in chronological order; the first 80% become
    /// the training portion and the remainder the test portion. Fails with
    /// [`PredictError::InsufficientData`] below [`MIN_TRAINING_ROWS`] rows
    /// and [`PredictError::InsufficientLabelDiversity`] when the training
    /// portion contains a single distinct label.
    pub fn train(
        &mut self,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<Evaluation, PredictError> {
        if features.len() != labels.len() {
            return Err(PredictError::InvalidInput(format!(
                "feature/label length mismatch: {} vs {}",
                features.len(),
                labels.len()
            )));
        }
        if features.len() < MIN_TRAINING_ROWS {
            return Err(PredictError::InsufficientData {
                required: MIN_TRAINING_ROWS,
                available: features.len(),
            });
        }
        if let Some(bad) = features.iter().find(|r| r.len() != NUM_FEATURES) {
            return Err(PredictError::InvalidInput(format!(
                "expected {NUM_FEATURES} features per row, got {}",
                bad.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= NUM_CLASSES) {
            return Err(PredictError::InvalidInput(format!(
                "label {bad} outside the {NUM_CLASSES}-class space"
            )));
        }

        let split = (features.len() as f64 * TRAIN_SPLIT).floor() as usize;
        let (x_train, x_test) = features.split_at(split);
        let (y_train, y_test) = labels.split_at(split);

        let mut seen = [false; NUM_CLASSES];
        for &y in y_train {
            seen[y] = true;
        }
        if seen.iter().filter(|&&s| s).count() < 2 {
            return Err(PredictError::InsufficientLabelDiversity);
        }

        let weights = fit_softmax(x_train, y_train)?;
        self.weights = Some(weights);

        Ok(self.evaluate(x_test, y_test))
    }

    /// Arg-max class for one standardized feature row
    pub fn predict(&self, row: &[f64]) -> Result<usize, PredictError> {
        let weights = self.weights.as_ref().ok_or(PredictError::ModelNotTrained)?;
        if row.len() != NUM_FEATURES {
            return Err(PredictError::InvalidInput(format!(
                "expected {NUM_FEATURES} features, got {}",
                row.len()
            )));
        }
        let scores = class_scores(weights, row);
        Ok(argmax(&scores))
    }

    /// Exact-match accuracy and confusion matrix over the given rows.
    ///
    /// Diagnostic, not load-bearing: degrades to an all-zero evaluation
    /// instead of failing when there are no test rows or the model cannot
    /// score a row.
    pub fn evaluate(&self, features: &[Vec<f64>], labels: &[usize]) -> Evaluation {
        if features.is_empty() || features.len() != labels.len() {
            return Evaluation::empty();
        }
        let mut confusion = [[0usize; NUM_CLASSES]; NUM_CLASSES];
        let mut correct = 0usize;
        for (row, &truth) in features.iter().zip(labels) {
            let Ok(pred) = self.predict(row) else {
                return Evaluation::empty();
            };
            if truth < NUM_CLASSES {
                confusion[truth][pred] += 1;
            }
            if pred == truth {
                correct += 1;
            }
        }
        Evaluation {
            accuracy: correct as f64 / features.len() as f64,
            confusion,
            test_rows: features.len(),
        }
    }
}

/// Batch gradient descent on the softmax cross-entropy loss.
fn fit_softmax(
    x: &[Vec<f64>],
    y: &[usize],
) -> Result<Vec<[f64; NUM_FEATURES + 1]>, PredictError> {
    let n = x.len() as f64;
    let mut weights = vec![[0.0f64; NUM_FEATURES + 1]; NUM_CLASSES];

    for _ in 0..TRAIN_STEPS {
        let mut grad = vec![[0.0f64; NUM_FEATURES + 1]; NUM_CLASSES];

        for (row, &label) in x.iter().zip(y) {
            let probs = softmax(&class_scores(&weights, row));
            for (c, grad_row) in grad.iter_mut().enumerate() {
                let err = probs[c] - if c == label { 1.0 } else { 0.0 };
                for (j, v) in row.iter().enumerate() {
                    grad_row[j] += err * v;
                }
                grad_row[NUM_FEATURES] += err; // bias
            }
        }

        for (w_row, g_row) in weights.iter_mut().zip(&grad) {
            for (w, g) in w_row.iter_mut().zip(g_row) {
                *w -= LEARNING_RATE * g / n;
            }
        }
    }

    if weights.iter().flatten().any(|w| !w.is_finite()) {
        return Err(PredictError::InvalidInput(
            "training diverged to non-finite weights".into(),
        ));
    }
    Ok(weights)
}

fn class_scores(weights: &[[f64; NUM_FEATURES + 1]], row: &[f64]) -> [f64; NUM_CLASSES] {
    let mut scores = [0.0; NUM_CLASSES];
    for (c, w) in weights.iter().enumerate() {
        let mut z = w[NUM_FEATURES]; // bias
        for (j, v) in row.iter().enumerate() {
            z += w[j] * v;
        }
        scores[c] = z;
    }
    scores
}

/// Numerically stable softmax (shifts by the max score before exponentiating)
fn softmax(scores: &[f64; NUM_CLASSES]) -> [f64; NUM_CLASSES] {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut out = [0.0; NUM_CLASSES];
    let mut sum = 0.0;
    for (o, s) in out.iter_mut().zip(scores) {
        *o = (s - max).exp();
        sum += *o;
    }
    for o in &mut out {
        *o /= sum;
    }
    out
}

fn argmax(scores: &[f64; NUM_CLASSES]) -> usize {
    let mut best = 0;
    for (c, s) in scores.iter().enumerate() {
        if *s > scores[best] {
            best = c;
        }
    }
    best
}
