//! Probability calibration via temperature scaling.
//!
//! Raw sigmoid outputs from the model tend to be overconfident; dividing
//! the log-odds by a per-horizon temperature before re-applying the
//! logistic pulls them back toward observed frequencies. Temperatures are
//! fit offline ([`fit_temperature`]) against a validation set and carried
//! as read-only configuration.

use crate::config::CalibrationConfig;
use crate::error::{EngineError, Result};

/// Applies the per-horizon temperatures from configuration.
#[derive(Debug, Clone)]
pub struct Calibrator {
    temp_tomorrow: f64,
    temp_week: f64,
    epsilon: f64,
}

impl Calibrator {
    pub fn new(cfg: &CalibrationConfig) -> Self {
        Self {
            temp_tomorrow: cfg.temp_tomorrow,
            temp_week: cfg.temp_week,
            epsilon: cfg.epsilon,
        }
    }

    /// Calibrate a raw next-day probability.
    pub fn tomorrow(&self, raw: f64) -> f64 {
        calibrate(raw, self.temp_tomorrow, self.epsilon)
    }

    /// Calibrate a raw week-horizon probability.
    pub fn week(&self, raw: f64) -> f64 {
        calibrate(raw, self.temp_week, self.epsilon)
    }
}

/// Temperature-scale a single probability.
///
/// The input is clipped to `[epsilon, 1 - epsilon]` so the logit stays
/// finite; this clip is a numeric safeguard, not input validation, which
/// happens at the engine boundary. Pure, deterministic, and strictly
/// increasing in `raw` for any fixed positive temperature, with 0.5 as a
/// fixed point.
pub fn calibrate(raw: f64, temperature: f64, epsilon: f64) -> f64 {
    let p = raw.clamp(epsilon, 1.0 - epsilon);
    let logit = (p / (1.0 - p)).ln();
    1.0 / (1.0 + (-logit / temperature).exp())
}

/// Mean squared error between predicted probabilities and binary outcomes.
pub fn brier_score(probs: &[f64], outcomes: &[f64]) -> f64 {
    if probs.is_empty() {
        return f64::NAN;
    }
    probs
        .iter()
        .zip(outcomes)
        .map(|(p, y)| (p - y).powi(2))
        .sum::<f64>()
        / probs.len() as f64
}

/// Offline temperature search for one horizon.
///
/// Evaluates `grid_steps` evenly-spaced temperatures over
/// `[grid_min, grid_max]` and returns the one minimizing the Brier score of
/// the calibrated probabilities against realized outcomes.
pub fn fit_temperature(
    raw_probs: &[f64],
    outcomes: &[f64],
    cfg: &CalibrationConfig,
) -> Result<FittedTemperature> {
    if raw_probs.is_empty() {
        return Err(EngineError::invalid_input(
            "raw_probs",
            "empty validation set",
        ));
    }
    if raw_probs.len() != outcomes.len() {
        return Err(EngineError::invalid_input(
            "outcomes",
            format!(
                "length mismatch: {} probabilities vs {} outcomes",
                raw_probs.len(),
                outcomes.len()
            ),
        ));
    }
    if let Some(bad) = outcomes.iter().find(|y| **y != 0.0 && **y != 1.0) {
        return Err(EngineError::invalid_input(
            "outcomes",
            format!("expected binary outcomes, got {bad}"),
        ));
    }
    if cfg.grid_steps < 2 || cfg.grid_min <= 0.0 || cfg.grid_max <= cfg.grid_min {
        return Err(EngineError::Config(
            "invalid temperature grid configuration".into(),
        ));
    }

    let step = (cfg.grid_max - cfg.grid_min) / (cfg.grid_steps - 1) as f64;
    let mut best = FittedTemperature {
        temperature: cfg.grid_min,
        brier: f64::INFINITY,
        uncalibrated_brier: brier_score(raw_probs, outcomes),
    };

    for i in 0..cfg.grid_steps {
        let t = cfg.grid_min + step * i as f64;
        let calibrated: Vec<f64> = raw_probs
            .iter()
            .map(|p| calibrate(*p, t, cfg.epsilon))
            .collect();
        let brier = brier_score(&calibrated, outcomes);
        if brier < best.brier {
            best.temperature = t;
            best.brier = brier;
        }
    }

    tracing::debug!(
        temperature = best.temperature,
        brier = best.brier,
        uncalibrated = best.uncalibrated_brier,
        "temperature grid search complete"
    );
    Ok(best)
}

/// Result of the offline grid search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedTemperature {
    pub temperature: f64,
    /// Brier score at the selected temperature.
    pub brier: f64,
    /// Brier score of the raw probabilities, for comparison.
    pub uncalibrated_brier: f64,
}
