//! Engine configuration.
//!
//! Every tunable constant of the decision engine lives here as an explicit,
//! immutable configuration struct passed into the components at
//! construction. Loaded once at startup from an optional TOML file plus
//! `STOCK_PREDICTOR_*` environment overrides, and never mutated afterwards.
//!
//! Defaults match the values the model was validated with; an empty config
//! file deserializes to exactly [`EngineConfig::default`].

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub calibration: CalibrationConfig,
    pub context: ContextConfig,
    pub threshold: ThresholdConfig,
    pub scoring: ScoringConfig,
    pub risk: RiskConfig,
    pub validation: ValidationAccuracy,
}

impl EngineConfig {
    /// Load configuration from a TOML file (optional) with environment
    /// overrides, e.g. `STOCK_PREDICTOR_THRESHOLD__BASE=0.60`.
    pub fn load(path: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("STOCK_PREDICTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let cfg: EngineConfig = cfg
            .try_deserialize()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations that would break engine invariants.
    pub fn validate(&self) -> Result<()> {
        if self.calibration.temp_tomorrow <= 0.0 || self.calibration.temp_week <= 0.0 {
            return Err(EngineError::Config(
                "calibration temperatures must be positive".into(),
            ));
        }
        if !(0.0 < self.calibration.epsilon && self.calibration.epsilon < 0.5) {
            return Err(EngineError::Config(
                "calibration epsilon must be in (0, 0.5)".into(),
            ));
        }
        if self.threshold.min > self.threshold.max {
            return Err(EngineError::Config(
                "threshold.min must not exceed threshold.max".into(),
            ));
        }
        if self.threshold.base < self.threshold.min || self.threshold.base > self.threshold.max {
            return Err(EngineError::Config(
                "threshold.base must lie within [threshold.min, threshold.max]".into(),
            ));
        }
        if self.risk.rr_floor < 1.0 {
            return Err(EngineError::Config(
                "risk.rr_floor must be at least 1.0".into(),
            ));
        }
        if self.risk.band_width_cap <= 0.0 || self.risk.band_width_cap >= 1.0 {
            return Err(EngineError::Config(
                "risk.band_width_cap must be in (0, 1)".into(),
            ));
        }
        let s = &self.scoring;
        for (name, value, max) in [
            ("vol_low_score", s.vol_low_score, s.max_volatility),
            ("vol_normal_score", s.vol_normal_score, s.max_volatility),
            ("vol_elevated_score", s.vol_elevated_score, s.max_volatility),
            ("vol_extreme_score", s.vol_extreme_score, s.max_volatility),
        ] {
            if value < 0.0 || value > max {
                return Err(EngineError::Config(format!(
                    "scoring.{name} must lie within [0, {max}]"
                )));
            }
        }
        for (name, acc) in [
            ("tomorrow", self.validation.tomorrow),
            ("week", self.validation.week),
        ] {
            if !(0.0..=1.0).contains(&acc) {
                return Err(EngineError::Config(format!(
                    "validation.{name} accuracy must lie within [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Temperature-scaling parameters, one temperature per horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Temperature for the next-day horizon.
    pub temp_tomorrow: f64,
    /// Temperature for the week horizon.
    pub temp_week: f64,
    /// Clip bound keeping the logit transform finite.
    pub epsilon: f64,
    /// Grid bounds and resolution for the offline temperature search.
    pub grid_min: f64,
    pub grid_max: f64,
    pub grid_steps: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            temp_tomorrow: 1.5,
            temp_week: 1.2,
            epsilon: 1e-7,
            grid_min: 0.5,
            grid_max: 3.0,
            grid_steps: 50,
        }
    }
}

/// Fixed cutoffs for market- and volatility-regime classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Annualized realized volatility below this is a low-vol regime.
    pub vol_low: f64,
    /// Below this, normal; above, elevated.
    pub vol_normal: f64,
    /// Above this, extreme.
    pub vol_elevated: f64,
    /// ATR% at or above this (without a strong trend) marks a choppy market.
    pub choppy_atr_pct: f64,
    /// Daily trend slope magnitude qualifying as a strong trend.
    pub strong_slope: f64,
    /// Daily trend slope magnitude qualifying as a trend at all.
    pub trend_slope: f64,
    /// Trend consistency required for the strong-trend regimes.
    pub strong_consistency: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            vol_low: 0.15,
            vol_normal: 0.25,
            vol_elevated: 0.40,
            choppy_atr_pct: 4.0,
            strong_slope: 0.004,
            trend_slope: 0.001,
            strong_consistency: 0.60,
        }
    }
}

/// Adaptive-threshold parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub base: f64,
    /// Operating band: the engine never demands a probability below `min`
    /// nor above `max`.
    pub min: f64,
    pub max: f64,
    pub vol_low_adj: f64,
    pub vol_normal_adj: f64,
    pub vol_elevated_adj: f64,
    pub vol_extreme_adj: f64,
    pub regime_strong_adj: f64,
    pub regime_trend_adj: f64,
    pub regime_sideways_adj: f64,
    pub regime_choppy_adj: f64,
    /// Per-unit-of-consistency relaxation applied above `consistency_floor`.
    pub consistency_relax: f64,
    pub consistency_floor: f64,
    /// Near-miss band below the threshold that maps to WAIT instead of
    /// NO TRADE.
    pub wait_margin: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base: 0.58,
            min: 0.50,
            max: 0.75,
            vol_low_adj: -0.02,
            vol_normal_adj: 0.0,
            vol_elevated_adj: 0.03,
            vol_extreme_adj: 0.06,
            regime_strong_adj: -0.03,
            regime_trend_adj: -0.015,
            regime_sideways_adj: 0.02,
            regime_choppy_adj: 0.04,
            consistency_relax: 0.02,
            consistency_floor: 0.5,
            wait_margin: 0.03,
        }
    }
}

/// Signal-score component weights and shaping parameters. The four maxima
/// sum to 100 by default (40/25/20/15).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub max_probability: f64,
    pub max_risk_reward: f64,
    pub max_market_alignment: f64,
    pub max_volatility: f64,
    /// Probability margin above the threshold at which the probability
    /// component saturates.
    pub probability_saturation: f64,
    /// R:R mapping: `(rr - rr_base) / rr_span`, clamped to [0, 1].
    pub rr_base: f64,
    pub rr_span: f64,
    /// Volatility component points per regime.
    pub vol_low_score: f64,
    pub vol_normal_score: f64,
    pub vol_elevated_score: f64,
    pub vol_extreme_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_probability: 40.0,
            max_risk_reward: 25.0,
            max_market_alignment: 20.0,
            max_volatility: 15.0,
            probability_saturation: 0.15,
            rr_base: 1.0,
            rr_span: 1.5,
            vol_low_score: 15.0,
            vol_normal_score: 12.0,
            vol_elevated_score: 5.0,
            vol_extreme_score: 1.0,
        }
    }
}

/// Risk/target planning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Hard floor on the realized reward-to-risk ratio.
    pub rr_floor: f64,
    /// Stop distance in multiples of ATR, before any floor tightening.
    pub stop_atr_mult: f64,
    /// Minimum gross move as a multiple of ATR, guarding tiny return
    /// estimates.
    pub min_move_atr_mult: f64,
    /// Cap on the target-band half-width as a fraction of the gross move.
    pub band_width_cap: f64,
    /// Volatility and ATR weights shaping the band half-width.
    pub band_vol_weight: f64,
    pub band_atr_weight: f64,
    /// R:R below this draws a marginal-R:R warning.
    pub marginal_rr: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            rr_floor: 1.5,
            stop_atr_mult: 1.0,
            min_move_atr_mult: 0.5,
            band_width_cap: 0.5,
            band_vol_weight: 5.0,
            band_atr_weight: 2.5,
            marginal_rr: 2.0,
        }
    }
}

/// Historical validation accuracy per horizon, used only to shape the
/// confidence label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationAccuracy {
    pub tomorrow: f64,
    pub week: f64,
}

impl Default for ValidationAccuracy {
    fn default() -> Self {
        Self {
            tomorrow: 0.597,
            week: 0.674,
        }
    }
}
