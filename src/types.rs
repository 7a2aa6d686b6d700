//! Core value objects shared across the engine.
//!
//! The central type is [`PredictionResult`]: one immutable, fully-populated
//! decision object per symbol per invocation, built exclusively by the
//! decision mapper once every upstream component has run. Callers may
//! serialize or display it but never mutate it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicted direction of the move over the week horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    /// Calibrated probability sits exactly at coin-flip.
    Neutral,
}

impl Direction {
    /// Derive a direction from a calibrated probability of an upward move.
    pub fn from_prob_up(prob_up: f64) -> Self {
        if prob_up > 0.5 {
            Direction::Up
        } else if prob_up < 0.5 {
            Direction::Down
        } else {
            Direction::Neutral
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Coarse classification of recent price-trend behaviour.
///
/// Boundaries are fixed numeric cutoffs in
/// [`ContextConfig`](crate::config::ContextConfig), applied consistently by
/// the threshold calculator and the signal scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegime {
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    StrongDowntrend,
    /// High-volatility whipsaw with no persistent direction.
    Choppy,
}

impl MarketRegime {
    /// Directional bias of the regime, if it has one.
    pub fn directional_bias(&self) -> Option<Direction> {
        match self {
            MarketRegime::StrongUptrend | MarketRegime::Uptrend => Some(Direction::Up),
            MarketRegime::StrongDowntrend | MarketRegime::Downtrend => Some(Direction::Down),
            MarketRegime::Sideways | MarketRegime::Choppy => None,
        }
    }

    /// Whether this is one of the strongly-trending regimes.
    pub fn is_strong_trend(&self) -> bool {
        matches!(
            self,
            MarketRegime::StrongUptrend | MarketRegime::StrongDowntrend
        )
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketRegime::StrongUptrend => "strong uptrend",
            MarketRegime::Uptrend => "uptrend",
            MarketRegime::Sideways => "sideways",
            MarketRegime::Downtrend => "downtrend",
            MarketRegime::StrongDowntrend => "strong downtrend",
            MarketRegime::Choppy => "choppy",
        };
        write!(f, "{s}")
    }
}

/// Realized-volatility regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Low,
    Normal,
    Elevated,
    Extreme,
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolatilityRegime::Low => "low",
            VolatilityRegime::Normal => "normal",
            VolatilityRegime::Elevated => "elevated",
            VolatilityRegime::Extreme => "extreme",
        };
        write!(f, "{s}")
    }
}

/// Discretized quality of the composite signal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalStrength {
    Excellent,
    Good,
    Marginal,
    Weak,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalStrength::Excellent => "excellent",
            SignalStrength::Good => "good",
            SignalStrength::Marginal => "marginal",
            SignalStrength::Weak => "weak",
        };
        write!(f, "{s}")
    }
}

/// Confidence label shaped by calibrated probability and the historical
/// validation accuracy of the relevant horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        write!(f, "{s}")
    }
}

/// Discrete trading recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    StrongBuy,
    Buy,
    CautiousBuy,
    CautiousSell,
    Sell,
    StrongSell,
    /// Probability is a near-miss against the threshold; worth monitoring.
    Wait,
    /// No actionable edge, or direction is ambiguous.
    NoTrade,
}

impl Action {
    pub fn is_buy(&self) -> bool {
        matches!(self, Action::StrongBuy | Action::Buy | Action::CautiousBuy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(
            self,
            Action::StrongSell | Action::Sell | Action::CautiousSell
        )
    }

    pub fn is_actionable(&self) -> bool {
        self.is_buy() || self.is_sell()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::StrongBuy => "STRONG BUY",
            Action::Buy => "BUY",
            Action::CautiousBuy => "CAUTIOUS BUY",
            Action::CautiousSell => "CAUTIOUS SELL",
            Action::Sell => "SELL",
            Action::StrongSell => "STRONG SELL",
            Action::Wait => "WAIT",
            Action::NoTrade => "NO TRADE",
        };
        write!(f, "{s}")
    }
}

/// Additive decomposition of the composite 0-100 signal score.
///
/// Invariant: each component is non-negative, bounded by its configured
/// maximum (40/25/20/15 by default), and the total equals the sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub probability: f64,
    pub risk_reward: f64,
    pub market_alignment: f64,
    pub volatility: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.probability + self.risk_reward + self.market_alignment + self.volatility
    }
}

/// Additive decomposition of the adaptive threshold. Always reported
/// alongside the threshold itself for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBreakdown {
    pub base: f64,
    pub vol_adjustment: f64,
    pub regime_adjustment: f64,
    pub trend_consistency: f64,
}

impl ThresholdBreakdown {
    /// Sum of the components before the operating-band clamp.
    pub fn unclamped(&self) -> f64 {
        self.base + self.vol_adjustment + self.regime_adjustment + self.trend_consistency
    }
}

/// One fully-specified, explainable trading recommendation.
///
/// Constructed exactly once per request by the decision mapper; never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub symbol: String,
    pub current_price: f64,
    pub price_date: NaiveDate,

    pub week_direction: Direction,
    pub week_prob_up: f64,

    pub signal_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub signal_strength: SignalStrength,
    pub confidence: Confidence,

    pub adaptive_threshold: f64,
    pub threshold_breakdown: ThresholdBreakdown,

    pub target_low: f64,
    pub target_high: f64,
    /// Expected move over the week horizon, signed, in percent of price.
    pub expected_return: f64,
    pub stop_loss: f64,
    /// Loss at the stop, in percent of price, always positive.
    pub max_loss: f64,
    pub risk_reward: f64,

    pub market_regime: MarketRegime,
    /// Annualized realized volatility supplied by the feature pipeline.
    pub volatility: f64,
    pub volatility_regime: VolatilityRegime,
    /// Average true range as a percentage of price, passed through unchanged.
    pub atr_pct: f64,

    pub action: Action,
    pub reasoning: Vec<String>,
    pub warnings: Vec<String>,
}

impl PredictionResult {
    /// Flatten into a single-level record suitable for appending to a
    /// prediction log or bulk columnar export.
    pub fn to_record(&self) -> PredictionRecord {
        PredictionRecord {
            symbol: self.symbol.clone(),
            current_price: self.current_price,
            price_date: self.price_date,
            week_direction: self.week_direction.to_string(),
            week_prob_up: self.week_prob_up,
            signal_score: self.signal_score,
            score_probability: self.score_breakdown.probability,
            score_risk_reward: self.score_breakdown.risk_reward,
            score_market_alignment: self.score_breakdown.market_alignment,
            score_volatility: self.score_breakdown.volatility,
            signal_strength: self.signal_strength.to_string(),
            confidence: self.confidence.to_string(),
            adaptive_threshold: self.adaptive_threshold,
            threshold_base: self.threshold_breakdown.base,
            threshold_vol_adjustment: self.threshold_breakdown.vol_adjustment,
            threshold_regime_adjustment: self.threshold_breakdown.regime_adjustment,
            threshold_trend_consistency: self.threshold_breakdown.trend_consistency,
            target_low: self.target_low,
            target_high: self.target_high,
            expected_return: self.expected_return,
            stop_loss: self.stop_loss,
            max_loss: self.max_loss,
            risk_reward: self.risk_reward,
            market_regime: self.market_regime.to_string(),
            volatility: self.volatility,
            volatility_regime: self.volatility_regime.to_string(),
            atr_pct: self.atr_pct,
            action: self.action.to_string(),
            reasoning: self.reasoning.join(" | "),
            warnings: self.warnings.join(" | "),
        }
    }
}

/// Flat, single-level projection of [`PredictionResult`] with the nested
/// breakdowns expanded into prefixed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub symbol: String,
    pub current_price: f64,
    pub price_date: NaiveDate,
    pub week_direction: String,
    pub week_prob_up: f64,
    pub signal_score: f64,
    pub score_probability: f64,
    pub score_risk_reward: f64,
    pub score_market_alignment: f64,
    pub score_volatility: f64,
    pub signal_strength: String,
    pub confidence: String,
    pub adaptive_threshold: f64,
    pub threshold_base: f64,
    pub threshold_vol_adjustment: f64,
    pub threshold_regime_adjustment: f64,
    pub threshold_trend_consistency: f64,
    pub target_low: f64,
    pub target_high: f64,
    pub expected_return: f64,
    pub stop_loss: f64,
    pub max_loss: f64,
    pub risk_reward: f64,
    pub market_regime: String,
    pub volatility: f64,
    pub volatility_regime: String,
    pub atr_pct: f64,
    pub action: String,
    pub reasoning: String,
    pub warnings: String,
}
