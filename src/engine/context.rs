//! Market-context classification.
//!
//! Derives a market-regime label and a volatility-regime label from summary
//! statistics of recent price history. The statistics themselves (trend
//! slope, trend consistency, realized volatility, ATR%) are computed by the
//! upstream feature pipeline; this module only applies fixed, documented
//! cutoffs so that the same inputs always yield the same labels.

use serde::{Deserialize, Serialize};

use crate::config::ContextConfig;
use crate::error::{EngineError, Result};
use crate::types::{MarketRegime, VolatilityRegime};

/// Summary statistics of recent price history, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    /// Average daily fractional price change over the lookback window.
    pub trend_slope: f64,
    /// Fraction of recent days moving in the dominant direction, in [0, 1].
    pub trend_consistency: f64,
    /// Annualized realized volatility.
    pub realized_vol: f64,
    /// Average true range as a percentage of price.
    pub atr_pct: f64,
}

/// Classified market context consumed by the threshold calculator, scorer
/// and decision mapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketContext {
    pub market_regime: MarketRegime,
    pub volatility_regime: VolatilityRegime,
    pub volatility: f64,
    pub atr_pct: f64,
    pub trend_consistency: f64,
}

/// Applies the fixed regime cutoffs from configuration.
#[derive(Debug, Clone)]
pub struct ContextClassifier {
    cfg: ContextConfig,
}

impl ContextClassifier {
    pub fn new(cfg: &ContextConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Classify the supplied statistics. Fails fast on missing or
    /// nonsensical statistics rather than guessing a regime.
    pub fn classify(&self, stats: &MarketStats) -> Result<MarketContext> {
        validate_stats(stats)?;

        let volatility_regime = self.volatility_regime(stats.realized_vol);
        let market_regime = self.market_regime(stats);

        tracing::debug!(
            ?market_regime,
            ?volatility_regime,
            slope = stats.trend_slope,
            consistency = stats.trend_consistency,
            atr_pct = stats.atr_pct,
            "classified market context"
        );

        Ok(MarketContext {
            market_regime,
            volatility_regime,
            volatility: stats.realized_vol,
            atr_pct: stats.atr_pct,
            trend_consistency: stats.trend_consistency,
        })
    }

    fn volatility_regime(&self, realized_vol: f64) -> VolatilityRegime {
        if realized_vol < self.cfg.vol_low {
            VolatilityRegime::Low
        } else if realized_vol < self.cfg.vol_normal {
            VolatilityRegime::Normal
        } else if realized_vol < self.cfg.vol_elevated {
            VolatilityRegime::Elevated
        } else {
            VolatilityRegime::Extreme
        }
    }

    fn market_regime(&self, stats: &MarketStats) -> MarketRegime {
        let slope = stats.trend_slope;
        let consistency = stats.trend_consistency;

        // Wide ranges without a strong trend are whipsaw, not direction.
        if stats.atr_pct >= self.cfg.choppy_atr_pct && slope.abs() < self.cfg.strong_slope {
            return MarketRegime::Choppy;
        }

        if slope >= self.cfg.strong_slope && consistency >= self.cfg.strong_consistency {
            MarketRegime::StrongUptrend
        } else if slope >= self.cfg.trend_slope {
            MarketRegime::Uptrend
        } else if slope <= -self.cfg.strong_slope && consistency >= self.cfg.strong_consistency {
            MarketRegime::StrongDowntrend
        } else if slope <= -self.cfg.trend_slope {
            MarketRegime::Downtrend
        } else {
            MarketRegime::Sideways
        }
    }
}

fn validate_stats(stats: &MarketStats) -> Result<()> {
    if !stats.trend_slope.is_finite() {
        return Err(EngineError::InsufficientContext(format!(
            "trend_slope is not finite: {}",
            stats.trend_slope
        )));
    }
    if !stats.trend_consistency.is_finite() || !(0.0..=1.0).contains(&stats.trend_consistency) {
        return Err(EngineError::InsufficientContext(format!(
            "trend_consistency must lie within [0, 1], got {}",
            stats.trend_consistency
        )));
    }
    if !stats.realized_vol.is_finite() || stats.realized_vol < 0.0 {
        return Err(EngineError::InsufficientContext(format!(
            "realized_vol must be finite and non-negative, got {}",
            stats.realized_vol
        )));
    }
    if !stats.atr_pct.is_finite() || stats.atr_pct < 0.0 {
        return Err(EngineError::InsufficientContext(format!(
            "atr_pct must be finite and non-negative, got {}",
            stats.atr_pct
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ContextClassifier {
        ContextClassifier::new(&ContextConfig::default())
    }

    fn stats(slope: f64, consistency: f64, vol: f64, atr_pct: f64) -> MarketStats {
        MarketStats {
            trend_slope: slope,
            trend_consistency: consistency,
            realized_vol: vol,
            atr_pct,
        }
    }

    #[test]
    fn test_strong_uptrend() {
        let ctx = classifier()
            .classify(&stats(0.006, 0.75, 0.18, 1.5))
            .unwrap();
        assert_eq!(ctx.market_regime, MarketRegime::StrongUptrend);
        assert_eq!(ctx.volatility_regime, VolatilityRegime::Normal);
    }

    #[test]
    fn test_strong_slope_without_consistency_is_plain_uptrend() {
        let ctx = classifier()
            .classify(&stats(0.006, 0.40, 0.18, 1.5))
            .unwrap();
        assert_eq!(ctx.market_regime, MarketRegime::Uptrend);
    }

    #[test]
    fn test_downtrends_mirror_uptrends() {
        let c = classifier();
        let strong = c.classify(&stats(-0.006, 0.75, 0.18, 1.5)).unwrap();
        assert_eq!(strong.market_regime, MarketRegime::StrongDowntrend);

        let weak = c.classify(&stats(-0.002, 0.50, 0.18, 1.5)).unwrap();
        assert_eq!(weak.market_regime, MarketRegime::Downtrend);
    }

    #[test]
    fn test_sideways_for_flat_slope() {
        let ctx = classifier()
            .classify(&stats(0.0005, 0.50, 0.18, 1.5))
            .unwrap();
        assert_eq!(ctx.market_regime, MarketRegime::Sideways);
    }

    #[test]
    fn test_choppy_beats_weak_trend() {
        let ctx = classifier()
            .classify(&stats(0.002, 0.55, 0.30, 5.0))
            .unwrap();
        assert_eq!(ctx.market_regime, MarketRegime::Choppy);
    }

    #[test]
    fn test_strong_trend_overrides_choppy_atr() {
        let ctx = classifier()
            .classify(&stats(0.006, 0.80, 0.30, 5.0))
            .unwrap();
        assert_eq!(ctx.market_regime, MarketRegime::StrongUptrend);
    }

    #[test]
    fn test_volatility_regime_boundaries() {
        let c = classifier();
        let cases = [
            (0.10, VolatilityRegime::Low),
            (0.15, VolatilityRegime::Normal),
            (0.249, VolatilityRegime::Normal),
            (0.25, VolatilityRegime::Elevated),
            (0.40, VolatilityRegime::Extreme),
            (0.90, VolatilityRegime::Extreme),
        ];
        for (vol, expected) in cases {
            let ctx = c.classify(&stats(0.0, 0.5, vol, 1.0)).unwrap();
            assert_eq!(ctx.volatility_regime, expected, "vol={vol}");
        }
    }

    #[test]
    fn test_determinism() {
        let c = classifier();
        let s = stats(0.003, 0.62, 0.22, 2.0);
        let a = c.classify(&s).unwrap();
        let b = c.classify(&s).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_stats() {
        let c = classifier();
        assert!(c.classify(&stats(f64::NAN, 0.5, 0.2, 1.0)).is_err());
        assert!(c.classify(&stats(0.0, 1.5, 0.2, 1.0)).is_err());
        assert!(c.classify(&stats(0.0, 0.5, -0.1, 1.0)).is_err());
        assert!(c.classify(&stats(0.0, 0.5, 0.2, f64::INFINITY)).is_err());
    }
}
