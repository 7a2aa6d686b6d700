//! Adaptive probability threshold.
//!
//! The bar a calibrated probability has to clear before a signal is
//! actionable. Noisy (high-volatility) regimes raise the bar, persistent
//! trends lower it, and uniform recent price action relaxes it further. The
//! final threshold is clamped to a sane operating band so the engine never
//! demands a probability below coin-flip nor above an unreachable level.

use crate::config::ThresholdConfig;
use crate::engine::context::MarketContext;
use crate::types::{MarketRegime, ThresholdBreakdown, VolatilityRegime};

/// Computes the threshold and its mandatory additive decomposition.
#[derive(Debug, Clone)]
pub struct ThresholdCalculator {
    cfg: ThresholdConfig,
}

impl ThresholdCalculator {
    pub fn new(cfg: &ThresholdConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    pub fn compute(&self, ctx: &MarketContext) -> (f64, ThresholdBreakdown) {
        let vol_adjustment = match ctx.volatility_regime {
            VolatilityRegime::Low => self.cfg.vol_low_adj,
            VolatilityRegime::Normal => self.cfg.vol_normal_adj,
            VolatilityRegime::Elevated => self.cfg.vol_elevated_adj,
            VolatilityRegime::Extreme => self.cfg.vol_extreme_adj,
        };

        let regime_adjustment = match ctx.market_regime {
            MarketRegime::StrongUptrend | MarketRegime::StrongDowntrend => {
                self.cfg.regime_strong_adj
            }
            MarketRegime::Uptrend | MarketRegime::Downtrend => self.cfg.regime_trend_adj,
            MarketRegime::Sideways => self.cfg.regime_sideways_adj,
            MarketRegime::Choppy => self.cfg.regime_choppy_adj,
        };

        let trend_consistency = if ctx.trend_consistency >= self.cfg.consistency_floor {
            -self.cfg.consistency_relax * ctx.trend_consistency
        } else {
            0.0
        };

        let breakdown = ThresholdBreakdown {
            base: self.cfg.base,
            vol_adjustment,
            regime_adjustment,
            trend_consistency,
        };
        let threshold = breakdown.unclamped().clamp(self.cfg.min, self.cfg.max);

        (threshold, breakdown)
    }
}
