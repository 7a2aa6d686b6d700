//! Weighted signal scoring.
//!
//! Combines calibrated probability, realized reward-to-risk, market
//! alignment and volatility into a single 0-100 score from four
//! independently-bounded components (40/25/20/15 by default). Reasoning
//! strings are appended whenever a component crosses a notable boundary.

use crate::config::ScoringConfig;
use crate::engine::context::MarketContext;
use crate::types::{Direction, MarketRegime, ScoreBreakdown, VolatilityRegime};

/// Score plus its decomposition and the explanation lines collected while
/// scoring.
#[derive(Debug, Clone)]
pub struct ScoredSignal {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SignalScorer {
    cfg: ScoringConfig,
}

impl SignalScorer {
    pub fn new(cfg: &ScoringConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Score a signal. `prob_direction` is the calibrated probability on
    /// the called side (the complement of prob-up for downward calls).
    pub fn score(
        &self,
        direction: Direction,
        prob_direction: f64,
        threshold: f64,
        risk_reward: f64,
        ctx: &MarketContext,
    ) -> ScoredSignal {
        let mut reasoning = Vec::new();

        let probability = self.probability_component(prob_direction, threshold, &mut reasoning);
        let rr = self.risk_reward_component(risk_reward, &mut reasoning);
        let alignment = self.alignment_component(direction, ctx.market_regime, &mut reasoning);
        let volatility = self.volatility_component(ctx.volatility_regime, &mut reasoning);

        let breakdown = ScoreBreakdown {
            probability,
            risk_reward: rr,
            market_alignment: alignment,
            volatility,
        };
        let score = breakdown.total();

        tracing::debug!(
            score,
            probability,
            risk_reward = rr,
            market_alignment = alignment,
            volatility,
            "scored signal"
        );

        ScoredSignal {
            score,
            breakdown,
            reasoning,
        }
    }

    /// Linear in the margin above the threshold, saturating at the
    /// configured margin. No credit for probabilities below the bar.
    fn probability_component(
        &self,
        prob_direction: f64,
        threshold: f64,
        reasoning: &mut Vec<String>,
    ) -> f64 {
        let margin = prob_direction - threshold;
        let component =
            (margin / self.cfg.probability_saturation).clamp(0.0, 1.0) * self.cfg.max_probability;

        if margin >= self.cfg.probability_saturation {
            reasoning.push(format!(
                "✅ Calibrated probability {:.1}% clears the {:.1}% threshold by a wide margin",
                prob_direction * 100.0,
                threshold * 100.0
            ));
        } else if margin > 0.0 {
            reasoning.push(format!(
                "✅ Calibrated probability {:.1}% above the {:.1}% threshold",
                prob_direction * 100.0,
                threshold * 100.0
            ));
        }
        component
    }

    /// Monotonically increasing, saturating map of the realized R:R. A
    /// ratio at the 1.5:1 floor scores low-to-moderate; well above 2:1
    /// approaches the maximum.
    fn risk_reward_component(&self, risk_reward: f64, reasoning: &mut Vec<String>) -> f64 {
        let normalized = ((risk_reward - self.cfg.rr_base) / self.cfg.rr_span).clamp(0.0, 1.0);
        if risk_reward >= self.cfg.rr_base + self.cfg.rr_span {
            reasoning.push(format!("✅ High reward-to-risk ({risk_reward:.1}:1)"));
        }
        normalized * self.cfg.max_risk_reward
    }

    /// Full score for agreement with the regime's directional bias, partial
    /// for neutral regimes, near zero for direct contradiction.
    fn alignment_component(
        &self,
        direction: Direction,
        regime: MarketRegime,
        reasoning: &mut Vec<String>,
    ) -> f64 {
        let max = self.cfg.max_market_alignment;

        if direction == Direction::Neutral {
            return max * 0.5;
        }

        match regime.directional_bias() {
            None => match regime {
                MarketRegime::Choppy => max * 0.25,
                _ => max * 0.5,
            },
            Some(bias) if bias == direction => {
                if regime.is_strong_trend() {
                    reasoning.push(format!("✅ {direction} call aligned with {regime}"));
                    max
                } else {
                    max * 0.75
                }
            }
            Some(_) => {
                if regime.is_strong_trend() {
                    0.0
                } else {
                    max * 0.2
                }
            }
        }
    }

    /// Inverse to the volatility regime: calm tape scores near the maximum,
    /// noisy tape near zero.
    fn volatility_component(
        &self,
        regime: VolatilityRegime,
        reasoning: &mut Vec<String>,
    ) -> f64 {
        match regime {
            VolatilityRegime::Low => {
                reasoning.push("✅ Low volatility favours clean follow-through".to_string());
                self.cfg.vol_low_score
            }
            VolatilityRegime::Normal => self.cfg.vol_normal_score,
            VolatilityRegime::Elevated => self.cfg.vol_elevated_score,
            VolatilityRegime::Extreme => self.cfg.vol_extreme_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> SignalScorer {
        SignalScorer::new(&ScoringConfig::default())
    }

    fn ctx(regime: MarketRegime, vol: VolatilityRegime) -> MarketContext {
        MarketContext {
            market_regime: regime,
            volatility_regime: vol,
            volatility: 0.2,
            atr_pct: 1.5,
            trend_consistency: 0.6,
        }
    }

    #[test]
    fn test_components_within_declared_maxima() {
        let s = scorer();
        let probs = [0.40, 0.55, 0.60, 0.72, 0.95];
        let rrs = [1.5, 2.0, 3.5, 10.0];
        let regimes = [
            MarketRegime::StrongUptrend,
            MarketRegime::Uptrend,
            MarketRegime::Sideways,
            MarketRegime::Downtrend,
            MarketRegime::StrongDowntrend,
            MarketRegime::Choppy,
        ];
        let vols = [
            VolatilityRegime::Low,
            VolatilityRegime::Normal,
            VolatilityRegime::Elevated,
            VolatilityRegime::Extreme,
        ];
        for p in probs {
            for rr in rrs {
                for regime in regimes {
                    for vol in vols {
                        for dir in [Direction::Up, Direction::Down] {
                            let scored = s.score(dir, p, 0.58, rr, &ctx(regime, vol));
                            let b = scored.breakdown;
                            assert!((0.0..=40.0).contains(&b.probability));
                            assert!((0.0..=25.0).contains(&b.risk_reward));
                            assert!((0.0..=20.0).contains(&b.market_alignment));
                            assert!((0.0..=15.0).contains(&b.volatility));
                            assert!((0.0..=100.0).contains(&scored.score));
                            assert!((scored.score - b.total()).abs() < 1e-12);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_probability_component_monotone_in_margin() {
        let s = scorer();
        let c = ctx(MarketRegime::Sideways, VolatilityRegime::Normal);
        let mut prev = -1.0;
        for i in 0..20 {
            let p = 0.50 + i as f64 * 0.02;
            let scored = s.score(Direction::Up, p, 0.58, 2.0, &c);
            assert!(scored.breakdown.probability >= prev);
            prev = scored.breakdown.probability;
        }
    }

    #[test]
    fn test_probability_saturates_at_max() {
        let s = scorer();
        let c = ctx(MarketRegime::Sideways, VolatilityRegime::Normal);
        let scored = s.score(Direction::Up, 0.95, 0.58, 2.0, &c);
        assert!((scored.breakdown.probability - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_probability_credit_below_threshold() {
        let s = scorer();
        let c = ctx(MarketRegime::Sideways, VolatilityRegime::Normal);
        let scored = s.score(Direction::Up, 0.52, 0.60, 2.0, &c);
        assert_eq!(scored.breakdown.probability, 0.0);
    }

    #[test]
    fn test_rr_floor_scores_low_to_moderate() {
        let s = scorer();
        let c = ctx(MarketRegime::Sideways, VolatilityRegime::Normal);
        let at_floor = s.score(Direction::Up, 0.70, 0.58, 1.5, &c);
        let well_above = s.score(Direction::Up, 0.70, 0.58, 2.6, &c);
        assert!(at_floor.breakdown.risk_reward < 10.0);
        assert!((well_above.breakdown.risk_reward - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_alignment_full_for_agreement_zero_for_strong_contradiction() {
        let s = scorer();
        let aligned = s.score(
            Direction::Up,
            0.70,
            0.58,
            2.0,
            &ctx(MarketRegime::StrongUptrend, VolatilityRegime::Normal),
        );
        assert_eq!(aligned.breakdown.market_alignment, 20.0);

        let contra = s.score(
            Direction::Up,
            0.70,
            0.58,
            2.0,
            &ctx(MarketRegime::StrongDowntrend, VolatilityRegime::Normal),
        );
        assert_eq!(contra.breakdown.market_alignment, 0.0);
    }

    #[test]
    fn test_alignment_partial_for_neutral_regimes() {
        let s = scorer();
        let sideways = s.score(
            Direction::Up,
            0.70,
            0.58,
            2.0,
            &ctx(MarketRegime::Sideways, VolatilityRegime::Normal),
        );
        assert_eq!(sideways.breakdown.market_alignment, 10.0);

        let choppy = s.score(
            Direction::Up,
            0.70,
            0.58,
            2.0,
            &ctx(MarketRegime::Choppy, VolatilityRegime::Normal),
        );
        assert_eq!(choppy.breakdown.market_alignment, 5.0);
    }

    #[test]
    fn test_volatility_component_inverse_to_regime() {
        let s = scorer();
        let mut prev = f64::INFINITY;
        for vol in [
            VolatilityRegime::Low,
            VolatilityRegime::Normal,
            VolatilityRegime::Elevated,
            VolatilityRegime::Extreme,
        ] {
            let scored = s.score(
                Direction::Up,
                0.70,
                0.58,
                2.0,
                &ctx(MarketRegime::Sideways, vol),
            );
            assert!(scored.breakdown.volatility < prev);
            prev = scored.breakdown.volatility;
        }
        // extreme volatility scores near zero
        assert!(prev <= 1.0);
    }

    #[test]
    fn test_reasoning_emitted_at_notable_boundaries() {
        let s = scorer();
        let scored = s.score(
            Direction::Up,
            0.80,
            0.58,
            3.0,
            &ctx(MarketRegime::StrongUptrend, VolatilityRegime::Low),
        );
        assert!(scored.reasoning.iter().any(|r| r.contains("wide margin")));
        assert!(scored
            .reasoning
            .iter()
            .any(|r| r.contains("reward-to-risk")));
        assert!(scored.reasoning.iter().any(|r| r.contains("aligned")));
    }
}
