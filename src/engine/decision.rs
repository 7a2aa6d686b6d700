//! Decision mapping.
//!
//! Maps the scored, planned and classified signal onto exactly one discrete
//! action, assembles the reasoning and warning lists, and constructs the
//! single immutable [`PredictionResult`]. This is a pure one-step
//! classification: there are no transitions, retries or partial states, and
//! no other component may produce a result object.
//!
//! The `signal_strength` and `confidence` discretizations are ordered
//! boundary tables, not nested conditionals, so they stay easy to tune and
//! to test exhaustively.

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::engine::context::MarketContext;
use crate::engine::risk::RiskPlan;
use crate::engine::scoring::ScoredSignal;
use crate::types::{
    Action, Confidence, Direction, PredictionResult, SignalStrength, ThresholdBreakdown,
};

/// Score tiers shared by `signal_strength` and the intensity grading of
/// cleared signals. First boundary the score meets wins.
const STRENGTH_TIERS: &[(f64, SignalStrength)] = &[
    (75.0, SignalStrength::Excellent),
    (65.0, SignalStrength::Good),
    (55.0, SignalStrength::Marginal),
];

/// Confidence tiers over `prob_direction x validation accuracy`.
const CONFIDENCE_TIERS: &[(f64, Confidence)] =
    &[(0.45, Confidence::High), (0.38, Confidence::Medium)];

pub fn strength_for(score: f64) -> SignalStrength {
    STRENGTH_TIERS
        .iter()
        .find(|(bound, _)| score >= *bound)
        .map(|(_, s)| *s)
        .unwrap_or(SignalStrength::Weak)
}

pub fn confidence_for(prob_direction: f64, validation_accuracy: f64) -> Confidence {
    let edge = prob_direction * validation_accuracy;
    CONFIDENCE_TIERS
        .iter()
        .find(|(bound, _)| edge >= *bound)
        .map(|(_, c)| *c)
        .unwrap_or(Confidence::Low)
}

/// Everything the mapper needs, produced by the upstream components.
#[derive(Debug, Clone)]
pub struct DecisionInputs {
    pub symbol: String,
    pub current_price: f64,
    pub price_date: NaiveDate,
    pub direction: Direction,
    pub week_prob_up: f64,
    /// Calibrated week probability on the called side.
    pub prob_direction: f64,
    /// Calibrated next-day probability, used for the horizon-agreement
    /// check only.
    pub tomorrow_prob_up: f64,
    pub threshold: f64,
    pub threshold_breakdown: ThresholdBreakdown,
    pub scored: ScoredSignal,
    pub plan: RiskPlan,
}

#[derive(Debug, Clone)]
pub struct DecisionMapper {
    wait_margin: f64,
    marginal_rr: f64,
    tomorrow_accuracy: f64,
    week_accuracy: f64,
}

impl DecisionMapper {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            wait_margin: cfg.threshold.wait_margin,
            marginal_rr: cfg.risk.marginal_rr,
            tomorrow_accuracy: cfg.validation.tomorrow,
            week_accuracy: cfg.validation.week,
        }
    }

    pub fn map(&self, inputs: DecisionInputs, ctx: &MarketContext) -> PredictionResult {
        let strength = strength_for(inputs.scored.score);
        let confidence = confidence_for(inputs.prob_direction, self.week_accuracy);

        let mut reasoning = inputs.scored.reasoning.clone();
        let mut warnings = Vec::new();

        let action = self.select_action(&inputs, strength, &mut reasoning, &mut warnings);
        self.collect_warnings(&inputs, ctx, confidence, &mut warnings);

        let week_up = inputs.week_prob_up >= 0.5;
        let tomorrow_up = inputs.tomorrow_prob_up >= 0.5;
        if week_up == tomorrow_up {
            if inputs.direction != Direction::Neutral {
                reasoning.push(format!(
                    "✅ Tomorrow and week horizons agree on direction (validated at {:.1}% / {:.1}%)",
                    self.tomorrow_accuracy * 100.0,
                    self.week_accuracy * 100.0
                ));
            }
        } else {
            warnings.push("⚠️ Tomorrow and week horizons disagree on direction".to_string());
        }

        tracing::info!(
            symbol = %inputs.symbol,
            %action,
            score = inputs.scored.score,
            prob = inputs.prob_direction,
            threshold = inputs.threshold,
            "decision mapped"
        );

        PredictionResult {
            symbol: inputs.symbol,
            current_price: inputs.current_price,
            price_date: inputs.price_date,
            week_direction: inputs.direction,
            week_prob_up: inputs.week_prob_up,
            signal_score: inputs.scored.score,
            score_breakdown: inputs.scored.breakdown,
            signal_strength: strength,
            confidence,
            adaptive_threshold: inputs.threshold,
            threshold_breakdown: inputs.threshold_breakdown,
            target_low: inputs.plan.target_low,
            target_high: inputs.plan.target_high,
            expected_return: inputs.plan.expected_return,
            stop_loss: inputs.plan.stop_loss,
            max_loss: inputs.plan.max_loss,
            risk_reward: inputs.plan.risk_reward,
            market_regime: ctx.market_regime,
            volatility: ctx.volatility,
            volatility_regime: ctx.volatility_regime,
            atr_pct: ctx.atr_pct,
            action,
            reasoning,
            warnings,
        }
    }

    fn select_action(
        &self,
        inputs: &DecisionInputs,
        strength: SignalStrength,
        reasoning: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) -> Action {
        if inputs.direction == Direction::Neutral {
            reasoning.push(
                "📊 NO TRADE: calibrated probability sits at coin-flip, direction is ambiguous"
                    .to_string(),
            );
            warnings.push("⚠️ No directional edge in either direction".to_string());
            return Action::NoTrade;
        }

        let shortfall = inputs.threshold - inputs.prob_direction;
        if shortfall > 0.0 {
            warnings.push(format!(
                "⚠️ Insufficient edge: {:.1}% vs {:.1}% threshold",
                inputs.prob_direction * 100.0,
                inputs.threshold * 100.0
            ));
            return if shortfall <= self.wait_margin {
                reasoning.push(format!(
                    "📊 WAIT: {} probability {:.1}% is a near-miss against the {:.1}% threshold, worth monitoring",
                    inputs.direction,
                    inputs.prob_direction * 100.0,
                    inputs.threshold * 100.0
                ));
                Action::Wait
            } else {
                reasoning.push(format!(
                    "📊 NO TRADE: {} probability {:.1}% well short of the {:.1}% threshold",
                    inputs.direction,
                    inputs.prob_direction * 100.0,
                    inputs.threshold * 100.0
                ));
                Action::NoTrade
            };
        }

        // Threshold cleared: grade intensity by the same tiers as
        // signal_strength.
        let buying = inputs.direction == Direction::Up;
        let action = match strength {
            SignalStrength::Excellent => {
                if buying {
                    Action::StrongBuy
                } else {
                    Action::StrongSell
                }
            }
            SignalStrength::Good => {
                if buying {
                    Action::Buy
                } else {
                    Action::Sell
                }
            }
            SignalStrength::Marginal => {
                if buying {
                    Action::CautiousBuy
                } else {
                    Action::CautiousSell
                }
            }
            SignalStrength::Weak => {
                warnings.push(format!(
                    "⚠️ Composite score {:.0}/100 too weak to act on despite the probability edge",
                    inputs.scored.score
                ));
                Action::Wait
            }
        };

        reasoning.push(format!(
            "📊 {}: score {:.0}/100 ({}), {} probability {:.1}% vs {:.1}% threshold",
            action,
            inputs.scored.score,
            strength,
            inputs.direction,
            inputs.prob_direction * 100.0,
            inputs.threshold * 100.0
        ));
        action
    }

    fn collect_warnings(
        &self,
        inputs: &DecisionInputs,
        ctx: &MarketContext,
        confidence: Confidence,
        warnings: &mut Vec<String>,
    ) {
        use crate::types::VolatilityRegime;

        if confidence == Confidence::Low {
            warnings.push(
                "⚠️ Low confidence: historical validation accuracy gives this call little backing"
                    .to_string(),
            );
        }

        match ctx.volatility_regime {
            VolatilityRegime::Elevated => {
                warnings.push("⚠️ Elevated volatility: expect noisy moves".to_string());
            }
            VolatilityRegime::Extreme => {
                warnings.push(
                    "⚠️ Extreme volatility regime: probability estimates are least reliable here"
                        .to_string(),
                );
            }
            _ => {}
        }

        if inputs.plan.risk_reward < self.marginal_rr {
            warnings.push(format!(
                "⚠️ Reward-to-risk {:.1}:1 is close to the floor",
                inputs.plan.risk_reward
            ));
        }

        if let Some(bias) = ctx.market_regime.directional_bias() {
            if ctx.market_regime.is_strong_trend()
                && inputs.direction != Direction::Neutral
                && inputs.direction != bias
            {
                warnings.push(format!(
                    "⚠️ {} call against a {}",
                    inputs.direction, ctx.market_regime
                ));
            }
        }

    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_tiers() {
        assert_eq!(strength_for(90.0), SignalStrength::Excellent);
        assert_eq!(strength_for(75.0), SignalStrength::Excellent);
        assert_eq!(strength_for(74.9), SignalStrength::Good);
        assert_eq!(strength_for(65.0), SignalStrength::Good);
        assert_eq!(strength_for(60.0), SignalStrength::Marginal);
        assert_eq!(strength_for(55.0), SignalStrength::Marginal);
        assert_eq!(strength_for(54.9), SignalStrength::Weak);
        assert_eq!(strength_for(0.0), SignalStrength::Weak);
    }

    #[test]
    fn test_confidence_tiers() {
        // 0.72 * 0.674 = 0.485 -> high
        assert_eq!(confidence_for(0.72, 0.674), Confidence::High);
        // 0.60 * 0.674 = 0.404 -> medium
        assert_eq!(confidence_for(0.60, 0.674), Confidence::Medium);
        // 0.52 * 0.674 = 0.350 -> low
        assert_eq!(confidence_for(0.52, 0.674), Confidence::Low);
        // poor validation accuracy drags everything down
        assert_eq!(confidence_for(0.90, 0.40), Confidence::Low);
    }

    #[test]
    fn test_tier_tables_are_ordered_descending() {
        for pair in STRENGTH_TIERS.windows(2) {
            assert!(pair[0].0 > pair[1].0);
        }
        for pair in CONFIDENCE_TIERS.windows(2) {
            assert!(pair[0].0 > pair[1].0);
        }
    }
}
