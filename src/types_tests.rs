//! Tests for core value objects

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use chrono::NaiveDate;

    #[test]
    fn test_direction_from_prob() {
        assert_eq!(Direction::from_prob_up(0.7), Direction::Up);
        assert_eq!(Direction::from_prob_up(0.3), Direction::Down);
        assert_eq!(Direction::from_prob_up(0.5), Direction::Neutral);
    }

    #[test]
    fn test_regime_bias() {
        assert_eq!(
            MarketRegime::StrongUptrend.directional_bias(),
            Some(Direction::Up)
        );
        assert_eq!(
            MarketRegime::Downtrend.directional_bias(),
            Some(Direction::Down)
        );
        assert_eq!(MarketRegime::Sideways.directional_bias(), None);
        assert_eq!(MarketRegime::Choppy.directional_bias(), None);
        assert!(MarketRegime::StrongDowntrend.is_strong_trend());
        assert!(!MarketRegime::Uptrend.is_strong_trend());
    }

    #[test]
    fn test_action_families() {
        assert!(Action::StrongBuy.is_buy());
        assert!(Action::CautiousBuy.is_buy());
        assert!(Action::Sell.is_sell());
        assert!(!Action::Wait.is_actionable());
        assert!(!Action::NoTrade.is_actionable());
        assert!(Action::StrongSell.is_actionable());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::StrongBuy.to_string(), "STRONG BUY");
        assert_eq!(Action::CautiousSell.to_string(), "CAUTIOUS SELL");
        assert_eq!(Action::Wait.to_string(), "WAIT");
        assert_eq!(Action::NoTrade.to_string(), "NO TRADE");
    }

    #[test]
    fn test_breakdown_sums() {
        let b = ScoreBreakdown {
            probability: 30.0,
            risk_reward: 20.0,
            market_alignment: 15.0,
            volatility: 12.0,
        };
        assert_eq!(b.total(), 77.0);

        let t = ThresholdBreakdown {
            base: 0.58,
            vol_adjustment: 0.03,
            regime_adjustment: -0.015,
            trend_consistency: -0.012,
        };
        assert!((t.unclamped() - 0.583).abs() < 1e-12);
    }

    fn sample_result() -> PredictionResult {
        PredictionResult {
            symbol: "AAPL".to_string(),
            current_price: 187.32,
            price_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            week_direction: Direction::Up,
            week_prob_up: 0.71,
            signal_score: 78.5,
            score_breakdown: ScoreBreakdown {
                probability: 36.0,
                risk_reward: 12.5,
                market_alignment: 20.0,
                volatility: 10.0,
            },
            signal_strength: SignalStrength::Excellent,
            confidence: Confidence::High,
            adaptive_threshold: 0.545,
            threshold_breakdown: ThresholdBreakdown {
                base: 0.58,
                vol_adjustment: -0.02,
                regime_adjustment: -0.03,
                trend_consistency: 0.015,
            },
            target_low: 190.2,
            target_high: 195.8,
            expected_return: 3.1,
            stop_loss: 183.4,
            max_loss: 2.1,
            risk_reward: 1.9,
            market_regime: MarketRegime::StrongUptrend,
            volatility: 0.14,
            volatility_regime: VolatilityRegime::Low,
            atr_pct: 1.3,
            action: Action::StrongBuy,
            reasoning: vec!["✅ looks good".to_string()],
            warnings: vec![],
        }
    }

    #[test]
    fn test_result_serde_round_trip() {
        let result = sample_result();
        let json = serde_json::to_string(&result).unwrap();
        let back: PredictionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }

    #[test]
    fn test_flat_record_flattens_breakdowns() {
        let record = sample_result().to_record();
        assert_eq!(record.score_probability, 36.0);
        assert_eq!(record.score_market_alignment, 20.0);
        assert_eq!(record.threshold_vol_adjustment, -0.02);
        assert_eq!(record.action, "STRONG BUY");
        assert_eq!(record.market_regime, "strong uptrend");
        assert_eq!(record.volatility_regime, "low");

        // the record serializes to a single-level JSON object
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.values().all(|v| !v.is_object() && !v.is_array()));
    }
}
