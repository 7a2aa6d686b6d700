//! Decision engine.
//!
//! Turns a pair of raw model probabilities plus raw return estimates into a
//! fully-specified, explainable trading recommendation. Data flows strictly
//! forward:
//!
//! ```text
//! raw probs/returns → Calibrator → {Threshold, Scorer} ← Context Classifier
//!                                        ↓
//!                     Risk Planner →  Decision Mapper → PredictionResult
//! ```
//!
//! The engine is purely computational and single-threaded per invocation:
//! every component is a pure function over its inputs, and the only state
//! is the read-only configuration loaded at startup. Independent workers
//! may evaluate different symbols concurrently without locking.

pub mod calibration;
pub mod context;
pub mod decision;
pub mod risk;
pub mod scoring;
pub mod threshold;


use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::types::{Direction, PredictionResult};

use calibration::Calibrator;
use context::{ContextClassifier, MarketStats};
use decision::{DecisionInputs, DecisionMapper};
use risk::RiskPlanner;
use scoring::SignalScorer;
use threshold::ThresholdCalculator;

/// One prediction request for one symbol: normalized model outputs plus the
/// price anchor and the market statistics from the feature pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub symbol: String,
    pub raw_prob_tomorrow: f64,
    pub raw_prob_week: f64,
    pub return_tomorrow: f64,
    pub return_week: f64,
    pub current_price: f64,
    pub price_date: NaiveDate,
    pub stats: MarketStats,
}

/// The single entry point of the crate.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: EngineConfig,
    calibrator: Calibrator,
    classifier: ContextClassifier,
    threshold: ThresholdCalculator,
    scorer: SignalScorer,
    planner: RiskPlanner,
    mapper: DecisionMapper,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            calibrator: Calibrator::new(&config.calibration),
            classifier: ContextClassifier::new(&config.context),
            threshold: ThresholdCalculator::new(&config.threshold),
            scorer: SignalScorer::new(&config.scoring),
            planner: RiskPlanner::new(&config.risk),
            mapper: DecisionMapper::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one request into exactly one immutable result.
    ///
    /// Fails fast on invalid inputs or missing context; upstream failures
    /// never degrade into a partially-populated result object.
    pub fn decide(&self, request: &DecisionRequest) -> Result<PredictionResult> {
        validate_request(request)?;
        let symbol = request.symbol.trim().to_uppercase();

        let ctx = self.classifier.classify(&request.stats)?;

        let tomorrow_prob_up = self.calibrator.tomorrow(request.raw_prob_tomorrow);
        let week_prob_up = self.calibrator.week(request.raw_prob_week);

        let direction = Direction::from_prob_up(week_prob_up);
        let prob_direction = match direction {
            Direction::Down => 1.0 - week_prob_up,
            Direction::Up | Direction::Neutral => week_prob_up,
        };

        let (threshold, threshold_breakdown) = self.threshold.compute(&ctx);

        let plan = self.planner.plan(
            direction,
            request.current_price,
            request.return_week,
            ctx.volatility,
            ctx.atr_pct,
        )?;

        // Defensive re-check of the hard floor; a violation here is a
        // planner defect, never a user-facing condition.
        if plan.risk_reward < self.config.risk.rr_floor {
            return Err(EngineError::Invariant(format!(
                "risk_reward {} escaped the {} floor",
                plan.risk_reward, self.config.risk.rr_floor
            )));
        }

        let scored = self
            .scorer
            .score(direction, prob_direction, threshold, plan.risk_reward, &ctx);

        let result = self.mapper.map(
            DecisionInputs {
                symbol,
                current_price: request.current_price,
                price_date: request.price_date,
                direction,
                week_prob_up,
                prob_direction,
                tomorrow_prob_up,
                threshold,
                threshold_breakdown,
                scored,
                plan,
            },
            &ctx,
        );

        debug_assert!(!result.reasoning.is_empty());
        Ok(result)
    }
}

fn validate_request(request: &DecisionRequest) -> Result<()> {
    if request.symbol.trim().is_empty() {
        return Err(EngineError::invalid_input("symbol", "must be non-empty"));
    }
    if !request.current_price.is_finite() || request.current_price <= 0.0 {
        return Err(EngineError::invalid_input(
            "current_price",
            format!("must be a positive finite price, got {}", request.current_price),
        ));
    }
    for (field, prob) in [
        ("raw_prob_tomorrow", request.raw_prob_tomorrow),
        ("raw_prob_week", request.raw_prob_week),
    ] {
        if !prob.is_finite() || prob <= 0.0 || prob >= 1.0 {
            return Err(EngineError::InvalidInput {
                field,
                reason: format!("probability must lie strictly within (0, 1), got {prob}"),
            });
        }
    }
    for (field, ret) in [
        ("return_tomorrow", request.return_tomorrow),
        ("return_week", request.return_week),
    ] {
        if !ret.is_finite() {
            return Err(EngineError::InvalidInput {
                field,
                reason: format!("return estimate must be finite, got {ret}"),
            });
        }
    }
    Ok(())
}
