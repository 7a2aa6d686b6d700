//! Risk and target planning.
//!
//! Derives the target band, stop-loss and realized reward-to-risk ratio
//! around the current price. The target band comes from the model's
//! expected-return estimate widened by a volatility-scaled margin; the stop
//! sits on the opposite side at an ATR-derived distance, tightened (never
//! the target loosened) whenever the ATR stop would break the configured
//! R:R floor. The floor is a hard invariant, not best-effort.

use crate::config::RiskConfig;
use crate::error::{EngineError, Result};
use crate::types::Direction;

/// Price geometry produced by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPlan {
    pub target_low: f64,
    pub target_high: f64,
    /// Expected move in the called direction, signed, in percent of price.
    pub expected_return: f64,
    pub stop_loss: f64,
    /// Loss at the stop in percent of price, always positive.
    pub max_loss: f64,
    pub risk_reward: f64,
}

#[derive(Debug, Clone)]
pub struct RiskPlanner {
    cfg: RiskConfig,
}

impl RiskPlanner {
    pub fn new(cfg: &RiskConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Plan the price geometry for a call in `direction`. A neutral
    /// direction is planned on the upside so the result object still
    /// carries a coherent band.
    pub fn plan(
        &self,
        direction: Direction,
        current_price: f64,
        expected_return: f64,
        volatility: f64,
        atr_pct: f64,
    ) -> Result<RiskPlan> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(EngineError::invalid_input(
                "current_price",
                format!("must be a positive finite price, got {current_price}"),
            ));
        }
        if !expected_return.is_finite() {
            return Err(EngineError::invalid_input(
                "expected_return",
                format!("must be finite, got {expected_return}"),
            ));
        }
        if !volatility.is_finite() || volatility < 0.0 || !atr_pct.is_finite() || atr_pct < 0.0 {
            return Err(EngineError::invalid_input(
                "volatility",
                format!("volatility/atr must be finite and non-negative, got {volatility}/{atr_pct}"),
            ));
        }

        let atr_frac = atr_pct / 100.0;

        // Gross expected move, floored by an ATR multiple so a near-zero
        // return estimate still yields a usable band.
        let gross = expected_return
            .abs()
            .max(self.cfg.min_move_atr_mult * atr_frac);
        if gross <= 0.0 {
            return Err(EngineError::invalid_input(
                "expected_return",
                "no expected move and zero ATR; cannot derive a target band",
            ));
        }

        // Band half-width scales with volatility but stays below the cap,
        // keeping the entire band on the direction side of the entry.
        let width_frac = (self.cfg.band_vol_weight * volatility
            + self.cfg.band_atr_weight * atr_frac)
            .min(self.cfg.band_width_cap);
        let half_width = gross * width_frac;

        // Reward is measured to the conservative edge of the band.
        let reward = gross - half_width;

        let atr_stop = self.cfg.stop_atr_mult * atr_frac;
        let (risk, risk_reward) = if atr_stop > 0.0 && atr_stop * self.cfg.rr_floor <= reward {
            // Rounding in the division must not dip below the floor the
            // branch condition just guaranteed.
            (atr_stop, (reward / atr_stop).max(self.cfg.rr_floor))
        } else {
            // ATR stop would violate the floor (or ATR is zero): tighten
            // the stop so the ratio lands exactly on the floor.
            (reward / self.cfg.rr_floor, self.cfg.rr_floor)
        };

        if risk_reward < self.cfg.rr_floor {
            return Err(EngineError::Invariant(format!(
                "planned risk_reward {risk_reward} below floor {}",
                self.cfg.rr_floor
            )));
        }

        let plan = match direction {
            Direction::Down => RiskPlan {
                target_low: current_price * (1.0 - (gross + half_width)),
                target_high: current_price * (1.0 - reward),
                expected_return: -gross * 100.0,
                stop_loss: current_price * (1.0 + risk),
                max_loss: risk * 100.0,
                risk_reward,
            },
            Direction::Up | Direction::Neutral => RiskPlan {
                target_low: current_price * (1.0 + reward),
                target_high: current_price * (1.0 + gross + half_width),
                expected_return: gross * 100.0,
                stop_loss: current_price * (1.0 - risk),
                max_loss: risk * 100.0,
                risk_reward,
            },
        };

        tracing::debug!(
            ?direction,
            target_low = plan.target_low,
            target_high = plan.target_high,
            stop_loss = plan.stop_loss,
            risk_reward = plan.risk_reward,
            "planned risk geometry"
        );
        Ok(plan)
    }
}
