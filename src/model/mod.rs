//! Model-inference boundary.
//!
//! The predictive model itself lives outside this crate. What lives here is
//! the normalization seam: trained models emit either a single head (one
//! probability) or a list of heads (two probabilities plus two return
//! estimates), and that shape difference must be resolved before anything
//! reaches the decision engine. The engine never branches on model output
//! shape.

use crate::error::{EngineError, Result};

/// Normalized model output: the fixed four-tuple every downstream component
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutput {
    pub raw_prob_tomorrow: f64,
    pub raw_prob_week: f64,
    pub return_tomorrow: f64,
    pub return_week: f64,
}

impl ModelOutput {
    /// Normalize a multi-shaped set of model heads.
    ///
    /// Single-head models predict only the next-day probability; the week
    /// probability falls back to it and the return estimates to zero.
    /// Heads beyond the first four are ignored.
    pub fn from_heads(heads: &[Vec<f64>]) -> Result<Self> {
        let scalar = |idx: usize| -> Result<Option<f64>> {
            match heads.get(idx) {
                None => Ok(None),
                Some(head) => match head.first() {
                    Some(v) => Ok(Some(*v)),
                    None => Err(EngineError::invalid_input(
                        "model_output",
                        format!("head {idx} is empty"),
                    )),
                },
            }
        };

        let raw_prob_tomorrow = scalar(0)?.ok_or_else(|| {
            EngineError::invalid_input("model_output", "model produced no output heads")
        })?;
        let raw_prob_week = scalar(1)?.unwrap_or(raw_prob_tomorrow);
        let return_tomorrow = scalar(2)?.unwrap_or(0.0);
        let return_week = scalar(3)?.unwrap_or(0.0);

        Ok(Self {
            raw_prob_tomorrow,
            raw_prob_week,
            return_tomorrow,
            return_week,
        })
    }
}

/// Seam for the out-of-scope predictive model: anything that can turn a
/// feature sequence into a normalized [`ModelOutput`].
pub trait InferenceModel: Send + Sync {
    /// Run inference over one feature sequence (rows of feature vectors).
    fn infer(&self, features: &[Vec<f64>]) -> Result<ModelOutput>;

    /// Model name for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_head_output() {
        let heads = vec![vec![0.62], vec![0.71], vec![0.004], vec![0.021]];
        let out = ModelOutput::from_heads(&heads).unwrap();
        assert_eq!(out.raw_prob_tomorrow, 0.62);
        assert_eq!(out.raw_prob_week, 0.71);
        assert_eq!(out.return_tomorrow, 0.004);
        assert_eq!(out.return_week, 0.021);
    }

    #[test]
    fn test_single_head_falls_back() {
        let heads = vec![vec![0.62]];
        let out = ModelOutput::from_heads(&heads).unwrap();
        assert_eq!(out.raw_prob_week, 0.62);
        assert_eq!(out.return_tomorrow, 0.0);
        assert_eq!(out.return_week, 0.0);
    }

    #[test]
    fn test_two_heads_without_returns() {
        let heads = vec![vec![0.62], vec![0.71]];
        let out = ModelOutput::from_heads(&heads).unwrap();
        assert_eq!(out.raw_prob_week, 0.71);
        assert_eq!(out.return_week, 0.0);
    }

    #[test]
    fn test_extra_heads_ignored() {
        let heads = vec![vec![0.6], vec![0.7], vec![0.01], vec![0.02], vec![9.9]];
        let out = ModelOutput::from_heads(&heads).unwrap();
        assert_eq!(out.return_week, 0.02);
    }

    #[test]
    fn test_no_heads_is_an_error() {
        assert!(ModelOutput::from_heads(&[]).is_err());
    }

    #[test]
    fn test_empty_head_is_an_error() {
        let heads = vec![vec![0.62], vec![]];
        assert!(ModelOutput::from_heads(&heads).is_err());
    }
}
