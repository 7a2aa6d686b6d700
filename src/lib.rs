//! Stock Prediction Decision Engine
//!
//! Converts raw model probabilities and return estimates into explainable
//! trading recommendations with guaranteed risk geometry.
//!
//! ## Architecture
//!
//! ```text
//! Model output → Calibrator → {Adaptive Threshold, Signal Scorer} ← Market Context
//!                                           ↓
//!                        Risk Planner → Decision Mapper → PredictionResult
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod types;

#[cfg(test)]
mod types_tests;
