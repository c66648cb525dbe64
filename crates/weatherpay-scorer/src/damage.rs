//! Composite damage score.
//!
//! score = 100 × (w_S·S + w_E·E + w_P·P_pred + w_R·P_real) × H
//!
//! Three formulas are kept as named variants because they serve different
//! decision points; see [`ScoreFormula`].

use serde::{Deserialize, Serialize};

use crate::allocation::{linear_capped_prediction, AllocationConfig};
use crate::weights::ScoreWeights;

/// The five inputs of a damage score for one (sub-region, date).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub social: f64,
    pub environmental: f64,
    pub p_pred: f64,
    pub p_real: f64,
    pub persistence: f64,
}

/// Weighted sum scaled to 0–100, multiplied by `persistence`.
pub fn damage_score(weights: &ScoreWeights, inputs: &ScoreInputs, persistence: f64) -> f64 {
    let base = weights.social * inputs.social
        + weights.environmental * inputs.environmental
        + weights.prediction * inputs.p_pred
        + weights.occurrence * inputs.p_real;
    100.0 * base * persistence
}

/// Damage-score formula selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFormula {
    /// Pre-incident estimate, 0.25/0.25/0.5, no occurrence term.
    PreScore,
    /// Post-incident reconciliation, 0.2/0.2/0.5/0.1. System of record.
    #[default]
    FinalScore,
    /// 0.4/0.3/0.2/0.1 with a linear capped prediction term and no H.
    /// Only for reproducing historical outputs.
    LegacyCapped,
}

impl ScoreFormula {
    pub fn weights(&self) -> ScoreWeights {
        match self {
            Self::PreScore => ScoreWeights::PRE_SCORE,
            Self::FinalScore => ScoreWeights::FINAL_SCORE,
            Self::LegacyCapped => ScoreWeights::LEGACY_CAPPED,
        }
    }

    /// The P_pred term this formula uses for a raw allocated count.
    pub fn prediction_term(&self, raw_allocated: f64, allocation: &AllocationConfig) -> f64 {
        match self {
            Self::PreScore | Self::FinalScore => allocation.compress(raw_allocated),
            Self::LegacyCapped => {
                linear_capped_prediction(raw_allocated, allocation.normalization_constant)
            }
        }
    }

    /// Whether H may multiply this formula.
    pub fn uses_persistence(&self) -> bool {
        !matches!(self, Self::LegacyCapped)
    }

    /// Score `inputs`. H is applied only when `apply_persistence` is set and
    /// the formula supports it.
    pub fn score(&self, inputs: &ScoreInputs, apply_persistence: bool) -> f64 {
        let h = if apply_persistence && self.uses_persistence() {
            inputs.persistence
        } else {
            1.0
        };
        damage_score(&self.weights(), inputs, h)
    }
}

impl std::fmt::Display for ScoreFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PreScore => "pre_score",
            Self::FinalScore => "final_score",
            Self::LegacyCapped => "legacy_capped",
        };
        f.write_str(name)
    }
}
