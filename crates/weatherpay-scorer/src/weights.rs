//! Weight vectors for the vulnerability indices and the damage score.
//! Each vector is a convex combination: weights are non-negative and sum to 1.0.

use serde::{Deserialize, Serialize};
use weatherpay_common::{Result, WeatherpayError};

fn check_convex(name: &str, weights: &[f64]) -> Result<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(WeatherpayError::InvalidWeights(format!(
            "{name}: weights must be finite and non-negative, got {weights:?}"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(WeatherpayError::InvalidWeights(format!(
            "{name}: weights sum to {sum}, expected 1.0"
        )));
    }
    Ok(())
}

// ── Social index S ──────────────────────────────────────────────────────────

/// Weights for S over the three population ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialWeights {
    pub elderly: f64,
    pub outdoor_worker: f64,
    pub heat_vulnerable: f64,
}

impl Default for SocialWeights {
    fn default() -> Self {
        Self {
            elderly:         0.5,
            outdoor_worker:  0.3,
            heat_vulnerable: 0.2,
        }
    }
}

impl SocialWeights {
    pub fn validate(&self) -> Result<()> {
        check_convex("social_weights", &self.as_array())
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.elderly, self.outdoor_worker, self.heat_vulnerable]
    }
}

// ── Environmental index E ───────────────────────────────────────────────────

/// Weights for E over normalised heat island, inverse green space and inverse cooling access.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalWeights {
    pub heat_island: f64,
    pub green_space_deficit: f64,
    pub cooling_access_deficit: f64,
}

impl Default for EnvironmentalWeights {
    fn default() -> Self {
        Self {
            heat_island:            0.5,
            green_space_deficit:    0.3,
            cooling_access_deficit: 0.2,
        }
    }
}

impl EnvironmentalWeights {
    pub fn validate(&self) -> Result<()> {
        check_convex("environmental_weights", &self.as_array())
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.heat_island, self.green_space_deficit, self.cooling_access_deficit]
    }
}

// ── Damage score ────────────────────────────────────────────────────────────

/// Term weights of a damage-score formula: S, E, P_pred, P_real.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub social: f64,
    pub environmental: f64,
    pub prediction: f64,
    pub occurrence: f64,
}

impl ScoreWeights {
    /// Pre-incident estimate: no observed-occurrence term.
    pub const PRE_SCORE: Self = Self {
        social:        0.25,
        environmental: 0.25,
        prediction:    0.50,
        occurrence:    0.0,
    };

    /// Post-incident reconciliation, the system of record.
    pub const FINAL_SCORE: Self = Self {
        social:        0.2,
        environmental: 0.2,
        prediction:    0.5,
        occurrence:    0.1,
    };

    /// Older dashboards: linear capped prediction, no persistence multiplier.
    pub const LEGACY_CAPPED: Self = Self {
        social:        0.4,
        environmental: 0.3,
        prediction:    0.2,
        occurrence:    0.1,
    };

    pub fn validate(&self) -> Result<()> {
        check_convex("score_weights", &self.as_array())
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.social, self.environmental, self.prediction, self.occurrence]
    }
}
