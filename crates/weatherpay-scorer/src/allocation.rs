//! Distribution of the parent-region prediction across sub-regions.
//!
//! raw_i  = aggregate × S_i / ΣS
//! P_pred = sqrt(raw_i / K)
//!
//! K is the largest plausible daily aggregate count. P_pred is not bounded by
//! 1 unless the caller asks for the clamp.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use weatherpay_common::{Result, WeatherpayError};

/// Allocation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Normalisation constant K (historical max plausible daily aggregate).
    #[serde(default = "default_normalization_constant")]
    pub normalization_constant: f64,

    /// Apply `min(P_pred, 1.0)` after compression.
    #[serde(default)]
    pub clamp_prediction: bool,
}

fn default_normalization_constant() -> f64 { 25.0 }

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            normalization_constant: default_normalization_constant(),
            clamp_prediction: false,
        }
    }
}

impl AllocationConfig {
    pub fn validate(&self) -> Result<()> {
        let k = self.normalization_constant;
        if !k.is_finite() || k <= 0.0 {
            return Err(WeatherpayError::Config(format!(
                "normalization_constant must be positive, got {k}"
            )));
        }
        Ok(())
    }

    /// sqrt-compressed P_pred, clamped when configured.
    pub fn compress(&self, raw_allocated: f64) -> f64 {
        let p = compress_prediction(raw_allocated, self.normalization_constant);
        if self.clamp_prediction { p.min(1.0) } else { p }
    }
}

/// Split `aggregate` across sub-regions in proportion to their social index.
///
/// The result sums to `aggregate` up to floating-point rounding. Fails with
/// `ZeroTotalWeight` when the indices sum to zero, and with
/// `InvalidPrediction` for a negative or non-finite aggregate.
pub fn allocate_proportional(date: NaiveDate, aggregate: f64, social: &[f64]) -> Result<Vec<f64>> {
    if !aggregate.is_finite() || aggregate < 0.0 {
        return Err(WeatherpayError::InvalidPrediction { date, value: aggregate });
    }

    let total: f64 = social.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(WeatherpayError::ZeroTotalWeight { date });
    }

    Ok(social.iter().map(|s| aggregate * (s / total)).collect())
}

/// Concave compression `sqrt(raw / k)`.
pub fn compress_prediction(raw_allocated: f64, k: f64) -> f64 {
    (raw_allocated / k).sqrt()
}

/// Linear share capped at 1.0, used by the legacy formula.
pub fn linear_capped_prediction(raw_allocated: f64, k: f64) -> f64 {
    (raw_allocated / k).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 28).unwrap()
    }

    #[test]
    fn test_two_region_split() {
        let raw = allocate_proportional(date(), 10.0, &[0.6, 0.4]).unwrap();
        assert!((raw[0] - 6.0).abs() < 1e-9);
        assert!((raw[1] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_allocation_sums_to_aggregate() {
        let social = [0.13, 0.42, 0.071, 0.3333, 0.29, 0.5, 0.0, 0.18];
        for aggregate in [0.0, 1.0, 7.3, 23.9, 141.7] {
            let raw = allocate_proportional(date(), aggregate, &social).unwrap();
            let sum: f64 = raw.iter().sum();
            assert!((sum - aggregate).abs() < 1e-9, "{sum} != {aggregate}");
        }
    }

    #[test]
    fn test_zero_total_weight_is_error() {
        let err = allocate_proportional(date(), 10.0, &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, WeatherpayError::ZeroTotalWeight { .. }));

        let err = allocate_proportional(date(), 10.0, &[]).unwrap_err();
        assert!(matches!(err, WeatherpayError::ZeroTotalWeight { .. }));
    }

    #[test]
    fn test_negative_aggregate_rejected() {
        let err = allocate_proportional(date(), -1.0, &[0.5]).unwrap_err();
        assert!(matches!(err, WeatherpayError::InvalidPrediction { .. }));
        assert!(allocate_proportional(date(), f64::NAN, &[0.5]).is_err());
    }

    #[test]
    fn test_compression_values() {
        assert!((compress_prediction(6.0, 25.0) - 0.489_897_948_556_635_6).abs() < 1e-12);
        assert!((compress_prediction(4.0, 25.0) - 0.4).abs() < 1e-12);
        assert_eq!(compress_prediction(25.0, 25.0), 1.0);
    }

    #[test]
    fn test_compression_unclamped_above_k() {
        let cfg = AllocationConfig::default();
        assert!(cfg.compress(36.0) > 1.0);

        let clamped = AllocationConfig { clamp_prediction: true, ..cfg };
        assert_eq!(clamped.compress(36.0), 1.0);
        assert!((clamped.compress(4.0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_linear_capped() {
        assert!((linear_capped_prediction(5.0, 25.0) - 0.2).abs() < 1e-12);
        assert_eq!(linear_capped_prediction(50.0, 25.0), 1.0);
    }

    #[test]
    fn test_invalid_constant_rejected() {
        let cfg = AllocationConfig { normalization_constant: 0.0, clamp_prediction: false };
        assert!(cfg.validate().is_err());
    }
}
