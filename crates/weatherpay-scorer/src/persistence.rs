//! Heatwave persistence multiplier H.
//!
//! Scans a date-ordered feels-like series for the longest run of consecutive
//! days at or above two thresholds. The severe threshold wins:
//!
//! | longest run ≥ 35 °C | longest run ≥ 33 °C | H    |
//! |---------------------|---------------------|------|
//! | ≥ 2                 | any                 | 1.3  |
//! | < 2                 | ≥ 2                 | 1.15 |
//! | < 2                 | < 2                 | 1.0  |

use serde::{Deserialize, Serialize};
use weatherpay_common::{Result, WeatherpayError};

/// Persistence settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Days of history ending at the scored date (inclusive).
    #[serde(default = "default_lookback")]
    pub lookback_days: u32,

    #[serde(default = "default_moderate_threshold")]
    pub moderate_threshold_c: f64,

    #[serde(default = "default_severe_threshold")]
    pub severe_threshold_c: f64,

    /// Minimum run length that counts as a heatwave.
    #[serde(default = "default_min_streak")]
    pub min_streak_days: usize,

    #[serde(default = "default_moderate_multiplier")]
    pub moderate_multiplier: f64,

    #[serde(default = "default_severe_multiplier")]
    pub severe_multiplier: f64,
}

fn default_lookback() -> u32 { 7 }
fn default_moderate_threshold() -> f64 { 33.0 }
fn default_severe_threshold() -> f64 { 35.0 }
fn default_min_streak() -> usize { 2 }
fn default_moderate_multiplier() -> f64 { 1.15 }
fn default_severe_multiplier() -> f64 { 1.3 }

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback(),
            moderate_threshold_c: default_moderate_threshold(),
            severe_threshold_c: default_severe_threshold(),
            min_streak_days: default_min_streak(),
            moderate_multiplier: default_moderate_multiplier(),
            severe_multiplier: default_severe_multiplier(),
        }
    }
}

/// Longest qualifying runs found in one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakSummary {
    pub moderate: usize,
    pub severe: usize,
}

/// Longest runs at or above `moderate` and `severe`, tracked by two independent counters.
///
/// A NaN reading meets neither threshold, so a gap in the series breaks both runs.
pub fn longest_streaks(temps: &[f64], moderate: f64, severe: f64) -> StreakSummary {
    let mut summary = StreakSummary::default();
    let (mut run_moderate, mut run_severe) = (0usize, 0usize);

    for &t in temps {
        if t >= moderate {
            run_moderate += 1;
            summary.moderate = summary.moderate.max(run_moderate);
        } else {
            run_moderate = 0;
        }

        if t >= severe {
            run_severe += 1;
            summary.severe = summary.severe.max(run_severe);
        } else {
            run_severe = 0;
        }
    }

    summary
}

impl PersistenceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days == 0 || self.min_streak_days == 0 {
            return Err(WeatherpayError::Config(
                "lookback_days and min_streak_days must be at least 1".to_string(),
            ));
        }
        if !(self.moderate_threshold_c.is_finite() && self.severe_threshold_c.is_finite())
            || self.severe_threshold_c < self.moderate_threshold_c
        {
            return Err(WeatherpayError::InvalidThresholds(format!(
                "severe threshold {} must be finite and not below moderate threshold {}",
                self.severe_threshold_c, self.moderate_threshold_c
            )));
        }
        if self.moderate_multiplier <= 0.0 || self.severe_multiplier <= 0.0 {
            return Err(WeatherpayError::Config(
                "persistence multipliers must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// H for a date-ordered feels-like series. An empty series yields 1.0.
    pub fn multiplier(&self, temps: &[f64]) -> f64 {
        let streaks = longest_streaks(temps, self.moderate_threshold_c, self.severe_threshold_c);
        if streaks.severe >= self.min_streak_days {
            self.severe_multiplier
        } else if streaks.moderate >= self.min_streak_days {
            self.moderate_multiplier
        } else {
            1.0
        }
    }
}

/// H with the default 33/35 °C thresholds.
pub fn persistence_multiplier(temps: &[f64]) -> f64 {
    PersistenceConfig::default().multiplier(temps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severe_streak_wins() {
        let temps = [34.0, 34.0, 30.0, 36.0, 36.0, 28.0];
        let s = longest_streaks(&temps, 33.0, 35.0);
        assert_eq!(s, StreakSummary { moderate: 2, severe: 2 });
        assert_eq!(persistence_multiplier(&temps), 1.3);
    }

    #[test]
    fn test_moderate_streak_only() {
        let temps = [34.0, 34.0, 30.0];
        let s = longest_streaks(&temps, 33.0, 35.0);
        assert_eq!(s, StreakSummary { moderate: 2, severe: 0 });
        assert_eq!(persistence_multiplier(&temps), 1.15);
    }

    #[test]
    fn test_no_streak() {
        assert_eq!(persistence_multiplier(&[30.0, 31.0, 32.0]), 1.0);
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(persistence_multiplier(&[]), 1.0);
        assert_eq!(longest_streaks(&[], 33.0, 35.0), StreakSummary::default());
    }

    #[test]
    fn test_isolated_hot_days_do_not_count() {
        // Alternating hot days never form a run of two.
        assert_eq!(persistence_multiplier(&[36.0, 30.0, 36.0, 30.0, 36.0]), 1.0);
    }

    #[test]
    fn test_severe_run_also_extends_moderate_run() {
        let s = longest_streaks(&[33.5, 35.0, 35.2, 34.0], 33.0, 35.0);
        assert_eq!(s, StreakSummary { moderate: 4, severe: 2 });
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(persistence_multiplier(&[33.0, 33.0]), 1.15);
        assert_eq!(persistence_multiplier(&[35.0, 35.0]), 1.3);
    }

    #[test]
    fn test_gap_breaks_streak() {
        assert_eq!(persistence_multiplier(&[36.0, f64::NAN, 36.0]), 1.0);
    }

    #[test]
    fn test_deterministic() {
        let temps = [33.1, 35.4, 35.9, 32.0, 34.0, 34.5, 36.0];
        let first = persistence_multiplier(&temps);
        for _ in 0..10 {
            assert_eq!(persistence_multiplier(&temps), first);
        }
    }

    #[test]
    fn test_window_size_agnostic() {
        let long: Vec<f64> = (0..30).map(|i| if i == 20 || i == 21 { 33.5 } else { 25.0 }).collect();
        assert_eq!(persistence_multiplier(&long), 1.15);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let cfg = PersistenceConfig {
            moderate_threshold_c: 36.0,
            severe_threshold_c: 35.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(WeatherpayError::InvalidThresholds(_))));
    }
}
