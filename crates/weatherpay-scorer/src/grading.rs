//! Risk grades and payout amounts.
//!
//! Two independent threshold tables: the payout table decides money, the
//! display table only labels. Each tier covers `[min_score, next.min_score)`.

use serde::{Deserialize, Serialize};
use weatherpay_common::{Result, WeatherpayError};

/// Ordinal risk grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskGrade {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskGrade {
    /// Colour marker used on the dashboard calendar.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::VeryLow => "🟢",
            Self::Low => "🟡",
            Self::Moderate => "🟠",
            Self::High => "🔴",
            Self::VeryHigh => "🔥",
        }
    }
}

impl std::fmt::Display for RiskGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}

// ── Tiers ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeTier {
    pub min_score: f64,
    pub grade: RiskGrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutTier {
    pub min_score: f64,
    pub grade: RiskGrade,
    /// Payout per subscriber, in won.
    pub payout: u64,
}

fn check_ascending(name: &str, mins: &[f64]) -> Result<()> {
    let Some(&first) = mins.first() else {
        return Err(WeatherpayError::InvalidThresholds(format!("{name}: no tiers")));
    };
    if first > 0.0 {
        return Err(WeatherpayError::InvalidThresholds(format!(
            "{name}: first tier starts at {first}, scores from 0 would be unmapped"
        )));
    }
    if mins.iter().any(|m| !m.is_finite()) {
        return Err(WeatherpayError::InvalidThresholds(format!(
            "{name}: tier boundaries must be finite"
        )));
    }
    if mins.windows(2).any(|w| w[0] >= w[1]) {
        return Err(WeatherpayError::InvalidThresholds(format!(
            "{name}: tier boundaries must be strictly ascending, got {mins:?}"
        )));
    }
    Ok(())
}

/// Index of the last tier whose boundary is at or below `score`.
fn tier_index(mins: impl Iterator<Item = f64>, score: f64) -> usize {
    mins.take_while(|&m| m <= score).count().saturating_sub(1)
}

// ── Payout table ────────────────────────────────────────────────────────────

/// Score → grade and per-subscriber payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutTable {
    pub tiers: Vec<PayoutTier>,
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                PayoutTier { min_score: 0.0,  grade: RiskGrade::Low,      payout: 0 },
                PayoutTier { min_score: 30.0, grade: RiskGrade::Moderate, payout: 5_000 },
                PayoutTier { min_score: 40.0, grade: RiskGrade::High,     payout: 10_000 },
                PayoutTier { min_score: 50.0, grade: RiskGrade::VeryHigh, payout: 20_000 },
            ],
        }
    }
}

impl PayoutTable {
    pub fn validate(&self) -> Result<()> {
        let mins: Vec<f64> = self.tiers.iter().map(|t| t.min_score).collect();
        check_ascending("payout_table", &mins)
    }

    /// Tier for `score`. The table must be validated.
    pub fn lookup(&self, score: f64) -> &PayoutTier {
        &self.tiers[tier_index(self.tiers.iter().map(|t| t.min_score), score)]
    }

    /// Boundary of the highest tier; every score at or above it pays the same.
    pub fn top_threshold(&self) -> f64 {
        self.tiers.last().map_or(0.0, |t| t.min_score)
    }
}

// ── Display grade table ─────────────────────────────────────────────────────

/// Score → display label only. Never consulted for payouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayGradeTable {
    pub tiers: Vec<GradeTier>,
}

impl Default for DisplayGradeTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                GradeTier { min_score: 0.0,  grade: RiskGrade::VeryLow },
                GradeTier { min_score: 20.0, grade: RiskGrade::Low },
                GradeTier { min_score: 30.0, grade: RiskGrade::Moderate },
                GradeTier { min_score: 40.0, grade: RiskGrade::High },
                GradeTier { min_score: 50.0, grade: RiskGrade::VeryHigh },
            ],
        }
    }
}

impl DisplayGradeTable {
    pub fn validate(&self) -> Result<()> {
        let mins: Vec<f64> = self.tiers.iter().map(|t| t.min_score).collect();
        check_ascending("display_grades", &mins)
    }

    /// Grade for `score`. The table must be validated.
    pub fn lookup(&self, score: f64) -> RiskGrade {
        self.tiers[tier_index(self.tiers.iter().map(|t| t.min_score), score)].grade
    }
}

// ── Free helpers ────────────────────────────────────────────────────────────

/// Expected payout for a sub-region: per-subscriber payout × subscriber count.
pub fn total_payout(payout: u64, subscribers: u64) -> u64 {
    payout * subscribers
}

/// Grade an aggregate predicted patient count for the regional headline.
/// Bounds are inclusive: 0, ≤2, ≤5, ≤10, above.
pub fn grade_predicted_count(predicted: f64) -> RiskGrade {
    if predicted <= 0.0 {
        RiskGrade::VeryLow
    } else if predicted <= 2.0 {
        RiskGrade::Low
    } else if predicted <= 5.0 {
        RiskGrade::Moderate
    } else if predicted <= 10.0 {
        RiskGrade::High
    } else {
        RiskGrade::VeryHigh
    }
}
