//! Batch damage-score engine.
//!
//! For one date:
//!   1. fetch the parent-region prediction,
//!   2. normalise environmental attributes and sum S across every profiled
//!      sub-region (the only cross-sub-region step),
//!   3. score each sub-region independently on the rayon pool.
//!
//! Missing inputs are reported per row as errors, never scored as zero.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use weatherpay_common::{ObservationTable, Result, SubRegionStaticProfile, WeatherpayError};

use crate::allocation::allocate_proportional;
use crate::config::EngineConfig;
use crate::damage::{ScoreFormula, ScoreInputs};
use crate::grading::{total_payout, RiskGrade};
use crate::prediction_provider::PredictionProvider;
use crate::vulnerability::{compute_indices, VulnerabilityIndices};

/// A value past its nominal bound. Reported as data, not as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeWarning {
    /// P_pred above 1.0: the allocated count exceeded K and was not clamped.
    PredictionAboveOne { value: f64 },
    /// Final score above 100 × applied H, only reachable with inputs above 1.
    ScoreAboveNominal { value: f64, bound: f64 },
}

/// One scored (sub-region, date) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScoreResult {
    pub sub_region: String,
    pub date: NaiveDate,
    pub social_index: f64,
    pub environmental_index: f64,
    /// Share of the aggregate prediction before compression.
    pub raw_allocated: f64,
    /// Prediction term used by the configured formula.
    pub p_pred: f64,
    pub p_real: f64,
    pub persistence: f64,
    pub pre_score: f64,
    pub final_score: f64,
    pub risk_grade: RiskGrade,
    pub display_grade: RiskGrade,
    /// Payout per subscriber, in won.
    pub payout: u64,
    pub total_payout: Option<u64>,
    pub warnings: Vec<RangeWarning>,
}

/// Per-sub-region result: a scored row or the reason it was refused.
pub type SubRegionOutcome = std::result::Result<CompositeScoreResult, WeatherpayError>;

/// All outcomes for one date, in sub-region name order.
#[derive(Debug)]
pub struct DateReport {
    pub date: NaiveDate,
    pub aggregate_prediction: f64,
    pub outcomes: Vec<SubRegionOutcome>,
}

impl DateReport {
    pub fn scored(&self) -> impl Iterator<Item = &CompositeScoreResult> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &WeatherpayError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn get(&self, sub_region: &str) -> Option<&CompositeScoreResult> {
        self.scored().find(|r| r.sub_region == sub_region)
    }

    /// Sum of expected payouts over rows that have a subscriber count.
    pub fn total_expected_payout(&self) -> u64 {
        self.scored().filter_map(|r| r.total_payout).sum()
    }
}

/// Reports for a batch of dates.
#[derive(Debug)]
pub struct ScoringRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub formula: ScoreFormula,
    pub reports: Vec<Result<DateReport>>,
}

/// Inputs handed over by the data collaborators. Fully loaded before scoring.
#[derive(Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub profiles: &'a [SubRegionStaticProfile],
    pub observations: &'a ObservationTable,
    pub predictions: &'a dyn PredictionProvider,
    /// Subscriber count per sub-region, for `total_payout`.
    pub subscribers: Option<&'a BTreeMap<String, u64>>,
}

impl<'a> ScoringInputs<'a> {
    pub fn new(
        profiles: &'a [SubRegionStaticProfile],
        observations: &'a ObservationTable,
        predictions: &'a dyn PredictionProvider,
    ) -> Self {
        Self {
            profiles,
            observations,
            predictions,
            subscribers: None,
        }
    }

    pub fn with_subscribers(mut self, subscribers: &'a BTreeMap<String, u64>) -> Self {
        self.subscribers = Some(subscribers);
        self
    }
}

/// Damage-score engine over a validated configuration.
#[derive(Debug, Clone)]
pub struct DamageScoreEngine {
    config: EngineConfig,
}

impl DamageScoreEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score every sub-region for `date`.
    ///
    /// Fails as a whole when the date has no usable prediction or the social
    /// indices sum to zero. Individual sub-regions without a profile or an
    /// observation come back as `Err` outcomes.
    pub fn score_date(&self, date: NaiveDate, inputs: &ScoringInputs<'_>) -> Result<DateReport> {
        let aggregate = inputs
            .predictions
            .predicted_count(date)
            .ok_or(WeatherpayError::MissingPrediction { date })?;

        let by_name: BTreeMap<&str, &SubRegionStaticProfile> = inputs
            .profiles
            .iter()
            .map(|p| (p.name.as_str(), p))
            .collect();

        let universe: Vec<&str> = by_name
            .keys()
            .copied()
            .chain(inputs.observations.sub_regions_on(date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Barrier: normalisation and allocation need every profiled sub-region.
        let profiled: Vec<&SubRegionStaticProfile> = by_name.values().copied().collect();
        let indices = compute_indices(
            &profiled,
            &self.config.social_weights,
            &self.config.environmental_weights,
        );
        let raw_allocated = if profiled.is_empty() {
            vec![]
        } else {
            let social: Vec<f64> = indices.iter().map(|i| i.social).collect();
            allocate_proportional(date, aggregate, &social)?
        };
        let position: BTreeMap<&str, usize> = profiled
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect();

        let outcomes: Vec<SubRegionOutcome> = universe
            .par_iter()
            .map(|&name| match position.get(name) {
                Some(&i) => self.score_sub_region(date, name, indices[i], raw_allocated[i], inputs),
                None => Err(WeatherpayError::MissingProfile {
                    sub_region: name.to_string(),
                }),
            })
            .collect();

        let report = DateReport {
            date,
            aggregate_prediction: aggregate,
            outcomes,
        };

        for err in report.rejected() {
            debug!(%date, error = %err, "Sub-region not scored");
        }
        info!(
            %date,
            aggregate_prediction = aggregate,
            sub_regions = report.outcomes.len(),
            scored = report.scored().count(),
            rejected = report.rejected().count(),
            "Scored date"
        );

        Ok(report)
    }

    /// Score a batch of dates. A failed date is kept in the run as `Err`.
    pub fn score_dates(&self, dates: &[NaiveDate], inputs: &ScoringInputs<'_>) -> ScoringRun {
        let run_id = Uuid::new_v4();
        info!(%run_id, dates = dates.len(), formula = %self.config.formula, "Starting scoring run");

        let reports = dates
            .iter()
            .map(|&date| {
                let report = self.score_date(date, inputs);
                if let Err(ref err) = report {
                    debug!(%run_id, %date, error = %err, "Date not scored");
                }
                report
            })
            .collect();

        ScoringRun {
            run_id,
            generated_at: Utc::now(),
            formula: self.config.formula,
            reports,
        }
    }

    fn score_sub_region(
        &self,
        date: NaiveDate,
        name: &str,
        indices: VulnerabilityIndices,
        raw_allocated: f64,
        inputs: &ScoringInputs<'_>,
    ) -> SubRegionOutcome {
        let cfg = &self.config;
        let observation = inputs.observations.get(name, date).ok_or_else(|| {
            WeatherpayError::MissingObservation {
                sub_region: name.to_string(),
                date,
            }
        })?;

        // A day without a record is NaN, which meets no threshold and breaks the run.
        let history: Vec<f64> = inputs
            .observations
            .window(name, date, cfg.persistence.lookback_days)
            .into_iter()
            .map(|t| t.unwrap_or(f64::NAN))
            .collect();
        let persistence = cfg.persistence.multiplier(&history);

        let base = ScoreInputs {
            social: indices.social,
            environmental: indices.environmental,
            p_pred: cfg.allocation.compress(raw_allocated),
            p_real: observation.occurrence(),
            persistence,
        };
        let pre_score = ScoreFormula::PreScore.score(&base, cfg.apply_persistence);

        let scored = ScoreInputs {
            p_pred: cfg.formula.prediction_term(raw_allocated, &cfg.allocation),
            ..base
        };
        let final_score = cfg.formula.score(&scored, cfg.apply_persistence);

        let tier = cfg.payout_table.lookup(final_score);
        let total = inputs
            .subscribers
            .and_then(|s| s.get(name))
            .map(|&n| total_payout(tier.payout, n));

        let mut warnings = Vec::new();
        if scored.p_pred > 1.0 {
            warnings.push(RangeWarning::PredictionAboveOne { value: scored.p_pred });
        }
        let applied_h = if cfg.apply_persistence && cfg.formula.uses_persistence() {
            persistence
        } else {
            1.0
        };
        let bound = 100.0 * applied_h;
        if final_score > bound {
            warnings.push(RangeWarning::ScoreAboveNominal { value: final_score, bound });
        }
        if !warnings.is_empty() {
            debug!(%date, sub_region = name, ?warnings, "Score outside nominal range");
        }

        Ok(CompositeScoreResult {
            sub_region: name.to_string(),
            date,
            social_index: indices.social,
            environmental_index: indices.environmental,
            raw_allocated,
            p_pred: scored.p_pred,
            p_real: scored.p_real,
            persistence,
            pre_score,
            final_score,
            risk_grade: tier.grade,
            display_grade: cfg.display_grades.lookup(final_score),
            payout: tier.payout,
            total_payout: total,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction_provider::InMemoryPredictions;
    use weatherpay_common::DailyObservation;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn profile(name: &str, elderly: f64, heat_island: f64) -> SubRegionStaticProfile {
        SubRegionStaticProfile {
            name: name.to_string(),
            elderly_ratio: elderly,
            outdoor_worker_ratio: 0.1,
            heat_vulnerable_ratio: 0.2,
            heat_island_index: heat_island,
            green_space_ratio: 0.3,
            cooling_access_ratio: 0.7,
        }
    }

    #[test]
    fn test_missing_prediction_is_date_error() {
        let engine = DamageScoreEngine::new(EngineConfig::default()).unwrap();
        let profiles = vec![profile("Mapo-gu", 0.2, 3.0)];
        let observations = ObservationTable::new();
        let predictions = InMemoryPredictions::new();
        let inputs = ScoringInputs::new(&profiles, &observations, &predictions);

        let err = engine.score_date(day(1), &inputs).unwrap_err();
        assert!(matches!(err, WeatherpayError::MissingPrediction { .. }));
    }

    #[test]
    fn test_zero_social_sum_is_date_error() {
        let engine = DamageScoreEngine::new(EngineConfig::default()).unwrap();
        let mut zero = profile("Mapo-gu", 0.0, 3.0);
        zero.outdoor_worker_ratio = 0.0;
        zero.heat_vulnerable_ratio = 0.0;
        let profiles = vec![zero];
        let observations = ObservationTable::new().with(DailyObservation::new("Mapo-gu", day(1), 30.0, 0));
        let predictions = InMemoryPredictions::new().with(day(1), 4.0);
        let inputs = ScoringInputs::new(&profiles, &observations, &predictions);

        let err = engine.score_date(day(1), &inputs).unwrap_err();
        assert!(matches!(err, WeatherpayError::ZeroTotalWeight { .. }));
    }

    #[test]
    fn test_missing_rows_reported_not_zeroed() {
        let engine = DamageScoreEngine::new(EngineConfig::default()).unwrap();
        let profiles = vec![profile("Mapo-gu", 0.2, 3.0), profile("Jung-gu", 0.3, 5.0)];
        let observations = ObservationTable::new()
            .with(DailyObservation::new("Mapo-gu", day(1), 30.0, 0))
            .with(DailyObservation::new("Unlisted-gu", day(1), 31.0, 2));
        let predictions = InMemoryPredictions::new().with(day(1), 4.0);
        let inputs = ScoringInputs::new(&profiles, &observations, &predictions);

        let report = engine.score_date(day(1), &inputs).unwrap();
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.scored().count(), 1);
        assert!(report.get("Mapo-gu").is_some());

        let rejected: Vec<_> = report.rejected().collect();
        assert!(rejected.iter().all(|e| e.is_missing_input()));
        assert!(rejected.iter().any(|e| matches!(
            e,
            WeatherpayError::MissingProfile { sub_region } if sub_region == "Unlisted-gu"
        )));
        assert!(rejected.iter().any(|e| matches!(
            e,
            WeatherpayError::MissingObservation { sub_region, .. } if sub_region == "Jung-gu"
        )));
    }

    #[test]
    fn test_unclamped_prediction_warns() {
        let engine = DamageScoreEngine::new(EngineConfig::default()).unwrap();
        let profiles = vec![profile("Mapo-gu", 0.2, 3.0)];
        let observations = ObservationTable::new().with(DailyObservation::new("Mapo-gu", day(1), 30.0, 0));
        let predictions = InMemoryPredictions::new().with(day(1), 36.0);
        let inputs = ScoringInputs::new(&profiles, &observations, &predictions);

        let report = engine.score_date(day(1), &inputs).unwrap();
        let row = report.get("Mapo-gu").unwrap();
        assert!((row.p_pred - 1.2).abs() < 1e-12);
        assert!(row
            .warnings
            .iter()
            .any(|w| matches!(w, RangeWarning::PredictionAboveOne { .. })));
    }

    #[test]
    fn test_clamp_flag_caps_prediction() {
        let mut config = EngineConfig::default();
        config.allocation.clamp_prediction = true;
        let engine = DamageScoreEngine::new(config).unwrap();
        let profiles = vec![profile("Mapo-gu", 0.2, 3.0)];
        let observations = ObservationTable::new().with(DailyObservation::new("Mapo-gu", day(1), 30.0, 0));
        let predictions = InMemoryPredictions::new().with(day(1), 36.0);
        let inputs = ScoringInputs::new(&profiles, &observations, &predictions);

        let report = engine.score_date(day(1), &inputs).unwrap();
        let row = report.get("Mapo-gu").unwrap();
        assert_eq!(row.p_pred, 1.0);
        assert!(row.warnings.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.social_weights.elderly = 0.9;
        assert!(DamageScoreEngine::new(config).is_err());
    }

    #[test]
    fn test_run_keeps_failed_dates() {
        let engine = DamageScoreEngine::new(EngineConfig::default()).unwrap();
        let profiles = vec![profile("Mapo-gu", 0.2, 3.0)];
        let observations = ObservationTable::new()
            .with(DailyObservation::new("Mapo-gu", day(1), 30.0, 0))
            .with(DailyObservation::new("Mapo-gu", day(2), 30.0, 0));
        let predictions = InMemoryPredictions::new().with(day(1), 3.0);
        let inputs = ScoringInputs::new(&profiles, &observations, &predictions);

        let run = engine.score_dates(&[day(1), day(2)], &inputs);
        assert_eq!(run.reports.len(), 2);
        assert!(run.reports[0].is_ok());
        assert!(matches!(run.reports[1], Err(WeatherpayError::MissingPrediction { .. })));
        assert_eq!(run.formula, ScoreFormula::FinalScore);
    }
}
