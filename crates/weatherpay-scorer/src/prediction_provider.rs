//! Trait for aggregate prediction access.
//!
//! The engine only consumes one predicted patient count per date for the
//! parent region. Where that number comes from (a table exported by the
//! dashboard, a regression model run on the day's weather) is decided by the
//! caller through this trait.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use weatherpay_common::WeatherFeatures;

/// Source of parent-region predicted patient counts.
pub trait PredictionProvider: Send + Sync {
    /// Predicted count for `date`, or None when no prediction exists.
    fn predicted_count(&self, date: NaiveDate) -> Option<f64>;
}

// ── In-memory table ─────────────────────────────────────────────────────────

/// Pre-computed predictions keyed by date.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPredictions {
    data: BTreeMap<NaiveDate, f64>,
}

impl InMemoryPredictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prediction for one date.
    pub fn with(mut self, date: NaiveDate, predicted: f64) -> Self {
        self.data.insert(date, predicted);
        self
    }

    pub fn insert(&mut self, date: NaiveDate, predicted: f64) {
        self.data.insert(date, predicted);
    }
}

impl PredictionProvider for InMemoryPredictions {
    fn predicted_count(&self, date: NaiveDate) -> Option<f64> {
        self.data.get(&date).copied()
    }
}

// ── Model-backed provider ───────────────────────────────────────────────────

/// A trained patient-count regression model.
pub trait PatientCountModel: Send + Sync {
    fn predict(&self, features: &WeatherFeatures) -> f64;
}

impl<F> PatientCountModel for F
where
    F: Fn(&WeatherFeatures) -> f64 + Send + Sync,
{
    fn predict(&self, features: &WeatherFeatures) -> f64 {
        self(features)
    }
}

/// Derives each date's prediction by running an injected model over that
/// date's regional weather features.
pub struct ModelPredictions<M> {
    model: M,
    features: BTreeMap<NaiveDate, WeatherFeatures>,
}

impl<M: PatientCountModel> ModelPredictions<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            features: BTreeMap::new(),
        }
    }

    /// Register the regional weather for one date.
    pub fn with(mut self, date: NaiveDate, features: WeatherFeatures) -> Self {
        self.features.insert(date, features);
        self
    }

    /// Get the underlying model.
    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: PatientCountModel> PredictionProvider for ModelPredictions<M> {
    fn predicted_count(&self, date: NaiveDate) -> Option<f64> {
        let features = self.features.get(&date)?;
        Some(self.model.predict(features))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
