/// Core domain types shared by the scorer and its data providers.
/// Static district profiles, daily observation rows, and model input features.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::feels_like::{average_temperature, summer_feels_like};

// ---------------------------------------------------------------------------
// Sub-region static profile
// ---------------------------------------------------------------------------

/// Static vulnerability attributes of one sub-region (district).
///
/// The three population ratios are expected pre-scaled to [0, 1] by the data
/// provider. The three environmental attributes are raw and are min-max
/// normalised across sub-regions before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRegionStaticProfile {
    pub name: String,
    pub elderly_ratio: f64,
    pub outdoor_worker_ratio: f64,
    pub heat_vulnerable_ratio: f64,
    pub heat_island_index: f64,
    pub green_space_ratio: f64,
    pub cooling_access_ratio: f64,
}

// ---------------------------------------------------------------------------
// Daily observation
// ---------------------------------------------------------------------------

/// One (sub-region, date) record: recorded patients and max feels-like temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub sub_region: String,
    pub date: NaiveDate,
    pub max_feels_like: f64,
    pub patient_count: u32,
}

impl DailyObservation {
    pub fn new(sub_region: impl Into<String>, date: NaiveDate, max_feels_like: f64, patient_count: u32) -> Self {
        Self {
            sub_region: sub_region.into(),
            date,
            max_feels_like,
            patient_count,
        }
    }

    /// Build a record from daily max temperature and mean humidity, deriving
    /// the feels-like value. Falls back to the air temperature when the
    /// humidity reading is unusable.
    pub fn from_weather(
        sub_region: impl Into<String>,
        date: NaiveDate,
        max_temperature: f64,
        humidity: f64,
        patient_count: u32,
    ) -> Self {
        let max_feels_like = summer_feels_like(max_temperature, humidity).unwrap_or(max_temperature);
        Self::new(sub_region, date, max_feels_like, patient_count)
    }

    /// Binary occurrence indicator: 1.0 when at least one patient was recorded.
    pub fn occurrence(&self) -> f64 {
        if self.patient_count >= 1 { 1.0 } else { 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Observation table
// ---------------------------------------------------------------------------

/// In-memory daily observation table keyed by (sub-region, date).
///
/// Later inserts for the same key replace earlier ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationTable {
    rows: BTreeMap<String, BTreeMap<NaiveDate, DailyObservation>>,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, obs: DailyObservation) {
        self.rows
            .entry(obs.sub_region.clone())
            .or_default()
            .insert(obs.date, obs);
    }

    pub fn with(mut self, obs: DailyObservation) -> Self {
        self.insert(obs);
        self
    }

    pub fn get(&self, sub_region: &str, date: NaiveDate) -> Option<&DailyObservation> {
        self.rows.get(sub_region)?.get(&date)
    }

    /// Sub-regions with a record on `date`, in name order.
    pub fn sub_regions_on(&self, date: NaiveDate) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|(_, by_date)| by_date.contains_key(&date))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Max feels-like temperatures for the `days` days ending at `end`
    /// (inclusive), oldest first. A day without a record is `None`.
    pub fn window(&self, sub_region: &str, end: NaiveDate, days: u32) -> Vec<Option<f64>> {
        let by_date = self.rows.get(sub_region);
        (0..days as i64)
            .rev()
            .map(|back| {
                let day = end - Duration::days(back);
                by_date
                    .and_then(|m| m.get(&day))
                    .map(|obs| obs.max_feels_like)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<DailyObservation> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = DailyObservation>>(iter: I) -> Self {
        let mut table = Self::new();
        for obs in iter {
            table.insert(obs);
        }
        table
    }
}

// ---------------------------------------------------------------------------
// Model input features
// ---------------------------------------------------------------------------

/// The five regional weather features the patient-count regression model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherFeatures {
    pub max_feels_like: f64,
    pub max_temperature: f64,
    pub avg_temperature: f64,
    pub min_temperature: f64,
    pub avg_humidity: f64,
}

impl WeatherFeatures {
    /// Derive the feature row from daily max/min temperature and mean humidity.
    pub fn from_daily(max_temperature: f64, min_temperature: f64, avg_humidity: f64) -> Self {
        Self {
            max_feels_like: summer_feels_like(max_temperature, avg_humidity).unwrap_or(max_temperature),
            max_temperature,
            avg_temperature: average_temperature(max_temperature, min_temperature),
            min_temperature,
            avg_humidity,
        }
    }

    /// Feature values in the model's training column order.
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.max_feels_like,
            self.max_temperature,
            self.avg_temperature,
            self.min_temperature,
            self.avg_humidity,
        ]
    }
}
