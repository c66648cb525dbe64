//! Shared fixtures for weatherpay tests.

use chrono::{Duration, NaiveDate};
use weatherpay_common::{DailyObservation, ObservationTable, SubRegionStaticProfile};

/// A date in July 2025, the season the fixtures cover.
pub fn july(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, day).expect("valid July date")
}

/// Profile with the same value for all three population ratios, so S equals `ratio`.
pub fn uniform_profile(
    name: &str,
    ratio: f64,
    heat_island: f64,
    green_space: f64,
    cooling_access: f64,
) -> SubRegionStaticProfile {
    SubRegionStaticProfile {
        name: name.to_string(),
        elderly_ratio: ratio,
        outdoor_worker_ratio: ratio,
        heat_vulnerable_ratio: ratio,
        heat_island_index: heat_island,
        green_space_ratio: green_space,
        cooling_access_ratio: cooling_access,
    }
}

/// Observations for the days ending at `end`, one per temperature, oldest first.
/// `patients_on_end` is recorded on `end`; earlier days record none.
pub fn heat_history(
    sub_region: &str,
    end: NaiveDate,
    temps: &[f64],
    patients_on_end: u32,
) -> Vec<DailyObservation> {
    let n = temps.len() as i64;
    temps
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let date = end - Duration::days(n - 1 - i as i64);
            let patients = if date == end { patients_on_end } else { 0 };
            DailyObservation::new(sub_region, date, t, patients)
        })
        .collect()
}

/// Two-district scenario with a zero-weight third district.
///
/// On [`two_district_date`] with an aggregate prediction of 10:
/// - A: S = 0.6, E = 0.5, one patient, no heatwave (H = 1.0)
/// - B: S = 0.4, E = 0.3, no patients, two days at 33–35 °C (H = 1.15)
/// - C: S = 0.0, takes no share of the prediction
///
/// Heat island is identical everywhere, so its normalised column is all zero.
pub fn two_district_profiles() -> Vec<SubRegionStaticProfile> {
    vec![
        uniform_profile("A", 0.6, 5.0, 0.0, 0.0),
        uniform_profile("B", 0.4, 5.0, 1.0, 1.0),
        uniform_profile("C", 0.0, 5.0, 3.0, 2.0),
    ]
}

pub fn two_district_date() -> NaiveDate {
    july(28)
}

pub fn two_district_observations() -> ObservationTable {
    let end = two_district_date();
    heat_history("A", end, &[29.0, 30.5, 31.0, 32.0, 30.0, 31.5, 32.5], 1)
        .into_iter()
        .chain(heat_history("B", end, &[30.0, 31.0, 32.0, 30.0, 31.0, 33.4, 34.1], 0))
        .chain(heat_history("C", end, &[28.0, 28.5, 29.0, 29.5, 30.0, 30.5, 31.0], 0))
        .collect()
}
