//! Summer feels-like temperature.
//!
//! Implements the national weather service's 2022 revision, which derives the
//! feels-like value from air temperature and a Stull (2011) wet-bulb estimate.

/// Round to `digits` decimal places.
fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Stull (2011) wet-bulb temperature (°C) from air temperature `ta` (°C) and
/// relative humidity `rh` (%). Rounded to three decimals.
///
/// Returns None when the inputs are not finite or humidity is out of the
/// formula's domain (the square root term needs `rh > -8.31`).
pub fn wet_bulb_stull(ta: f64, rh: f64) -> Option<f64> {
    if !ta.is_finite() || !rh.is_finite() || rh + 8.313659 < 0.0 {
        return None;
    }
    let tw = ta * (0.151977 * (rh + 8.313659).sqrt()).atan()
        + (ta + rh).atan()
        - (rh - 1.67633).atan()
        + 0.00391838 * rh.powf(1.5) * (0.023101 * rh).atan()
        - 4.686035;
    tw.is_finite().then(|| round_to(tw, 3))
}

/// Summer feels-like temperature (°C), rounded to one decimal.
pub fn summer_feels_like(ta: f64, rh: f64) -> Option<f64> {
    let tw = wet_bulb_stull(ta, rh)?;
    let value = -0.2442 + 0.55399 * tw + 0.45535 * ta - 0.0022 * tw * tw + 0.00278 * tw * ta + 3.0;
    Some(round_to(value, 1))
}

/// Daily mean of max and min temperature, rounded to one decimal.
pub fn average_temperature(tmax: f64, tmin: f64) -> f64 {
    round_to((tmax + tmin) / 2.0, 1)
}
