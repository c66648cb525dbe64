//! Cross-sub-region index normalisation.
//! Min-max scaling of one raw indicator column for a single date.

/// Min-max normalise `value` into [0, 1] against the observed `min_val`/`max_val`.
///
/// When `max_val == min_val` the range is taken as 1, so every value of a
/// constant column maps to 0.0 rather than NaN.
pub fn minmax_normalise(value: f64, min_val: f64, max_val: f64) -> f64 {
    let range = if max_val != min_val { max_val - min_val } else { 1.0 };
    (value - min_val) / range
}

/// Normalise a whole column, one entry per sub-region.
/// Returns values in the same order as input.
///
/// Precondition: callers filter out missing readings first. A NaN entry is not
/// used for the min/max and comes back as NaN.
pub fn minmax_normalise_column(raw: &[f64]) -> Vec<f64> {
    if raw.is_empty() {
        return vec![];
    }

    let min_val = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max_val = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    raw.iter()
        .map(|&v| minmax_normalise(v, min_val, max_val))
        .collect()
}
