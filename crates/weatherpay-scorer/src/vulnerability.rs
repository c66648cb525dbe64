//! Social (S) and environmental (E) vulnerability indices.
//!
//! S = Σ w_i × ratio_i over the pre-scaled population ratios, no normalisation.
//! E = w_hi × heat_island_std + w_gs × (1 − green_space_std) + w_ca × (1 − cooling_access_std)
//!
//! The three `_std` columns come from one min-max pass over every sub-region
//! scored that day, so E is the only index with a cross-sub-region dependency.

use serde::{Deserialize, Serialize};
use weatherpay_common::SubRegionStaticProfile;

use crate::normalise::minmax_normalise_column;
use crate::weights::{EnvironmentalWeights, SocialWeights};

/// S and E for one sub-region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityIndices {
    pub social: f64,
    pub environmental: f64,
}

/// Compute S for one sub-region.
pub fn social_index(profile: &SubRegionStaticProfile, weights: &SocialWeights) -> f64 {
    weights.elderly * profile.elderly_ratio
        + weights.outdoor_worker * profile.outdoor_worker_ratio
        + weights.heat_vulnerable * profile.heat_vulnerable_ratio
}

/// Compute E from already-normalised environmental attributes.
pub fn environmental_index(
    heat_island_std: f64,
    green_space_std: f64,
    cooling_access_std: f64,
    weights: &EnvironmentalWeights,
) -> f64 {
    weights.heat_island * heat_island_std
        + weights.green_space_deficit * (1.0 - green_space_std)
        + weights.cooling_access_deficit * (1.0 - cooling_access_std)
}

/// Compute S and E for every profile, normalising the environmental columns
/// across the whole slice first. Output order matches input order.
pub fn compute_indices(
    profiles: &[&SubRegionStaticProfile],
    social_weights: &SocialWeights,
    environmental_weights: &EnvironmentalWeights,
) -> Vec<VulnerabilityIndices> {
    let column = |f: fn(&SubRegionStaticProfile) -> f64| -> Vec<f64> {
        minmax_normalise_column(&profiles.iter().map(|p| f(p)).collect::<Vec<_>>())
    };
    let heat_island = column(|p| p.heat_island_index);
    let green_space = column(|p| p.green_space_ratio);
    let cooling_access = column(|p| p.cooling_access_ratio);

    profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| VulnerabilityIndices {
            social: social_index(profile, social_weights),
            environmental: environmental_index(
                heat_island[i],
                green_space[i],
                cooling_access[i],
                environmental_weights,
            ),
        })
        .collect()
}
