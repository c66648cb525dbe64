//! weatherpay-common — Shared types, errors, and weather formulas used across all weatherpay crates.

pub mod error;
pub mod entities;
pub mod feels_like;

// Re-export commonly used types
pub use entities::{DailyObservation, ObservationTable, SubRegionStaticProfile, WeatherFeatures};
pub use error::{Result, WeatherpayError};
