//! weatherpay-scorer — Heat-illness damage scoring engine.
//! Turns district vulnerability profiles, daily observations and a regional
//! patient-count prediction into per-district damage scores, grades and payouts.

pub mod normalise;
pub mod weights;
pub mod vulnerability;
pub mod allocation;
pub mod persistence;
pub mod damage;
pub mod grading;
pub mod config;
pub mod prediction_provider;
pub mod engine;

// Re-export commonly used types
pub use config::EngineConfig;
pub use damage::ScoreFormula;
pub use engine::{CompositeScoreResult, DamageScoreEngine, DateReport, RangeWarning, ScoringInputs, ScoringRun};
pub use grading::RiskGrade;
pub use prediction_provider::{InMemoryPredictions, ModelPredictions, PatientCountModel, PredictionProvider};
