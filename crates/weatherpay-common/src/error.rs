use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherpayError {
    #[error("No static profile for sub-region {sub_region}")]
    MissingProfile { sub_region: String },

    #[error("No aggregate prediction for {date}")]
    MissingPrediction { date: NaiveDate },

    #[error("No observation for sub-region {sub_region} on {date}")]
    MissingObservation { sub_region: String, date: NaiveDate },

    #[error("Aggregate prediction for {date} is not a usable count: {value}")]
    InvalidPrediction { date: NaiveDate, value: f64 },

    #[error("Social indices sum to zero on {date}; allocation is undefined")]
    ZeroTotalWeight { date: NaiveDate },

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeatherpayError {
    /// True for the missing-input family: the row or date was refused, not scored as zero.
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            Self::MissingProfile { .. }
                | Self::MissingPrediction { .. }
                | Self::MissingObservation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WeatherpayError>;
