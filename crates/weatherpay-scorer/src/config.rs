//! Scoring engine configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Loaded from YAML, JSON or TOML.

use serde::{Deserialize, Serialize};
use weatherpay_common::Result;

use crate::allocation::AllocationConfig;
use crate::damage::ScoreFormula;
use crate::grading::{DisplayGradeTable, PayoutTable};
use crate::persistence::PersistenceConfig;
use crate::weights::{EnvironmentalWeights, SocialWeights};

/// Complete scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub social_weights: SocialWeights,

    #[serde(default)]
    pub environmental_weights: EnvironmentalWeights,

    #[serde(default)]
    pub allocation: AllocationConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Formula that produces `final_score` and drives grade and payout.
    #[serde(default)]
    pub formula: ScoreFormula,

    /// Multiply scores by the heatwave persistence factor H.
    #[serde(default = "default_true")]
    pub apply_persistence: bool,

    #[serde(default)]
    pub payout_table: PayoutTable,

    #[serde(default)]
    pub display_grades: DisplayGradeTable,
}

fn default_true() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            social_weights: SocialWeights::default(),
            environmental_weights: EnvironmentalWeights::default(),
            allocation: AllocationConfig::default(),
            persistence: PersistenceConfig::default(),
            formula: ScoreFormula::default(),
            apply_persistence: true,
            payout_table: PayoutTable::default(),
            display_grades: DisplayGradeTable::default(),
        }
    }
}

impl EngineConfig {
    /// Check every weight vector and threshold table.
    pub fn validate(&self) -> Result<()> {
        self.social_weights.validate()?;
        self.environmental_weights.validate()?;
        self.allocation.validate()?;
        self.persistence.validate()?;
        self.payout_table.validate()?;
        self.display_grades.validate()?;
        Ok(())
    }

    /// Load from YAML file
    pub fn from_yaml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to YAML file
    pub fn to_yaml(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::RiskGrade;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.formula, ScoreFormula::FinalScore);
        assert!(config.apply_persistence);
        assert!(!config.allocation.clamp_prediction);
        assert_eq!(config.allocation.normalization_constant, 25.0);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "
formula: legacy_capped
allocation:
  clamp_prediction: true
persistence:
  lookback_days: 5
";
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.formula, ScoreFormula::LegacyCapped);
        assert!(config.allocation.clamp_prediction);
        assert_eq!(config.allocation.normalization_constant, 25.0);
        assert_eq!(config.persistence.lookback_days, 5);
        assert_eq!(config.persistence.severe_threshold_c, 35.0);
        assert_eq!(config.payout_table, PayoutTable::default());
    }

    #[test]
    fn test_toml_payout_table() {
        let toml_src = r#"
[[payout_table.tiers]]
min_score = 0.0
grade = "low"
payout = 0

[[payout_table.tiers]]
min_score = 45.0
grade = "very_high"
payout = 30000
"#;
        let config: EngineConfig = toml::from_str(toml_src).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.payout_table.lookup(50.0).payout, 30_000);
        assert_eq!(config.payout_table.lookup(50.0).grade, RiskGrade::VeryHigh);
        assert_eq!(config.display_grades, DisplayGradeTable::default());
    }

    #[test]
    fn test_invalid_weights_fail_validation() {
        let json = r#"{ "social_weights": { "elderly": 0.9, "outdoor_worker": 0.3, "heat_vulnerable": 0.2 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("weatherpay-config-{}.yaml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = EngineConfig::default();
        config.apply_persistence = false;
        config.to_yaml(&path).unwrap();

        let loaded = EngineConfig::from_yaml(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(EngineConfig::from_json("/nonexistent/weatherpay.json").is_err());
    }
}
