use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Engine config
// ---------------------------------------------------------------------------

/// Matching thresholds and bonuses. The defaults are the calibrated
/// production values; a TOML file can override any subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Winning scores below this are reported as no-match.
    pub confidence_floor: f64,
    /// Minimum score for adopting the directory address without review.
    pub high_confidence: f64,
    pub city_bonus: f64,
    pub address_exact_bonus: f64,
    pub address_contains_bonus: f64,
    /// Prefixed to a location's path alias to form report URLs.
    pub directory_base_url: Option<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.6,
            high_confidence: 0.8,
            city_bonus: 0.1,
            address_exact_bonus: 0.2,
            address_contains_bonus: 0.15,
            directory_base_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ReconError::ConfigValidation(format!(
                "confidence_floor must be within [0, 1], got {}",
                self.confidence_floor
            )));
        }

        if self.high_confidence < self.confidence_floor {
            return Err(ReconError::ConfigValidation(format!(
                "high_confidence ({}) must not be below confidence_floor ({})",
                self.high_confidence, self.confidence_floor
            )));
        }

        for (name, value) in [
            ("city_bonus", self.city_bonus),
            ("address_exact_bonus", self.address_exact_bonus),
            ("address_contains_bonus", self.address_contains_bonus),
        ] {
            if value < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
