//! Scoring configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::scoring::DimensionWeights;

/// Weights used to combine dimension scores.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: DimensionWeights,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.weights
            .validate()
            .map_err(|e| ValidationError::InvalidWeights(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let config = ScoringConfig {
            weights: DimensionWeights {
                framework_adherence: 0.5,
                audience_readiness: 0.5,
                clarity: 0.5,
                business_impact: 0.5,
            },
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidWeights(_))));
    }
}
