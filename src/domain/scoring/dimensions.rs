//! Quality dimensions, their weights and weighted aggregation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::{Score, ValidationError};

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// A named quality axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    FrameworkAdherence,
    AudienceReadiness,
    Clarity,
    BusinessImpact,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::FrameworkAdherence,
        Dimension::AudienceReadiness,
        Dimension::Clarity,
        Dimension::BusinessImpact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::FrameworkAdherence => "framework_adherence",
            Dimension::AudienceReadiness => "audience_readiness",
            Dimension::Clarity => "clarity",
            Dimension::BusinessImpact => "business_impact",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::FrameworkAdherence => "Framework adherence",
            Dimension::AudienceReadiness => "Audience readiness",
            Dimension::Clarity => "Clarity",
            Dimension::BusinessImpact => "Business impact",
        }
    }

    /// Weighted sub-assessments a dimension score is composed of.
    ///
    /// Weights of each table sum to 1.0.
    pub fn sub_assessments(&self) -> &'static [(&'static str, f64)] {
        match self {
            Dimension::FrameworkAdherence => &[
                ("step_coverage", 0.5),
                ("sequence_order", 0.3),
                ("slide_count_fit", 0.2),
            ],
            Dimension::AudienceReadiness => &[
                ("language_appropriateness", 0.4),
                ("value_clarity", 0.3),
                ("actionability", 0.3),
            ],
            Dimension::Clarity => &[
                ("message_focus", 0.4),
                ("concision", 0.3),
                ("headline_quality", 0.3),
            ],
            Dimension::BusinessImpact => &[
                ("quantified_evidence", 0.4),
                ("outcome_language", 0.3),
                ("call_to_action", 0.3),
            ],
        }
    }

    /// Combines sub-assessment values into the dimension score.
    ///
    /// Every value is clamped to [0, 100] before weighting. Sub-assessments
    /// absent from `values` count as neutral (50).
    pub fn combine(&self, values: &HashMap<String, f64>) -> Score {
        let total = self
            .sub_assessments()
            .iter()
            .map(|(name, weight)| {
                let value = values
                    .get(*name)
                    .map(|v| Score::new(*v))
                    .unwrap_or(Score::NEUTRAL);
                value.value() * weight
            })
            .sum();
        Score::new(total)
    }

    pub fn from_label(label: &str) -> Option<Dimension> {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "framework_adherence" | "framework" | "framework_compliance" => {
                Some(Dimension::FrameworkAdherence)
            }
            "audience_readiness" | "audience" | "audience_fit" => Some(Dimension::AudienceReadiness),
            "clarity" => Some(Dimension::Clarity),
            "business_impact" | "impact" => Some(Dimension::BusinessImpact),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weight of each dimension in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub framework_adherence: f64,
    pub audience_readiness: f64,
    pub clarity: f64,
    pub business_impact: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            framework_adherence: 0.25,
            audience_readiness: 0.30,
            clarity: 0.25,
            business_impact: 0.20,
        }
    }
}

impl DimensionWeights {
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::FrameworkAdherence => self.framework_adherence,
            Dimension::AudienceReadiness => self.audience_readiness,
            Dimension::Clarity => self.clarity,
            Dimension::BusinessImpact => self.business_impact,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.weight(*d)).sum()
    }

    /// Weights must be non-negative and sum to 1.0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for dimension in Dimension::ALL {
            let w = self.weight(dimension);
            if !w.is_finite() || w < 0.0 {
                return Err(ValidationError::out_of_range(dimension.as_str(), 0.0, 1.0, w));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ValidationError::invalid_format(
                "dimension_weights",
                format!("weights must sum to 1.0, got {:.6}", sum),
            ));
        }
        Ok(())
    }
}

/// Score for every dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub framework_adherence: Score,
    pub audience_readiness: Score,
    pub clarity: Score,
    pub business_impact: Score,
}

impl DimensionScores {
    pub fn new(framework_adherence: f64, audience_readiness: f64, clarity: f64, business_impact: f64) -> Self {
        Self {
            framework_adherence: Score::new(framework_adherence),
            audience_readiness: Score::new(audience_readiness),
            clarity: Score::new(clarity),
            business_impact: Score::new(business_impact),
        }
    }

    /// Every dimension at the same value.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn get(&self, dimension: Dimension) -> Score {
        match dimension {
            Dimension::FrameworkAdherence => self.framework_adherence,
            Dimension::AudienceReadiness => self.audience_readiness,
            Dimension::Clarity => self.clarity,
            Dimension::BusinessImpact => self.business_impact,
        }
    }

    pub fn set(&mut self, dimension: Dimension, score: Score) {
        match dimension {
            Dimension::FrameworkAdherence => self.framework_adherence = score,
            Dimension::AudienceReadiness => self.audience_readiness = score,
            Dimension::Clarity => self.clarity = score,
            Dimension::BusinessImpact => self.business_impact = score,
        }
    }

    /// Weighted sum of all dimensions.
    pub fn overall(&self, weights: &DimensionWeights) -> Score {
        let total = Dimension::ALL
            .iter()
            .map(|d| self.get(*d).value() * weights.weight(*d))
            .sum();
        Score::new(total)
    }

    /// Per-dimension change from `earlier` to `self`.
    pub fn deltas_from(&self, earlier: &DimensionScores) -> Vec<DimensionDelta> {
        Dimension::ALL
            .iter()
            .map(|d| DimensionDelta {
                dimension: *d,
                delta: self.get(*d).delta_from(earlier.get(*d)),
            })
            .collect()
    }

    /// The lowest-scoring dimension (first in declaration order on ties).
    pub fn weakest(&self) -> Dimension {
        Dimension::ALL
            .iter()
            .copied()
            .fold(Dimension::FrameworkAdherence, |weakest, d| {
                if self.get(d).value() < self.get(weakest).value() {
                    d
                } else {
                    weakest
                }
            })
    }
}

/// Change of a single dimension between two scoring passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionDelta {
    pub dimension: Dimension,
    pub delta: f64,
}
