//! Refinement loop configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::feedback::Curriculum;
use crate::domain::foundation::Score;
use crate::domain::framework::{FrameworkCatalog, FrameworkId};
use crate::domain::refinement::StoppingPolicy;

/// Settings for one refinement session.
#[derive(Debug, Clone, Deserialize)]
pub struct RefinementConfig {
    /// Overall score that ends the loop, 0-100
    #[serde(default = "default_target")]
    pub target_score: f64,

    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Smallest gain that keeps the loop going after round 1
    #[serde(default = "default_min_improvement")]
    pub min_improvement: f64,

    /// Timeout wrapped around every remote call, in seconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Retries of a failed scoring call before the rule-based fallback
    #[serde(default = "default_scoring_retries")]
    pub scoring_retries: u32,

    /// Generation attempts per round when the response is structurally invalid
    #[serde(default = "default_generation_attempts")]
    pub generation_attempts: u32,

    /// Move on to the next round instead of stopping when regeneration fails
    #[serde(default)]
    pub continue_after_failed_round: bool,

    /// Use this framework instead of asking for a recommendation
    pub framework: Option<String>,

    /// YAML file replacing the built-in framework catalog
    pub framework_catalog_path: Option<PathBuf>,

    /// YAML file replacing the default curriculum
    pub curriculum_path: Option<PathBuf>,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            target_score: default_target(),
            max_rounds: default_max_rounds(),
            min_improvement: default_min_improvement(),
            call_timeout_secs: default_call_timeout(),
            scoring_retries: default_scoring_retries(),
            generation_attempts: default_generation_attempts(),
            continue_after_failed_round: false,
            framework: None,
            framework_catalog_path: None,
            curriculum_path: None,
        }
    }
}

impl RefinementConfig {
    pub fn target(&self) -> Score {
        Score::new(self.target_score)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn stopping_policy(&self) -> StoppingPolicy {
        StoppingPolicy::new(self.target(), self.max_rounds).with_min_improvement(self.min_improvement)
    }

    /// The configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<FrameworkCatalog, ValidationError> {
        match &self.framework_catalog_path {
            Some(path) => {
                let yaml = read(path).map_err(ValidationError::InvalidCatalog)?;
                FrameworkCatalog::from_yaml(&yaml).map_err(|e| ValidationError::InvalidCatalog(e.to_string()))
            }
            None => Ok(FrameworkCatalog::builtin().clone()),
        }
    }

    /// The configured curriculum, or the default one.
    pub fn load_curriculum(&self) -> Result<Curriculum, ValidationError> {
        let Some(path) = &self.curriculum_path else {
            return Ok(Curriculum::default());
        };
        let yaml = read(path).map_err(ValidationError::InvalidCurriculum)?;
        let curriculum: Curriculum =
            serde_yaml::from_str(&yaml).map_err(|e| ValidationError::InvalidCurriculum(e.to_string()))?;
        curriculum
            .validate()
            .map_err(|e| ValidationError::InvalidCurriculum(e.to_string()))?;
        Ok(curriculum)
    }

    /// The pinned framework, checked against `catalog`.
    pub fn pinned_framework(&self, catalog: &FrameworkCatalog) -> Result<Option<FrameworkId>, ValidationError> {
        let Some(raw) = &self.framework else {
            return Ok(None);
        };
        let id = FrameworkId::new(raw.as_str()).map_err(|_| ValidationError::UnknownFramework(raw.clone()))?;
        if !catalog.contains(&id) {
            return Err(ValidationError::UnknownFramework(raw.clone()));
        }
        Ok(Some(id))
    }

    /// Checks thresholds, then that the catalog, curriculum and pinned
    /// framework all load.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.target_score.is_finite() || !(0.0..=100.0).contains(&self.target_score) {
            return Err(ValidationError::InvalidTarget(self.target_score));
        }
        if self.max_rounds == 0 {
            return Err(ValidationError::InvalidRounds);
        }
        if !self.min_improvement.is_finite() || self.min_improvement < 0.0 {
            return Err(ValidationError::InvalidThreshold {
                name: "min_improvement",
                value: self.min_improvement,
            });
        }
        if self.call_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("refinement.call_timeout_secs"));
        }
        if self.generation_attempts == 0 {
            return Err(ValidationError::InvalidThreshold {
                name: "generation_attempts",
                value: 0.0,
            });
        }
        let catalog = self.load_catalog()?;
        self.load_curriculum()?;
        self.pinned_framework(&catalog)?;
        Ok(())
    }
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn default_target() -> f64 {
    85.0
}

fn default_max_rounds() -> u32 {
    5
}

fn default_min_improvement() -> f64 {
    crate::domain::refinement::DEFAULT_MIN_IMPROVEMENT
}

fn default_call_timeout() -> u64 {
    60
}

fn default_scoring_retries() -> u32 {
    2
}

fn default_generation_attempts() -> u32 {
    2
}
