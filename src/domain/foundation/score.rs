//! Score value object (0-100 scale, fractional).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::ValidationError;

/// A quality score between 0 and 100 inclusive.
///
/// Scores are fractional because the overall score is a weighted sum of
/// dimension scores. NaN is never stored: construction maps it to zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Zero score.
    pub const ZERO: Self = Self(0.0);

    /// Perfect score.
    pub const MAX: Self = Self(100.0);

    /// Neutral score used when a value has to be backfilled.
    pub const NEUTRAL: Self = Self(50.0);

    /// Creates a new Score, clamping to the valid range.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Creates a Score, returning error if out of range or not a number.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::out_of_range("score", 0.0, 100.0, value));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the value rounded to one decimal place.
    pub fn rounded(&self) -> f64 {
        (self.0 * 10.0).round() / 10.0
    }

    /// Signed difference `self - earlier`.
    pub fn delta_from(&self, earlier: Score) -> f64 {
        self.0 - earlier.0
    }

    /// Total ordering; valid because NaN is never stored.
    pub fn total_cmp(&self, other: &Score) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_new_clamps_to_range() {
        assert_eq!(Score::new(-5.0).value(), 0.0);
        assert_eq!(Score::new(140.0).value(), 100.0);
        assert_eq!(Score::new(72.5).value(), 72.5);
    }

    #[test]
    fn score_new_maps_nan_to_zero() {
        assert_eq!(Score::new(f64::NAN), Score::ZERO);
    }

    #[test]
    fn score_try_new_rejects_out_of_range() {
        assert!(Score::try_new(100.1).is_err());
        assert!(Score::try_new(-0.1).is_err());
        assert!(Score::try_new(f64::INFINITY).is_err());
        assert!(Score::try_new(0.0).is_ok());
        assert!(Score::try_new(100.0).is_ok());
    }

    #[test]
    fn score_delta_is_signed() {
        let before = Score::new(70.0);
        let after = Score::new(65.5);
        assert!((after.delta_from(before) + 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn score_displays_one_decimal() {
        assert_eq!(format!("{}", Score::new(81.25)), "81.2");
        assert_eq!(format!("{}", Score::MAX), "100.0");
    }

    #[test]
    fn score_serializes_as_number() {
        let json = serde_json::to_string(&Score::new(42.0)).unwrap();
        assert_eq!(json, "42.0");
    }
}
