//! Pattern strength classification.
//!
//! Buckets a learned pattern into a [`PatternStrength`] tier from its
//! `(confidence, frequency)` pair. Tiers are checked strongest first and
//! the first match wins; a tier matches only when **both** its confidence
//! and its frequency thresholds are met.
//!
//! | Tier | Confidence ≥ | Frequency ≥ |
//! |------|--------------|-------------|
//! | critical | 90 | 10 |
//! | strong | 75 | 5 |
//! | moderate | 60 | 3 |
//! | weak | otherwise | — |
//!
//! The table is a policy value ([`StrengthThresholds`]) so organizations
//! can tune it; [`classify`] and [`update_metrics`] use the default table.
//!
//! The classifier does not clamp. Confidence outside `[0, 100]` is a caller
//! error; boundary code should run values through [`clamp_confidence`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{LearningPattern, PatternStrength};

/// Lower bound of the confidence domain.
pub const MIN_CONFIDENCE: f64 = 0.0;
/// Upper bound of the confidence domain.
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Minimum confidence and frequency required to reach one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThreshold {
    pub min_confidence: f64,
    pub min_frequency: u32,
}

impl TierThreshold {
    fn is_met(&self, confidence: f64, frequency: u32) -> bool {
        confidence >= self.min_confidence && frequency >= self.min_frequency
    }
}

/// Thresholds for every tier above `weak`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthThresholds {
    pub critical: TierThreshold,
    pub strong: TierThreshold,
    pub moderate: TierThreshold,
}

impl Default for StrengthThresholds {
    fn default() -> Self {
        Self {
            critical: TierThreshold {
                min_confidence: 90.0,
                min_frequency: 10,
            },
            strong: TierThreshold {
                min_confidence: 75.0,
                min_frequency: 5,
            },
            moderate: TierThreshold {
                min_confidence: 60.0,
                min_frequency: 3,
            },
        }
    }
}

impl StrengthThresholds {
    /// Check that confidences lie in `[0, 100]` and that each tier demands at
    /// least as much as the one below it on both dimensions.
    pub fn validate(&self) -> Result<(), CoreError> {
        let tiers = [
            ("moderate", &self.moderate),
            ("strong", &self.strong),
            ("critical", &self.critical),
        ];
        for (name, t) in tiers {
            if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&t.min_confidence) {
                return Err(CoreError::InvalidConfiguration(format!(
                    "{} min_confidence must be in [0, 100], got {}",
                    name, t.min_confidence
                )));
            }
        }
        for pair in tiers.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            if upper.min_confidence < lower.min_confidence
                || upper.min_frequency < lower.min_frequency
            {
                return Err(CoreError::InvalidConfiguration(format!(
                    "{} thresholds must not be below {} thresholds",
                    upper_name, lower_name
                )));
            }
        }
        Ok(())
    }

    /// Classify a `(confidence, frequency)` pair under this policy.
    pub fn classify(&self, confidence: f64, frequency: u32) -> PatternStrength {
        if self.critical.is_met(confidence, frequency) {
            PatternStrength::Critical
        } else if self.strong.is_met(confidence, frequency) {
            PatternStrength::Strong
        } else if self.moderate.is_met(confidence, frequency) {
            PatternStrength::Moderate
        } else {
            PatternStrength::Weak
        }
    }

    /// Apply metric deltas to `pattern` and reclassify under this policy.
    ///
    /// Confidence is clamped to `[0, 100]` and frequency is floored at 1.
    /// Confidence, frequency, and strength are replaced together in the
    /// returned value.
    pub fn update_metrics(
        &self,
        pattern: &LearningPattern,
        confidence_delta: f64,
        frequency_delta: i64,
    ) -> LearningPattern {
        let confidence = clamp_confidence(pattern.confidence_score + confidence_delta);
        let frequency = i64::from(pattern.frequency_count)
            .saturating_add(frequency_delta)
            .clamp(1, i64::from(u32::MAX)) as u32;
        let strength = self.classify(confidence, frequency);

        LearningPattern {
            confidence_score: confidence,
            frequency_count: frequency,
            strength,
            updated_at: Utc::now(),
            ..pattern.clone()
        }
    }

    /// Recompute `pattern.strength` from its metrics under this policy.
    ///
    /// Returns `true` if the stored tier changed. Metrics and `updated_at`
    /// are left alone.
    pub fn reclassify(&self, pattern: &mut LearningPattern) -> bool {
        let strength = self.classify(
            clamp_confidence(pattern.confidence_score),
            pattern.frequency_count,
        );
        if strength == pattern.strength {
            return false;
        }
        pattern.strength = strength;
        true
    }
}

/// Classify under the default threshold table.
pub fn classify(confidence: f64, frequency: u32) -> PatternStrength {
    StrengthThresholds::default().classify(confidence, frequency)
}

/// Apply metric deltas and reclassify under the default threshold table.
pub fn update_metrics(
    pattern: &LearningPattern,
    confidence_delta: f64,
    frequency_delta: i64,
) -> LearningPattern {
    StrengthThresholds::default().update_metrics(pattern, confidence_delta, frequency_delta)
}

/// Clamp a confidence value into `[0, 100]`. `NaN` maps to 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_CONFIDENCE;
    }
    value.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatternType;

    fn pattern_with(confidence: f64, frequency: u32) -> LearningPattern {
        let mut p = LearningPattern::new(
            "org",
            "key",
            PatternType::Other,
            &StrengthThresholds::default(),
        );
        p.confidence_score = confidence;
        p.frequency_count = frequency;
        p.strength = classify(confidence, frequency);
        p
    }

    #[test]
    fn test_boundary_exactness() {
        assert_eq!(classify(90.0, 10), PatternStrength::Critical);
        assert_eq!(classify(89.9, 10), PatternStrength::Strong);
        assert_eq!(classify(90.0, 9), PatternStrength::Strong);
        assert_eq!(classify(0.0, 0), PatternStrength::Weak);
    }

    #[test]
    fn test_both_thresholds_required() {
        assert_eq!(classify(95.0, 1), PatternStrength::Weak);
        assert_eq!(classify(10.0, 500), PatternStrength::Weak);
        assert_eq!(classify(75.0, 5), PatternStrength::Strong);
        assert_eq!(classify(74.99, 5), PatternStrength::Moderate);
        assert_eq!(classify(60.0, 3), PatternStrength::Moderate);
        assert_eq!(classify(60.0, 2), PatternStrength::Weak);
        assert_eq!(classify(100.0, u32::MAX), PatternStrength::Critical);
    }

    #[test]
    fn test_update_metrics_clamps_and_floors() {
        let p = pattern_with(95.0, 2);
        let updated = update_metrics(&p, 10.0, -5);
        assert_eq!(updated.confidence_score, 100.0);
        assert_eq!(updated.frequency_count, 1);
        assert_eq!(updated.strength, PatternStrength::Weak);
        assert_eq!(updated.id, p.id);
    }

    #[test]
    fn test_update_metrics_extreme_frequency_deltas() {
        let p = pattern_with(50.0, 5);
        let up = update_metrics(&p, 0.0, i64::MAX);
        assert_eq!(up.frequency_count, u32::MAX);
        let down = update_metrics(&p, 0.0, i64::MIN);
        assert_eq!(down.frequency_count, 1);
    }

    #[test]
    fn test_reclassify_follows_policy() {
        let mut p = pattern_with(80.0, 6);
        assert_eq!(p.strength, PatternStrength::Strong);
        assert!(!StrengthThresholds::default().reclassify(&mut p));

        let mut lenient = StrengthThresholds::default();
        lenient.critical = TierThreshold {
            min_confidence: 75.0,
            min_frequency: 5,
        };
        assert!(lenient.reclassify(&mut p));
        assert_eq!(p.strength, PatternStrength::Critical);
        assert_eq!(p.confidence_score, 80.0);
    }

    #[test]
    fn test_update_metrics_promotes_tier() {
        let p = pattern_with(85.0, 9);
        assert_eq!(p.strength, PatternStrength::Strong);
        let updated = update_metrics(&p, 5.0, 1);
        assert_eq!(updated.strength, PatternStrength::Critical);
    }

    #[test]
    fn test_update_metrics_clamps_at_zero() {
        let p = pattern_with(20.0, 4);
        let updated = update_metrics(&p, -500.0, 0);
        assert_eq!(updated.confidence_score, 0.0);
        assert_eq!(updated.frequency_count, 4);
    }

    #[test]
    fn test_custom_thresholds() {
        let lenient = StrengthThresholds {
            critical: TierThreshold {
                min_confidence: 80.0,
                min_frequency: 4,
            },
            strong: TierThreshold {
                min_confidence: 50.0,
                min_frequency: 2,
            },
            moderate: TierThreshold {
                min_confidence: 20.0,
                min_frequency: 1,
            },
        };
        lenient.validate().unwrap();
        assert_eq!(lenient.classify(80.0, 4), PatternStrength::Critical);
        assert_eq!(lenient.classify(25.0, 1), PatternStrength::Moderate);
    }

    #[test]
    fn test_validate_rejects_inverted_tiers() {
        let mut t = StrengthThresholds::default();
        t.strong.min_frequency = 20;
        assert!(matches!(
            t.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));

        let mut t = StrengthThresholds::default();
        t.critical.min_confidence = 120.0;
        assert!(t.validate().is_err());

        StrengthThresholds::default().validate().unwrap();
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(-3.0), 0.0);
        assert_eq!(clamp_confidence(42.5), 42.5);
        assert_eq!(clamp_confidence(140.0), 100.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
    }
}
