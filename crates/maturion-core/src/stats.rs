//! Tier-dependent aggregate statistics over a pattern set.
//!
//! [`TierStats`] can be computed from scratch with
//! [`TierStats::from_patterns`] or maintained incrementally as patterns are
//! created and reclassified with [`TierStats::record_transition`].

use serde::{Deserialize, Serialize};

use crate::models::{LearningPattern, PatternStrength};

/// Counts of active patterns per tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    pub weak: u64,
    pub moderate: u64,
    pub strong: u64,
    pub critical: u64,
    pub total: u64,
    pub mean_confidence: f64,
}

impl TierStats {
    /// Statistics over the active patterns in `patterns`.
    pub fn from_patterns(patterns: &[LearningPattern]) -> Self {
        let mut stats = Self::default();
        let mut confidence_sum = 0.0;
        for p in patterns.iter().filter(|p| p.is_active) {
            *stats.count_mut(p.strength) += 1;
            stats.total += 1;
            confidence_sum += p.confidence_score;
        }
        if stats.total > 0 {
            stats.mean_confidence = confidence_sum / stats.total as f64;
        }
        stats
    }

    pub fn count(&self, tier: PatternStrength) -> u64 {
        match tier {
            PatternStrength::Weak => self.weak,
            PatternStrength::Moderate => self.moderate,
            PatternStrength::Strong => self.strong,
            PatternStrength::Critical => self.critical,
        }
    }

    fn count_mut(&mut self, tier: PatternStrength) -> &mut u64 {
        match tier {
            PatternStrength::Weak => &mut self.weak,
            PatternStrength::Moderate => &mut self.moderate,
            PatternStrength::Strong => &mut self.strong,
            PatternStrength::Critical => &mut self.critical,
        }
    }

    /// Move one pattern between tiers. `from = None` means it is new.
    ///
    /// `mean_confidence` is not touched; recompute with
    /// [`from_patterns`](Self::from_patterns) when it matters.
    pub fn record_transition(&mut self, from: Option<PatternStrength>, to: PatternStrength) {
        match from {
            Some(old) => {
                let c = self.count_mut(old);
                *c = c.saturating_sub(1);
            }
            None => self.total += 1,
        }
        *self.count_mut(to) += 1;
    }

    /// Remove one pattern from the counts (soft deactivation).
    pub fn record_removal(&mut self, tier: PatternStrength) {
        let c = self.count_mut(tier);
        if *c > 0 {
            *c -= 1;
            self.total = self.total.saturating_sub(1);
        }
    }

    /// Share of patterns in `tier`, or 0 when there are none.
    pub fn share(&self, tier: PatternStrength) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(tier) as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::StrengthThresholds;
    use crate::models::PatternType;

    fn pattern(confidence: f64, frequency: u32, active: bool) -> LearningPattern {
        let t = StrengthThresholds::default();
        let mut p = LearningPattern::new("org", "k", PatternType::Other, &t);
        p.confidence_score = confidence;
        p.frequency_count = frequency;
        p.strength = t.classify(confidence, frequency);
        p.is_active = active;
        p
    }

    #[test]
    fn test_from_patterns_counts_active_only() {
        let patterns = vec![
            pattern(95.0, 12, true),
            pattern(80.0, 6, true),
            pattern(10.0, 1, true),
            pattern(99.0, 50, false),
        ];
        let stats = TierStats::from_patterns(&patterns);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.strong, 1);
        assert_eq!(stats.weak, 1);
        assert_eq!(stats.moderate, 0);
        assert!((stats.mean_confidence - 185.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_transition() {
        let mut stats = TierStats::default();
        stats.record_transition(None, PatternStrength::Weak);
        stats.record_transition(None, PatternStrength::Weak);
        stats.record_transition(Some(PatternStrength::Weak), PatternStrength::Moderate);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.weak, 1);
        assert_eq!(stats.moderate, 1);
        assert_eq!(stats.share(PatternStrength::Moderate), 0.5);

        stats.record_removal(PatternStrength::Moderate);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.moderate, 0);
    }

    #[test]
    fn test_empty_share_is_zero() {
        assert_eq!(TierStats::default().share(PatternStrength::Critical), 0.0);
    }
}
