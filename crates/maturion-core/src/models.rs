//! Core data models shared by the chunking and pattern-learning pipelines.
//!
//! These types flow between the pure algorithms in this crate and the
//! ingestion workflows in the application crate. All of them serialize with
//! `serde` so they can be persisted by whatever storage collaborator the
//! embedding application uses.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::StrengthThresholds;
use crate::stats::TierStats;

/// Confidence assigned to a pattern the first time it is observed.
pub const INITIAL_CONFIDENCE: f64 = 10.0;

/// Frequency assigned to a pattern the first time it is observed.
pub const INITIAL_FREQUENCY: u32 = 1;

/// A contiguous window of a source document.
///
/// Offsets are in characters (Unicode scalar values), so
/// `end_offset - start_offset == content.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
    pub start_offset: usize,
    pub end_offset: usize,
    /// SHA-256 of `content`, for embedding staleness detection.
    pub hash: String,
}

/// Coarse evidence tier of a learned pattern. Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternStrength {
    Weak,
    Moderate,
    Strong,
    Critical,
}

impl PatternStrength {
    /// All tiers, weakest first.
    pub const ALL: [PatternStrength; 4] = [
        PatternStrength::Weak,
        PatternStrength::Moderate,
        PatternStrength::Strong,
        PatternStrength::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternStrength::Weak => "weak",
            PatternStrength::Moderate => "moderate",
            PatternStrength::Strong => "strong",
            PatternStrength::Critical => "critical",
        }
    }
}

impl fmt::Display for PatternStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of signal a pattern captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    TerminologyPreference,
    ScoringBias,
    EvidenceGap,
    ContentStructure,
    #[default]
    Other,
}

/// A human sign-off on a pattern. Recording one never changes the tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub validated_by: String,
    pub validated_at: DateTime<Utc>,
    pub approved: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// A recurring textual signal learned from user feedback.
///
/// `strength` is always derived from `(confidence_score, frequency_count)`;
/// the only way to change any of the three is
/// [`update_metrics`](crate::classify::update_metrics), which replaces them
/// together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPattern {
    pub id: String,
    pub organization_id: String,
    pub pattern_key: String,
    #[serde(default)]
    pub pattern_type: PatternType,
    pub confidence_score: f64,
    pub frequency_count: u32,
    pub strength: PatternStrength,
    pub is_active: bool,
    /// Row version for optimistic concurrency. Bumped by every store write.
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub validation: Option<ValidationRecord>,
}

impl LearningPattern {
    /// Create a freshly detected pattern with the initial low-confidence
    /// defaults, classified under `thresholds`.
    pub fn new(
        organization_id: &str,
        pattern_key: &str,
        pattern_type: PatternType,
        thresholds: &StrengthThresholds,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.to_string(),
            pattern_key: pattern_key.to_string(),
            pattern_type,
            confidence_score: INITIAL_CONFIDENCE,
            frequency_count: INITIAL_FREQUENCY,
            strength: thresholds.classify(INITIAL_CONFIDENCE, INITIAL_FREQUENCY),
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
            validation: None,
        }
    }
}

/// Kind of user feedback. Unknown kinds round-trip through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeedbackType {
    Correction,
    Approval,
    Rejection,
    Suggestion,
    Comment,
    Custom(String),
}

impl FeedbackType {
    pub fn as_str(&self) -> &str {
        match self {
            FeedbackType::Correction => "correction",
            FeedbackType::Approval => "approval",
            FeedbackType::Rejection => "rejection",
            FeedbackType::Suggestion => "suggestion",
            FeedbackType::Comment => "comment",
            FeedbackType::Custom(s) => s,
        }
    }
}

impl From<&str> for FeedbackType {
    fn from(s: &str) -> Self {
        match s {
            "correction" => FeedbackType::Correction,
            "approval" => FeedbackType::Approval,
            "rejection" => FeedbackType::Rejection,
            "suggestion" => FeedbackType::Suggestion,
            "comment" => FeedbackType::Comment,
            other => FeedbackType::Custom(other.to_string()),
        }
    }
}

impl From<String> for FeedbackType {
    fn from(s: String) -> Self {
        FeedbackType::from(s.as_str())
    }
}

impl From<FeedbackType> for String {
    fn from(t: FeedbackType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-organization multiplier for one `(feedback_type, feedback_category)` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackWeight {
    pub feedback_type: FeedbackType,
    pub feedback_category: String,
    pub weight_multiplier: f64,
    #[serde(default)]
    pub is_critical: bool,
}

/// One user feedback observation about a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    /// Id of the feedback record. Events without one get a generated id
    /// when applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
    pub pattern_key: String,
    #[serde(default)]
    pub pattern_type: PatternType,
    pub feedback_type: FeedbackType,
    pub feedback_category: String,
    #[serde(default)]
    pub confidence_delta: f64,
    #[serde(default)]
    pub frequency_delta: i64,
}

/// Typed parameters of a learning rule, one variant per rule type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum RuleParameters {
    /// Replace the classifier's tier thresholds.
    StrengthThresholds { thresholds: StrengthThresholds },
    /// Drop non-critical feedback whose weight is below `min_weight`.
    FeedbackPruning { min_weight: f64 },
    /// Soft-deactivate stale low-confidence patterns.
    AutoDeactivate {
        max_confidence: f64,
        min_idle_days: i64,
    },
}

/// A named, switchable learning rule configured for an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRule {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(flatten)]
    pub parameters: RuleParameters,
}

fn default_true() -> bool {
    true
}

/// Point-in-time capture of an organization's pattern set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub id: String,
    pub organization_id: String,
    pub taken_at: DateTime<Utc>,
    pub stats: TierStats,
    pub patterns: Vec<LearningPattern>,
    /// Unresolved feedback ids per pattern id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub open_feedback: BTreeMap<String, Vec<String>>,
}

impl ModelSnapshot {
    /// Capture `patterns` with freshly computed statistics.
    pub fn capture(organization_id: &str, patterns: Vec<LearningPattern>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.to_string(),
            taken_at: Utc::now(),
            stats: TierStats::from_patterns(&patterns),
            patterns,
            open_feedback: BTreeMap::new(),
        }
    }

    /// Attach open feedback references. Empty id lists are dropped.
    pub fn with_open_feedback(mut self, open: BTreeMap<String, Vec<String>>) -> Self {
        self.open_feedback = open.into_iter().filter(|(_, ids)| !ids.is_empty()).collect();
        self
    }
}
