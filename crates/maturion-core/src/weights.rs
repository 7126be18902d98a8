//! Per-organization feedback weights.
//!
//! A [`FeedbackWeightTable`] holds at most one [`FeedbackWeight`] per
//! `(feedback_type, feedback_category)` key. Lookups for keys the
//! organization has not customized fall back to
//! [`DEFAULT_WEIGHT_MULTIPLIER`]; a missing row is the common case, not an
//! error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{FeedbackEvent, FeedbackType, FeedbackWeight};

/// Multiplier used when no weight row exists for a key.
pub const DEFAULT_WEIGHT_MULTIPLIER: f64 = 1.0;

type WeightKey = (FeedbackType, String);

/// Weight rows for one organization, unique per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeedbackWeight>", into = "Vec<FeedbackWeight>")]
pub struct FeedbackWeightTable {
    rows: HashMap<WeightKey, FeedbackWeight>,
}

impl FeedbackWeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, validating each. Later rows replace earlier
    /// rows with the same key.
    pub fn from_rows(rows: impl IntoIterator<Item = FeedbackWeight>) -> Result<Self, CoreError> {
        let mut table = Self::new();
        for row in rows {
            table.upsert(row)?;
        }
        Ok(table)
    }

    /// Insert or replace the single row for `weight`'s key.
    ///
    /// Returns the row it replaced, if any.
    pub fn upsert(&mut self, weight: FeedbackWeight) -> Result<Option<FeedbackWeight>, CoreError> {
        if !weight.weight_multiplier.is_finite() || weight.weight_multiplier <= 0.0 {
            return Err(CoreError::InvalidWeight {
                feedback_type: weight.feedback_type.to_string(),
                feedback_category: weight.feedback_category.clone(),
                multiplier: weight.weight_multiplier,
            });
        }
        let key = (weight.feedback_type.clone(), weight.feedback_category.clone());
        Ok(self.rows.insert(key, weight))
    }

    pub fn get(&self, feedback_type: &FeedbackType, feedback_category: &str) -> Option<&FeedbackWeight> {
        self.rows
            .get(&(feedback_type.clone(), feedback_category.to_string()))
    }

    /// Whether feedback under this key must survive pruning. False when unset.
    pub fn is_critical(&self, feedback_type: &FeedbackType, feedback_category: &str) -> bool {
        self.get(feedback_type, feedback_category)
            .map(|w| w.is_critical)
            .unwrap_or(false)
    }

    /// Drop events whose weight is below `min_weight`, keeping critical ones.
    ///
    /// Returns `(kept, pruned)` in their original order.
    pub fn prune(
        &self,
        events: Vec<FeedbackEvent>,
        min_weight: f64,
    ) -> (Vec<FeedbackEvent>, Vec<FeedbackEvent>) {
        events.into_iter().partition(|e| {
            self.is_critical(&e.feedback_type, &e.feedback_category)
                || weight_for(&e.feedback_type, &e.feedback_category, self) >= min_weight
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &FeedbackWeight> {
        self.rows.values()
    }
}

impl TryFrom<Vec<FeedbackWeight>> for FeedbackWeightTable {
    type Error = CoreError;

    fn try_from(rows: Vec<FeedbackWeight>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<FeedbackWeightTable> for Vec<FeedbackWeight> {
    fn from(table: FeedbackWeightTable) -> Self {
        let mut rows: Vec<FeedbackWeight> = table.rows.into_values().collect();
        rows.sort_by(|a, b| {
            (a.feedback_type.as_str(), a.feedback_category.as_str())
                .cmp(&(b.feedback_type.as_str(), b.feedback_category.as_str()))
        });
        rows
    }
}

/// Multiplier for a feedback key, or [`DEFAULT_WEIGHT_MULTIPLIER`] if unset.
pub fn weight_for(
    feedback_type: &FeedbackType,
    feedback_category: &str,
    table: &FeedbackWeightTable,
) -> f64 {
    table
        .get(feedback_type, feedback_category)
        .map(|w| w.weight_multiplier)
        .unwrap_or(DEFAULT_WEIGHT_MULTIPLIER)
}
