//! In-memory [`PatternStore`] implementation for testing, the CLI, and WASM
//! targets.
//!
//! Uses `HashMap` behind `std::sync::RwLock` for thread safety. A store can
//! be seeded from a [`ModelSnapshot`] and captured back into one, which is
//! how the CLI persists pattern state between runs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{LearningPattern, ModelSnapshot};

use super::{PatternStore, UpdateOutcome};

/// In-memory pattern store.
pub struct InMemoryPatternStore {
    patterns: RwLock<HashMap<String, LearningPattern>>,
    /// `(organization_id, pattern_key)` → pattern id.
    keys: RwLock<HashMap<(String, String), String>>,
    feedback_refs: RwLock<HashMap<String, HashSet<String>>>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self {
            patterns: RwLock::new(HashMap::new()),
            keys: RwLock::new(HashMap::new()),
            feedback_refs: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a store with the patterns of a snapshot.
    pub fn from_snapshot(snapshot: &ModelSnapshot) -> Self {
        let store = Self::new();
        {
            let mut patterns = store.patterns.write().unwrap();
            let mut keys = store.keys.write().unwrap();
            for p in &snapshot.patterns {
                keys.insert(
                    (p.organization_id.clone(), p.pattern_key.clone()),
                    p.id.clone(),
                );
                patterns.insert(p.id.clone(), p.clone());
            }
            let mut refs = store.feedback_refs.write().unwrap();
            for (pattern_id, ids) in &snapshot.open_feedback {
                if patterns.contains_key(pattern_id) && !ids.is_empty() {
                    refs.insert(pattern_id.clone(), ids.iter().cloned().collect());
                }
            }
        }
        store
    }

    /// Capture every pattern of `organization_id`, ordered by key.
    pub fn snapshot(&self, organization_id: &str) -> ModelSnapshot {
        let patterns = self.patterns.read().unwrap();
        let mut list: Vec<LearningPattern> = patterns
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.pattern_key.cmp(&b.pattern_key));

        let refs = self.feedback_refs.read().unwrap();
        let open: BTreeMap<String, Vec<String>> = list
            .iter()
            .filter_map(|p| {
                let ids = refs.get(&p.id)?;
                let mut ids: Vec<String> = ids.iter().cloned().collect();
                ids.sort();
                Some((p.id.clone(), ids))
            })
            .collect();
        ModelSnapshot::capture(organization_id, list).with_open_feedback(open)
    }

    pub fn len(&self) -> usize {
        self.patterns.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryPatternStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PatternStore for InMemoryPatternStore {
    async fn get(&self, id: &str) -> Result<Option<LearningPattern>> {
        Ok(self.patterns.read().unwrap().get(id).cloned())
    }

    async fn get_by_key(
        &self,
        organization_id: &str,
        pattern_key: &str,
    ) -> Result<Option<LearningPattern>> {
        let keys = self.keys.read().unwrap();
        let id = match keys.get(&(organization_id.to_string(), pattern_key.to_string())) {
            Some(id) => id,
            None => return Ok(None),
        };
        Ok(self.patterns.read().unwrap().get(id).cloned())
    }

    async fn insert(&self, pattern: &LearningPattern) -> Result<LearningPattern> {
        let mut keys = self.keys.write().unwrap();
        let key = (pattern.organization_id.clone(), pattern.pattern_key.clone());
        if keys.contains_key(&key) {
            bail!(
                "pattern '{}' already exists for organization '{}'",
                pattern.pattern_key,
                pattern.organization_id
            );
        }
        let mut stored = pattern.clone();
        stored.version = 1;
        keys.insert(key, stored.id.clone());
        self.patterns
            .write()
            .unwrap()
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, pattern: &LearningPattern) -> Result<UpdateOutcome> {
        let mut patterns = self.patterns.write().unwrap();
        let current = match patterns.get_mut(&pattern.id) {
            Some(p) => p,
            None => return Ok(UpdateOutcome::NotFound),
        };
        if current.version != pattern.version {
            return Ok(UpdateOutcome::Conflict(current.clone()));
        }
        // Key and ownership are immutable once inserted.
        let mut next = pattern.clone();
        next.organization_id = current.organization_id.clone();
        next.pattern_key = current.pattern_key.clone();
        next.version = current.version + 1;
        *current = next.clone();
        Ok(UpdateOutcome::Updated(next))
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<Option<LearningPattern>> {
        let mut patterns = self.patterns.write().unwrap();
        Ok(patterns.get_mut(id).map(|p| {
            if p.is_active != active {
                p.is_active = active;
                p.version += 1;
                p.updated_at = Utc::now();
            }
            p.clone()
        }))
    }

    async fn list(&self, organization_id: &str) -> Result<Vec<LearningPattern>> {
        let patterns = self.patterns.read().unwrap();
        let mut list: Vec<LearningPattern> = patterns
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.pattern_key.cmp(&b.pattern_key));
        Ok(list)
    }

    async fn add_feedback_ref(&self, pattern_id: &str, feedback_id: &str) -> Result<()> {
        if !self.patterns.read().unwrap().contains_key(pattern_id) {
            bail!("pattern not found: {}", pattern_id);
        }
        self.feedback_refs
            .write()
            .unwrap()
            .entry(pattern_id.to_string())
            .or_default()
            .insert(feedback_id.to_string());
        Ok(())
    }

    async fn close_feedback_refs(&self, pattern_id: &str) -> Result<usize> {
        Ok(self
            .feedback_refs
            .write()
            .unwrap()
            .remove(pattern_id)
            .map(|refs| refs.len())
            .unwrap_or(0))
    }

    async fn open_feedback_refs(&self, pattern_id: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .feedback_refs
            .read()
            .unwrap()
            .get(pattern_id)
            .map(|refs| refs.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }
}
