//! Storage abstraction for learned patterns.
//!
//! The [`PatternStore`] trait defines the persistence operations the
//! feedback-ingestion workflow needs, so the same workflow runs against the
//! in-memory store, a snapshot file, or a relational backend owned by the
//! embedding application.
//!
//! Writes are optimistic: [`update`](PatternStore::update) only succeeds if
//! the stored row still has the version the caller read, and bumps it.
//! Confidence, frequency, and strength are always written together.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::LearningPattern;

/// Result of a compare-and-swap [`update`](PatternStore::update).
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The write landed; carries the row as stored (with its new version).
    Updated(LearningPattern),
    /// Another writer got there first; carries the current stored row.
    Conflict(LearningPattern),
    /// No row with that id.
    NotFound,
}

/// Abstract storage backend for learned patterns.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](PatternStore::get) | Fetch a pattern by id |
/// | [`get_by_key`](PatternStore::get_by_key) | Fetch a pattern by organization + key |
/// | [`insert`](PatternStore::insert) | Store a newly detected pattern |
/// | [`update`](PatternStore::update) | Versioned write of metrics or validation |
/// | [`set_active`](PatternStore::set_active) | Soft (de)activation |
/// | [`list`](PatternStore::list) | All patterns of an organization |
/// | [`add_feedback_ref`](PatternStore::add_feedback_ref) | Mark open feedback referencing a pattern |
/// | [`close_feedback_refs`](PatternStore::close_feedback_refs) | Resolve open feedback |
/// | [`open_feedback_refs`](PatternStore::open_feedback_refs) | Ids of open feedback |
#[async_trait]
pub trait PatternStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<LearningPattern>>;

    async fn get_by_key(
        &self,
        organization_id: &str,
        pattern_key: &str,
    ) -> Result<Option<LearningPattern>>;

    /// Insert a new pattern. Fails if the organization already has that key.
    async fn insert(&self, pattern: &LearningPattern) -> Result<LearningPattern>;

    /// Replace the stored row if its version equals `pattern.version`.
    async fn update(&self, pattern: &LearningPattern) -> Result<UpdateOutcome>;

    /// Flip the soft-deactivation flag. Returns the stored row, if any.
    async fn set_active(&self, id: &str, active: bool) -> Result<Option<LearningPattern>>;

    async fn list(&self, organization_id: &str) -> Result<Vec<LearningPattern>>;

    async fn add_feedback_ref(&self, pattern_id: &str, feedback_id: &str) -> Result<()>;

    /// Resolve every open reference to `pattern_id`. Returns how many closed.
    async fn close_feedback_refs(&self, pattern_id: &str) -> Result<usize>;

    /// Ids of open feedback referencing `pattern_id`, sorted.
    async fn open_feedback_refs(&self, pattern_id: &str) -> Result<Vec<String>>;
}
