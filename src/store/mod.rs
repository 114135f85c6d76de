//! Collaborators consumed by the progression engine
//!
//! The engine only talks to these traits. [`MemoryStore`] backs tests and
//! throwaway sessions, [`SqliteStore`] persists to `~/.coco/progression.db`.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::progression::{DailyStreakRecord, UserProgressionSnapshot};

/// Source of per-user statistics
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    /// Current statistics; metrics the provider knows nothing about are left unset
    async fn snapshot(&self, user_id: &str) -> Result<UserProgressionSnapshot>;
}

/// Append-only record of unlocked achievements
#[async_trait]
pub trait AchievementStore: Send + Sync {
    async fn list_unlocked(&self, user_id: &str) -> Result<HashSet<String>>;

    /// Insert if absent. Returns `false` when `(user_id, achievement_id)`
    /// already exists; this must hold across processes, not just in-process.
    async fn try_unlock(
        &self,
        user_id: &str,
        achievement_id: &str,
        points_earned: u32,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Sum of `points_earned` over the user's unlocked achievements
    async fn total_points(&self, user_id: &str) -> Result<u64>;
}

/// Per-user daily streak state (last writer wins)
#[async_trait]
pub trait StreakStore: Send + Sync {
    async fn get_streak(&self, user_id: &str) -> Result<Option<DailyStreakRecord>>;

    async fn set_streak(&self, user_id: &str, record: &DailyStreakRecord) -> Result<()>;
}
