//! In-process store
//!
//! Implements all three collaborator traits behind one mutex. The
//! `set_*_available` switches simulate backend outages.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{AchievementStore, StatisticsProvider, StreakStore};
use crate::progression::{DailyStreakRecord, UserProgressionSnapshot};

#[derive(Debug, Clone, Copy)]
struct UnlockRow {
    points_earned: u32,
    unlocked_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    snapshots: HashMap<String, UserProgressionSnapshot>,
    unlocked: HashMap<String, HashMap<String, UnlockRow>>,
    streaks: HashMap<String, DailyStreakRecord>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    statistics_up: AtomicBool,
    persistence_up: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            statistics_up: AtomicBool::new(true),
            persistence_up: AtomicBool::new(true),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn check_persistence(&self) -> Result<()> {
        if !self.persistence_up.load(Ordering::SeqCst) {
            bail!("persistence unavailable");
        }
        Ok(())
    }

    /// Replace the statistics returned for `user_id`
    pub fn set_snapshot(&self, user_id: &str, snapshot: UserProgressionSnapshot) -> Result<()> {
        self.lock()?.snapshots.insert(user_id.to_string(), snapshot);
        Ok(())
    }

    /// Toggle a simulated statistics backend outage
    pub fn set_statistics_available(&self, up: bool) {
        self.statistics_up.store(up, Ordering::SeqCst);
    }

    /// Toggle a simulated achievement/streak persistence outage
    pub fn set_persistence_available(&self, up: bool) {
        self.persistence_up.store(up, Ordering::SeqCst);
    }

    /// Number of unlock rows stored for `user_id`
    pub fn unlock_count(&self, user_id: &str) -> Result<usize> {
        Ok(self
            .lock()?
            .unlocked
            .get(user_id)
            .map(HashMap::len)
            .unwrap_or(0))
    }

    /// When `achievement_id` was unlocked for `user_id`, if it was
    pub fn unlocked_at(&self, user_id: &str, achievement_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .lock()?
            .unlocked
            .get(user_id)
            .and_then(|rows| rows.get(achievement_id))
            .map(|row| row.unlocked_at))
    }
}

#[async_trait]
impl StatisticsProvider for MemoryStore {
    async fn snapshot(&self, user_id: &str) -> Result<UserProgressionSnapshot> {
        if !self.statistics_up.load(Ordering::SeqCst) {
            bail!("statistics provider unavailable");
        }
        Ok(self
            .lock()?
            .snapshots
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AchievementStore for MemoryStore {
    async fn list_unlocked(&self, user_id: &str) -> Result<HashSet<String>> {
        self.check_persistence()?;
        Ok(self
            .lock()?
            .unlocked
            .get(user_id)
            .map(|rows| rows.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn try_unlock(
        &self,
        user_id: &str,
        achievement_id: &str,
        points_earned: u32,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.check_persistence()?;
        let mut inner = self.lock()?;
        let rows = inner.unlocked.entry(user_id.to_string()).or_default();
        if rows.contains_key(achievement_id) {
            return Ok(false);
        }
        rows.insert(
            achievement_id.to_string(),
            UnlockRow {
                points_earned,
                unlocked_at,
            },
        );
        Ok(true)
    }

    async fn total_points(&self, user_id: &str) -> Result<u64> {
        self.check_persistence()?;
        Ok(self
            .lock()?
            .unlocked
            .get(user_id)
            .map(|rows| rows.values().map(|r| u64::from(r.points_earned)).sum())
            .unwrap_or(0))
    }
}

#[async_trait]
impl StreakStore for MemoryStore {
    async fn get_streak(&self, user_id: &str) -> Result<Option<DailyStreakRecord>> {
        self.check_persistence()?;
        Ok(self.lock()?.streaks.get(user_id).copied())
    }

    async fn set_streak(&self, user_id: &str, record: &DailyStreakRecord) -> Result<()> {
        self.check_persistence()?;
        self.lock()?.streaks.insert(user_id.to_string(), *record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_try_unlock_is_insert_if_absent() {
        let store = MemoryStore::new();
        let now = Utc::now();
        assert!(store.try_unlock("ana", "first_recipe", 10, now).await.unwrap());
        let later = now + chrono::Duration::seconds(5);
        assert!(!store.try_unlock("ana", "first_recipe", 10, later).await.unwrap());
        assert_eq!(store.unlocked_at("ana", "first_recipe").unwrap(), Some(now));
        assert!(store.try_unlock("ben", "first_recipe", 10, now).await.unwrap());
        assert_eq!(store.unlock_count("ana").unwrap(), 1);
        assert_eq!(store.total_points("ana").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_outage_switches() {
        let store = MemoryStore::new();
        store.set_statistics_available(false);
        assert!(store.snapshot("ana").await.is_err());
        store.set_persistence_available(false);
        assert!(store.list_unlocked("ana").await.is_err());
        assert!(store.get_streak("ana").await.is_err());
    }
}
