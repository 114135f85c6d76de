//! Progression engine - core gamification logic
//!
//! Handles achievement evaluation, streak updates and level computation on
//! top of the injected statistics/persistence collaborators.
//!
//! Achievement tracking is auxiliary: collaborator failures are logged and
//! turn into "nothing unlocked", never into an error for the caller.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::checker::check_achievements;
use super::definitions::{AchievementDefinition, ACHIEVEMENTS};
use super::levels::PlayerProgress;
use super::metrics::Metric;
use super::streaks::{local_today, DailyStreakRecord, StreakTransition};
use crate::store::{AchievementStore, StatisticsProvider, StreakStore};

/// An achievement unlocked by an evaluation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnlockedAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub title: String,
    /// Points of the definition at unlock time
    pub points_earned: u32,
    pub unlocked_at: DateTime<Utc>,
}

/// Display payload for an unlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockNotification {
    pub id: String,
    pub title: String,
    pub points: u32,
}

/// A level up event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    pub new_title: String,
}

/// Events delivered to the notification sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionEvent {
    AchievementUnlocked(UnlockNotification),
    LevelUp(LevelUp),
    StreakExtended { user_id: String, count: u32 },
}

/// Main entry point for all progression features
pub struct ProgressionEngine {
    statistics: Arc<dyn StatisticsProvider>,
    achievements: Arc<dyn AchievementStore>,
    streaks: Arc<dyn StreakStore>,
    catalog: &'static [AchievementDefinition],
    notifier: Option<UnboundedSender<ProgressionEvent>>,
}

impl ProgressionEngine {
    pub fn new(
        statistics: Arc<dyn StatisticsProvider>,
        achievements: Arc<dyn AchievementStore>,
        streaks: Arc<dyn StreakStore>,
    ) -> Self {
        Self {
            statistics,
            achievements,
            streaks,
            catalog: ACHIEVEMENTS,
            notifier: None,
        }
    }

    /// Engine whose three collaborators are the same store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: StatisticsProvider + AchievementStore + StreakStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Replace the built-in achievement catalog
    pub fn with_catalog(mut self, catalog: &'static [AchievementDefinition]) -> Self {
        self.catalog = catalog;
        self
    }

    /// Send progression events to `sink`
    pub fn with_notifier(mut self, sink: UnboundedSender<ProgressionEvent>) -> Self {
        self.notifier = Some(sink);
        self
    }

    /// Create a notification channel and return its receiving end
    pub fn subscribe(&mut self) -> UnboundedReceiver<ProgressionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.notifier = Some(tx);
        rx
    }

    pub fn catalog(&self) -> &'static [AchievementDefinition] {
        self.catalog
    }

    fn emit(&self, event: ProgressionEvent) {
        if let Some(sink) = &self.notifier {
            if sink.send(event).is_err() {
                debug!("Notification sink closed, dropping progression event");
            }
        }
    }

    // ========================================
    // ACHIEVEMENTS
    // ========================================

    /// Evaluate every not-yet-unlocked achievement for `user_id` and persist
    /// the satisfied ones. Returns only what this call unlocked.
    pub async fn evaluate_achievements(&self, user_id: &str) -> Vec<UnlockedAchievement> {
        self.evaluate_achievements_on(user_id, local_today()).await
    }

    /// [`Self::evaluate_achievements`] with `today` as the calendar day used
    /// to decide whether the stored streak is still alive
    pub async fn evaluate_achievements_on(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Vec<UnlockedAchievement> {
        let mut snapshot = match self.statistics.snapshot(user_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(user_id, error = %e, "Statistics unavailable, skipping achievement check");
                return Vec::new();
            }
        };

        if !snapshot.has(Metric::DailyStreak) {
            match self.streaks.get_streak(user_id).await {
                Ok(Some(record)) => {
                    // A lapsed streak counts as 0 until the next activity
                    let current = if record.is_active(today) { record.current } else { 0 };
                    snapshot.set(Metric::DailyStreak, u64::from(current));
                }
                Ok(None) => {}
                Err(e) => debug!(user_id, error = %e, "Streak unavailable for evaluation"),
            }
        }

        let unlocked = match self.achievements.list_unlocked(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(user_id, error = %e, "Achievement store unavailable, skipping achievement check");
                return Vec::new();
            }
        };

        let candidates = check_achievements(self.catalog, &snapshot, &unlocked);
        if candidates.is_empty() {
            return Vec::new();
        }

        let points_before = self.achievements.total_points(user_id).await.ok();
        let now = Utc::now();
        let mut newly_unlocked = Vec::new();

        for def in candidates {
            match self
                .achievements
                .try_unlock(user_id, def.id, def.points, now)
                .await
            {
                Ok(true) => {
                    info!(user_id, achievement = def.id, points = def.points, "Achievement unlocked");
                    newly_unlocked.push(UnlockedAchievement {
                        user_id: user_id.to_string(),
                        achievement_id: def.id.to_string(),
                        title: def.title.to_string(),
                        points_earned: def.points,
                        unlocked_at: now,
                    });
                }
                // Lost a race against a concurrent evaluation
                Ok(false) => debug!(user_id, achievement = def.id, "Already unlocked"),
                Err(e) => {
                    warn!(user_id, achievement = def.id, error = %e, "Failed to persist unlock")
                }
            }
        }

        for unlocked in &newly_unlocked {
            self.emit(ProgressionEvent::AchievementUnlocked(UnlockNotification {
                id: unlocked.achievement_id.clone(),
                title: unlocked.title.clone(),
                points: unlocked.points_earned,
            }));
        }

        if let Some(before) = points_before {
            let gained: u64 = newly_unlocked
                .iter()
                .map(|u| u64::from(u.points_earned))
                .sum();
            if let Some(level_up) = level_up_between(before, before + gained) {
                info!(user_id, level = level_up.new_level, "Level up");
                self.emit(ProgressionEvent::LevelUp(level_up));
            }
        }

        newly_unlocked
    }

    // ========================================
    // STREAKS
    // ========================================

    /// Record activity on `today` (the caller's calendar day) and return the
    /// resulting streak length
    pub async fn record_daily_activity(&self, user_id: &str, today: NaiveDate) -> Result<u32> {
        let previous = self.streaks.get_streak(user_id).await?;
        let (record, transition) = DailyStreakRecord::advance(previous.as_ref(), today);

        match transition {
            StreakTransition::Unchanged => return Ok(record.current),
            StreakTransition::Extended => {
                self.streaks.set_streak(user_id, &record).await?;
                debug!(user_id, streak = record.current, "Daily streak extended");
                self.emit(ProgressionEvent::StreakExtended {
                    user_id: user_id.to_string(),
                    count: record.current,
                });
            }
            StreakTransition::Reset => {
                self.streaks.set_streak(user_id, &record).await?;
                debug!(user_id, "Daily streak started");
            }
        }

        Ok(record.current)
    }

    /// Record activity and evaluate achievements; never fails
    pub async fn track_activity(&self, user_id: &str, today: NaiveDate) -> Vec<UnlockedAchievement> {
        if let Err(e) = self.record_daily_activity(user_id, today).await {
            warn!(user_id, error = %e, "Failed to record daily activity");
        }
        self.evaluate_achievements_on(user_id, today).await
    }

    // ========================================
    // POINTS & LEVEL
    // ========================================

    /// Total points and level for `user_id`
    pub async fn progress(&self, user_id: &str) -> Result<PlayerProgress> {
        let total = self.achievements.total_points(user_id).await?;
        Ok(PlayerProgress::new(total))
    }
}

fn level_up_between(before: u64, after: u64) -> Option<LevelUp> {
    let old = PlayerProgress::new(before);
    let new = PlayerProgress::new(after);
    (new.level > old.level).then(|| LevelUp {
        old_level: old.level,
        new_level: new.level,
        new_title: new.title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::metrics::UserProgressionSnapshot;
    use crate::store::MemoryStore;

    fn engine() -> (Arc<MemoryStore>, ProgressionEngine) {
        let store = Arc::new(MemoryStore::new());
        let engine = ProgressionEngine::from_store(store.clone());
        (store, engine)
    }

    #[test]
    fn test_level_up_between() {
        assert_eq!(level_up_between(0, 99), None);
        let up = level_up_between(90, 310).unwrap();
        assert_eq!((up.old_level, up.new_level), (1, 3));
        assert_eq!(up.new_title, "Line Cook");
    }

    #[tokio::test]
    async fn test_events_for_unlock_and_level_up() {
        let (store, mut engine) = engine();
        let mut events = engine.subscribe();
        store
            .set_snapshot(
                "ana",
                UserProgressionSnapshot::new().with(Metric::RecipeCount, 10),
            )
            .unwrap();

        let unlocked = engine.evaluate_achievements("ana").await;
        // 10 + 25 + 50 points
        assert_eq!(unlocked.len(), 3);

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        assert_eq!(received.len(), 3);
        assert!(matches!(
            &received[0],
            ProgressionEvent::AchievementUnlocked(n) if n.id == "first_recipe" && n.points == 10
        ));
        // 85 points keeps level 1
        assert!(!received
            .iter()
            .any(|e| matches!(e, ProgressionEvent::LevelUp(_))));
    }

    #[tokio::test]
    async fn test_streak_from_store_feeds_conditions() {
        let (_store, engine) = engine();
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for offset in 0..3 {
            engine
                .record_daily_activity("ana", start + chrono::Duration::days(offset))
                .await
                .unwrap();
        }
        let ids: Vec<String> = engine
            .evaluate_achievements_on("ana", start + chrono::Duration::days(2))
            .await
            .into_iter()
            .map(|u| u.achievement_id)
            .collect();
        assert_eq!(ids, vec!["streak_3".to_string()]);
    }

    #[tokio::test]
    async fn test_lapsed_streak_does_not_count() {
        let (_store, engine) = engine();
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for offset in 0..3 {
            engine
                .record_daily_activity("ana", start + chrono::Duration::days(offset))
                .await
                .unwrap();
        }

        // Last active May 3rd: broken by May 5th
        let lapsed = engine
            .evaluate_achievements_on("ana", start + chrono::Duration::days(4))
            .await;
        assert!(lapsed.is_empty());

        // Still alive the day after the last activity
        let alive = engine
            .evaluate_achievements_on("ana", start + chrono::Duration::days(3))
            .await;
        assert_eq!(alive.len(), 1);
        assert_eq!(alive[0].achievement_id, "streak_3");
    }

    #[tokio::test]
    async fn test_closed_sink_is_ignored() {
        let (store, engine) = engine();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let engine = engine.with_notifier(tx);
        store
            .set_snapshot("ana", UserProgressionSnapshot::new().with(Metric::FriendCount, 1))
            .unwrap();
        assert_eq!(engine.evaluate_achievements("ana").await.len(), 1);
    }
}
