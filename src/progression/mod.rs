//! Gamification system: trophies, points, levels and daily streaks
//!
//! Achievement definitions are declarative ([`Condition`]) and evaluated
//! against a fresh [`UserProgressionSnapshot`] on every pass. Unlocks are
//! persisted at most once per user through the [`crate::store`] traits.

mod checker;
mod definitions;
mod engine;
mod levels;
mod metrics;
mod streaks;

pub use checker::{check_achievements, is_satisfied};
pub use definitions::{AchievementCategory, AchievementDefinition, Condition, ACHIEVEMENTS};
pub use engine::{
    LevelUp, ProgressionEngine, ProgressionEvent, UnlockNotification, UnlockedAchievement,
};
pub use levels::{compute_level, LevelInfo, LevelTier, PlayerProgress, LEVEL_TIERS};
pub use metrics::{Metric, UserProgressionSnapshot};
pub use streaks::{local_today, DailyStreakRecord, StreakTransition};
