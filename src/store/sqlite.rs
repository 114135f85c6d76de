//! SQLite-backed progression store
//!
//! Uniqueness of `(user_id, achievement_id)` is enforced by the primary key,
//! so concurrent evaluations from several processes still unlock each
//! achievement at most once.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use super::{AchievementStore, StatisticsProvider, StreakStore};
use crate::progression::{DailyStreakRecord, Metric, UserProgressionSnapshot};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Database wrapper shared between clones
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the progression database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progression db: {}", path.display()))?;

        // WAL lets several app processes evaluate the same user concurrently
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Self::with_connection(conn)
    }

    /// Private database that lives as long as the store
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize progression schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("progression db lock poisoned"))
    }

    /// Run `f` on the blocking pool so lock waits (up to `busy_timeout`)
    /// never stall the async runtime
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| anyhow!("progression db lock poisoned"))?;
            f(&conn)
        })
        .await
        .context("Progression db task failed")?
    }

    /// Set one metric for a user (`category` for per-category counts)
    pub fn set_metric(
        &self,
        user_id: &str,
        metric: Metric,
        category: Option<&str>,
        value: u64,
    ) -> Result<()> {
        let value = i64::try_from(value).context("metric value out of range")?;
        let category = category.map(str::to_lowercase).unwrap_or_default();
        let now = Utc::now().timestamp_millis();

        self.conn()?.execute(
            r#"
            INSERT INTO user_metrics (user_id, metric, category, value, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id, metric, category) DO UPDATE SET
                value = ?4, updated_at = ?5
            "#,
            (user_id, metric.as_str(), &category, value, now),
        )?;
        Ok(())
    }

    /// Delete all progression data for every user
    pub fn reset_all(&self) -> Result<()> {
        self.conn()?.execute_batch(
            r#"
            DELETE FROM unlocked_achievements;
            DELETE FROM daily_streaks;
            DELETE FROM user_metrics;
            "#,
        )?;
        Ok(())
    }
}

#[async_trait]
impl StatisticsProvider for SqliteStore {
    async fn snapshot(&self, user_id: &str) -> Result<UserProgressionSnapshot> {
        let user_id = user_id.to_string();
        self.blocking(move |conn| {
            let mut stmt = conn
                .prepare("SELECT metric, category, value FROM user_metrics WHERE user_id = ?1")?;
            let rows = stmt.query_map([&user_id], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, i64>(2)?,
                ))
            })?;

            let mut snapshot = UserProgressionSnapshot::new();
            for row in rows {
                let (name, category, value) = row?;
                let Some(metric) = Metric::from_str(&name) else {
                    debug!(metric = %name, "Skipping unknown metric");
                    continue;
                };
                let value = u64::try_from(value).unwrap_or(0);
                if category.is_empty() {
                    snapshot.set(metric, value);
                } else {
                    snapshot.set_category(metric, &category, value);
                }
            }
            Ok(snapshot)
        })
        .await
    }
}

#[async_trait]
impl AchievementStore for SqliteStore {
    async fn list_unlocked(&self, user_id: &str) -> Result<HashSet<String>> {
        let user_id = user_id.to_string();
        self.blocking(move |conn| {
            let mut stmt = conn
                .prepare("SELECT achievement_id FROM unlocked_achievements WHERE user_id = ?1")?;
            let ids = stmt
                .query_map([&user_id], |r| r.get::<_, String>(0))?
                .collect::<rusqlite::Result<HashSet<String>>>()?;
            Ok(ids)
        })
        .await
    }

    async fn try_unlock(
        &self,
        user_id: &str,
        achievement_id: &str,
        points_earned: u32,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool> {
        let user_id = user_id.to_string();
        let achievement_id = achievement_id.to_string();
        self.blocking(move |conn| {
            let inserted = conn.execute(
                r#"
                INSERT OR IGNORE INTO unlocked_achievements
                    (user_id, achievement_id, points_earned, unlocked_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                (
                    &user_id,
                    &achievement_id,
                    points_earned,
                    unlocked_at.timestamp_millis(),
                ),
            )?;
            Ok(inserted == 1)
        })
        .await
    }

    async fn total_points(&self, user_id: &str) -> Result<u64> {
        let user_id = user_id.to_string();
        self.blocking(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(points_earned), 0) FROM unlocked_achievements WHERE user_id = ?1",
                [&user_id],
                |r| r.get(0),
            )?;
            Ok(u64::try_from(total).unwrap_or(0))
        })
        .await
    }
}

#[async_trait]
impl StreakStore for SqliteStore {
    async fn get_streak(&self, user_id: &str) -> Result<Option<DailyStreakRecord>> {
        let user_id = user_id.to_string();
        self.blocking(move |conn| {
            let row = conn
                .query_row(
                    "SELECT current_count, best_count, last_active_day FROM daily_streaks WHERE user_id = ?1",
                    [&user_id],
                    |r| {
                        Ok((
                            r.get::<_, u32>(0)?,
                            r.get::<_, u32>(1)?,
                            r.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()?;

            let Some((current, best, day)) = row else {
                return Ok(None);
            };
            let last_active_day = NaiveDate::parse_from_str(&day, DAY_FORMAT)
                .with_context(|| format!("Invalid streak day for {user_id}: {day}"))?;
            Ok(Some(DailyStreakRecord {
                last_active_day,
                current,
                best,
            }))
        })
        .await
    }

    async fn set_streak(&self, user_id: &str, record: &DailyStreakRecord) -> Result<()> {
        let user_id = user_id.to_string();
        let record = *record;
        self.blocking(move |conn| {
            let day = record.last_active_day.format(DAY_FORMAT).to_string();
            let now = Utc::now().timestamp_millis();
            conn.execute(
                r#"
                INSERT INTO daily_streaks (user_id, current_count, best_count, last_active_day, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id) DO UPDATE SET
                    current_count = ?2, best_count = ?3, last_active_day = ?4, updated_at = ?5
                "#,
                (&user_id, record.current, record.best, &day, now),
            )?;
            Ok(())
        })
        .await
    }
}

/// SQL schema for the progression database
const SCHEMA_SQL: &str = r#"
-- Unlocked achievements (append-only, one row per user and achievement)
CREATE TABLE IF NOT EXISTS unlocked_achievements (
    user_id TEXT NOT NULL,
    achievement_id TEXT NOT NULL,
    points_earned INTEGER NOT NULL,
    unlocked_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, achievement_id)
);

-- Daily streaks
CREATE TABLE IF NOT EXISTS daily_streaks (
    user_id TEXT PRIMARY KEY,
    current_count INTEGER NOT NULL DEFAULT 0,
    best_count INTEGER NOT NULL DEFAULT 0,
    last_active_day TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Statistics snapshot source (category '' = plain metric)
CREATE TABLE IF NOT EXISTS user_metrics (
    user_id TEXT NOT NULL,
    metric TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT '',
    value INTEGER NOT NULL DEFAULT 0,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, metric, category)
);

CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
