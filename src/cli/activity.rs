//! Activity and evaluation commands

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use coco::config::Config;
use coco::progression::{local_today, ProgressionEngine, ProgressionEvent};
use coco::retry::RetryExecutor;
use coco::store::SqliteStore;

use super::level::print_progress;

fn open_engine(db_path: &Path) -> Result<ProgressionEngine> {
    let store = Arc::new(SqliteStore::open(db_path)?);
    Ok(ProgressionEngine::from_store(store))
}

/// Record daily activity, then evaluate achievements
pub async fn activity_command(
    db_path: &Path,
    config: &Config,
    user: &str,
    date: Option<&str>,
) -> Result<()> {
    let today = match date {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?,
        None => local_today(),
    };

    let mut engine = open_engine(db_path)?;
    let mut events = engine.subscribe();

    // The database may be held by the app for a moment
    let executor = RetryExecutor::new(config.retry.to_policy::<anyhow::Error>()?)
        .named("record_daily_activity")
        .on_retry(|retry| {
            eprintln!(
                "Database busy, retrying... (attempt {}/{})",
                retry.attempt, retry.max_retries
            );
        });
    let streak = executor
        .execute(|| engine.record_daily_activity(user, today))
        .await?;

    println!("{user}: {streak}-day streak ({today})");

    let unlocked = engine.evaluate_achievements_on(user, today).await;
    for unlocked in &unlocked {
        println!("  🏆 {} (+{} pts)", unlocked.title, unlocked.points_earned);
    }
    print_events(&mut events);
    Ok(())
}

/// Evaluate achievements for a user and show the resulting progress
pub async fn evaluate_command(db_path: &Path, config: &Config, user: &str, json: bool) -> Result<()> {
    let mut engine = open_engine(db_path)?;
    let mut events = engine.subscribe();

    let unlocked = engine.evaluate_achievements(user).await;

    let executor = RetryExecutor::new(config.retry.to_policy::<anyhow::Error>()?)
        .named("load_progress");
    let progress = executor.execute(|| engine.progress(user)).await?;

    if json {
        let output = serde_json::json!({
            "unlocked": unlocked,
            "progress": progress,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if unlocked.is_empty() {
        println!("No new achievements.");
    } else {
        println!("Unlocked {} achievement(s):", unlocked.len());
        for unlocked in &unlocked {
            println!("  🏆 {} (+{} pts)", unlocked.title, unlocked.points_earned);
        }
    }
    print_events(&mut events);
    print_progress(user, &progress);
    Ok(())
}

fn print_events(events: &mut tokio::sync::mpsc::UnboundedReceiver<ProgressionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            ProgressionEvent::LevelUp(level_up) => println!(
                "  ⬆️  Level up! {} -> {} ({})",
                level_up.old_level, level_up.new_level, level_up.new_title
            ),
            ProgressionEvent::StreakExtended { count, .. } => {
                println!("  🔥 Streak extended to {count} days")
            }
            // Already printed from the returned list
            ProgressionEvent::AchievementUnlocked(_) => {}
        }
    }
}
