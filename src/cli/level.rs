//! Level and progress commands

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use coco::progression::{compute_level, PlayerProgress, ProgressionEngine};
use coco::store::SqliteStore;

/// Show the level tier for a point total
pub fn level_command(points: u64, json: bool) -> Result<()> {
    let info = compute_level(points);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!(
        "Level {} - {} ({}% to next level)",
        info.tier.level, info.tier.title, info.progress_percent
    );
    Ok(())
}

/// Show points and level for a user
pub async fn progress_command(db_path: &Path, user: &str, json: bool) -> Result<()> {
    let store = Arc::new(SqliteStore::open(db_path)?);
    let engine = ProgressionEngine::from_store(store);
    let progress = engine.progress(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        print_progress(user, &progress);
    }
    Ok(())
}

pub(crate) fn print_progress(user: &str, progress: &PlayerProgress) {
    println!(
        "{}: {} points, level {} ({})",
        user, progress.total_points, progress.level, progress.title
    );
    match progress.points_to_next {
        Some(missing) => println!(
            "  {}% of the way, {} points to the next level",
            progress.progress_percent, missing
        ),
        None => println!("  Max level reached"),
    }
}
