//! Metric command implementation

use std::path::Path;

use anyhow::{bail, Result};

use coco::progression::Metric;
use coco::store::SqliteStore;

/// Set a user statistic in the progression database
pub async fn metric_command(
    db_path: &Path,
    user: &str,
    metric: &str,
    category: Option<&str>,
    value: u64,
) -> Result<()> {
    let Some(metric) = Metric::from_str(metric) else {
        let known: Vec<&str> = Metric::all().iter().map(Metric::as_str).collect();
        bail!("Unknown metric '{}'. Known metrics: {}", metric, known.join(", "));
    };

    let store = SqliteStore::open(db_path)?;
    store.set_metric(user, metric, category, value)?;

    match category {
        Some(category) => println!("{user}: {metric}[{category}] = {value}"),
        None => println!("{user}: {metric} = {value}"),
    }
    Ok(())
}
