//! User statistics consumed by achievement conditions

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named statistic a condition can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RecipeCount,
    /// Per-category recipe counts (dessert, vegan, ...)
    RecipesByCategory,
    FriendCount,
    LikesReceived,
    LikesGiven,
    CommentsWritten,
    RecipesShared,
    /// Consecutive calendar days with activity
    DailyStreak,
    /// 0-100
    ProfileCompleteness,
    DaysSinceRegistration,
}

impl Metric {
    /// Get the string ID for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecipeCount => "recipe_count",
            Self::RecipesByCategory => "recipes_by_category",
            Self::FriendCount => "friend_count",
            Self::LikesReceived => "likes_received",
            Self::LikesGiven => "likes_given",
            Self::CommentsWritten => "comments_written",
            Self::RecipesShared => "recipes_shared",
            Self::DailyStreak => "daily_streak",
            Self::ProfileCompleteness => "profile_completeness",
            Self::DaysSinceRegistration => "days_since_registration",
        }
    }

    /// Parse from database string (camelCase names are accepted too)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "recipe_count" | "recipeCount" => Some(Self::RecipeCount),
            "recipes_by_category" | "recipesByCategory" => Some(Self::RecipesByCategory),
            "friend_count" | "friendCount" | "friendsCount" => Some(Self::FriendCount),
            "likes_received" | "likesReceived" => Some(Self::LikesReceived),
            "likes_given" | "likesGiven" => Some(Self::LikesGiven),
            "comments_written" | "commentsWritten" => Some(Self::CommentsWritten),
            "recipes_shared" | "recipesShared" => Some(Self::RecipesShared),
            "daily_streak" | "dailyStreak" => Some(Self::DailyStreak),
            "profile_completeness" | "profileCompleteness" => Some(Self::ProfileCompleteness),
            "days_since_registration" | "daysSinceRegistration" => {
                Some(Self::DaysSinceRegistration)
            }
            _ => None,
        }
    }

    pub fn all() -> &'static [Metric] {
        &[
            Self::RecipeCount,
            Self::RecipesByCategory,
            Self::FriendCount,
            Self::LikesReceived,
            Self::LikesGiven,
            Self::CommentsWritten,
            Self::RecipesShared,
            Self::DailyStreak,
            Self::ProfileCompleteness,
            Self::DaysSinceRegistration,
        ]
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a user's statistics
///
/// Built fresh for every evaluation pass. Absent metrics read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProgressionSnapshot {
    #[serde(default)]
    counts: HashMap<Metric, u64>,
    #[serde(default)]
    categories: HashMap<Metric, HashMap<String, u64>>,
}

impl UserProgressionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, metric: Metric, value: u64) -> Self {
        self.set(metric, value);
        self
    }

    /// Builder-style setter for a per-category count
    pub fn with_category(mut self, metric: Metric, category: &str, value: u64) -> Self {
        self.set_category(metric, category, value);
        self
    }

    pub fn set(&mut self, metric: Metric, value: u64) {
        self.counts.insert(metric, value);
    }

    pub fn set_category(&mut self, metric: Metric, category: &str, value: u64) {
        self.categories
            .entry(metric)
            .or_default()
            .insert(category.to_lowercase(), value);
    }

    pub fn get(&self, metric: Metric) -> u64 {
        self.counts.get(&metric).copied().unwrap_or(0)
    }

    /// Category lookup is case-insensitive; a missing category counts as 0
    pub fn category(&self, metric: Metric, category: &str) -> u64 {
        self.categories
            .get(&metric)
            .and_then(|by_category| by_category.get(&category.to_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    pub fn has(&self, metric: Metric) -> bool {
        self.counts.contains_key(&metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metrics_default_to_zero() {
        let snapshot = UserProgressionSnapshot::new().with(Metric::RecipeCount, 4);
        assert_eq!(snapshot.get(Metric::RecipeCount), 4);
        assert_eq!(snapshot.get(Metric::FriendCount), 0);
        assert_eq!(snapshot.category(Metric::RecipesByCategory, "dessert"), 0);
    }

    #[test]
    fn test_category_lookup_is_case_insensitive() {
        let snapshot =
            UserProgressionSnapshot::new().with_category(Metric::RecipesByCategory, "Dessert", 7);
        assert_eq!(snapshot.category(Metric::RecipesByCategory, "dessert"), 7);
        assert_eq!(snapshot.category(Metric::RecipesByCategory, "DESSERT"), 7);
    }

    #[test]
    fn test_metric_names_roundtrip() {
        for metric in Metric::all() {
            assert_eq!(Metric::from_str(metric.as_str()), Some(*metric));
        }
        assert_eq!(Metric::from_str("friendsCount"), Some(Metric::FriendCount));
        assert_eq!(Metric::from_str("karma"), None);
    }
}
