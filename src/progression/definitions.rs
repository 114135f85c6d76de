//! Achievement definitions and metadata
//!
//! All trophies are defined here with their unlock conditions and rewards.

use std::fmt;

use super::metrics::Metric;

/// Declarative unlock condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// `snapshot[metric] >= value`
    CountThreshold { metric: Metric, value: u64 },
    /// `snapshot[metric][category] >= value`
    CategoryCountThreshold {
        metric: Metric,
        category: &'static str,
        value: u64,
    },
    /// Every subcondition holds
    CompositeAll(&'static [Condition]),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountThreshold { metric, value } => write!(f, "{metric} >= {value}"),
            Self::CategoryCountThreshold {
                metric,
                category,
                value,
            } => write!(f, "{metric}[{category}] >= {value}"),
            Self::CompositeAll(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

/// Achievement category for grouping in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementCategory {
    Milestone,
    Social,
    Popularity,
    Community,
    Cuisine,
    Streak,
    Profile,
    Loyalty,
    Combo,
}

impl AchievementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Milestone => "Milestones",
            Self::Social => "Friends",
            Self::Popularity => "Popularity",
            Self::Community => "Community",
            Self::Cuisine => "Cuisine",
            Self::Streak => "Streaks",
            Self::Profile => "Profile",
            Self::Loyalty => "Loyalty",
            Self::Combo => "Combos",
        }
    }
}

/// Achievement definition with all metadata
#[derive(Debug, Clone)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    /// Granted once, on unlock
    pub points: u32,
    pub condition: Condition,
}

const fn count(metric: Metric, value: u64) -> Condition {
    Condition::CountThreshold { metric, value }
}

const fn recipes_in(category: &'static str, value: u64) -> Condition {
    Condition::CategoryCountThreshold {
        metric: Metric::RecipesByCategory,
        category,
        value,
    }
}

/// All achievement definitions
pub static ACHIEVEMENTS: &[AchievementDefinition] = &[
    // === MILESTONE ===
    AchievementDefinition {
        id: "first_recipe",
        title: "First Dish",
        description: "Publish your first recipe",
        icon: "🍳",
        category: AchievementCategory::Milestone,
        points: 10,
        condition: count(Metric::RecipeCount, 1),
    },
    AchievementDefinition {
        id: "recipe_apprentice",
        title: "Kitchen Apprentice",
        description: "Publish 5 recipes",
        icon: "🥄",
        category: AchievementCategory::Milestone,
        points: 25,
        condition: count(Metric::RecipeCount, 5),
    },
    AchievementDefinition {
        id: "home_chef",
        title: "Home Chef",
        description: "Publish 10 recipes",
        icon: "👩‍🍳",
        category: AchievementCategory::Milestone,
        points: 50,
        condition: count(Metric::RecipeCount, 10),
    },
    AchievementDefinition {
        id: "prolific_chef",
        title: "Prolific Chef",
        description: "Publish 25 recipes",
        icon: "📖",
        category: AchievementCategory::Milestone,
        points: 100,
        condition: count(Metric::RecipeCount, 25),
    },
    AchievementDefinition {
        id: "recipe_master",
        title: "Recipe Master",
        description: "Publish 50 recipes",
        icon: "🏅",
        category: AchievementCategory::Milestone,
        points: 200,
        condition: count(Metric::RecipeCount, 50),
    },
    AchievementDefinition {
        id: "cookbook_author",
        title: "Cookbook Author",
        description: "Publish 100 recipes",
        icon: "📚",
        category: AchievementCategory::Milestone,
        points: 500,
        condition: count(Metric::RecipeCount, 100),
    },
    // === SOCIAL ===
    AchievementDefinition {
        id: "first_friend",
        title: "Dinner Guest",
        description: "Add your first friend",
        icon: "🤝",
        category: AchievementCategory::Social,
        points: 10,
        condition: count(Metric::FriendCount, 1),
    },
    AchievementDefinition {
        id: "social_circle",
        title: "Supper Club",
        description: "Have 10 friends",
        icon: "🍽️",
        category: AchievementCategory::Social,
        points: 50,
        condition: count(Metric::FriendCount, 10),
    },
    AchievementDefinition {
        id: "social_butterfly",
        title: "Social Butterfly",
        description: "Have 50 friends",
        icon: "🦋",
        category: AchievementCategory::Social,
        points: 200,
        condition: count(Metric::FriendCount, 50),
    },
    // === POPULARITY ===
    AchievementDefinition {
        id: "first_like",
        title: "Tasty!",
        description: "Receive your first like",
        icon: "❤️",
        category: AchievementCategory::Popularity,
        points: 10,
        condition: count(Metric::LikesReceived, 1),
    },
    AchievementDefinition {
        id: "crowd_pleaser",
        title: "Crowd Pleaser",
        description: "Receive 25 likes",
        icon: "😋",
        category: AchievementCategory::Popularity,
        points: 50,
        condition: count(Metric::LikesReceived, 25),
    },
    AchievementDefinition {
        id: "fan_favorite",
        title: "Fan Favorite",
        description: "Receive 100 likes",
        icon: "⭐",
        category: AchievementCategory::Popularity,
        points: 150,
        condition: count(Metric::LikesReceived, 100),
    },
    AchievementDefinition {
        id: "viral_recipe",
        title: "Gone Viral",
        description: "Receive 1000 likes",
        icon: "🔥",
        category: AchievementCategory::Popularity,
        points: 500,
        condition: count(Metric::LikesReceived, 1000),
    },
    // === COMMUNITY ===
    AchievementDefinition {
        id: "generous_taster",
        title: "Generous Taster",
        description: "Like 50 recipes from others",
        icon: "👍",
        category: AchievementCategory::Community,
        points: 30,
        condition: count(Metric::LikesGiven, 50),
    },
    AchievementDefinition {
        id: "food_critic",
        title: "Food Critic",
        description: "Write 25 comments",
        icon: "📝",
        category: AchievementCategory::Community,
        points: 50,
        condition: count(Metric::CommentsWritten, 25),
    },
    AchievementDefinition {
        id: "sharer",
        title: "Sharing is Caring",
        description: "Share 10 recipes",
        icon: "📤",
        category: AchievementCategory::Community,
        points: 50,
        condition: count(Metric::RecipesShared, 10),
    },
    // === CUISINE ===
    AchievementDefinition {
        id: "sweet_tooth",
        title: "Sweet Tooth",
        description: "Publish 5 dessert recipes",
        icon: "🍰",
        category: AchievementCategory::Cuisine,
        points: 50,
        condition: recipes_in("dessert", 5),
    },
    AchievementDefinition {
        id: "green_chef",
        title: "Green Chef",
        description: "Publish 10 vegetarian recipes",
        icon: "🥗",
        category: AchievementCategory::Cuisine,
        points: 75,
        condition: recipes_in("vegetarian", 10),
    },
    AchievementDefinition {
        id: "master_baker",
        title: "Master Baker",
        description: "Publish 10 baking recipes",
        icon: "🥖",
        category: AchievementCategory::Cuisine,
        points: 75,
        condition: recipes_in("baking", 10),
    },
    // === STREAK ===
    AchievementDefinition {
        id: "streak_3",
        title: "Warming Up",
        description: "Cook up a 3-day streak",
        icon: "♨️",
        category: AchievementCategory::Streak,
        points: 30,
        condition: count(Metric::DailyStreak, 3),
    },
    AchievementDefinition {
        id: "streak_7",
        title: "Week of Flavour",
        description: "Maintain a 7-day streak",
        icon: "📅",
        category: AchievementCategory::Streak,
        points: 75,
        condition: count(Metric::DailyStreak, 7),
    },
    AchievementDefinition {
        id: "streak_30",
        title: "Monthly Menu",
        description: "Maintain a 30-day streak",
        icon: "👑",
        category: AchievementCategory::Streak,
        points: 300,
        condition: count(Metric::DailyStreak, 30),
    },
    // === PROFILE ===
    AchievementDefinition {
        id: "profile_complete",
        title: "Chef's Whites",
        description: "Complete your profile",
        icon: "🧑‍🍳",
        category: AchievementCategory::Profile,
        points: 20,
        condition: count(Metric::ProfileCompleteness, 100),
    },
    // === LOYALTY ===
    AchievementDefinition {
        id: "one_year",
        title: "Seasoned",
        description: "Be a member for a year",
        icon: "🎂",
        category: AchievementCategory::Loyalty,
        points: 100,
        condition: count(Metric::DaysSinceRegistration, 365),
    },
    // === COMBO ===
    AchievementDefinition {
        id: "influencer",
        title: "Food Influencer",
        description: "Have 50 friends and receive 100 likes",
        icon: "📸",
        category: AchievementCategory::Combo,
        points: 300,
        condition: Condition::CompositeAll(&[
            Condition::CountThreshold {
                metric: Metric::FriendCount,
                value: 50,
            },
            Condition::CountThreshold {
                metric: Metric::LikesReceived,
                value: 100,
            },
        ]),
    },
    AchievementDefinition {
        id: "well_rounded",
        title: "Well Rounded",
        description: "Publish 10 recipes, have 10 friends and write 10 comments",
        icon: "🧆",
        category: AchievementCategory::Combo,
        points: 150,
        condition: Condition::CompositeAll(&[
            Condition::CountThreshold {
                metric: Metric::RecipeCount,
                value: 10,
            },
            Condition::CountThreshold {
                metric: Metric::FriendCount,
                value: 10,
            },
            Condition::CountThreshold {
                metric: Metric::CommentsWritten,
                value: 10,
            },
        ]),
    },
    AchievementDefinition {
        id: "dedicated_chef",
        title: "Dedicated Chef",
        description: "Publish 25 recipes during a 7-day streak",
        icon: "🔪",
        category: AchievementCategory::Combo,
        points: 200,
        condition: Condition::CompositeAll(&[
            Condition::CountThreshold {
                metric: Metric::DailyStreak,
                value: 7,
            },
            Condition::CountThreshold {
                metric: Metric::RecipeCount,
                value: 25,
            },
        ]),
    },
];

impl AchievementDefinition {
    /// Get achievement definition by ID
    pub fn get(id: &str) -> Option<&'static AchievementDefinition> {
        ACHIEVEMENTS.iter().find(|a| a.id == id)
    }

    /// Get total number of achievements
    pub fn total_count() -> usize {
        ACHIEVEMENTS.len()
    }

    /// Get total possible points from all achievements
    pub fn total_points() -> u32 {
        ACHIEVEMENTS.iter().map(|a| a.points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_lookup() {
        let influencer = AchievementDefinition::get("influencer").unwrap();
        assert_eq!(influencer.points, 300);
        assert!(matches!(influencer.condition, Condition::CompositeAll(parts) if parts.len() == 2));
        assert!(AchievementDefinition::get("unknown").is_none());
    }

    #[test]
    fn test_condition_display() {
        let influencer = AchievementDefinition::get("influencer").unwrap();
        assert_eq!(
            influencer.condition.to_string(),
            "friend_count >= 50 AND likes_received >= 100"
        );
        let sweet = AchievementDefinition::get("sweet_tooth").unwrap();
        assert_eq!(
            sweet.condition.to_string(),
            "recipes_by_category[dessert] >= 5"
        );
    }
}
