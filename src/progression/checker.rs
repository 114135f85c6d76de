//! Achievement checking logic
//!
//! Pure functions: conditions are evaluated against a snapshot, no I/O.

use std::collections::HashSet;

use super::definitions::{AchievementDefinition, Condition};
use super::metrics::UserProgressionSnapshot;

/// Evaluate a condition against a snapshot
pub fn is_satisfied(condition: &Condition, snapshot: &UserProgressionSnapshot) -> bool {
    match condition {
        Condition::CountThreshold { metric, value } => snapshot.get(*metric) >= *value,
        Condition::CategoryCountThreshold {
            metric,
            category,
            value,
        } => snapshot.category(*metric, category) >= *value,
        Condition::CompositeAll(parts) => parts.iter().all(|part| is_satisfied(part, snapshot)),
    }
}

/// Definitions that are satisfied by `snapshot` and not yet in `unlocked`,
/// in catalog order
pub fn check_achievements<'a>(
    catalog: &'a [AchievementDefinition],
    snapshot: &UserProgressionSnapshot,
    unlocked: &HashSet<String>,
) -> Vec<&'a AchievementDefinition> {
    catalog
        .iter()
        .filter(|def| !unlocked.contains(def.id))
        .filter(|def| is_satisfied(&def.condition, snapshot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::definitions::ACHIEVEMENTS;
    use crate::progression::metrics::Metric;

    fn influencer() -> &'static AchievementDefinition {
        AchievementDefinition::get("influencer").unwrap()
    }

    #[test]
    fn test_count_threshold_is_inclusive() {
        let condition = Condition::CountThreshold {
            metric: Metric::RecipeCount,
            value: 10,
        };
        let snapshot = UserProgressionSnapshot::new().with(Metric::RecipeCount, 9);
        assert!(!is_satisfied(&condition, &snapshot));
        let snapshot = snapshot.with(Metric::RecipeCount, 10);
        assert!(is_satisfied(&condition, &snapshot));
    }

    #[test]
    fn test_category_threshold_missing_category_is_zero() {
        let condition = Condition::CategoryCountThreshold {
            metric: Metric::RecipesByCategory,
            category: "dessert",
            value: 1,
        };
        let snapshot =
            UserProgressionSnapshot::new().with_category(Metric::RecipesByCategory, "soup", 12);
        assert!(!is_satisfied(&condition, &snapshot));
        let snapshot = snapshot.with_category(Metric::RecipesByCategory, "dessert", 1);
        assert!(is_satisfied(&condition, &snapshot));
    }

    #[test]
    fn test_composite_requires_every_part() {
        let one_side = UserProgressionSnapshot::new()
            .with(Metric::FriendCount, 60)
            .with(Metric::LikesReceived, 40);
        assert!(!is_satisfied(&influencer().condition, &one_side));

        let both = one_side.with(Metric::LikesReceived, 150);
        assert!(is_satisfied(&influencer().condition, &both));
    }

    #[test]
    fn test_empty_composite_is_vacuously_true() {
        let condition = Condition::CompositeAll(&[]);
        assert!(is_satisfied(&condition, &UserProgressionSnapshot::new()));
    }

    #[test]
    fn test_check_skips_unlocked() {
        let snapshot = UserProgressionSnapshot::new().with(Metric::RecipeCount, 5);
        let newly = check_achievements(ACHIEVEMENTS, &snapshot, &HashSet::new());
        let ids: Vec<&str> = newly.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["first_recipe", "recipe_apprentice"]);

        let unlocked: HashSet<String> = ["first_recipe".to_string()].into_iter().collect();
        let newly = check_achievements(ACHIEVEMENTS, &snapshot, &unlocked);
        let ids: Vec<&str> = newly.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["recipe_apprentice"]);
    }
}
