//! Achievement catalog listing

use coco::progression::{AchievementDefinition, ACHIEVEMENTS};

/// List all achievements grouped by category
pub fn list_command() {
    let mut current_category = None;

    for def in ACHIEVEMENTS {
        if current_category != Some(def.category) {
            println!("\n{}:", def.category.label());
            current_category = Some(def.category);
        }
        println!(
            "  {} {:<18} {:>4} pts  {}  [{}]",
            def.icon, def.id, def.points, def.description, def.condition
        );
    }

    println!(
        "\n{} achievements, {} points total",
        AchievementDefinition::total_count(),
        AchievementDefinition::total_points()
    );
}
