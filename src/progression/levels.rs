//! Points and level system
//!
//! Defines level thresholds, titles, and progress calculations.

use serde::Serialize;

/// Level definition
#[derive(Debug, Clone, Serialize)]
pub struct LevelTier {
    pub level: u32,
    pub min_points: u64,
    pub title: &'static str,
}

/// All level definitions (must be sorted by level, first tier starts at 0)
pub static LEVEL_TIERS: &[LevelTier] = &[
    LevelTier {
        level: 1,
        min_points: 0,
        title: "Kitchen Newbie",
    },
    LevelTier {
        level: 2,
        min_points: 100,
        title: "Home Cook",
    },
    LevelTier {
        level: 3,
        min_points: 300,
        title: "Line Cook",
    },
    LevelTier {
        level: 4,
        min_points: 600,
        title: "Sous Chef",
    },
    LevelTier {
        level: 5,
        min_points: 1_000,
        title: "Chef de Partie",
    },
    LevelTier {
        level: 6,
        min_points: 2_000,
        title: "Head Chef",
    },
    LevelTier {
        level: 7,
        min_points: 4_000,
        title: "Executive Chef",
    },
    LevelTier {
        level: 8,
        min_points: 8_000,
        title: "Master Chef",
    },
    LevelTier {
        level: 9,
        min_points: 16_000,
        title: "Culinary Legend",
    },
    LevelTier {
        level: 10,
        min_points: 32_000,
        title: "Grand Gourmet",
    },
];

impl LevelTier {
    /// Tier whose range contains `points`
    pub fn for_points(points: u64) -> &'static LevelTier {
        LEVEL_TIERS
            .iter()
            .rev()
            .find(|t| points >= t.min_points)
            .unwrap_or(&LEVEL_TIERS[0])
    }

    /// Following tier (None at the top)
    pub fn next(&self) -> Option<&'static LevelTier> {
        LEVEL_TIERS.iter().find(|t| t.level == self.level + 1)
    }

    /// Last point value inside this tier (None for the unbounded top tier)
    pub fn max_points(&self) -> Option<u64> {
        self.next().map(|next| next.min_points - 1)
    }

    pub fn max_level() -> u32 {
        LEVEL_TIERS.last().map(|t| t.level).unwrap_or(1)
    }
}

/// Level computed for a point total
#[derive(Debug, Clone, Serialize)]
pub struct LevelInfo {
    pub tier: &'static LevelTier,
    /// 0-100, rounded; 100 at the top tier
    pub progress_percent: u8,
}

/// Map a point total onto its tier and the progress towards the next one
pub fn compute_level(total_points: u64) -> LevelInfo {
    let tier = LevelTier::for_points(total_points);
    let progress_percent = match tier.next() {
        Some(next) => {
            let span = (next.min_points - tier.min_points) as f64;
            let into = (total_points - tier.min_points) as f64;
            (100.0 * into / span).round().clamp(0.0, 100.0) as u8
        }
        None => 100,
    };
    LevelInfo {
        tier,
        progress_percent,
    }
}

/// Player progress as shown on a profile
#[derive(Debug, Clone, Serialize)]
pub struct PlayerProgress {
    pub total_points: u64,
    pub level: u32,
    pub title: String,
    pub progress_percent: u8,
    /// Points still missing for the next level (None at max level)
    pub points_to_next: Option<u64>,
}

impl PlayerProgress {
    pub fn new(total_points: u64) -> Self {
        let info = compute_level(total_points);
        Self {
            total_points,
            level: info.tier.level,
            title: info.tier.title.to_string(),
            progress_percent: info.progress_percent,
            points_to_next: info
                .tier
                .next()
                .map(|next| next.min_points - total_points),
        }
    }

    /// Check if at max level
    pub fn is_max_level(&self) -> bool {
        self.points_to_next.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_contiguous() {
        assert_eq!(LEVEL_TIERS[0].min_points, 0);
        for pair in LEVEL_TIERS.windows(2) {
            assert_eq!(pair[1].level, pair[0].level + 1);
            assert!(pair[1].min_points > pair[0].min_points);
            assert_eq!(pair[0].max_points(), Some(pair[1].min_points - 1));
        }
        assert_eq!(LEVEL_TIERS.last().unwrap().max_points(), None);
    }

    #[test]
    fn test_level_for_points() {
        assert_eq!(compute_level(0).tier.level, 1);
        assert_eq!(compute_level(99).tier.level, 1);
        assert_eq!(compute_level(100).tier.level, 2);
        assert_eq!(compute_level(31_999).tier.level, 9);
        assert_eq!(compute_level(32_000).tier.level, 10);
        assert_eq!(compute_level(u64::MAX).tier.level, 10);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(compute_level(0).progress_percent, 0);
        assert_eq!(compute_level(50).progress_percent, 50);
        assert_eq!(compute_level(100).progress_percent, 0);
        assert_eq!(compute_level(250).progress_percent, 75);
        assert!(compute_level(299).progress_percent >= 99);
        assert_eq!(compute_level(40_000).progress_percent, 100);
    }

    #[test]
    fn test_player_progress() {
        let progress = PlayerProgress::new(450);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.title, "Line Cook");
        assert_eq!(progress.progress_percent, 50);
        assert_eq!(progress.points_to_next, Some(150));
        assert!(!progress.is_max_level());
        assert!(PlayerProgress::new(32_000).is_max_level());
    }
}
