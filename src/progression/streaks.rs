//! Daily streak tracking
//!
//! Streaks compare calendar days, not elapsed time: two activities two hours
//! apart on either side of midnight land on different days.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Per-user streak state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStreakRecord {
    pub last_active_day: NaiveDate,
    pub current: u32,
    /// Longest streak ever reached
    pub best: u32,
}

/// What a recorded activity did to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// Already active today, nothing changes
    Unchanged,
    /// Active yesterday, streak grows by one
    Extended,
    /// First activity ever, or a gap of more than one day
    Reset,
}

impl DailyStreakRecord {
    /// Streak state after activity on `today`
    pub fn advance(previous: Option<&Self>, today: NaiveDate) -> (Self, StreakTransition) {
        let Some(prev) = previous else {
            return (
                Self {
                    last_active_day: today,
                    current: 1,
                    best: 1,
                },
                StreakTransition::Reset,
            );
        };

        match (today - prev.last_active_day).num_days() {
            // Same day, or a clock that went backwards
            i64::MIN..=0 => (*prev, StreakTransition::Unchanged),
            1 => {
                let current = prev.current.saturating_add(1);
                (
                    Self {
                        last_active_day: today,
                        current,
                        best: prev.best.max(current),
                    },
                    StreakTransition::Extended,
                )
            }
            _ => (
                Self {
                    last_active_day: today,
                    current: 1,
                    best: prev.best.max(1),
                },
                StreakTransition::Reset,
            ),
        }
    }

    /// Still alive: activity today or yesterday
    pub fn is_active(&self, today: NaiveDate) -> bool {
        (0..=1).contains(&(today - self.last_active_day).num_days())
    }
}

/// Today in the local timezone
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_first_activity_starts_at_one() {
        let (record, transition) = DailyStreakRecord::advance(None, day(10));
        assert_eq!(record.current, 1);
        assert_eq!(record.best, 1);
        assert_eq!(transition, StreakTransition::Reset);
    }

    #[test]
    fn test_streak_transitions() {
        let (d, _) = DailyStreakRecord::advance(None, day(10));
        let (same, t) = DailyStreakRecord::advance(Some(&d), day(10));
        assert_eq!((same.current, t), (1, StreakTransition::Unchanged));

        let (next, t) = DailyStreakRecord::advance(Some(&same), day(11));
        assert_eq!((next.current, t), (2, StreakTransition::Extended));
        assert_eq!(next.best, 2);

        let (gap, t) = DailyStreakRecord::advance(Some(&next), day(14));
        assert_eq!((gap.current, t), (1, StreakTransition::Reset));
        assert_eq!(gap.best, 2);
        assert_eq!(gap.last_active_day, day(14));
    }

    #[test]
    fn test_backwards_clock_keeps_record() {
        let (d, _) = DailyStreakRecord::advance(None, day(10));
        let (after, t) = DailyStreakRecord::advance(Some(&d), day(8));
        assert_eq!(after, d);
        assert_eq!(t, StreakTransition::Unchanged);
    }

    #[test]
    fn test_month_boundary_extends() {
        let feb_end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let (d, _) = DailyStreakRecord::advance(None, feb_end);
        let (next, t) = DailyStreakRecord::advance(Some(&d), day(1));
        assert_eq!((next.current, t), (2, StreakTransition::Extended));
    }

    #[test]
    fn test_is_active() {
        let (d, _) = DailyStreakRecord::advance(None, day(10));
        assert!(d.is_active(day(10)));
        assert!(d.is_active(day(11)));
        assert!(!d.is_active(day(12)));
    }
}
