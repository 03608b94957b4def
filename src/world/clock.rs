//! The simulated world clock.
//!
//! Game time is plain integers (hour/minute/day) advanced from real elapsed
//! seconds through a configurable `time_scale`. Derived state — the named
//! time period and the day/night flag — drives NPC mood drift and is
//! published on time-change events.

use serde::{Deserialize, Serialize};

/// Named slice of the day derived from the current hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimePeriod {
    pub fn display_name(&self) -> &'static str {
        match self {
            TimePeriod::Morning => "morning",
            TimePeriod::Afternoon => "afternoon",
            TimePeriod::Evening => "evening",
            TimePeriod::Night => "night",
        }
    }
}

impl std::fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Hour/day deltas observed by one [`WorldClock::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAdvance {
    pub old_hour: u8,
    pub new_hour: u8,
    pub old_day: u32,
    pub new_day: u32,
}

impl TimeAdvance {
    /// True when the hour or the day changed, i.e. a time-change event is due.
    pub fn rolled_over(&self) -> bool {
        self.old_hour != self.new_hour || self.old_day != self.new_day
    }
}

/// Current game time: `hour` 0-23, `minute` 0-59, `day` counter from 1, and
/// the real-seconds-to-game-minutes multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldClock {
    pub hour: u8,
    pub minute: u8,
    pub day: u32,
    pub time_scale: f64,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self {
            hour: 12,
            minute: 0,
            day: 1,
            time_scale: 1.0,
        }
    }
}

impl WorldClock {
    pub fn new(hour: u8, minute: u8, day: u32, time_scale: f64) -> Self {
        Self {
            hour,
            minute,
            day,
            time_scale,
        }
    }

    /// Advance by `delta_seconds` of real time.
    ///
    /// Elapsed seconds convert to whole game-minutes (`delta × time_scale /
    /// 60`, fraction truncated) which then cascade minute→hour→day with
    /// integer division, so arbitrarily large deltas — multi-day jumps in one
    /// call — land on the correct time without skipping values.
    pub fn advance(&mut self, delta_seconds: f64) -> TimeAdvance {
        let old_hour = self.hour;
        let old_day = self.day;

        let game_minutes = (delta_seconds * self.time_scale / 60.0) as u64;

        let total_minutes = u64::from(self.minute) + game_minutes;
        self.minute = (total_minutes % 60) as u8;

        let total_hours = u64::from(self.hour) + total_minutes / 60;
        self.hour = (total_hours % 24) as u8;

        let carry_days = u32::try_from(total_hours / 24).unwrap_or(u32::MAX);
        self.day = self.day.saturating_add(carry_days);

        TimeAdvance {
            old_hour,
            new_hour: self.hour,
            old_day,
            new_day: self.day,
        }
    }

    /// Day time is 6 AM to 6 PM.
    pub fn is_day_time(&self) -> bool {
        (6..18).contains(&self.hour)
    }

    pub fn time_period(&self) -> TimePeriod {
        match self.hour {
            5..=11 => TimePeriod::Morning,
            12..=16 => TimePeriod::Afternoon,
            17..=20 => TimePeriod::Evening,
            _ => TimePeriod::Night,
        }
    }

    /// Formatted time string, e.g. "Day 5, 23:59".
    pub fn display(&self) -> String {
        format!("Day {}, {:02}:{:02}", self.day, self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_rollover_cascades_into_next_day() {
        let mut clock = WorldClock::new(23, 59, 5, 1.0);
        // 2 game-minutes: 120 real seconds at scale 1.0
        let advance = clock.advance(120.0);

        assert_eq!(clock.hour, 0);
        assert_eq!(clock.minute, 1);
        assert_eq!(clock.day, 6);
        assert!(advance.rolled_over());
        assert_eq!(advance.old_day, 5);
        assert_eq!(advance.new_day, 6);
    }

    #[test]
    fn multi_day_jump_in_one_call() {
        let mut clock = WorldClock::new(12, 30, 1, 1.0);
        // 3 days, 2 hours, 15 minutes of game time in a single update
        let minutes = (3 * 24 * 60 + 2 * 60 + 15) as f64;
        let advance = clock.advance(minutes * 60.0);

        assert_eq!(clock.day, 4);
        assert_eq!(clock.hour, 14);
        assert_eq!(clock.minute, 45);
        assert!(advance.rolled_over());
    }

    #[test]
    fn sub_minute_advance_does_not_roll_over() {
        let mut clock = WorldClock::default();
        let advance = clock.advance(30.0); // half a game-minute, truncated away

        assert_eq!(clock.minute, 0);
        assert!(!advance.rolled_over());
    }

    #[test]
    fn time_scale_multiplies_elapsed_time() {
        let mut clock = WorldClock::new(12, 0, 1, 60.0);
        clock.advance(60.0); // one real minute = one game hour
        assert_eq!(clock.hour, 13);
        assert_eq!(clock.minute, 0);
    }

    #[test]
    fn time_period_boundaries_match_the_day_cycle() {
        let period_at = |hour| WorldClock::new(hour, 0, 1, 1.0).time_period();

        assert_eq!(period_at(4), TimePeriod::Night);
        assert_eq!(period_at(5), TimePeriod::Morning);
        assert_eq!(period_at(11), TimePeriod::Morning);
        assert_eq!(period_at(12), TimePeriod::Afternoon);
        assert_eq!(period_at(16), TimePeriod::Afternoon);
        assert_eq!(period_at(17), TimePeriod::Evening);
        assert_eq!(period_at(20), TimePeriod::Evening);
        assert_eq!(period_at(21), TimePeriod::Night);
    }

    #[test]
    fn day_time_is_six_to_eighteen() {
        assert!(!WorldClock::new(5, 59, 1, 1.0).is_day_time());
        assert!(WorldClock::new(6, 0, 1, 1.0).is_day_time());
        assert!(WorldClock::new(17, 59, 1, 1.0).is_day_time());
        assert!(!WorldClock::new(18, 0, 1, 1.0).is_day_time());
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(WorldClock::new(9, 5, 12, 1.0).display(), "Day 12, 09:05");
    }
}
