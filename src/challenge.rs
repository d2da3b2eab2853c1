use crate::config::ChallengeConfig;
use crate::error::{AppError, AppResult};
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Weekly raffle entry requires 60% of the weekly step goal.
const RAFFLE_THRESHOLD_PCT: i64 = 60;
/// Grand prize entry requires 70% of the full-challenge individual goal.
const GRAND_PRIZE_THRESHOLD_PCT: i64 = 70;
/// The org-wide halfway milestone fires at 50% of the global goal.
const MILESTONE_HALFWAY_PCT: i64 = 50;

pub const MILESTONE_50_PERCENT: &str = "50_percent";

/// Challenge calendar and goal arithmetic.
///
/// All date bucketing happens in the configured named time zone: a log
/// belongs to the civil day it was logged on in that zone, and weekly buckets
/// are fixed 7-day windows counted from the start date (week 1 = days 0-6).
#[derive(Debug, Clone)]
pub struct Challenge {
    start_date: NaiveDate,
    duration_days: u32,
    weeks: u32,
    daily_goal: i64,
    roster_size: i64,
    tz: Tz,
}

/// Result of checking a before/after total pair against a threshold.
///
/// `crossed` is true only for the single update that moved the total from
/// below the threshold to at-or-above it. `qualifies` only looks at the new
/// total, so re-evaluating an already-qualified participant is a safe no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdCheck {
    pub crossed: bool,
    pub qualifies: bool,
}

/// `crossed` iff `total_before < threshold <= total_after`.
pub fn evaluate(total_before: i64, total_after: i64, threshold: i64) -> ThresholdCheck {
    ThresholdCheck {
        crossed: total_before < threshold && total_after >= threshold,
        qualifies: total_after >= threshold,
    }
}

impl Challenge {
    pub fn from_config(cfg: &ChallengeConfig) -> AppResult<Self> {
        let tz: Tz = cfg
            .timezone
            .parse()
            .map_err(|_| AppError::ConfigError(format!("Unknown time zone: {}", cfg.timezone)))?;
        if cfg.weeks == 0 || cfg.duration_days == 0 {
            return Err(AppError::ConfigError(
                "Challenge duration must be at least one week".to_string(),
            ));
        }
        if cfg.daily_goal <= 0 || cfg.roster_size <= 0 {
            return Err(AppError::ConfigError(
                "daily_goal and roster_size must be positive".to_string(),
            ));
        }
        Ok(Self {
            start_date: cfg.start_date,
            duration_days: cfg.duration_days,
            weeks: cfg.weeks,
            daily_goal: cfg.daily_goal,
            roster_size: cfg.roster_size,
            tz,
        })
    }

    /// Today's civil date in the challenge time zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::days(self.duration_days as i64 - 1)
    }

    pub fn weeks(&self) -> u32 {
        self.weeks
    }

    pub fn in_window(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date()
    }

    /// Which challenge week a date falls in, clamped to 1..=weeks.
    pub fn week_of(&self, date: NaiveDate) -> u32 {
        let days = (date - self.start_date).num_days();
        let week = days.div_euclid(7) + 1;
        week.clamp(1, self.weeks as i64) as u32
    }

    /// Current week by wall clock. Back-dated logs evaluate against this
    /// week, matching the original tracker's behavior.
    pub fn current_week(&self) -> u32 {
        self.week_of(self.today())
    }

    /// Start/end civil dates of a challenge week (inclusive).
    pub fn week_bounds(&self, week: u32) -> (NaiveDate, NaiveDate) {
        let start = self.start_date + Duration::days((week as i64 - 1) * 7);
        (start, start + Duration::days(6))
    }

    pub fn weekly_goal(&self) -> i64 {
        self.daily_goal * 7
    }

    pub fn raffle_threshold(&self) -> i64 {
        self.weekly_goal() * RAFFLE_THRESHOLD_PCT / 100
    }

    pub fn individual_goal(&self) -> i64 {
        self.daily_goal * self.duration_days as i64
    }

    pub fn grand_prize_threshold(&self) -> i64 {
        self.individual_goal() * GRAND_PRIZE_THRESHOLD_PCT / 100
    }

    pub fn global_goal(&self) -> i64 {
        self.individual_goal() * self.roster_size
    }

    pub fn halfway_threshold(&self) -> i64 {
        self.global_goal() * MILESTONE_HALFWAY_PCT / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChallengeConfig;

    fn december() -> Challenge {
        Challenge::from_config(&ChallengeConfig::default()).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_crossing_fires_exactly_once() {
        // 6,000 -> 8,200 across a weekly threshold of 7,000 crosses.
        let check = evaluate(6000, 8200, 7000);
        assert!(check.crossed);
        assert!(check.qualifies);

        // The follow-up write 8,200 -> 9,000 must not re-fire.
        let check = evaluate(8200, 9000, 7000);
        assert!(!check.crossed);
        assert!(check.qualifies);
    }

    #[test]
    fn test_crossing_boundary_is_inclusive_above() {
        // Landing exactly on the threshold counts as crossing.
        assert!(evaluate(6999, 7000, 7000).crossed);
        // Starting exactly on the threshold does not.
        assert!(!evaluate(7000, 7500, 7000).crossed);
        // Still below: neither crossed nor qualified.
        let check = evaluate(1000, 6999, 7000);
        assert!(!check.crossed);
        assert!(!check.qualifies);
    }

    #[test]
    fn test_qualification_is_independent_of_crossing() {
        let check = evaluate(10_000, 10_500, 7000);
        assert!(!check.crossed);
        assert!(check.qualifies);
    }

    #[test]
    fn test_derived_goal_arithmetic() {
        let c = december();
        assert_eq!(c.weekly_goal(), 49_000);
        assert_eq!(c.raffle_threshold(), 29_400);
        assert_eq!(c.individual_goal(), 217_000);
        assert_eq!(c.grand_prize_threshold(), 151_900);
        assert_eq!(c.global_goal(), 2_170_000);
        assert_eq!(c.halfway_threshold(), 1_085_000);
    }

    #[test]
    fn test_week_bounds() {
        let c = december();
        assert_eq!(c.week_bounds(1), (d(2025, 12, 1), d(2025, 12, 7)));
        assert_eq!(c.week_bounds(2), (d(2025, 12, 8), d(2025, 12, 14)));
        assert_eq!(c.week_bounds(4), (d(2025, 12, 22), d(2025, 12, 28)));
    }

    #[test]
    fn test_week_of_clamps_to_challenge_weeks() {
        let c = december();
        assert_eq!(c.week_of(d(2025, 12, 1)), 1);
        assert_eq!(c.week_of(d(2025, 12, 7)), 1);
        assert_eq!(c.week_of(d(2025, 12, 8)), 2);
        // Day 29-31 fall past week 4 but clamp to it.
        assert_eq!(c.week_of(d(2025, 12, 31)), 4);
        // Out-of-window dates clamp rather than panic.
        assert_eq!(c.week_of(d(2025, 11, 15)), 1);
        assert_eq!(c.week_of(d(2026, 2, 1)), 4);
    }

    #[test]
    fn test_challenge_window() {
        let c = december();
        assert_eq!(c.end_date(), d(2025, 12, 31));
        assert!(c.in_window(d(2025, 12, 1)));
        assert!(c.in_window(d(2025, 12, 31)));
        assert!(!c.in_window(d(2025, 11, 30)));
        assert!(!c.in_window(d(2026, 1, 1)));
    }

    #[test]
    fn test_unknown_timezone_is_a_config_error() {
        let cfg = ChallengeConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..ChallengeConfig::default()
        };
        assert!(Challenge::from_config(&cfg).is_err());
    }
}
