//! World clock
//!
//! The in-game calendar, the pause state and the accumulator that batches
//! updates of globally owned entities.

use serde::{Deserialize, Serialize};

use crate::data::CalendarConfig;

/// In-game date, stored as game seconds since the start of the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameDate {
    seconds: f64,
    #[serde(skip)]
    calendar: CalendarConfig,
}

impl GameDate {
    pub fn new(calendar: CalendarConfig) -> Self {
        Self {
            seconds: 0.0,
            calendar,
        }
    }

    pub fn from_seconds(seconds: f64, calendar: CalendarConfig) -> Self {
        Self {
            seconds: seconds.max(0.0),
            calendar,
        }
    }

    /// Move the date forward. Negative amounts are ignored.
    pub fn add_seconds(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.seconds += seconds;
        }
    }

    pub fn total_seconds(&self) -> f64 {
        self.seconds
    }

    pub fn total_hours(&self) -> f64 {
        self.seconds / 3600.0
    }

    fn total_days(&self) -> u64 {
        (self.total_hours() / self.calendar.hours_per_day as f64).floor() as u64
    }

    pub fn minute(&self) -> u32 {
        ((self.seconds / 60.0).floor() as u64 % 60) as u32
    }

    pub fn hour(&self) -> u32 {
        (self.total_hours().floor() as u64 % self.calendar.hours_per_day as u64) as u32
    }

    /// Day of the month, starting at 1
    pub fn day(&self) -> u32 {
        (self.total_days() % self.calendar.days_per_month as u64) as u32 + 1
    }

    /// Month of the year, starting at 1
    pub fn month(&self) -> u32 {
        let months = self.total_days() / self.calendar.days_per_month as u64;
        (months % self.calendar.months_per_year as u64) as u32 + 1
    }

    /// Year, starting at 1
    pub fn year(&self) -> u32 {
        let months = self.total_days() / self.calendar.days_per_month as u64;
        (months / self.calendar.months_per_year as u64) as u32 + 1
    }
}

impl std::fmt::Display for GameDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}, day {} of month {}, year {}",
            self.hour(),
            self.minute(),
            self.day(),
            self.month(),
            self.year()
        )
    }
}

/// Pause state and game time
#[derive(Debug, Clone)]
pub struct WorldClock {
    date: GameDate,
    paused: bool,
    paused_by_player: bool,
    /// The player explicitly unpaused; suppresses idle auto-pause
    unpaused_by_player: bool,
    /// Real seconds since globally owned entities last updated
    global_accumulator: f32,
}

impl WorldClock {
    pub fn new(calendar: CalendarConfig) -> Self {
        Self {
            date: GameDate::new(calendar),
            paused: false,
            paused_by_player: false,
            unpaused_by_player: false,
            global_accumulator: 0.0,
        }
    }

    pub fn date(&self) -> &GameDate {
        &self.date
    }

    pub fn date_mut(&mut self) -> &mut GameDate {
        &mut self.date
    }

    pub fn set_date(&mut self, date: GameDate) {
        self.date = date;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn paused_by_player(&self) -> bool {
        self.paused && self.paused_by_player
    }

    pub fn unpaused_by_player(&self) -> bool {
        self.unpaused_by_player
    }

    /// Pausing, for whatever reason, also clears the player's unpause
    pub fn pause(&mut self, by_player: bool) {
        self.paused = true;
        self.paused_by_player = by_player;
        self.unpaused_by_player = false;
    }

    pub fn unpause(&mut self, by_player: bool) {
        self.paused = false;
        self.paused_by_player = false;
        self.unpaused_by_player = by_player;
    }

    /// Advance the calendar by `delta` real seconds at `multiplier`
    pub fn advance(&mut self, delta: f32, multiplier: u32) {
        self.date.add_seconds(delta as f64 * multiplier as f64);
    }

    /// Accumulate real time; once more than `interval` has built up, return
    /// the whole accumulated amount and start over
    pub fn accumulate_global(&mut self, delta: f32, interval: f32) -> Option<f32> {
        self.global_accumulator += delta;
        if self.global_accumulator > interval {
            let accumulated = self.global_accumulator;
            self.global_accumulator = 0.0;
            Some(accumulated)
        } else {
            None
        }
    }
}
