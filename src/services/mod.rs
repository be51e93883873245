//! # Habit recurrence and streak engine
//!
//! Three pure functions, no I/O and no clock:
//!
//! - [`recurrence::is_scheduled`] decides whether a habit is due on a day
//! - [`daily_status::compute_status`] grades one day's log
//! - [`stats::compute_stats`] folds the whole history into streaks, completion
//!   rate and goal progress
//!
//! Callers pass "today" explicitly. Every call works on its own snapshot, so
//! habits can be evaluated in parallel without coordination.

use chrono::NaiveDate;

pub mod daily_status;
pub mod recurrence;
pub mod stats;

pub use daily_status::compute_status;
pub use recurrence::is_scheduled;
pub use stats::{compute_stats, day_history, logs_by_day};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HabitError {
    #[error("Invalid habit definition: start date {start} is after end date {end}")]
    InvalidHabitDefinition { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
}
