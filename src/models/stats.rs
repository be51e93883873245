use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Done,
    Partial,
    None,
}

/// Completion verdict for one habit on one day.
///
/// `Done` always carries `progress == 1.0` and `is_complete == true`;
/// `None` always carries `progress == 0.0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailyStatus {
    pub status: CompletionStatus,
    pub progress: f64,
    pub is_complete: bool,
}

impl DailyStatus {
    pub const NONE: Self = Self {
        status: CompletionStatus::None,
        progress: 0.0,
        is_complete: false,
    };

    pub const DONE: Self = Self {
        status: CompletionStatus::Done,
        progress: 1.0,
        is_complete: true,
    };

    pub fn is_done(&self) -> bool {
        self.status == CompletionStatus::Done
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitStats {
    pub current_streak: u32,
    pub best_streak: u32,
    /// Percentage, rounded to two decimals
    pub completion_rate: f64,
    pub days_completed: u32,
    pub scheduled_days: u32,
    pub goal_progress: f64,
}

/// Single day in the calendar view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub scheduled: bool,
    #[serde(flatten)]
    pub status: DailyStatus,
}
