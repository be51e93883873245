use chrono::{Datelike, Duration, NaiveDate};

use crate::models::habit::{Habit, Schedule};

/// Whether `date` is a scheduled day for `habit`.
pub fn is_scheduled(habit: &Habit, date: NaiveDate) -> bool {
    if !habit.is_active_on(date) {
        return false;
    }

    match &habit.schedule {
        Schedule::Daily => true,
        Schedule::SpecificDays { days_of_week } => {
            let dow = date.weekday().num_days_from_sunday() as u8;
            days_of_week.contains(&dow)
        }
        // Every in-range day counts; times_per_week is display-only.
        Schedule::Weekly { .. } => week_start(date) >= week_start(habit.start_date),
        // No short-month fallback: a start on the 31st skips 30-day months.
        Schedule::Monthly { .. } => date.day() == habit.start_date.day(),
    }
}

/// Sunday of the week containing `date`, clamped to `NaiveDate::MIN`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_sunday() as i64))
        .unwrap_or(NaiveDate::MIN)
}
