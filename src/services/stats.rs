use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::daily_status::compute_status;
use super::recurrence::is_scheduled;
use super::HabitError;
use crate::models::habit::{CompletionType, Habit};
use crate::models::habit_log::HabitLog;
use crate::models::stats::{DayEntry, HabitStats};

/// Keys logs by day. When a day appears more than once, the log that comes
/// last in `logs` wins.
pub fn logs_by_day(logs: &[HabitLog]) -> BTreeMap<NaiveDate, &HabitLog> {
    let mut by_day = BTreeMap::new();
    for log in logs {
        by_day.insert(log.date, log);
    }
    by_day
}

/// Folds the full log history of `habit` into streaks, completion rate and
/// goal progress, counting days from `habit.start_date` through `today`.
pub fn compute_stats(
    habit: &Habit,
    logs: &[HabitLog],
    today: NaiveDate,
) -> Result<HabitStats, HabitError> {
    habit.validate()?;

    let by_day = logs_by_day(logs);
    let last_day = match habit.end_date {
        Some(end) if end < today => end,
        _ => today,
    };

    // Forward pass: best streak, completion rate
    let mut running_streak = 0u32;
    let mut best_streak = 0u32;
    let mut days_completed = 0u32;
    let mut scheduled_days = 0u32;

    for day in habit.start_date.iter_days().take_while(|d| *d <= last_day) {
        if is_scheduled(habit, day) {
            scheduled_days += 1;
            if compute_status(habit, by_day.get(&day).copied()).is_done() {
                running_streak += 1;
                days_completed += 1;
            } else {
                best_streak = best_streak.max(running_streak);
                running_streak = 0;
            }
        }
    }
    best_streak = best_streak.max(running_streak);

    // Backward pass: current streak ends at the first scheduled miss, today included
    let mut current_streak = 0u32;
    let mut cursor = Some(last_day);
    while let Some(day) = cursor.filter(|d| *d >= habit.start_date) {
        if is_scheduled(habit, day) {
            if !compute_status(habit, by_day.get(&day).copied()).is_done() {
                break;
            }
            current_streak += 1;
        }
        cursor = day.pred_opt();
    }

    let completion_rate = if scheduled_days > 0 {
        round_2dp(days_completed as f64 / scheduled_days as f64 * 100.0)
    } else {
        0.0
    };

    let stats = HabitStats {
        current_streak,
        best_streak,
        completion_rate,
        days_completed,
        scheduled_days,
        goal_progress: goal_progress(habit, logs, &by_day),
    };

    tracing::debug!(
        habit_id = %habit.id,
        %today,
        current_streak = stats.current_streak,
        best_streak = stats.best_streak,
        completion_rate = stats.completion_rate,
        "Computed habit stats"
    );

    Ok(stats)
}

/// Cumulative total over every logged day, scheduled or not. Checklist items
/// are summed over the raw logs, duplicates per day included.
fn goal_progress(habit: &Habit, logs: &[HabitLog], by_day: &BTreeMap<NaiveDate, &HabitLog>) -> f64 {
    match habit.completion_type {
        CompletionType::Count | CompletionType::Duration => {
            by_day.values().map(|log| log.value.unwrap_or(0.0)).sum()
        }
        CompletionType::Binary => by_day
            .values()
            .filter(|log| compute_status(habit, Some(**log)).is_done())
            .count() as f64,
        CompletionType::Checklist => logs
            .iter()
            .map(|log| log.completed_checklist_item_ids.len())
            .sum::<usize>() as f64,
    }
}

/// Per-day view over `[from, to]` for calendar rendering. Logged days get a
/// status even when they fall off-schedule.
pub fn day_history(
    habit: &Habit,
    logs: &[HabitLog],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DayEntry>, HabitError> {
    habit.validate()?;
    if from > to {
        return Err(HabitError::InvalidRange { from, to });
    }

    let by_day = logs_by_day(logs);
    let entries = from
        .iter_days()
        .take_while(|d| *d <= to)
        .map(|day| DayEntry {
            date: day,
            scheduled: is_scheduled(habit, day),
            status: compute_status(habit, by_day.get(&day).copied()),
        })
        .collect();
    Ok(entries)
}

/// Round half up to two decimal places.
fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
