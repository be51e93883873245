use crate::models::habit::{CompletionType, Habit, TargetComparison};
use crate::models::habit_log::HabitLog;
use crate::models::stats::{CompletionStatus, DailyStatus};

/// Grades a single day. Never fails: odd inputs degrade to `None`/`Partial`.
pub fn compute_status(habit: &Habit, log: Option<&HabitLog>) -> DailyStatus {
    let Some(log) = log else {
        return DailyStatus::NONE;
    };

    match habit.completion_type {
        CompletionType::Binary => DailyStatus::DONE,
        CompletionType::Count | CompletionType::Duration => {
            let value = log.value.unwrap_or(0.0);
            let target = habit.daily_target.unwrap_or(1.0);
            let comparison = habit.daily_target_comparison.unwrap_or_default();
            target_status(value, target, comparison)
        }
        CompletionType::Checklist => {
            checklist_status(log.completed_checklist_item_ids.len(), habit.checklist_item_count)
        }
    }
}

fn target_status(value: f64, target: f64, comparison: TargetComparison) -> DailyStatus {
    if value.is_nan() {
        return DailyStatus::NONE;
    }

    let is_complete = comparison.holds(value, target);
    if is_complete {
        return DailyStatus::DONE;
    }

    // Zero or negative targets divide as 1.
    let divisor = if target > 0.0 { target } else { 1.0 };
    let ratio = (value / divisor).clamp(0.0, 1.0);

    let progress = match comparison {
        TargetComparison::GreaterThan | TargetComparison::GreaterOrEqual => ratio,
        TargetComparison::LessThan | TargetComparison::LessOrEqual | TargetComparison::Equal => {
            if value > 0.0 {
                ratio
            } else {
                0.0
            }
        }
    };

    if value > 0.0 {
        DailyStatus {
            status: CompletionStatus::Partial,
            progress,
            is_complete: false,
        }
    } else {
        DailyStatus::NONE
    }
}

fn checklist_status(done: usize, total: i32) -> DailyStatus {
    if total <= 0 {
        return DailyStatus::NONE;
    }
    let total = total as usize;

    if done == total {
        DailyStatus::DONE
    } else if done > 0 {
        DailyStatus {
            status: CompletionStatus::Partial,
            progress: (done as f64 / total as f64).min(1.0),
            is_complete: false,
        }
    } else {
        DailyStatus::NONE
    }
}
