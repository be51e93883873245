//! Stateless evaluation: the caller supplies the habit, its logs and the
//! reference date. Nothing is read from or written to the database.

use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::habit::Habit;
use crate::models::habit_log::HabitLog;
use crate::models::stats::{DayEntry, HabitStats};
use crate::services::{compute_stats, compute_status, is_scheduled};

/// Longest start-to-today walk accepted from callers (about a century).
const MAX_EVALUATE_DAYS: i64 = 36_525;

/// POST /api/evaluate/stats
#[derive(Debug, Deserialize)]
pub struct EvaluateStatsRequest {
    pub habit: Habit,
    #[serde(default)]
    pub logs: Vec<HabitLog>,
    pub today: NaiveDate,
}

/// POST /api/evaluate/status
#[derive(Debug, Deserialize)]
pub struct EvaluateStatusRequest {
    pub habit: Habit,
    pub log: Option<HabitLog>,
    pub date: NaiveDate,
}

pub async fn evaluate_stats(Json(body): Json<EvaluateStatsRequest>) -> AppResult<Json<HabitStats>> {
    check_span(&body.habit, body.today)?;
    let stats = compute_stats(&body.habit, &body.logs, body.today)?;
    Ok(Json(stats))
}

pub async fn evaluate_status(Json(body): Json<EvaluateStatusRequest>) -> AppResult<Json<DayEntry>> {
    body.habit.validate()?;
    if let Some(log) = &body.log {
        check_log_matches(&body.habit, log, body.date)?;
    }

    Ok(Json(DayEntry {
        date: body.date,
        scheduled: is_scheduled(&body.habit, body.date),
        status: compute_status(&body.habit, body.log.as_ref()),
    }))
}

pub(crate) fn check_span(habit: &Habit, today: NaiveDate) -> AppResult<()> {
    let span = today.signed_duration_since(habit.start_date).num_days();
    if span > MAX_EVALUATE_DAYS {
        return Err(AppError::Validation(format!(
            "start_date to today must span at most {} days",
            MAX_EVALUATE_DAYS
        )));
    }
    Ok(())
}

fn check_log_matches(habit: &Habit, log: &HabitLog, date: NaiveDate) -> AppResult<()> {
    if log.habit_id != habit.id {
        return Err(AppError::Validation(format!(
            "Log belongs to habit {}, not {}",
            log.habit_id, habit.id
        )));
    }
    if log.date != date {
        return Err(AppError::Validation(format!(
            "Log date {} does not match requested date {}",
            log.date, date
        )));
    }
    Ok(())
}
