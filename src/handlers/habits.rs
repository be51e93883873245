use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::evaluate::check_span;
use crate::models::habit::{CalendarQuery, DateQuery, Habit, HabitRow, StatsQuery};
use crate::models::habit_log::{HabitLog, HabitLogRow};
use crate::models::stats::{DailyStatus, DayEntry, HabitStats};
use crate::services::{compute_stats, compute_status, day_history, is_scheduled};
use crate::AppState;

const DEFAULT_CALENDAR_DAYS: i64 = 90;
const MAX_CALENDAR_DAYS: i64 = 366;

/// GET /api/habits — one entry per active habit with its status for `date`
#[derive(Debug, Serialize)]
pub struct HabitDueResponse {
    pub id: Uuid,
    pub name: String,
    pub is_due: bool,
    #[serde(flatten)]
    pub status: DailyStatus,
}

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<HabitDueResponse>>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let rows = sqlx::query_as::<_, HabitRow>(
        r#"
        SELECT * FROM habits
        WHERE is_archived = false
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let logs = sqlx::query_as::<_, HabitLogRow>(
        "SELECT * FROM habit_logs WHERE log_date = $1 ORDER BY created_at ASC",
    )
    .bind(date)
    .fetch_all(&state.db)
    .await?;
    let logs: Vec<HabitLog> = logs.into_iter().map(HabitLog::from).collect();
    let latest_by_habit = latest_log_per_habit(&logs);

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let name = row.name.clone();
        let habit = Habit::from(row);
        let log = latest_by_habit.get(&habit.id).copied();
        result.push(HabitDueResponse {
            id: habit.id,
            name,
            is_due: is_scheduled(&habit, date),
            status: compute_status(&habit, log),
        });
    }

    Ok(Json(result))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<HabitStats>> {
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    let habit = fetch_habit(&state.db, habit_id).await?;
    check_span(&habit, today)?;
    let logs = fetch_logs(&state.db, habit_id, None).await?;

    tracing::debug!(habit_id = %habit_id, log_count = logs.len(), %today, "Computing stats");
    let stats = compute_stats(&habit, &logs, today)?;

    Ok(Json(stats))
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<DayEntry>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let habit = fetch_habit(&state.db, habit_id).await?;
    habit.validate()?;
    let logs = fetch_logs(&state.db, habit_id, Some((date, date))).await?;

    Ok(Json(DayEntry {
        date,
        scheduled: is_scheduled(&habit, date),
        status: compute_status(&habit, logs.last()),
    }))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<DayEntry>>> {
    let (from, to) = calendar_range(query, Utc::now().date_naive())?;
    let habit = fetch_habit(&state.db, habit_id).await?;
    let logs = fetch_logs(&state.db, habit_id, Some((from, to))).await?;

    Ok(Json(day_history(&habit, &logs, from, to)?))
}

/// Last log per habit in input order.
fn latest_log_per_habit(logs: &[HabitLog]) -> HashMap<Uuid, &HabitLog> {
    let mut latest = HashMap::with_capacity(logs.len());
    for log in logs {
        latest.insert(log.habit_id, log);
    }
    latest
}

/// Resolves calendar bounds, defaulting to the last 90 days ending `today`.
fn calendar_range(query: CalendarQuery, today: NaiveDate) -> AppResult<(NaiveDate, NaiveDate)> {
    let to = query.to.unwrap_or(today);
    let from = query
        .from
        .unwrap_or_else(|| {
            to.checked_sub_signed(Duration::days(DEFAULT_CALENDAR_DAYS - 1))
                .unwrap_or(NaiveDate::MIN)
        });

    if from <= to && (to - from).num_days() >= MAX_CALENDAR_DAYS {
        return Err(AppError::Validation(format!(
            "Calendar range must be at most {} days",
            MAX_CALENDAR_DAYS
        )));
    }
    Ok((from, to))
}

pub(crate) async fn fetch_habit(db: &PgPool, habit_id: Uuid) -> AppResult<Habit> {
    let row = sqlx::query_as::<_, HabitRow>("SELECT * FROM habits WHERE id = $1")
        .bind(habit_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))?;

    Ok(row.into())
}

/// Logs ordered by day, then insertion time, so the engine's last-wins
/// tie-break picks the newest record.
pub(crate) async fn fetch_logs(
    db: &PgPool,
    habit_id: Uuid,
    range: Option<(NaiveDate, NaiveDate)>,
) -> AppResult<Vec<HabitLog>> {
    let rows = match range {
        Some((start, end)) => {
            sqlx::query_as::<_, HabitLogRow>(
                r#"
                SELECT * FROM habit_logs
                WHERE habit_id = $1 AND log_date BETWEEN $2 AND $3
                ORDER BY log_date ASC, created_at ASC
                "#,
            )
            .bind(habit_id)
            .bind(start)
            .bind(end)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, HabitLogRow>(
                r#"
                SELECT * FROM habit_logs
                WHERE habit_id = $1
                ORDER BY log_date ASC, created_at ASC
                "#,
            )
            .bind(habit_id)
            .fetch_all(db)
            .await?
        }
    };

    Ok(rows.into_iter().map(HabitLog::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_latest_log_per_habit_keeps_last() {
        let habit_a = Uuid::new_v4();
        let habit_b = Uuid::new_v4();
        let log = |habit_id: Uuid, value: f64| HabitLog {
            habit_id,
            date: date(2024, 1, 1),
            value: Some(value),
            completed_checklist_item_ids: Default::default(),
        };
        let logs = vec![log(habit_a, 1.0), log(habit_b, 2.0), log(habit_a, 3.0)];

        let latest = latest_log_per_habit(&logs);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[&habit_a].value, Some(3.0));
        assert_eq!(latest[&habit_b].value, Some(2.0));
    }

    #[test]
    fn test_calendar_range_defaults_to_90_days() {
        let query = CalendarQuery { from: None, to: None };
        let (from, to) = calendar_range(query, date(2024, 4, 1)).unwrap();
        assert_eq!(to, date(2024, 4, 1));
        assert_eq!((to - from).num_days(), 89);
    }

    #[test]
    fn test_calendar_range_default_clamps_at_min_date() {
        let query = CalendarQuery {
            from: None,
            to: Some(NaiveDate::MIN),
        };
        let (from, to) = calendar_range(query, date(2024, 4, 1)).unwrap();
        assert_eq!(from, NaiveDate::MIN);
        assert_eq!(to, NaiveDate::MIN);
    }

    #[test]
    fn test_calendar_range_rejects_over_a_year() {
        let query = CalendarQuery {
            from: Some(date(2023, 1, 1)),
            to: Some(date(2024, 1, 2)),
        };
        assert!(calendar_range(query, date(2024, 4, 1)).is_err());
    }

    #[test]
    fn test_calendar_range_keeps_inverted_bounds_for_engine() {
        let query = CalendarQuery {
            from: Some(date(2024, 2, 1)),
            to: Some(date(2024, 1, 1)),
        };
        let (from, to) = calendar_range(query, date(2024, 4, 1)).unwrap();
        assert!(from > to);
    }
}
