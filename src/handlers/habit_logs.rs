use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::habits::fetch_habit;
use crate::models::habit::{CompletionType, Habit};
use crate::models::habit_log::{HabitLogQuery, HabitLogRow, UpsertHabitLogRequest};
use crate::AppState;

pub async fn upsert_habit_log(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<UpsertHabitLogRequest>,
) -> AppResult<Json<HabitLogRow>> {
    body.validate()?;
    let habit = fetch_habit(&state.db, habit_id).await?;
    check_log_fits(&habit, &body)?;

    let log_date = body.date.unwrap_or_else(|| Utc::now().date_naive());
    let item_ids: Vec<Uuid> = body.completed_checklist_item_ids.into_iter().collect();

    // One authoritative log per (habit, day)
    let log = sqlx::query_as::<_, HabitLogRow>(
        r#"
        INSERT INTO habit_logs (id, habit_id, log_date, value, completed_checklist_item_ids)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (habit_id, log_date) DO UPDATE SET
            value = EXCLUDED.value,
            completed_checklist_item_ids = EXCLUDED.completed_checklist_item_ids,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(habit_id)
    .bind(log_date)
    .bind(body.value)
    .bind(&item_ids)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(habit_id = %habit_id, %log_date, "Habit log upserted");

    Ok(Json(log))
}

pub async fn list_habit_logs(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<HabitLogQuery>,
) -> AppResult<Json<Vec<HabitLogRow>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let logs = sqlx::query_as::<_, HabitLogRow>(
        r#"
        SELECT * FROM habit_logs
        WHERE habit_id = $1 AND log_date BETWEEN $2 AND $3
        ORDER BY log_date DESC
        "#,
    )
    .bind(habit_id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(logs))
}

/// Checklist ids only make sense on checklist habits.
fn check_log_fits(habit: &Habit, body: &UpsertHabitLogRequest) -> AppResult<()> {
    if habit.completion_type != CompletionType::Checklist
        && !body.completed_checklist_item_ids.is_empty()
    {
        return Err(AppError::Validation(
            "completed_checklist_item_ids is only accepted for checklist habits".into(),
        ));
    }
    Ok(())
}
