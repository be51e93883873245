use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One day's record for a habit. `date` is the day key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLog {
    pub habit_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub completed_checklist_item_ids: BTreeSet<Uuid>,
}

/// Row in the `habit_logs` table. Unique on `(habit_id, log_date)`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HabitLogRow {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub log_date: NaiveDate,
    pub value: Option<f64>,
    pub completed_checklist_item_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HabitLogRow> for HabitLog {
    fn from(row: HabitLogRow) -> Self {
        Self {
            habit_id: row.habit_id,
            date: row.log_date,
            value: row.value,
            completed_checklist_item_ids: row.completed_checklist_item_ids.into_iter().collect(),
        }
    }
}

/// PUT /api/habits/:id/logs
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertHabitLogRequest {
    /// Defaults to server-side today (UTC)
    pub date: Option<NaiveDate>,

    #[validate(range(min = 0.0, message = "Value must not be negative"))]
    pub value: Option<f64>,

    #[serde(default)]
    pub completed_checklist_item_ids: BTreeSet<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct HabitLogQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
