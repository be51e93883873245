use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::HabitError;

/// A habit definition as the engine sees it. Immutable for the duration of
/// a computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub completion_type: CompletionType,
    #[serde(default)]
    pub daily_target: Option<f64>,
    #[serde(default)]
    pub daily_target_comparison: Option<TargetComparison>,
    #[serde(default)]
    pub checklist_item_count: i32,
    pub schedule: Schedule,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Habit {
    /// Rejects definitions no day could ever satisfy.
    pub fn validate(&self) -> Result<(), HabitError> {
        match self.end_date {
            Some(end) if self.start_date > end => Err(HabitError::InvalidHabitDefinition {
                start: self.start_date,
                end,
            }),
            _ => Ok(()),
        }
    }

    /// Active date range check, shared by every schedule variant.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "completion_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompletionType {
    Binary,
    Count,
    Duration,
    Checklist,
}

impl Default for CompletionType {
    fn default() -> Self {
        Self::Binary
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "target_comparison", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TargetComparison {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Equal,
}

impl Default for TargetComparison {
    fn default() -> Self {
        Self::GreaterOrEqual
    }
}

impl TargetComparison {
    pub fn holds(self, value: f64, target: f64) -> bool {
        match self {
            Self::GreaterThan => value > target,
            Self::GreaterOrEqual => value >= target,
            Self::LessThan => value < target,
            Self::LessOrEqual => value <= target,
            Self::Equal => value == target,
        }
    }
}

/// Recurrence rule. Stored as JSONB, e.g. `{"type":"specific_days","days_of_week":[1,3,5]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    Daily,
    /// `times_per_week` is advisory only; it does not gate recurrence.
    Weekly { times_per_week: u32 },
    /// Matches the start date's day-of-month only.
    Monthly { times_per_month: u32 },
    /// 0 = Sunday .. 6 = Saturday
    SpecificDays { days_of_week: BTreeSet<u8> },
}

impl Default for Schedule {
    fn default() -> Self {
        Self::Daily
    }
}

/// Row in the `habits` table.
#[derive(Debug, Clone, FromRow)]
pub struct HabitRow {
    pub id: Uuid,
    pub name: String,
    pub completion_type: CompletionType,
    pub daily_target: Option<f64>,
    pub daily_target_comparison: Option<TargetComparison>,
    pub checklist_item_count: i32,
    pub schedule: sqlx::types::Json<Schedule>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HabitRow> for Habit {
    fn from(row: HabitRow) -> Self {
        Self {
            id: row.id,
            completion_type: row.completion_type,
            daily_target: row.daily_target,
            daily_target_comparison: row.daily_target_comparison,
            checklist_item_count: row.checklist_item_count,
            schedule: row.schedule.0,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_deserializes_specific_days() {
        let json = r#"{"type":"specific_days","days_of_week":[5,1,3]}"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(
            schedule,
            Schedule::SpecificDays {
                days_of_week: [1, 3, 5].into_iter().collect()
            }
        );
    }

    #[test]
    fn test_schedule_unknown_type_fails() {
        let result = serde_json::from_str::<Schedule>(r#"{"type":"yearly"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_habit_optional_fields_default() {
        let json = r#"{
            "id": "7f6c3c1e-2b1a-4d5e-9f00-000000000001",
            "completion_type": "count",
            "schedule": {"type": "daily"},
            "start_date": "2024-01-01"
        }"#;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.daily_target, None);
        assert_eq!(habit.daily_target_comparison, None);
        assert_eq!(habit.checklist_item_count, 0);
        assert_eq!(habit.end_date, None);
    }

    #[test]
    fn test_comparison_serializes_snake_case() {
        let json = serde_json::to_value(TargetComparison::GreaterOrEqual).unwrap();
        assert_eq!(json, "greater_or_equal");
    }

    #[test]
    fn test_validate_rejects_start_after_end() {
        let habit = Habit {
            id: Uuid::nil(),
            completion_type: CompletionType::Binary,
            daily_target: None,
            daily_target_comparison: None,
            checklist_item_count: 0,
            schedule: Schedule::Daily,
            start_date: date(2024, 2, 1),
            end_date: Some(date(2024, 1, 31)),
        };
        assert!(matches!(
            habit.validate(),
            Err(HabitError::InvalidHabitDefinition { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_single_day_range() {
        let habit = Habit {
            id: Uuid::nil(),
            completion_type: CompletionType::Binary,
            daily_target: None,
            daily_target_comparison: None,
            checklist_item_count: 0,
            schedule: Schedule::Daily,
            start_date: date(2024, 2, 1),
            end_date: Some(date(2024, 2, 1)),
        };
        assert!(habit.validate().is_ok());
    }
}
