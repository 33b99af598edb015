// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod codec;
pub mod handoff;
pub mod progress;

/// How much time the user intends to put into a goal.
/// Informs schedule generation only; stored as plain metadata.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Dedication {
    Casual,
    Moderate,
    Intense,
}

impl Dedication {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "casual" => Some(Dedication::Casual),
            "moderate" => Some(Dedication::Moderate),
            "intense" => Some(Dedication::Intense),
            _ => None,
        }
    }
}

/// The goal a schedule was authored for, denormalized onto every schedule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub goal_name: String,
    pub objective: String,
    // Day precision is enough for a deadline; no timezone needed.
    pub deadline: NaiveDate,
    pub dedication: Dedication,
    pub is_manual: bool,
}

/// A persisted schedule: goal metadata, the encoded day/task grid, and the
/// derived progress statistics.
///
/// Derivation attributes (derive):
/// - `Serialize`, `Deserialize`: Allows conversion to/from JSON.
/// - `Debug`: Enables displaying the structure for debugging.
/// - `Clone`: Allows creating copies of the object.
/// - `sqlx::FromRow`: Allows `sqlx` to create a `Schedule` instance directly
///   from a database result row.
///
/// `total_tasks` is fixed when the schedule is created, from the encoded
/// `schedule_data`. The progress grid is the source of truth for counts from
/// then on; `completed_tasks`, `progress_percentage` and `is_completed` are
/// recomputed through [`progress::aggregate`] on every progress update.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,

    pub owner: String,

    pub goal_name: String,

    pub objective: String,

    pub deadline: NaiveDate,

    pub dedication: Dedication,

    pub is_manual: bool,

    // Encoded day/task grid, see `codec`.
    pub schedule_data: String,

    pub total_tasks: i64,

    // Stored as a JSON TEXT column; outer index = day, inner = task.
    #[sqlx(json)]
    pub progress: Vec<Vec<bool>>,

    pub completed_tasks: i64,

    pub progress_percentage: i64,

    pub is_completed: bool,

    pub created_at: DateTime<Utc>,

    pub last_updated: DateTime<Utc>,
}

impl Schedule {
    /// The goal fields of this schedule, as one value.
    pub fn goal(&self) -> Goal {
        Goal {
            goal_name: self.goal_name.clone(),
            objective: self.objective.clone(),
            deadline: self.deadline,
            dedication: self.dedication,
            is_manual: self.is_manual,
        }
    }
}

/// Structure used to receive schedule creation data from the API.
/// API models are kept separate from the database model (`Schedule`): every
/// required field is an `Option` here so a missing field surfaces as a
/// validation failure at the boundary instead of a deserialization error.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedulePayload {
    pub goal_name: Option<String>,
    pub objective: Option<String>,
    pub deadline: Option<String>,
    pub dedication: Option<String>,
    #[serde(default)]
    pub is_manual: bool,
    pub schedule_data: Option<String>,
    // Clients send their own count; the server recomputes it from
    // `schedule_data` and stores the recomputed value.
    pub total_tasks: Option<i64>,
}

/// Structure used to receive a progress update from the API.
/// The grid arrives as a raw JSON value and is validated into `bool[][]`
/// by the handler.
#[derive(Deserialize, Debug)]
pub struct UpdateProgressPayload {
    pub progress: Option<serde_json::Value>,
}

/// Validated data for inserting a schedule, produced by the create handler
/// once the payload has passed all boundary checks.
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub goal: Goal,
    pub schedule_data: String,
    pub total_tasks: i64,
}
