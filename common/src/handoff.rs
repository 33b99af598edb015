// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::progress::{self, ProgressStats};
use crate::{Goal, Schedule};

/// The bundle handed from the authoring/listing views to the execution view
/// when a schedule is opened.
///
/// Both origins go through the same channel: a freshly authored draft (not
/// yet persisted, `schedule_id` is `None`) and a schedule reopened from the
/// list populate every field the same way, so the execution view behaves
/// identically regardless of where the bundle came from. It carries enough
/// to rebuild the full day/task grid with per-task completion state without
/// any further fetch.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleHandoff {
    pub goal: Goal,
    pub schedule_id: Option<i64>,
    pub schedule_data: String,
    pub progress: Vec<Vec<bool>>,
    pub completed_tasks: i64,
    pub progress_percentage: i64,
    pub is_completed: bool,
}

/// A task as the execution view renders it: its text and whether it has been
/// marked done.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackedTask {
    pub text: String,
    pub done: bool,
}

/// A decoded day with per-task completion state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackedDay {
    pub label: String,
    pub tasks: Vec<TrackedTask>,
}

impl ScheduleHandoff {
    /// Bundle for reopening a persisted schedule, carrying its stored
    /// progress snapshot forward as-is.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        ScheduleHandoff {
            goal: schedule.goal(),
            schedule_id: Some(schedule.id),
            schedule_data: schedule.schedule_data.clone(),
            progress: schedule.progress.clone(),
            completed_tasks: schedule.completed_tasks,
            progress_percentage: schedule.progress_percentage,
            is_completed: schedule.is_completed,
        }
    }

    /// Bundle for an authored-but-unpersisted schedule. The derived fields
    /// are computed from the given grid so the shape matches the persisted
    /// path exactly.
    pub fn draft(goal: Goal, schedule_data: String, progress: Vec<Vec<bool>>) -> Self {
        let ProgressStats {
            completed_tasks,
            progress_percentage,
            is_completed,
        } = progress::aggregate(&progress);

        ScheduleHandoff {
            goal,
            schedule_id: None,
            schedule_data,
            progress,
            completed_tasks,
            progress_percentage,
            is_completed,
        }
    }

    /// Reconstructs the day/task grid with per-task completion state from
    /// this bundle alone. Progress entries missing for a position (a grid
    /// that has not been updated yet, or a shorter day) default to
    /// not-completed.
    pub fn tracked_days(&self) -> Vec<TrackedDay> {
        codec::decode(&self.schedule_data)
            .into_iter()
            .enumerate()
            .map(|(day_idx, day)| {
                let flags = self.progress.get(day_idx);
                TrackedDay {
                    label: day.label,
                    tasks: day
                        .tasks
                        .into_iter()
                        .enumerate()
                        .map(|(task_idx, text)| TrackedTask {
                            text,
                            done: flags
                                .and_then(|day_flags| day_flags.get(task_idx))
                                .copied()
                                .unwrap_or(false),
                        })
                        .collect(),
                }
            })
            .collect()
    }
}
