//! Report aggregation over a task snapshot.
//!
//! [`aggregate`] is a pure function: no storage access, no clock reads. The
//! same task sequence and `as_of` always produce an identical snapshot, so
//! the whole module tests without a database.

use crate::types::{AgeBuckets, ReportSnapshot, Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

const MS_PER_DAY: i64 = 86_400_000;

/// Compute the status/priority breakdowns, overdue count, age histogram and
/// completion rate for a user's task set at the instant `as_of`.
///
/// Tasks with no due date never count as overdue; that leniency extends to
/// stored dates that failed to parse (they surface here as `None`).
pub fn aggregate(tasks: &[Task], as_of: DateTime<Utc>) -> ReportSnapshot {
    let mut status_counts: HashMap<String, i64> = TaskStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut priority_counts: HashMap<String, i64> = TaskPriority::ALL
        .iter()
        .map(|p| (p.as_str().to_string(), 0))
        .collect();

    let today = as_of.date_naive();
    let as_of_ms = as_of.timestamp_millis();

    let mut overdue = 0i64;
    let mut completed = 0i64;
    let mut buckets = AgeBuckets::default();

    for task in tasks {
        *status_counts
            .entry(task.status.as_str().to_string())
            .or_insert(0) += 1;
        *priority_counts
            .entry(task.priority.as_str().to_string())
            .or_insert(0) += 1;

        if task.status == TaskStatus::Completed {
            completed += 1;
        }

        if let Some(due) = task.due_date {
            if due < today && task.status != TaskStatus::Completed {
                overdue += 1;
            }
        }

        let age_days = (as_of_ms - task.created_at).max(0) / MS_PER_DAY;
        match age_days {
            0..=7 => buckets.days_0_7 += 1,
            8..=30 => buckets.days_8_30 += 1,
            31..=90 => buckets.days_31_90 += 1,
            _ => buckets.days_over_90 += 1,
        }
    }

    let total = tasks.len() as i64;
    let completion_rate = if total == 0 {
        0.0
    } else {
        round1(completed as f64 / total as f64 * 100.0)
    };

    ReportSnapshot {
        total,
        status_counts,
        priority_counts,
        overdue,
        age_buckets: buckets,
        completion_rate,
    }
}

/// Round to one decimal place.
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn task(id: i64, status: TaskStatus) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: None,
            due_date: None,
            priority: TaskPriority::Medium,
            status,
            user_id: "u1".to_string(),
            created_at: as_of().timestamp_millis(),
            updated_at: as_of().timestamp_millis(),
        }
    }

    fn aged(id: i64, days: i64) -> Task {
        let mut t = task(id, TaskStatus::Todo);
        t.created_at = (as_of() - Duration::days(days)).timestamp_millis();
        t
    }

    #[test]
    fn empty_snapshot_is_all_zeros() {
        let snap = aggregate(&[], as_of());
        assert_eq!(snap.total, 0);
        assert_eq!(snap.completion_rate, 0.0);
        assert_eq!(snap.overdue, 0);
        assert_eq!(snap.status_counts["todo"], 0);
        assert_eq!(snap.status_counts["in_progress"], 0);
        assert_eq!(snap.status_counts["completed"], 0);
        assert_eq!(snap.priority_counts.len(), 4);
    }

    #[test]
    fn one_of_four_completed_is_25_percent() {
        let tasks = vec![
            task(1, TaskStatus::Completed),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::Todo),
            task(4, TaskStatus::InProgress),
        ];
        let snap = aggregate(&tasks, as_of());
        assert_eq!(snap.completion_rate, 25.0);
        assert_eq!(snap.status_counts["completed"], 1);
        assert_eq!(snap.status_counts["todo"], 2);
        assert_eq!(snap.status_counts["in_progress"], 1);
    }

    #[test]
    fn completion_rate_rounds_to_one_decimal() {
        let mut tasks = vec![task(1, TaskStatus::Completed)];
        tasks.push(task(2, TaskStatus::Todo));
        tasks.push(task(3, TaskStatus::Todo));
        // 1/3 -> 33.333... -> 33.3
        assert_eq!(aggregate(&tasks, as_of()).completion_rate, 33.3);
    }

    #[test]
    fn overdue_counts_past_due_incomplete_only() {
        let yesterday = as_of().date_naive() - Duration::days(1);
        let tomorrow = as_of().date_naive() + Duration::days(1);

        let mut past_todo = task(1, TaskStatus::Todo);
        past_todo.due_date = Some(yesterday);
        let mut past_done = task(2, TaskStatus::Completed);
        past_done.due_date = Some(yesterday);
        let mut future = task(3, TaskStatus::Todo);
        future.due_date = Some(tomorrow);
        let dateless = task(4, TaskStatus::Todo);

        let snap = aggregate(&[past_todo, past_done, future, dateless], as_of());
        assert_eq!(snap.overdue, 1);
    }

    #[test]
    fn due_today_is_not_overdue() {
        let mut t = task(1, TaskStatus::Todo);
        t.due_date = Some(as_of().date_naive());
        assert_eq!(aggregate(&[t], as_of()).overdue, 0);
    }

    #[test]
    fn age_bucket_boundaries() {
        let snap = aggregate(
            &[
                aged(1, 0),
                aged(2, 7),
                aged(3, 8),
                aged(4, 30),
                aged(5, 31),
                aged(6, 90),
                aged(7, 91),
                aged(8, 400),
            ],
            as_of(),
        );
        assert_eq!(
            snap.age_buckets,
            AgeBuckets {
                days_0_7: 2,
                days_8_30: 2,
                days_31_90: 2,
                days_over_90: 2,
            }
        );
    }

    #[test]
    fn future_created_task_counts_as_age_zero() {
        let mut t = task(1, TaskStatus::Todo);
        t.created_at = (as_of() + Duration::days(3)).timestamp_millis();
        let snap = aggregate(&[t], as_of());
        assert_eq!(snap.age_buckets.days_0_7, 1);
    }

    #[test]
    fn snapshot_serializes_for_downstream_formatters() {
        let tasks = vec![
            task(1, TaskStatus::Completed),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::Todo),
            task(4, TaskStatus::InProgress),
        ];
        let snap = aggregate(&tasks, as_of());

        let json = serde_json::to_value(&snap).expect("snapshot should serialize");
        assert_eq!(json["total"], 4);
        assert_eq!(json["completion_rate"], 25.0);
        assert_eq!(json["status_counts"]["completed"], 1);
        assert_eq!(json["priority_counts"]["medium"], 4);
        assert_eq!(json["age_buckets"]["days_0_7"], 4);

        let back: ReportSnapshot =
            serde_json::from_value(json).expect("snapshot should deserialize");
        assert_eq!(back, snap);
    }

    #[test]
    fn aggregate_is_deterministic() {
        let tasks = vec![
            aged(1, 3),
            aged(2, 12),
            task(3, TaskStatus::Completed),
            {
                let mut t = task(4, TaskStatus::InProgress);
                t.due_date = NaiveDate::from_ymd_opt(2024, 6, 1);
                t
            },
        ];
        let first = aggregate(&tasks, as_of());
        let second = aggregate(&tasks, as_of());
        assert_eq!(first, second);
    }
}
