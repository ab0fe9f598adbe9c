//! Training analytics over completed sessions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::session::WorkoutSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrainingStat {
    /// ISO week, formatted `YYYY-Www`.
    pub week_key: String,
    pub days_trained: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseVolumeStat {
    pub exercise_name: String,
    pub total_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePrStat {
    pub exercise_name: String,
    pub max_weight_kg: Option<f64>,
    /// Best reps logged at the heaviest weight, as `(weight_kg, reps)`.
    pub best_reps_at_weight: Option<(f64, u32)>,
}

/// Distinct training days per ISO week, newest week first.
pub fn weekly_training_stats(sessions: &[WorkoutSession]) -> Vec<WeeklyTrainingStat> {
    let mut per_week: BTreeMap<String, BTreeSet<NaiveDate>> = BTreeMap::new();
    for session in sessions {
        let day = session.started_at.date_naive();
        per_week.entry(iso_week_key(day)).or_default().insert(day);
    }

    per_week
        .into_iter()
        .rev()
        .map(|(week_key, days)| WeeklyTrainingStat {
            week_key,
            days_trained: days.len(),
        })
        .collect()
}

/// Total `reps x weight` per exercise, largest first.
///
/// Actual values fall back to targets; sets without positive volume are
/// skipped.
pub fn exercise_volume_stats(sessions: &[WorkoutSession]) -> Vec<ExerciseVolumeStat> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for log in sessions.iter().flat_map(|s| &s.set_logs) {
        let volume = f64::from(log.effective_reps()) * log.effective_weight_kg().unwrap_or(0.0);
        if !volume.is_finite() || volume <= 0.0 {
            continue;
        }
        *totals.entry(log.exercise_name.as_str()).or_insert(0.0) += volume;
    }

    let mut stats: Vec<ExerciseVolumeStat> = totals
        .into_iter()
        .map(|(name, total_volume)| ExerciseVolumeStat {
            exercise_name: name.to_string(),
            total_volume,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.total_volume
            .total_cmp(&a.total_volume)
            .then_with(|| a.exercise_name.cmp(&b.exercise_name))
    });
    stats
}

/// Personal records per exercise, sorted by exercise name.
pub fn exercise_pr_stats(sessions: &[WorkoutSession]) -> Vec<ExercisePrStat> {
    let mut groups: BTreeMap<&str, Vec<(f64, u32)>> = BTreeMap::new();
    for log in sessions.iter().flat_map(|s| &s.set_logs) {
        let entry = groups.entry(log.exercise_name.as_str()).or_default();
        if let Some(weight) = log.effective_weight_kg() {
            entry.push((weight, log.effective_reps()));
        }
    }

    groups
        .into_iter()
        .map(|(name, lifts)| {
            let best = lifts.iter().copied().max_by(|a, b| {
                a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1))
            });
            ExercisePrStat {
                exercise_name: name.to_string(),
                max_weight_kg: best.map(|(weight, _)| weight),
                best_reps_at_weight: best,
            }
        })
        .collect()
}

fn iso_week_key(day: NaiveDate) -> String {
    let week = day.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SetType;
    use crate::session::SessionSetLog;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn log(name: &str, reps: Option<u32>, weight: Option<f64>) -> SessionSetLog {
        SessionSetLog {
            exercise_id: name.to_lowercase(),
            exercise_name: name.to_string(),
            set_id: uuid::Uuid::new_v4().to_string(),
            set_order: 1,
            set_type: SetType::Working,
            target_reps: 10,
            target_weight_kg: None,
            actual_reps: reps,
            actual_weight_kg: weight,
            actual_rpe: None,
            actual_rir: None,
            actual_tempo: None,
            notes: None,
            completed_at: Utc::now(),
        }
    }

    fn session(started_at: DateTime<Utc>, logs: Vec<SessionSetLog>) -> WorkoutSession {
        WorkoutSession::assemble("s", "p", "Push", started_at, started_at + Duration::hours(1), logs)
    }

    #[test]
    fn test_weekly_stats_count_distinct_days() {
        // 2025-01-01 is a Wednesday in ISO week 2025-W01.
        let wed = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let sessions = vec![
            session(wed, vec![]),
            session(wed + Duration::hours(9), vec![]),
            session(wed + Duration::days(1), vec![]),
            session(wed + Duration::days(7), vec![]),
            // 2024-12-29 is a Sunday, still ISO week 2024-W52.
            session(Utc.with_ymd_and_hms(2024, 12, 29, 8, 0, 0).unwrap(), vec![]),
        ];
        let stats = weekly_training_stats(&sessions);
        let keys: Vec<(&str, usize)> = stats.iter().map(|s| (s.week_key.as_str(), s.days_trained)).collect();
        assert_eq!(keys, vec![("2025-W02", 1), ("2025-W01", 2), ("2024-W52", 1)]);
    }

    #[test]
    fn test_volume_skips_bodyweight_and_sorts_descending() {
        let now = Utc::now();
        let sessions = vec![session(
            now,
            vec![
                log("Bench", Some(10), Some(60.0)),
                log("Bench", None, Some(60.0)),
                log("Curl", Some(12), Some(10.0)),
                log("Pull-up", Some(8), None),
            ],
        )];
        let stats = exercise_volume_stats(&sessions);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].exercise_name, "Bench");
        assert_eq!(stats[0].total_volume, 1200.0);
        assert_eq!(stats[1].total_volume, 120.0);
    }

    #[test]
    fn test_prs_pick_best_reps_at_heaviest_weight() {
        let now = Utc::now();
        let sessions = vec![session(
            now,
            vec![
                log("Squat", Some(5), Some(100.0)),
                log("Squat", Some(3), Some(110.0)),
                log("Squat", Some(4), Some(110.0)),
                log("Squat", Some(12), Some(80.0)),
                log("Dips", Some(10), None),
            ],
        )];
        let stats = exercise_pr_stats(&sessions);
        assert_eq!(stats[0].exercise_name, "Dips");
        assert_eq!(stats[0].max_weight_kg, None);
        assert_eq!(stats[1].max_weight_kg, Some(110.0));
        assert_eq!(stats[1].best_reps_at_weight, Some((110.0, 4)));
    }
}
