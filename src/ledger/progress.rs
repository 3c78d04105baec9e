//! Progress ledger: per-exercise attempt and completion records.
//!
//! Completion is monotonic: once an exercise is completed it never reverts,
//! and its `completed_at` / `xp_earned` are fixed at first completion.
//! Re-submitting still counts an attempt and may improve the best time.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{PROGRESS_KEY, Store, default_version, load_state, persist_state};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// One record per exercise id. The id itself is owned by the exercise
/// catalog and is not validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub exercise_id: u64,
    pub status: ExerciseStatus,
    pub attempts: u32,
    pub completed_at: Option<DateTime<Utc>>,
    pub best_execution_time_ms: Option<u64>,
    pub xp_earned: u32,
    pub saved_code: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl ExerciseProgress {
    fn fresh(exercise_id: u64, now: DateTime<Utc>) -> Self {
        Self {
            exercise_id,
            status: ExerciseStatus::InProgress,
            attempts: 0,
            completed_at: None,
            best_execution_time_ms: None,
            xp_earned: 0,
            saved_code: None,
            last_attempt_at: Some(now),
        }
    }
}

/// Aggregates derived from the per-exercise records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub total_completed: u32,
    pub total_attempts: u32,
    /// Mean of best execution times over completed exercises, 0 if none
    pub average_execution_time_ms: u64,
    /// Completed / touched, as an integer percent (0 if nothing touched)
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgressState {
    #[serde(default = "default_version")]
    version: u32,
    exercises: HashMap<u64, ExerciseProgress>,
    total_completed: u32,
    total_attempts: u32,
    total_xp_earned: u64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            version: default_version(),
            exercises: HashMap::new(),
            total_completed: 0,
            total_attempts: 0,
            total_xp_earned: 0,
        }
    }
}

/// Exercise progress with injected persistence. All operations are total:
/// unknown ids simply produce fresh records.
pub struct ProgressLedger {
    store: Arc<dyn Store>,
    state: ProgressState,
}

impl ProgressLedger {
    /// Create a ledger over `store`, loading any persisted state
    pub fn new(store: Arc<dyn Store>) -> Self {
        let state = load_state(store.as_ref(), PROGRESS_KEY);
        Self { store, state }
    }

    fn persist(&self) {
        persist_state(self.store.as_ref(), PROGRESS_KEY, &self.state);
    }

    /// Mark an exercise as started. Idempotent on completed exercises:
    /// their status is left untouched, only `last_attempt_at` refreshes.
    pub fn start_exercise(&mut self, exercise_id: u64) {
        self.start_exercise_at(exercise_id, Utc::now());
    }

    pub fn start_exercise_at(&mut self, exercise_id: u64, now: DateTime<Utc>) {
        let record = self
            .state
            .exercises
            .entry(exercise_id)
            .or_insert_with(|| ExerciseProgress::fresh(exercise_id, now));
        if record.status != ExerciseStatus::Completed {
            record.status = ExerciseStatus::InProgress;
        }
        record.last_attempt_at = Some(now);
        self.persist();
    }

    /// Record a successful submission evaluation.
    ///
    /// Always counts an attempt. On first completion the supplied XP is
    /// fixed on the record and added to the global totals; repeats leave
    /// `xp_earned`, `completed_at`, and the completed/XP totals unchanged
    /// but may still improve the best execution time.
    pub fn complete_exercise(
        &mut self,
        exercise_id: u64,
        xp_earned: u32,
        execution_time_ms: Option<u64>,
    ) {
        self.complete_exercise_at(exercise_id, xp_earned, execution_time_ms, Utc::now());
    }

    pub fn complete_exercise_at(
        &mut self,
        exercise_id: u64,
        xp_earned: u32,
        execution_time_ms: Option<u64>,
        now: DateTime<Utc>,
    ) {
        let record = self
            .state
            .exercises
            .entry(exercise_id)
            .or_insert_with(|| ExerciseProgress::fresh(exercise_id, now));
        let was_completed = record.status == ExerciseStatus::Completed;

        record.status = ExerciseStatus::Completed;
        record.attempts += 1;
        record.last_attempt_at = Some(now);
        if !was_completed {
            record.completed_at = Some(now);
            record.xp_earned = xp_earned;
        }
        record.best_execution_time_ms = match (record.best_execution_time_ms, execution_time_ms) {
            (Some(best), Some(new)) => Some(best.min(new)),
            (best, new) => new.or(best),
        };

        self.state.total_attempts += 1;
        if !was_completed {
            self.state.total_completed += 1;
            self.state.total_xp_earned += xp_earned as u64;
        }

        debug!(
            "Exercise {} completed (attempt {}, first: {})",
            exercise_id, record.attempts, !was_completed
        );
        self.persist();
    }

    /// Upsert the last-known editor contents for an exercise. Does not touch
    /// status or attempts. Callers are expected to debounce.
    pub fn save_code(&mut self, exercise_id: u64, code: &str) {
        self.save_code_at(exercise_id, code, Utc::now());
    }

    pub fn save_code_at(&mut self, exercise_id: u64, code: &str, now: DateTime<Utc>) {
        let record = self
            .state
            .exercises
            .entry(exercise_id)
            .or_insert_with(|| ExerciseProgress::fresh(exercise_id, now));
        record.saved_code = Some(code.to_string());
        record.last_attempt_at = Some(now);
        self.persist();
    }

    pub fn progress(&self, exercise_id: u64) -> Option<&ExerciseProgress> {
        self.state.exercises.get(&exercise_id)
    }

    pub fn completed_exercise_ids(&self) -> Vec<u64> {
        self.state
            .exercises
            .values()
            .filter(|p| p.status == ExerciseStatus::Completed)
            .map(|p| p.exercise_id)
            .collect()
    }

    /// Most recently touched exercises, newest first
    pub fn recent_exercises(&self, limit: usize) -> Vec<&ExerciseProgress> {
        let mut records: Vec<&ExerciseProgress> = self.state.exercises.values().collect();
        records.sort_by(|a, b| b.last_attempt_at.cmp(&a.last_attempt_at));
        records.truncate(limit);
        records
    }

    /// Aggregates derived from the records themselves
    pub fn stats(&self) -> ProgressStats {
        let records: Vec<&ExerciseProgress> = self.state.exercises.values().collect();
        let completed: Vec<&ExerciseProgress> = records
            .iter()
            .copied()
            .filter(|p| p.status == ExerciseStatus::Completed)
            .collect();

        let average_execution_time_ms = if completed.is_empty() {
            0
        } else {
            let sum: u64 = completed
                .iter()
                .map(|p| p.best_execution_time_ms.unwrap_or(0))
                .sum();
            ((sum as f64) / (completed.len() as f64)).round() as u64
        };

        let completion_rate = if records.is_empty() {
            0
        } else {
            ((completed.len() as f64 / records.len() as f64) * 100.0).round() as u32
        };

        ProgressStats {
            total_completed: completed.len() as u32,
            total_attempts: records.iter().map(|p| p.attempts).sum(),
            average_execution_time_ms,
            completion_rate,
        }
    }

    /// Lifetime completed counter (first completions only)
    pub fn total_completed(&self) -> u32 {
        self.state.total_completed
    }

    /// Lifetime attempt counter (every successful submission evaluation)
    pub fn total_attempts(&self) -> u32 {
        self.state.total_attempts
    }

    /// Lifetime XP awarded by first completions
    pub fn total_xp_earned(&self) -> u64 {
        self.state.total_xp_earned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn ledger() -> ProgressLedger {
        ProgressLedger::new(Arc::new(MemoryStore::new()))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_start_creates_in_progress_record() {
        let mut ledger = ledger();
        ledger.start_exercise(42);

        let record = ledger.progress(42).unwrap();
        assert_eq!(record.status, ExerciseStatus::InProgress);
        assert_eq!(record.attempts, 0);
        assert_eq!(record.xp_earned, 0);
        assert!(record.last_attempt_at.is_some());
    }

    #[test]
    fn test_start_does_not_regress_completed() {
        let mut ledger = ledger();
        ledger.complete_exercise(42, 15, Some(250));
        ledger.start_exercise(42);

        assert_eq!(ledger.progress(42).unwrap().status, ExerciseStatus::Completed);
    }

    #[test]
    fn test_idempotent_completion() {
        let mut ledger = ledger();
        ledger.complete_exercise_at(7, 20, Some(500), at(0));
        let first = ledger.progress(7).unwrap().clone();
        assert_eq!(ledger.total_completed(), 1);
        assert_eq!(ledger.total_xp_earned(), 20);

        ledger.complete_exercise_at(7, 99, Some(500), at(60));
        let second = ledger.progress(7).unwrap();

        assert_eq!(second.attempts, first.attempts + 1);
        assert_eq!(second.xp_earned, first.xp_earned);
        assert_eq!(second.completed_at, first.completed_at);
        assert_eq!(ledger.total_completed(), 1);
        assert_eq!(ledger.total_xp_earned(), 20);
        assert_eq!(ledger.total_attempts(), 2);
    }

    #[test]
    fn test_best_time_monotonicity() {
        let mut ledger = ledger();
        ledger.complete_exercise(7, 10, Some(500));
        assert_eq!(ledger.progress(7).unwrap().best_execution_time_ms, Some(500));

        ledger.complete_exercise(7, 10, Some(300));
        assert_eq!(ledger.progress(7).unwrap().best_execution_time_ms, Some(300));

        ledger.complete_exercise(7, 10, Some(800));
        assert_eq!(ledger.progress(7).unwrap().best_execution_time_ms, Some(300));

        // Missing time keeps the recorded best
        ledger.complete_exercise(7, 10, None);
        assert_eq!(ledger.progress(7).unwrap().best_execution_time_ms, Some(300));
    }

    #[test]
    fn test_save_code_does_not_touch_status() {
        let mut ledger = ledger();
        ledger.complete_exercise(3, 10, None);
        ledger.save_code(3, "fn main() {}");

        let record = ledger.progress(3).unwrap();
        assert_eq!(record.status, ExerciseStatus::Completed);
        assert_eq!(record.attempts, 1);
        assert_eq!(record.saved_code.as_deref(), Some("fn main() {}"));

        // Unknown id gets a fresh in-progress record
        ledger.save_code(4, "draft");
        assert_eq!(ledger.progress(4).unwrap().status, ExerciseStatus::InProgress);
    }

    #[test]
    fn test_recent_exercises_sorted_by_last_attempt() {
        let mut ledger = ledger();
        ledger.start_exercise_at(1, at(10));
        ledger.start_exercise_at(2, at(30));
        ledger.start_exercise_at(3, at(20));

        let recent: Vec<u64> = ledger
            .recent_exercises(2)
            .iter()
            .map(|p| p.exercise_id)
            .collect();
        assert_eq!(recent, vec![2, 3]);
    }

    #[test]
    fn test_stats() {
        let mut ledger = ledger();
        assert_eq!(ledger.stats().completion_rate, 0);
        assert_eq!(ledger.stats().average_execution_time_ms, 0);

        ledger.complete_exercise(1, 10, Some(200));
        ledger.complete_exercise(2, 10, Some(400));
        ledger.start_exercise(3);
        ledger.start_exercise(4);

        let stats = ledger.stats();
        assert_eq!(stats.total_completed, 2);
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.average_execution_time_ms, 300);
        assert_eq!(stats.completion_rate, 50);
    }

    #[test]
    fn test_completed_ids() {
        let mut ledger = ledger();
        ledger.complete_exercise(5, 10, None);
        ledger.start_exercise(6);

        let ids = ledger.completed_exercise_ids();
        assert_eq!(ids, vec![5]);
    }

    #[test]
    fn test_state_survives_reload() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

        let mut ledger = ProgressLedger::new(store.clone());
        ledger.complete_exercise(42, 15, Some(250));
        ledger.save_code(42, "let x = 1;");

        let reloaded = ProgressLedger::new(store);
        let record = reloaded.progress(42).unwrap();
        assert_eq!(record.status, ExerciseStatus::Completed);
        assert_eq!(record.xp_earned, 15);
        assert_eq!(record.saved_code.as_deref(), Some("let x = 1;"));
        assert_eq!(reloaded.total_completed(), 1);
    }
}
