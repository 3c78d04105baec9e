//! Submission pipeline over the three ledgers.
//!
//! A successful submission is applied in a fixed order: progress update,
//! XP award, streak update, achievement check, then level comparison. XP
//! must land and achievements be checked before the level is compared,
//! otherwise a level-up can be missed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Timelike, Utc};
use tracing::debug;

use crate::exec::SubmitOutcome;
use crate::ledger::{
    AchievementDef, AchievementLog, EngagementLedger, LedgerStats, ProgressLedger,
};
use crate::notify::NotificationCenter;
use crate::store::Store;

/// Editor saves are applied after this much input inactivity
const SAVE_DEBOUNCE_MS: i64 = 1000;

/// What a submission caused, in occurrence order
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    XpAwarded {
        amount: u32,
    },
    StreakExtended {
        days: u32,
    },
    AchievementUnlocked {
        achievement: &'static AchievementDef,
        unlocked_at: DateTime<Utc>,
    },
    LevelUp {
        old_level: u32,
        new_level: u32,
    },
}

/// Wall-clock inputs for one submission: UTC instant for timestamps, local
/// calendar day for the streak, local hour for time-of-day achievements
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    pub hour: u32,
}

impl LocalClock {
    pub fn current() -> Self {
        let local = Local::now();
        Self {
            now: Utc::now(),
            today: local.date_naive(),
            hour: local.hour(),
        }
    }
}

struct PendingSave {
    code: String,
    edited_at: DateTime<Utc>,
}

/// A learner's session: the three ledgers and the notification feed over
/// one shared store
pub struct Session {
    pub progress: ProgressLedger,
    pub engagement: EngagementLedger,
    pub achievements: AchievementLog,
    pub notifications: NotificationCenter,
    pending_saves: HashMap<u64, PendingSave>,
}

impl Session {
    /// Create a session over `store`, loading any persisted ledger state
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            progress: ProgressLedger::new(store.clone()),
            engagement: EngagementLedger::new(store.clone()),
            achievements: AchievementLog::new(store.clone()),
            notifications: NotificationCenter::new(store),
            pending_saves: HashMap::new(),
        }
    }

    /// Ephemeral session for tests and previews
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::store::MemoryStore::new()))
    }

    /// Stat snapshot for achievement checks, built from the ledgers so each
    /// figure has a single source of truth
    pub fn ledger_stats(&self) -> LedgerStats {
        LedgerStats {
            exercises_completed: self.progress.total_completed() as u64,
            streak: self.engagement.streak(),
            level: self.engagement.level(),
            xp: self.engagement.xp(),
        }
    }

    /// Apply a submission outcome to the ledgers.
    ///
    /// Failed submissions leave everything untouched; the execution service
    /// already decided success. With XP disabled, completion is still
    /// tracked (at zero XP) but engagement and notifications stay quiet.
    pub fn record_submission(&mut self, exercise_id: u64, outcome: &SubmitOutcome) -> Vec<LedgerEvent> {
        self.record_submission_at(exercise_id, outcome, &LocalClock::current())
    }

    pub fn record_submission_at(
        &mut self,
        exercise_id: u64,
        outcome: &SubmitOutcome,
        clock: &LocalClock,
    ) -> Vec<LedgerEvent> {
        if !outcome.success {
            return Vec::new();
        }

        let mut events = Vec::new();
        let xp_enabled = self.engagement.settings().xp_enabled;
        let xp = if xp_enabled { outcome.xp_earned } else { 0 };
        let old_level = self.engagement.level();

        self.progress
            .complete_exercise_at(exercise_id, xp, outcome.execution_time_ms, clock.now);

        if !xp_enabled {
            return events;
        }

        self.engagement.add_xp(xp);
        events.push(LedgerEvent::XpAwarded { amount: xp });

        if let Some(days) = self.engagement.increment_streak_on(clock.today) {
            events.push(LedgerEvent::StreakExtended { days });
        }

        let stats = self.ledger_stats();
        let mut newly = self.achievements.check_at(&stats, clock.now);
        if clock.hour < 5 {
            newly.extend(self.achievements.unlock_special_at("night_owl", clock.now));
        } else if clock.hour < 6 {
            newly.extend(self.achievements.unlock_special_at("early_bird", clock.now));
        }

        for def in newly {
            self.notifications.push_achievement(def.name, def.icon);
            events.push(LedgerEvent::AchievementUnlocked {
                achievement: def,
                unlocked_at: self.achievements.unlocked_at(def.id).unwrap_or(clock.now),
            });
        }

        let new_level = self.engagement.level();
        if new_level > old_level {
            self.notifications.push_level_up(new_level);
            events.push(LedgerEvent::LevelUp {
                old_level,
                new_level,
            });
        }

        debug!(
            "Submission for exercise {} produced {} event(s)",
            exercise_id,
            events.len()
        );
        events
    }

    /// Buffer the latest editor contents for an exercise. The write happens
    /// on flush, once the edit has been idle for the debounce window.
    pub fn note_code_edit(&mut self, exercise_id: u64, code: &str) {
        self.note_code_edit_at(exercise_id, code, Utc::now());
    }

    pub fn note_code_edit_at(&mut self, exercise_id: u64, code: &str, now: DateTime<Utc>) {
        self.pending_saves.insert(
            exercise_id,
            PendingSave {
                code: code.to_string(),
                edited_at: now,
            },
        );
    }

    /// Write buffered edits idle for at least the debounce window. Returns
    /// the number of exercises saved.
    pub fn flush_pending_saves(&mut self) -> usize {
        self.flush_pending_saves_at(Utc::now())
    }

    pub fn flush_pending_saves_at(&mut self, now: DateTime<Utc>) -> usize {
        let due: Vec<u64> = self
            .pending_saves
            .iter()
            .filter(|(_, p)| (now - p.edited_at).num_milliseconds() >= SAVE_DEBOUNCE_MS)
            .map(|(id, _)| *id)
            .collect();
        for id in &due {
            if let Some(pending) = self.pending_saves.remove(id) {
                self.progress.save_code_at(*id, &pending.code, now);
            }
        }
        due.len()
    }

    /// Write all buffered edits immediately (e.g. on shutdown)
    pub fn flush_all_saves(&mut self) {
        let now = Utc::now();
        for (id, pending) in self.pending_saves.drain() {
            self.progress.save_code_at(id, &pending.code, now);
        }
    }
}
