//! Unlock tracking and threshold evaluation over the static catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{ACHIEVEMENTS_KEY, Store, default_version, load_state, persist_state};

use super::definitions::{ACHIEVEMENTS, AchievementDef, RequirementKind};

/// Stat snapshot the evaluator measures against. Built by the caller from
/// the progress and engagement ledgers, so there is a single source of
/// truth for each figure.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerStats {
    pub exercises_completed: u64,
    pub streak: u32,
    pub level: u32,
    pub xp: u64,
}

impl LedgerStats {
    fn measure(&self, kind: RequirementKind) -> Option<u64> {
        match kind {
            RequirementKind::ExercisesCompleted => Some(self.exercises_completed),
            RequirementKind::StreakDays => Some(self.streak as u64),
            RequirementKind::LevelReached => Some(self.level as u64),
            RequirementKind::XpEarned => Some(self.xp),
            RequirementKind::Special => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AchievementState {
    #[serde(default = "default_version")]
    version: u32,
    /// Achievement id -> unlock timestamp. Entries are never removed.
    unlocked: BTreeMap<String, DateTime<Utc>>,
}

impl Default for AchievementState {
    fn default() -> Self {
        Self {
            version: default_version(),
            unlocked: BTreeMap::new(),
        }
    }
}

/// Persistent unlock log over the static catalog.
///
/// Unlocks are one-way: an achievement transitions locked -> unlocked exactly
/// once and never re-locks, even if the measured stat later regresses.
pub struct AchievementLog {
    store: Arc<dyn Store>,
    state: AchievementState,
    recently_unlocked: Option<&'static AchievementDef>,
}

impl AchievementLog {
    /// Create a log over `store`, loading any persisted unlocks
    pub fn new(store: Arc<dyn Store>) -> Self {
        let state = load_state(store.as_ref(), ACHIEVEMENTS_KEY);
        Self {
            store,
            state,
            recently_unlocked: None,
        }
    }

    fn persist(&self) {
        persist_state(self.store.as_ref(), ACHIEVEMENTS_KEY, &self.state);
    }

    /// Evaluate the catalog against `stats` and unlock everything newly
    /// satisfied, in catalog order. Returns the newly unlocked definitions;
    /// the first one also lands in the `recently_unlocked` slot, which a
    /// check that unlocks nothing clears.
    pub fn check(&mut self, stats: &LedgerStats) -> Vec<&'static AchievementDef> {
        self.check_at(stats, Utc::now())
    }

    pub fn check_at(
        &mut self,
        stats: &LedgerStats,
        now: DateTime<Utc>,
    ) -> Vec<&'static AchievementDef> {
        let mut newly = Vec::new();
        for def in ACHIEVEMENTS {
            if self.state.unlocked.contains_key(def.id) {
                continue;
            }
            let Some(measured) = stats.measure(def.requirement.kind) else {
                continue;
            };
            if measured >= def.requirement.value {
                self.state.unlocked.insert(def.id.to_string(), now);
                debug!("Achievement unlocked: {}", def.id);
                newly.push(def);
            }
        }

        self.recently_unlocked = newly.first().copied();
        if !newly.is_empty() {
            self.persist();
        }
        newly
    }

    /// Unlock a `special`-requirement achievement by explicit trigger.
    /// Returns the definition if this call performed the unlock.
    pub fn unlock_special(&mut self, id: &str) -> Option<&'static AchievementDef> {
        self.unlock_special_at(id, Utc::now())
    }

    pub fn unlock_special_at(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Option<&'static AchievementDef> {
        let def = AchievementDef::get(id)?;
        if def.requirement.kind != RequirementKind::Special
            || self.state.unlocked.contains_key(def.id)
        {
            return None;
        }
        self.state.unlocked.insert(def.id.to_string(), now);
        debug!("Achievement unlocked: {}", def.id);
        self.recently_unlocked = Some(def);
        self.persist();
        Some(def)
    }

    /// The first achievement unlocked by the most recent check, until the
    /// next check or [`Self::clear_recent_unlock`]
    pub fn recently_unlocked(&self) -> Option<&'static AchievementDef> {
        self.recently_unlocked
    }

    pub fn clear_recent_unlock(&mut self) {
        self.recently_unlocked = None;
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.state.unlocked.contains_key(id)
    }

    pub fn unlocked_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.state.unlocked.get(id).copied()
    }

    pub fn unlocked_count(&self) -> usize {
        self.state.unlocked.len()
    }

    /// Progress towards an achievement as an integer percent. Unlocked
    /// achievements report 100; locked `special` ones report 0.
    pub fn progress(&self, id: &str, stats: &LedgerStats) -> u8 {
        let Some(def) = AchievementDef::get(id) else {
            return 0;
        };
        if self.is_unlocked(id) {
            return 100;
        }
        let Some(measured) = stats.measure(def.requirement.kind) else {
            return 0;
        };
        (measured.saturating_mul(100) / def.requirement.value).min(100) as u8
    }
}
