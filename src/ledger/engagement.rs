//! Engagement ledger: XP, daily streak, and feature toggles.
//!
//! XP only ever increases; the level is derived from it (see
//! [`super::level`]). The streak counts consecutive calendar days with at
//! least one streak-incrementing action, at local-day granularity.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{ENGAGEMENT_KEY, Store, default_version, load_state, persist_state};

use super::level::level_for_xp;

/// Independent feature toggles. They gate whether callers act on XP and
/// streak changes; the ledger itself does not consult them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementSettings {
    pub xp_enabled: bool,
    pub streak_enabled: bool,
    pub sounds_enabled: bool,
    pub animations_enabled: bool,
    pub focus_timer_enabled: bool,
    pub brainrot_mode: bool,
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self {
            xp_enabled: true,
            streak_enabled: true,
            sounds_enabled: false,
            animations_enabled: true,
            focus_timer_enabled: true,
            brainrot_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngagementState {
    #[serde(default = "default_version")]
    version: u32,
    xp: u64,
    streak: u32,
    last_active_date: Option<NaiveDate>,
    focus_sessions_completed: u32,
    #[serde(flatten)]
    settings: EngagementSettings,
}

impl Default for EngagementState {
    fn default() -> Self {
        Self {
            version: default_version(),
            xp: 0,
            streak: 0,
            last_active_date: None,
            focus_sessions_completed: 0,
            settings: EngagementSettings::default(),
        }
    }
}

/// Process-wide engagement state with injected persistence
pub struct EngagementLedger {
    store: Arc<dyn Store>,
    state: EngagementState,
}

impl EngagementLedger {
    /// Create a ledger over `store`, loading any persisted state
    pub fn new(store: Arc<dyn Store>) -> Self {
        let state = load_state(store.as_ref(), ENGAGEMENT_KEY);
        Self { store, state }
    }

    fn persist(&self) {
        persist_state(self.store.as_ref(), ENGAGEMENT_KEY, &self.state);
    }

    /// Add XP to the accumulator. Zero is accepted and persisted as-is.
    pub fn add_xp(&mut self, amount: u32) {
        self.state.xp += amount as u64;
        debug!("Added {} XP (total {})", amount, self.state.xp);
        self.persist();
    }

    /// Extend the daily streak for today (local calendar day).
    ///
    /// Same-day repeats are no-ops; a gap of two or more days resets the
    /// streak to 1. Returns the streak count if this call counted a new day.
    pub fn increment_streak(&mut self) -> Option<u32> {
        self.increment_streak_on(Local::now().date_naive())
    }

    /// Streak update with an explicit "today", for callers that control the
    /// clock
    pub fn increment_streak_on(&mut self, today: NaiveDate) -> Option<u32> {
        if self.state.last_active_date == Some(today) {
            return None;
        }

        self.state.streak = if self.state.last_active_date == today.pred_opt() {
            self.state.streak + 1
        } else {
            1
        };
        self.state.last_active_date = Some(today);
        debug!("Streak now {} days", self.state.streak);
        self.persist();
        Some(self.state.streak)
    }

    /// Administrative reset. Not invoked by the streak-continuity logic.
    pub fn reset_streak(&mut self) {
        self.state.streak = 0;
        self.persist();
    }

    pub fn complete_focus_session(&mut self) {
        self.state.focus_sessions_completed += 1;
        self.persist();
    }

    /// Current level, derived from XP
    pub fn level(&self) -> u32 {
        level_for_xp(self.state.xp)
    }

    pub fn xp(&self) -> u64 {
        self.state.xp
    }

    pub fn streak(&self) -> u32 {
        self.state.streak
    }

    pub fn last_active_date(&self) -> Option<NaiveDate> {
        self.state.last_active_date
    }

    pub fn focus_sessions_completed(&self) -> u32 {
        self.state.focus_sessions_completed
    }

    pub fn settings(&self) -> &EngagementSettings {
        &self.state.settings
    }

    pub fn set_xp_enabled(&mut self, enabled: bool) {
        self.state.settings.xp_enabled = enabled;
        self.persist();
    }

    pub fn set_streak_enabled(&mut self, enabled: bool) {
        self.state.settings.streak_enabled = enabled;
        self.persist();
    }

    pub fn set_sounds_enabled(&mut self, enabled: bool) {
        self.state.settings.sounds_enabled = enabled;
        self.persist();
    }

    pub fn set_animations_enabled(&mut self, enabled: bool) {
        self.state.settings.animations_enabled = enabled;
        self.persist();
    }

    pub fn set_focus_timer_enabled(&mut self, enabled: bool) {
        self.state.settings.focus_timer_enabled = enabled;
        self.persist();
    }

    pub fn set_brainrot_mode(&mut self, enabled: bool) {
        self.state.settings.brainrot_mode = enabled;
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ledger() -> EngagementLedger {
        EngagementLedger::new(Arc::new(MemoryStore::new()))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_streak_continuity() {
        let mut ledger = ledger();

        assert_eq!(ledger.increment_streak_on(day(2024, 1, 1)), Some(1));
        assert_eq!(ledger.increment_streak_on(day(2024, 1, 2)), Some(2));

        // Same-day repeat is a no-op
        assert_eq!(ledger.increment_streak_on(day(2024, 1, 2)), None);
        assert_eq!(ledger.streak(), 2);

        // A gap resets to 1
        assert_eq!(ledger.increment_streak_on(day(2024, 1, 10)), Some(1));
        assert_eq!(ledger.streak(), 1);
        assert_eq!(ledger.last_active_date(), Some(day(2024, 1, 10)));
    }

    #[test]
    fn test_first_ever_activity_starts_at_one() {
        let mut ledger = ledger();
        assert_eq!(ledger.streak(), 0);
        assert_eq!(ledger.increment_streak_on(day(2024, 6, 15)), Some(1));
    }

    #[test]
    fn test_reset_streak_keeps_last_active_date() {
        let mut ledger = ledger();
        ledger.increment_streak_on(day(2024, 1, 1));
        ledger.reset_streak();
        assert_eq!(ledger.streak(), 0);
        assert_eq!(ledger.last_active_date(), Some(day(2024, 1, 1)));
    }

    #[test]
    fn test_xp_accumulates_and_derives_level() {
        let mut ledger = ledger();
        assert_eq!(ledger.level(), 1);

        ledger.add_xp(99);
        assert_eq!(ledger.level(), 1);

        ledger.add_xp(1);
        assert_eq!(ledger.xp(), 100);
        assert_eq!(ledger.level(), 2);

        ledger.add_xp(300);
        assert_eq!(ledger.level(), 3);
    }

    #[test]
    fn test_toggles_are_independent() {
        let mut ledger = ledger();
        assert!(ledger.settings().xp_enabled);
        assert!(!ledger.settings().sounds_enabled);

        ledger.set_sounds_enabled(true);
        ledger.set_xp_enabled(false);
        assert!(ledger.settings().sounds_enabled);
        assert!(!ledger.settings().xp_enabled);
        assert!(ledger.settings().streak_enabled);
    }

    #[test]
    fn test_state_survives_reload() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

        let mut ledger = EngagementLedger::new(store.clone());
        ledger.add_xp(250);
        ledger.increment_streak_on(day(2024, 3, 3));
        ledger.complete_focus_session();
        ledger.set_brainrot_mode(true);

        let reloaded = EngagementLedger::new(store);
        assert_eq!(reloaded.xp(), 250);
        assert_eq!(reloaded.streak(), 1);
        assert_eq!(reloaded.last_active_date(), Some(day(2024, 3, 3)));
        assert_eq!(reloaded.focus_sessions_completed(), 1);
        assert!(reloaded.settings().brainrot_mode);
    }
}
