//! Notification center: transient toasts and a capped history feed.
//!
//! Achievement and level-up entries are toasts: callers sweep them out with
//! [`NotificationCenter::expire_toasts`] once they are older than 5 seconds.
//! Everything runs on one cooperative scheduler, so expiry is an explicit
//! call rather than a timer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{NOTIFICATIONS_KEY, Store, default_version, load_state, persist_state};

/// Retained history cap; oldest entries are dropped first
const MAX_HISTORY: usize = 50;

/// Toast lifetime for achievement and level-up notifications
const TOAST_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Achievement,
    Streak,
    LevelUp,
    System,
    Exercise,
}

impl NotificationKind {
    /// Toasts auto-expire; other kinds stay until removed
    fn is_toast(&self) -> bool {
        matches!(self, Self::Achievement | Self::LevelUp)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NotifyState {
    #[serde(default = "default_version")]
    version: u32,
    /// Newest first
    notifications: Vec<Notification>,
    unread_count: u32,
}

impl Default for NotifyState {
    fn default() -> Self {
        Self {
            version: default_version(),
            notifications: Vec::new(),
            unread_count: 0,
        }
    }
}

/// Capped notification feed with unread tracking
pub struct NotificationCenter {
    store: Arc<dyn Store>,
    state: NotifyState,
}

impl NotificationCenter {
    /// Create a center over `store`, loading any persisted feed
    pub fn new(store: Arc<dyn Store>) -> Self {
        let state = load_state(store.as_ref(), NOTIFICATIONS_KEY);
        Self { store, state }
    }

    fn persist(&self) {
        persist_state(self.store.as_ref(), NOTIFICATIONS_KEY, &self.state);
    }

    /// Push a notification onto the feed. Returns its id.
    pub fn push(&mut self, kind: NotificationKind, title: &str, message: &str) -> Uuid {
        self.push_at(kind, title, message, Utc::now())
    }

    pub fn push_at(
        &mut self,
        kind: NotificationKind,
        title: &str,
        message: &str,
        now: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.state.notifications.insert(
            0,
            Notification {
                id,
                kind,
                title: title.to_string(),
                message: message.to_string(),
                read: false,
                created_at: now,
            },
        );
        // Dropped entries count as consumed, read or not
        while self.state.notifications.len() > MAX_HISTORY {
            if let Some(dropped) = self.state.notifications.pop() {
                if !dropped.read {
                    self.state.unread_count = self.state.unread_count.saturating_sub(1);
                }
            }
        }
        self.state.unread_count += 1;
        self.persist();
        id
    }

    pub fn push_achievement(&mut self, name: &str, icon: &str) -> Uuid {
        self.push(
            NotificationKind::Achievement,
            "Achievement Unlocked!",
            &format!("{icon} {name}"),
        )
    }

    pub fn push_streak(&mut self, streak_days: u32) -> Uuid {
        self.push(
            NotificationKind::Streak,
            "Streak Milestone!",
            &format!("You've maintained a {streak_days}-day streak!"),
        )
    }

    pub fn push_level_up(&mut self, level: u32) -> Uuid {
        self.push(
            NotificationKind::LevelUp,
            "Level Up!",
            &format!("Congratulations! You reached level {level}"),
        )
    }

    pub fn mark_read(&mut self, id: Uuid) {
        if let Some(n) = self.state.notifications.iter_mut().find(|n| n.id == id) {
            if !n.read {
                n.read = true;
                self.state.unread_count = self.state.unread_count.saturating_sub(1);
            }
            self.persist();
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.state.notifications {
            n.read = true;
        }
        self.state.unread_count = 0;
        self.persist();
    }

    pub fn remove(&mut self, id: Uuid) {
        let Some(pos) = self.state.notifications.iter().position(|n| n.id == id) else {
            return;
        };
        let removed = self.state.notifications.remove(pos);
        if !removed.read {
            self.state.unread_count = self.state.unread_count.saturating_sub(1);
        }
        self.persist();
    }

    pub fn clear_all(&mut self) {
        self.state.notifications.clear();
        self.state.unread_count = 0;
        self.persist();
    }

    /// Drop toast-kind entries older than the toast TTL
    pub fn expire_toasts(&mut self, now: DateTime<Utc>) {
        let mut removed_unread = 0u32;
        let before = self.state.notifications.len();
        self.state.notifications.retain(|n| {
            let expired =
                n.kind.is_toast() && (now - n.created_at).num_seconds() >= TOAST_TTL_SECS;
            if expired && !n.read {
                removed_unread += 1;
            }
            !expired
        });
        if self.state.notifications.len() != before {
            self.state.unread_count = self.state.unread_count.saturating_sub(removed_unread);
            self.persist();
        }
    }

    /// Current feed, newest first
    pub fn notifications(&self) -> &[Notification] {
        &self.state.notifications
    }

    pub fn unread_count(&self) -> u32 {
        self.state.unread_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn center() -> NotificationCenter {
        NotificationCenter::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_push_and_read_tracking() {
        let mut center = center();
        let id = center.push(NotificationKind::System, "Hello", "world");
        assert_eq!(center.unread_count(), 1);
        assert_eq!(center.notifications().len(), 1);

        center.mark_read(id);
        assert_eq!(center.unread_count(), 0);

        // Marking twice does not underflow
        center.mark_read(id);
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn test_history_capped_at_fifty() {
        let mut center = center();
        for i in 0..60 {
            center.push(NotificationKind::Exercise, "n", &format!("{i}"));
        }
        assert_eq!(center.notifications().len(), 50);
        // Newest first; the oldest ten were dropped
        assert_eq!(center.notifications()[0].message, "59");
        assert_eq!(center.notifications()[49].message, "10");
        assert_eq!(center.unread_count(), 50);
    }

    #[test]
    fn test_remove_adjusts_unread() {
        let mut center = center();
        let a = center.push(NotificationKind::System, "a", "a");
        let b = center.push(NotificationKind::System, "b", "b");

        center.mark_read(a);
        center.remove(a);
        assert_eq!(center.unread_count(), 1);

        center.remove(b);
        assert_eq!(center.unread_count(), 0);
        assert!(center.notifications().is_empty());
    }

    #[test]
    fn test_toasts_expire_after_five_seconds() {
        let mut center = center();
        let t0 = Utc::now();
        center.push_at(NotificationKind::Achievement, "Achievement Unlocked!", "👣", t0);
        center.push_at(NotificationKind::System, "keep", "me", t0);

        center.expire_toasts(t0 + Duration::seconds(4));
        assert_eq!(center.notifications().len(), 2);

        center.expire_toasts(t0 + Duration::seconds(5));
        assert_eq!(center.notifications().len(), 1);
        assert_eq!(center.notifications()[0].kind, NotificationKind::System);
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_helper_messages() {
        let mut center = center();
        center.push_achievement("First Steps", "👣");
        center.push_level_up(2);
        center.push_streak(7);

        let feed = center.notifications();
        assert_eq!(feed[0].message, "You've maintained a 7-day streak!");
        assert_eq!(feed[1].message, "Congratulations! You reached level 2");
        assert_eq!(feed[2].message, "👣 First Steps");
    }

    #[test]
    fn test_feed_survives_reload() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut center = NotificationCenter::new(store.clone());
        center.push(NotificationKind::System, "persisted", "yes");

        let reloaded = NotificationCenter::new(store);
        assert_eq!(reloaded.notifications().len(), 1);
        assert_eq!(reloaded.unread_count(), 1);
    }
}
