//! The three cooperating ledgers: progress, engagement, achievements.

pub mod achievements;
pub mod engagement;
pub mod level;
pub mod progress;

pub use achievements::{
    ACHIEVEMENTS, AchievementCategory, AchievementDef, AchievementLog, LedgerStats, Requirement,
    RequirementKind,
};
pub use engagement::{EngagementLedger, EngagementSettings};
pub use level::{level_for_xp, progress_to_next, xp_for_level};
pub use progress::{ExerciseProgress, ExerciseStatus, ProgressLedger, ProgressStats};
