//! Achievement catalog and one-way unlock tracking.

mod definitions;
mod log;

pub use definitions::{
    ACHIEVEMENTS, AchievementCategory, AchievementDef, Requirement, RequirementKind,
};
pub use log::{AchievementLog, LedgerStats};
