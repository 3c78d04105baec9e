//! Achievement definitions and metadata
//!
//! All achievements are defined here with their unlock requirements.

/// Achievement category for grouping in UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementCategory {
    Milestone,
    Streak,
    Exercise,
    Social,
    Special,
}

impl AchievementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Milestone => "Milestones",
            Self::Streak => "Streaks",
            Self::Exercise => "Exercises",
            Self::Social => "Social",
            Self::Special => "Special",
        }
    }
}

/// What an achievement measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    ExercisesCompleted,
    StreakDays,
    XpEarned,
    LevelReached,
    /// Unlocked by an explicit trigger, never by threshold checks
    Special,
}

/// Unlock requirement: the measured stat must reach `value`
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    pub kind: RequirementKind,
    pub value: u64,
}

/// Achievement definition with all metadata
#[derive(Debug, Clone)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub requirement: Requirement,
}

/// All achievement definitions, in catalog (and notification) order
pub static ACHIEVEMENTS: &[AchievementDef] = &[
    // === MILESTONE ===
    AchievementDef {
        id: "first_steps",
        name: "First Steps",
        description: "Complete your first exercise",
        icon: "👣",
        category: AchievementCategory::Milestone,
        requirement: Requirement {
            kind: RequirementKind::ExercisesCompleted,
            value: 1,
        },
    },
    AchievementDef {
        id: "getting_warm",
        name: "Getting Warm",
        description: "Complete 10 exercises",
        icon: "🔥",
        category: AchievementCategory::Milestone,
        requirement: Requirement {
            kind: RequirementKind::ExercisesCompleted,
            value: 10,
        },
    },
    AchievementDef {
        id: "problem_solver",
        name: "Problem Solver",
        description: "Complete 50 exercises",
        icon: "🧩",
        category: AchievementCategory::Milestone,
        requirement: Requirement {
            kind: RequirementKind::ExercisesCompleted,
            value: 50,
        },
    },
    AchievementDef {
        id: "code_master",
        name: "Code Master",
        description: "Complete 100 exercises",
        icon: "👑",
        category: AchievementCategory::Milestone,
        requirement: Requirement {
            kind: RequirementKind::ExercisesCompleted,
            value: 100,
        },
    },
    // === STREAK ===
    AchievementDef {
        id: "week_warrior",
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "📅",
        category: AchievementCategory::Streak,
        requirement: Requirement {
            kind: RequirementKind::StreakDays,
            value: 7,
        },
    },
    AchievementDef {
        id: "month_master",
        name: "Month Master",
        description: "Maintain a 30-day streak",
        icon: "🗓️",
        category: AchievementCategory::Streak,
        requirement: Requirement {
            kind: RequirementKind::StreakDays,
            value: 30,
        },
    },
    AchievementDef {
        id: "centurion",
        name: "Centurion",
        description: "Maintain a 100-day streak",
        icon: "💯",
        category: AchievementCategory::Streak,
        requirement: Requirement {
            kind: RequirementKind::StreakDays,
            value: 100,
        },
    },
    // === LEVELS ===
    AchievementDef {
        id: "novice",
        name: "Novice Rustacean",
        description: "Reach level 5",
        icon: "🦀",
        category: AchievementCategory::Exercise,
        requirement: Requirement {
            kind: RequirementKind::LevelReached,
            value: 5,
        },
    },
    AchievementDef {
        id: "apprentice",
        name: "Apprentice",
        description: "Reach level 10",
        icon: "⚡",
        category: AchievementCategory::Exercise,
        requirement: Requirement {
            kind: RequirementKind::LevelReached,
            value: 10,
        },
    },
    AchievementDef {
        id: "expert",
        name: "Rust Expert",
        description: "Reach level 25",
        icon: "🎯",
        category: AchievementCategory::Exercise,
        requirement: Requirement {
            kind: RequirementKind::LevelReached,
            value: 25,
        },
    },
    AchievementDef {
        id: "master",
        name: "Rust Master",
        description: "Reach level 50",
        icon: "🏆",
        category: AchievementCategory::Exercise,
        requirement: Requirement {
            kind: RequirementKind::LevelReached,
            value: 50,
        },
    },
    AchievementDef {
        id: "legend",
        name: "Rust Legend",
        description: "Reach level 100",
        icon: "👑",
        category: AchievementCategory::Exercise,
        requirement: Requirement {
            kind: RequirementKind::LevelReached,
            value: 100,
        },
    },
    // === SPECIAL ===
    AchievementDef {
        id: "night_owl",
        name: "Night Owl",
        description: "Solve an exercise after midnight",
        icon: "🦉",
        category: AchievementCategory::Special,
        requirement: Requirement {
            kind: RequirementKind::Special,
            value: 1,
        },
    },
    AchievementDef {
        id: "early_bird",
        name: "Early Bird",
        description: "Solve an exercise before 6 AM",
        icon: "🐦",
        category: AchievementCategory::Special,
        requirement: Requirement {
            kind: RequirementKind::Special,
            value: 1,
        },
    },
];

impl AchievementDef {
    /// Look up a definition by ID
    pub fn get(id: &str) -> Option<&'static AchievementDef> {
        ACHIEVEMENTS.iter().find(|a| a.id == id)
    }

    /// Total number of achievements in the catalog
    pub fn total_count() -> usize {
        ACHIEVEMENTS.len()
    }
}
