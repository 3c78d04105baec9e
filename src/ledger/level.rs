//! Level curve: a pure function of total XP.
//!
//! `level = floor(sqrt(xp / 100)) + 1`, so level boundaries sit at
//! 0, 100, 400, 900, ... XP. Levels are derived on demand and never stored.

/// Level for a given XP total
pub fn level_for_xp(xp: u64) -> u32 {
    (xp as f64 / 100.0).sqrt().floor() as u32 + 1
}

/// Lowest XP total that yields `level` (0 for level 1 and below)
pub fn xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let n = (level - 1) as u64;
    n * n * 100
}

/// Progress through the current level (0.0 - 1.0)
pub fn progress_to_next(xp: u64) -> f32 {
    let level = level_for_xp(xp);
    let current = xp_for_level(level);
    let next = xp_for_level(level + 1);
    // f64 sqrt can round up at extreme totals, putting `current` just above
    // `xp`; saturate instead of underflowing.
    xp.saturating_sub(current) as f32 / (next - current) as f32
}
