//! Level curve, rod multipliers and level-up rewards.

/// Total XP required to reach `level`. Quadratic curve: level 2 at 100 XP,
/// level 10 at 8100, level 50 at 240100.
pub fn xp_threshold(level: i32) -> i64 {
    let steps = (level - 1).max(0) as i64;
    100 * steps * steps
}

/// Level implied by a total XP amount. Inverse of [`xp_threshold`].
pub fn level_for_xp(xp: i64) -> i32 {
    if xp <= 0 {
        return 1;
    }
    let mut level = 1;
    while xp_threshold(level + 1) <= xp {
        level += 1;
    }
    level
}

/// Step function of level: better anglers get better rods.
pub fn rod_multiplier(level: i32) -> f64 {
    match level {
        ..=9 => 1.0,
        10..=19 => 1.05,
        20..=49 => 1.10,
        _ => 1.5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpReward {
    pub bonus_casts: i32,
    pub bait_id: &'static str,
    pub bait_count: i64,
    pub grants_chest: bool,
}

/// Reward granted when a player reaches `level`. Milestone levels
/// (60/70/80/90/100) additionally queue a chest for the client to open.
pub fn level_up_reward(level: i32) -> LevelUpReward {
    let (bait_id, bait_count) = match level {
        ..=19 => ("worm", 3),
        20..=39 => ("shrimp", 3),
        40..=59 => ("squid_chunk", 2),
        60..=79 => ("glow_lure", 2),
        _ => ("abyssal_lure", 1),
    };

    LevelUpReward {
        bonus_casts: 5,
        bait_id,
        bait_count,
        grants_chest: matches!(level, 60 | 70 | 80 | 90 | 100),
    }
}
