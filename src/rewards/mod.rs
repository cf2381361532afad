pub mod payouts;
pub mod progression;
pub mod tables;

pub use payouts::payout_shares;
pub use progression::{level_for_xp, level_up_reward, rod_multiplier, xp_threshold};
pub use tables::{BaitSpec, FishSpec, Rarity, find_bait, find_fish};
